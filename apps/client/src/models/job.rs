use serde::{Deserialize, Serialize};

use crate::jobs::classifier::MatchTier;

/// The canonical job record every caller renders against, whichever upstream produced it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct JobRecord {
    pub title: String,
    pub company: String,
    pub location: String,
    pub description: String,
    /// Always `"<int>%"`.
    pub match_percent: String,
    pub apply_link: String,
}

impl JobRecord {
    pub fn tier(&self) -> MatchTier {
        MatchTier::classify(&self.match_percent)
    }
}
