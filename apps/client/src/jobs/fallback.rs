//! Offline dataset used when the live search service is unreachable.

use std::path::PathBuf;

use async_trait::async_trait;
use serde::Deserialize;
use serde_json::Value;
use tracing::debug;

use crate::errors::ClientError;
use crate::jobs::normalizer::display_name;
use crate::models::search::SearchQuery;

#[derive(Debug, Deserialize)]
struct FallbackDocument {
    jobs: Vec<Value>,
}

/// Where the bundled listings come from. Carried as `Arc<dyn FallbackSource>`.
#[async_trait]
pub trait FallbackSource: Send + Sync {
    async fn load(&self) -> Result<Vec<Value>, ClientError>;
}

/// Reads `{ "jobs": [...] }` from a JSON file on every call.
pub struct FileFallback {
    path: PathBuf,
}

impl FileFallback {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

#[async_trait]
impl FallbackSource for FileFallback {
    async fn load(&self) -> Result<Vec<Value>, ClientError> {
        let contents = tokio::fs::read(&self.path).await.map_err(|e| {
            ClientError::FallbackExhausted(format!("{}: {e}", self.path.display()))
        })?;
        let document: FallbackDocument = serde_json::from_slice(&contents).map_err(|e| {
            ClientError::FallbackExhausted(format!("{}: {e}", self.path.display()))
        })?;
        debug!(
            "Loaded {} offline listings from {}",
            document.jobs.len(),
            self.path.display()
        );
        Ok(document.jobs)
    }
}

/// Keeps listings whose title, company or description contains the keyword and
/// whose location contains the location token, both case-insensitively.
/// The catch-all location matches every listing.
pub fn filter_listings(listings: Vec<Value>, query: &SearchQuery) -> Vec<Value> {
    let keyword = query.keyword.trim().to_lowercase();
    let location = query.location.as_str();
    let match_any_location = query.location.is_catch_all();

    listings
        .into_iter()
        .filter(|job| {
            keyword.is_empty()
                || ["title", "description"]
                    .iter()
                    .filter_map(|f| job.get(*f).and_then(Value::as_str))
                    .chain(display_name(job, "company"))
                    .any(|text| text.to_lowercase().contains(&keyword))
        })
        .filter(|job| {
            match_any_location
                || display_name(job, "location")
                    .is_some_and(|l| l.to_lowercase().contains(location))
        })
        .collect()
}
