use std::fmt;

use clap::ValueEnum;
use serde::{Deserialize, Serialize};

/// Recognized city/region tokens. `India` is the catch-all.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum Location {
    #[default]
    India,
    Bangalore,
    Mumbai,
    Delhi,
    Pune,
    Hyderabad,
    Chennai,
    Kolkata,
    Ahmedabad,
    Gurgaon,
    Noida,
}

impl Location {
    pub const ALL: [Location; 11] = [
        Location::India,
        Location::Bangalore,
        Location::Mumbai,
        Location::Delhi,
        Location::Pune,
        Location::Hyderabad,
        Location::Chennai,
        Location::Kolkata,
        Location::Ahmedabad,
        Location::Gurgaon,
        Location::Noida,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Location::India => "india",
            Location::Bangalore => "bangalore",
            Location::Mumbai => "mumbai",
            Location::Delhi => "delhi",
            Location::Pune => "pune",
            Location::Hyderabad => "hyderabad",
            Location::Chennai => "chennai",
            Location::Kolkata => "kolkata",
            Location::Ahmedabad => "ahmedabad",
            Location::Gurgaon => "gurgaon",
            Location::Noida => "noida",
        }
    }

    /// Case-insensitive token lookup.
    pub fn from_token(token: &str) -> Option<Location> {
        let token = token.trim().to_lowercase();
        Location::ALL.into_iter().find(|l| l.as_str() == token)
    }

    /// Resolves free text (e.g. a profile's location) to a token, defaulting to
    /// the catch-all when it is not one of the recognized values.
    pub fn from_free_text(text: &str) -> Location {
        Location::from_token(text).unwrap_or_default()
    }

    pub fn is_catch_all(&self) -> bool {
        matches!(self, Location::India)
    }
}

impl fmt::Display for Location {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SearchQuery {
    pub keyword: String,
    pub location: Location,
}

impl SearchQuery {
    pub fn new(keyword: impl Into<String>, location: Location) -> Self {
        Self {
            keyword: keyword.into(),
            location,
        }
    }
}

/// Quick searches offered to the user before they type anything.
pub const POPULAR_SEARCHES: &[(&str, Location)] = &[
    ("product management intern", Location::Bangalore),
    ("business analyst intern", Location::Mumbai),
    ("marketing intern", Location::Delhi),
    ("operations intern", Location::Pune),
    ("data analyst intern", Location::Hyderabad),
    ("strategy intern", Location::Chennai),
];

pub const DEFAULT_KEYWORD: &str = "product management intern";
