use std::path::PathBuf;

use anyhow::{bail, Context, Result};

use crate::jobs::normalizer::DEFAULT_SEARCH_LINK_BASE;

const DEFAULT_SEARCH_API_URL: &str = "http://127.0.0.1:7000";
const DEFAULT_ANALYSIS_API_URL: &str = "http://127.0.0.1:5002";

/// How the normalizer fills in a missing `match_percent`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlaceholderSetting {
    /// Uniform random integer in [70, 99].
    Random,
    /// Always the given percentage.
    Fixed(u8),
}

/// Application configuration loaded from environment variables.
/// Every variable has a default, so a bare checkout runs against local services.
#[derive(Debug, Clone)]
pub struct Config {
    pub search_api_url: String,
    pub analysis_api_url: String,
    pub profile_path: PathBuf,
    pub fallback_dataset_path: PathBuf,
    pub request_timeout_secs: u64,
    pub match_placeholder: PlaceholderSetting,
    /// Job-board search page used for synthesized apply links.
    pub job_board_url: String,
    pub rust_log: String,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok(); // load .env if present; ignore if missing

        Ok(Config {
            search_api_url: env_or("SEARCH_API_URL", DEFAULT_SEARCH_API_URL),
            analysis_api_url: env_or("ANALYSIS_API_URL", DEFAULT_ANALYSIS_API_URL),
            profile_path: env_or("PROFILE_PATH", "data/user_profile.json").into(),
            fallback_dataset_path: env_or("FALLBACK_DATASET_PATH", "data/internships.json")
                .into(),
            request_timeout_secs: env_or("REQUEST_TIMEOUT_SECS", "30")
                .parse::<u64>()
                .context("REQUEST_TIMEOUT_SECS must be a whole number of seconds")?,
            match_placeholder: parse_placeholder(&env_or("MATCH_PLACEHOLDER", "random"))?,
            job_board_url: env_or("JOB_BOARD_URL", DEFAULT_SEARCH_LINK_BASE),
            rust_log: env_or("RUST_LOG", "info"),
        })
    }
}

fn env_or(key: &str, default: &str) -> String {
    std::env::var(key).unwrap_or_else(|_| default.to_string())
}

fn parse_placeholder(raw: &str) -> Result<PlaceholderSetting> {
    let raw = raw.trim();
    if raw.eq_ignore_ascii_case("random") {
        return Ok(PlaceholderSetting::Random);
    }
    let value = raw
        .parse::<u8>()
        .with_context(|| format!("MATCH_PLACEHOLDER must be 'random' or 0-100, got '{raw}'"))?;
    if value > 100 {
        bail!("MATCH_PLACEHOLDER must be at most 100, got {value}");
    }
    Ok(PlaceholderSetting::Fixed(value))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_placeholder_random() {
        assert_eq!(
            parse_placeholder("Random").unwrap(),
            PlaceholderSetting::Random
        );
    }

    #[test]
    fn test_parse_placeholder_fixed() {
        assert_eq!(
            parse_placeholder(" 85 ").unwrap(),
            PlaceholderSetting::Fixed(85)
        );
    }

    #[test]
    fn test_parse_placeholder_rejects_out_of_range() {
        assert!(parse_placeholder("150").is_err());
        assert!(parse_placeholder("high").is_err());
    }
}
