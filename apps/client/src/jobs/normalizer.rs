//! Job Record Normalizer: folds the three upstream job shapes into one `JobRecord`.
//!
//! The search service sends flat strings, the recommendation service sends flat
//! strings with a computed `match_percent`, and the offline dataset nests
//! `company` / `location` under `{display_name}` and carries `redirect_url`.
//! Normalization never fails: anything missing degrades to a placeholder.

use std::sync::Arc;

use rand::Rng;
use reqwest::Url;
use serde_json::Value;

use crate::config::PlaceholderSetting;
use crate::jobs::classifier::is_canonical_percent;
use crate::models::job::JobRecord;

pub const PLACEHOLDER_TITLE: &str = "Internship Position";
pub const PLACEHOLDER_COMPANY: &str = "Company";
pub const PLACEHOLDER_LOCATION: &str = "Location";
pub const PLACEHOLDER_DESCRIPTION: &str = "Exciting internship opportunity in a leading company.";

pub const DEFAULT_SEARCH_LINK_BASE: &str = "https://www.adzuna.co.in/jobs/search/internship";
const DEFAULT_LINK_KEYWORD: &str = "internship";

// ────────────────────────────────────────────────────────────────────────────
// Placeholder match percent
// ────────────────────────────────────────────────────────────────────────────

/// Supplies a `match_percent` for records that arrive without one.
///
/// This is a display placeholder, not a score. Nothing downstream should treat
/// its value as evidence of fit.
pub trait MatchPlaceholder: Send + Sync {
    fn placeholder_percent(&self) -> u8;
}

/// Uniform random integer in `[min, max]`.
pub struct RandomPlaceholder {
    pub min: u8,
    pub max: u8,
}

impl Default for RandomPlaceholder {
    fn default() -> Self {
        Self { min: 70, max: 99 }
    }
}

impl MatchPlaceholder for RandomPlaceholder {
    fn placeholder_percent(&self) -> u8 {
        let (lo, hi) = if self.min <= self.max {
            (self.min, self.max)
        } else {
            (self.max, self.min)
        };
        rand::rng().random_range(lo..=hi)
    }
}

/// Always the same percentage. Deterministic, for tests and for users who
/// prefer not to see invented numbers vary.
pub struct FixedPlaceholder(pub u8);

impl MatchPlaceholder for FixedPlaceholder {
    fn placeholder_percent(&self) -> u8 {
        self.0.min(100)
    }
}

pub fn placeholder_from_setting(setting: PlaceholderSetting) -> Arc<dyn MatchPlaceholder> {
    match setting {
        PlaceholderSetting::Random => Arc::new(RandomPlaceholder::default()),
        PlaceholderSetting::Fixed(value) => Arc::new(FixedPlaceholder(value)),
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Normalizer
// ────────────────────────────────────────────────────────────────────────────

#[derive(Clone)]
pub struct JobRecordNormalizer {
    placeholder: Arc<dyn MatchPlaceholder>,
    search_link_base: String,
}

impl Default for JobRecordNormalizer {
    fn default() -> Self {
        Self::new(Arc::new(RandomPlaceholder::default()))
    }
}

impl JobRecordNormalizer {
    pub fn new(placeholder: Arc<dyn MatchPlaceholder>) -> Self {
        Self {
            placeholder,
            search_link_base: DEFAULT_SEARCH_LINK_BASE.to_string(),
        }
    }

    pub fn with_search_link_base(mut self, base: impl Into<String>) -> Self {
        self.search_link_base = base.into();
        self
    }

    /// Maps any job-like payload to the canonical shape.
    /// `search_keyword` parameterizes the synthesized apply link.
    pub fn normalize(&self, raw: &Value, search_keyword: &str) -> JobRecord {
        let match_percent = match non_blank_str(raw, "match_percent") {
            Some(p) if is_canonical_percent(p) => p.to_string(),
            _ => format!("{}%", self.placeholder.placeholder_percent()),
        };

        let apply_link = link_field(raw, "apply_link")
            .or_else(|| link_field(raw, "redirect_url"))
            .map(String::from)
            .unwrap_or_else(|| self.search_link(search_keyword));

        JobRecord {
            title: non_blank_str(raw, "title")
                .unwrap_or(PLACEHOLDER_TITLE)
                .to_string(),
            company: display_name(raw, "company")
                .unwrap_or(PLACEHOLDER_COMPANY)
                .to_string(),
            location: display_name(raw, "location")
                .unwrap_or(PLACEHOLDER_LOCATION)
                .to_string(),
            description: non_blank_str(raw, "description")
                .unwrap_or(PLACEHOLDER_DESCRIPTION)
                .to_string(),
            match_percent,
            apply_link,
        }
    }

    pub fn normalize_all(&self, raw_jobs: &[Value], search_keyword: &str) -> Vec<JobRecord> {
        raw_jobs
            .iter()
            .map(|raw| self.normalize(raw, search_keyword))
            .collect()
    }

    /// External job-board search URL for the keyword.
    fn search_link(&self, keyword: &str) -> String {
        let keyword = match keyword.trim() {
            "" => DEFAULT_LINK_KEYWORD,
            k => k,
        };
        Url::parse_with_params(&self.search_link_base, &[("keyword", keyword)])
            .or_else(|_| {
                Url::parse_with_params(DEFAULT_SEARCH_LINK_BASE, &[("keyword", keyword)])
            })
            .map(|u| u.to_string())
            .unwrap_or_else(|_| DEFAULT_SEARCH_LINK_BASE.to_string())
    }
}

/// `raw[field]` as a string if it is one, or `raw[field].display_name` if that is.
pub fn display_name<'a>(raw: &'a Value, field: &str) -> Option<&'a str> {
    let value = raw.get(field)?;
    match value {
        Value::String(s) if !s.trim().is_empty() => Some(s.as_str()),
        Value::Object(_) => value
            .get("display_name")
            .and_then(Value::as_str)
            .filter(|s| !s.trim().is_empty()),
        _ => None,
    }
}

fn non_blank_str<'a>(raw: &'a Value, field: &str) -> Option<&'a str> {
    raw.get(field)
        .and_then(Value::as_str)
        .filter(|s| !s.trim().is_empty())
}

/// Upstreams send `"#"` when they have no link.
fn link_field<'a>(raw: &'a Value, field: &str) -> Option<&'a str> {
    non_blank_str(raw, field).filter(|s| s.trim() != "#")
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn fixed(n: u8) -> JobRecordNormalizer {
        JobRecordNormalizer::new(Arc::new(FixedPlaceholder(n)))
    }

    #[test]
    fn test_flat_search_record() {
        let raw = json!({
            "title": "PM Intern",
            "company": "Acme",
            "location": "Pune",
            "description": "Own the roadmap",
            "match_percent": "85%",
            "apply_link": "https://acme.example/jobs/1"
        });
        let job = fixed(70).normalize(&raw, "product");
        assert_eq!(job.title, "PM Intern");
        assert_eq!(job.company, "Acme");
        assert_eq!(job.location, "Pune");
        assert_eq!(job.match_percent, "85%");
        assert_eq!(job.apply_link, "https://acme.example/jobs/1");
    }

    #[test]
    fn test_nested_display_names_and_redirect_url() {
        let raw = json!({
            "title": "Product Management Summer Intern",
            "company": {"display_name": "TechCorp India"},
            "location": {"display_name": "Bangalore, Karnataka"},
            "description": "Roadmaps",
            "redirect_url": "https://careers.techcorp.com/internships/pm"
        });
        let job = fixed(77).normalize(&raw, "product");
        assert_eq!(job.company, "TechCorp India");
        assert_eq!(job.location, "Bangalore, Karnataka");
        assert_eq!(job.match_percent, "77%");
        assert_eq!(job.apply_link, "https://careers.techcorp.com/internships/pm");
    }

    #[test]
    fn test_empty_payload_gets_placeholders() {
        let job = fixed(90).normalize(&json!({}), "product");
        assert_eq!(job.title, PLACEHOLDER_TITLE);
        assert_eq!(job.company, PLACEHOLDER_COMPANY);
        assert_eq!(job.location, PLACEHOLDER_LOCATION);
        assert_eq!(job.description, PLACEHOLDER_DESCRIPTION);
        assert_eq!(job.match_percent, "90%");
    }

    #[test]
    fn test_non_object_payload_does_not_fail() {
        let job = fixed(90).normalize(&json!("garbage"), "");
        assert_eq!(job.title, PLACEHOLDER_TITLE);
        assert!(job.apply_link.starts_with("https://"));
    }

    #[test]
    fn test_missing_links_synthesize_search_url() {
        for raw in [
            json!({}),
            json!({"apply_link": ""}),
            json!({"apply_link": "#", "redirect_url": "  "}),
            json!({"apply_link": null, "redirect_url": 42}),
        ] {
            let job = fixed(80).normalize(&raw, "product management & strategy");
            let url = Url::parse(&job.apply_link).expect("well-formed URL");
            assert_eq!(url.host_str(), Some("www.adzuna.co.in"));
            let keyword = url
                .query_pairs()
                .find(|(k, _)| k == "keyword")
                .map(|(_, v)| v.into_owned());
            assert_eq!(keyword.as_deref(), Some("product management & strategy"));
        }
    }

    #[test]
    fn test_blank_keyword_still_builds_url() {
        let job = fixed(80).normalize(&json!({}), "   ");
        assert!(job.apply_link.ends_with("keyword=internship"));
    }

    #[test]
    fn test_non_canonical_percent_is_replaced() {
        for bad in [json!("85"), json!("eighty%"), json!(85), json!("8.5%")] {
            let job = fixed(71).normalize(&json!({ "match_percent": bad }), "x");
            assert_eq!(job.match_percent, "71%");
        }
    }

    #[test]
    fn test_random_placeholder_stays_in_range() {
        let normalizer = JobRecordNormalizer::default();
        for _ in 0..200 {
            let job = normalizer.normalize(&json!({}), "x");
            let n: u8 = job.match_percent.trim_end_matches('%').parse().unwrap();
            assert!((70..=99).contains(&n), "out of range: {n}");
        }
    }

    #[test]
    fn test_custom_link_base() {
        let normalizer = fixed(80).with_search_link_base("https://jobs.example/search");
        let job = normalizer.normalize(&json!({}), "pm");
        assert_eq!(job.apply_link, "https://jobs.example/search?keyword=pm");
    }

    #[test]
    fn test_normalize_all_preserves_order() {
        let raws = vec![json!({"title": "A"}), json!({"title": "B"}), json!({"title": "C"})];
        let titles: Vec<_> = fixed(80)
            .normalize_all(&raws, "x")
            .into_iter()
            .map(|j| j.title)
            .collect();
        assert_eq!(titles, vec!["A", "B", "C"]);
    }
}
