//! Match tiers. Every place that shows match strength or a score-band color
//! goes through here so the thresholds stay in one spot.

use serde::{Deserialize, Serialize};

/// Scores below this trigger the "add missing keywords" advisory.
pub const LOW_SCORE_THRESHOLD: f64 = 60.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MatchTier {
    VeryLow,
    Low,
    Medium,
    High,
}

impl MatchTier {
    pub fn from_percent(percent: i64) -> Self {
        match percent {
            p if p >= 80 => MatchTier::High,
            p if p >= 60 => MatchTier::Medium,
            p if p >= 40 => MatchTier::Low,
            _ => MatchTier::VeryLow,
        }
    }

    /// Classifies a `"<n>%"` string. Total: anything unparsable is `VeryLow`.
    pub fn classify(match_percent: &str) -> Self {
        parse_percent(match_percent)
            .map(MatchTier::from_percent)
            .unwrap_or(MatchTier::VeryLow)
    }

    pub fn from_score(score: f64) -> Self {
        if score.is_nan() {
            return MatchTier::VeryLow;
        }
        MatchTier::from_percent(score.floor() as i64)
    }

    pub fn label(&self) -> &'static str {
        match self {
            MatchTier::High => "High",
            MatchTier::Medium => "Medium",
            MatchTier::Low => "Low",
            MatchTier::VeryLow => "Very low",
        }
    }
}

/// Parses `"85%"`, `"85"` or `" 85.4 %"` to an integer percentage.
/// Fractions are truncated toward negative infinity.
pub fn parse_percent(raw: &str) -> Option<i64> {
    let trimmed = raw.trim();
    let number = trimmed.strip_suffix('%').unwrap_or(trimmed).trim();
    if let Ok(n) = number.parse::<i64>() {
        return Some(n);
    }
    number
        .parse::<f64>()
        .ok()
        .filter(|f| f.is_finite())
        .map(|f| f.floor() as i64)
}

/// True when `raw` is exactly `<digits>%` with at most three digits.
pub fn is_canonical_percent(raw: &str) -> bool {
    raw.strip_suffix('%')
        .is_some_and(|digits| {
            (1..=3).contains(&digits.len()) && digits.chars().all(|c| c.is_ascii_digit())
        })
}

pub fn is_low_score(score: f64) -> bool {
    score < LOW_SCORE_THRESHOLD
}

/// Human label for an ATS score band, used when the service omits `status`.
pub fn status_label(score: f64) -> &'static str {
    match MatchTier::from_score(score) {
        MatchTier::High => "Excellent chance",
        MatchTier::Medium => "Good chance",
        MatchTier::Low => "Fair chance",
        MatchTier::VeryLow => "Low chance, add missing keywords",
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_thresholds() {
        assert_eq!(MatchTier::classify("80%"), MatchTier::High);
        assert_eq!(MatchTier::classify("79%"), MatchTier::Medium);
        assert_eq!(MatchTier::classify("60%"), MatchTier::Medium);
        assert_eq!(MatchTier::classify("59%"), MatchTier::Low);
        assert_eq!(MatchTier::classify("40%"), MatchTier::Low);
        assert_eq!(MatchTier::classify("39%"), MatchTier::VeryLow);
        assert_eq!(MatchTier::classify("0%"), MatchTier::VeryLow);
    }

    #[test]
    fn test_monotonic_non_increasing_as_percent_decreases() {
        let mut previous = MatchTier::classify("100%");
        for n in (0..=100).rev() {
            let tier = MatchTier::classify(&format!("{n}%"));
            assert!(tier <= previous, "tier rose at {n}%");
            previous = tier;
        }
    }

    #[test]
    fn test_malformed_input_is_very_low() {
        assert_eq!(MatchTier::classify("abc"), MatchTier::VeryLow);
        assert_eq!(MatchTier::classify(""), MatchTier::VeryLow);
        assert_eq!(MatchTier::classify("%"), MatchTier::VeryLow);
        assert_eq!(MatchTier::classify("NaN%"), MatchTier::VeryLow);
    }

    #[test]
    fn test_missing_percent_sign_still_parses() {
        assert_eq!(MatchTier::classify("85"), MatchTier::High);
        assert_eq!(MatchTier::classify(" 72.9 %"), MatchTier::Medium);
    }

    #[test]
    fn test_score_45_is_low_with_advisory() {
        assert_eq!(MatchTier::from_score(45.0), MatchTier::Low);
        assert!(is_low_score(45.0));
        assert!(!is_low_score(60.0));
    }

    #[test]
    fn test_canonical_percent() {
        assert!(is_canonical_percent("7%"));
        assert!(is_canonical_percent("100%"));
        assert!(!is_canonical_percent("85"));
        assert!(!is_canonical_percent("8.5%"));
        assert!(!is_canonical_percent("1000%"));
        assert!(!is_canonical_percent("%"));
    }

    #[test]
    fn test_status_labels() {
        assert_eq!(status_label(91.0), "Excellent chance");
        assert_eq!(status_label(65.2), "Good chance");
        assert_eq!(status_label(40.0), "Fair chance");
        assert_eq!(status_label(12.0), "Low chance, add missing keywords");
    }
}
