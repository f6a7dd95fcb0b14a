use std::path::Path;

use bytes::Bytes;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::errors::ClientError;
use crate::jobs::classifier::{is_low_score, MatchTier};
use crate::models::job::JobRecord;
use crate::models::profile::Profile;

pub const PDF_CONTENT_TYPE: &str = "application/pdf";
pub const DOCX_CONTENT_TYPE: &str =
    "application/vnd.openxmlformats-officedocument.wordprocessingml.document";
pub const ACCEPTED_CONTENT_TYPES: [&str; 2] = [PDF_CONTENT_TYPE, DOCX_CONTENT_TYPE];
/// 10 MiB
pub const MAX_RESUME_BYTES: usize = 10 * 1024 * 1024;

/// A resume selected for submission. `content_type` is the declared type, not sniffed.
#[derive(Debug, Clone)]
pub struct ResumeFile {
    pub file_name: String,
    pub content_type: String,
    pub bytes: Bytes,
}

impl ResumeFile {
    pub fn new(
        file_name: impl Into<String>,
        content_type: impl Into<String>,
        bytes: impl Into<Bytes>,
    ) -> Self {
        Self {
            file_name: file_name.into(),
            content_type: content_type.into(),
            bytes: bytes.into(),
        }
    }

    /// Reads a file from disk, declaring its type from the extension.
    /// Unknown extensions are declared as `application/octet-stream` and rejected
    /// later by validation. Oversized files are rejected before they are read.
    pub fn from_path(path: &Path) -> Result<Self, ClientError> {
        let unreadable = |e: std::io::Error| {
            ClientError::Validation(format!("Could not read '{}': {e}", path.display()))
        };
        let len = std::fs::metadata(path).map_err(unreadable)?.len();
        if len > MAX_RESUME_BYTES as u64 {
            return Err(resume_too_large(len));
        }
        let bytes = std::fs::read(path).map_err(unreadable)?;
        let file_name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| "resume".to_string());
        Ok(Self::new(
            file_name,
            content_type_for(path),
            Bytes::from(bytes),
        ))
    }

    pub fn size(&self) -> usize {
        self.bytes.len()
    }
}

pub fn resume_too_large(size: u64) -> ClientError {
    ClientError::Validation(format!(
        "Resume is {:.2} MB; the limit is 10 MB",
        size as f64 / 1024.0 / 1024.0
    ))
}

fn content_type_for(path: &Path) -> &'static str {
    match path
        .extension()
        .and_then(|e| e.to_str())
        .map(|e| e.to_ascii_lowercase())
        .as_deref()
    {
        Some("pdf") => PDF_CONTENT_TYPE,
        Some("docx") => DOCX_CONTENT_TYPE,
        _ => "application/octet-stream",
    }
}

/// Optional free-text fields sent alongside the resume.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AnalysisForm {
    pub skills: String,
    pub education: String,
    pub location: String,
    pub domain: String,
}

impl Default for AnalysisForm {
    fn default() -> Self {
        Self {
            skills: String::new(),
            education: String::new(),
            location: "india".to_string(),
            domain: String::new(),
        }
    }
}

impl AnalysisForm {
    /// Pre-fills skills, education and location from a saved profile.
    pub fn from_profile(profile: &Profile) -> Self {
        let location = if profile.location.trim().is_empty() {
            "india".to_string()
        } else {
            profile.location.clone()
        };
        Self {
            skills: profile.skills.join(", "),
            education: profile.education.clone(),
            location,
            domain: String::new(),
        }
    }
}

/// The analysis service's response body, as received.
#[derive(Debug, Clone, Deserialize)]
pub struct AnalysisResponse {
    pub ats_score: f64,
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default)]
    pub missing_keywords: Vec<String>,
    #[serde(default)]
    pub recommendations: Vec<Value>,
    #[serde(default)]
    pub effective_search_keyword: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnalysisResult {
    /// 0 – 100
    pub ats_score: f64,
    pub status: String,
    pub missing_keywords: Vec<String>,
    pub recommendations: Vec<JobRecord>,
    pub effective_search_keyword: String,
}

impl AnalysisResult {
    pub fn tier(&self) -> MatchTier {
        MatchTier::from_score(self.ats_score)
    }

    /// True when the score is low enough to show the "add missing keywords" advisory.
    pub fn needs_improvement(&self) -> bool {
        is_low_score(self.ats_score)
    }
}
