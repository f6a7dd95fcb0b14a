//! Analysis Orchestrator: resume submission for ATS scoring and recommendations.
//!
//! `Idle → Validating → Submitting → {Success, Failed}`
//!
//! Validation is local and synchronous. A rejected submission changes no state,
//! never touches the network and never supersedes a submission already in flight.
//! There is no automatic retry: trying again is a new submission.

use std::sync::Arc;

use tokio::sync::watch;
use tracing::{info, warn};

use crate::backend::{AnalysisBackend, AnalysisRequest};
use crate::errors::{ClientError, GENERIC_ANALYSIS_MESSAGE};
use crate::jobs::classifier::status_label;
use crate::jobs::normalizer::JobRecordNormalizer;
use crate::models::analysis::{
    resume_too_large, AnalysisForm, AnalysisResponse, AnalysisResult, ResumeFile,
    ACCEPTED_CONTENT_TYPES, MAX_RESUME_BYTES,
};
use crate::orchestrator::token::{Completion, RequestTokens};
use crate::profile::store::ProfileStore;

const DEFAULT_RECOMMENDATION_KEYWORD: &str = "internship";

#[derive(Debug, Clone, PartialEq)]
pub enum AnalysisState {
    Idle,
    Validating,
    Submitting,
    Success { result: AnalysisResult },
    Failed { message: String },
}

/// Checks a selected resume before anything is sent.
pub fn validate_resume(resume: Option<&ResumeFile>) -> Result<&ResumeFile, ClientError> {
    let resume =
        resume.ok_or_else(|| ClientError::Validation("Please upload your resume".to_string()))?;
    if !ACCEPTED_CONTENT_TYPES.contains(&resume.content_type.as_str()) {
        return Err(ClientError::Validation(
            "Please upload a PDF or DOCX file".to_string(),
        ));
    }
    if resume.size() > MAX_RESUME_BYTES {
        return Err(resume_too_large(resume.size() as u64));
    }
    Ok(resume)
}

pub struct AnalysisOrchestrator {
    backend: Arc<dyn AnalysisBackend>,
    store: Arc<ProfileStore>,
    normalizer: JobRecordNormalizer,
    state: watch::Sender<AnalysisState>,
    tokens: RequestTokens,
}

impl AnalysisOrchestrator {
    pub fn new(
        backend: Arc<dyn AnalysisBackend>,
        store: Arc<ProfileStore>,
        normalizer: JobRecordNormalizer,
    ) -> Self {
        let (state, _) = watch::channel(AnalysisState::Idle);
        Self {
            backend,
            store,
            normalizer,
            state,
            tokens: RequestTokens::default(),
        }
    }

    pub fn subscribe(&self) -> watch::Receiver<AnalysisState> {
        self.state.subscribe()
    }

    pub fn state(&self) -> AnalysisState {
        self.state.borrow().clone()
    }

    /// Validates and submits a resume.
    ///
    /// Returns `Err` only for validation failures, which leave the state as it was.
    /// Service failures resolve to `AnalysisState::Failed`.
    pub async fn submit(
        &self,
        resume: Option<ResumeFile>,
        form: AnalysisForm,
    ) -> Result<Completion<AnalysisState>, ClientError> {
        let resume = validate_resume(resume.as_ref())?.clone();
        let token = self.tokens.begin(&self.state, AnalysisState::Validating);

        if self
            .tokens
            .settle(&self.state, token, AnalysisState::Submitting)
            == Completion::Superseded
        {
            return Ok(Completion::Superseded);
        }

        let request = AnalysisRequest {
            resume,
            profile_data: self.profile_data(),
            form,
        };
        info!(
            file = %request.resume.file_name,
            bytes = request.resume.size(),
            with_profile = request.profile_data.is_some(),
            "submitting resume for analysis"
        );

        let outcome = match self.backend.recommend(&request).await {
            Ok(response) => AnalysisState::Success {
                result: self.adopt(response, &request.form),
            },
            Err(e) => {
                warn!("Resume analysis failed: {e}");
                AnalysisState::Failed {
                    message: e
                        .server_message()
                        .map(String::from)
                        .unwrap_or_else(|| GENERIC_ANALYSIS_MESSAGE.to_string()),
                }
            }
        };

        let completion = self.tokens.settle(&self.state, token, outcome);
        if completion == Completion::Superseded {
            info!("Discarding response from a superseded analysis");
        }
        Ok(completion)
    }

    /// The saved profile, serialized, if there is one.
    fn profile_data(&self) -> Option<String> {
        let profile = self.store.load_saved()?;
        match serde_json::to_string(&profile) {
            Ok(json) => Some(json),
            Err(e) => {
                warn!("Could not serialize profile for submission: {e}");
                None
            }
        }
    }

    fn adopt(&self, response: AnalysisResponse, form: &AnalysisForm) -> AnalysisResult {
        let ats_score = response.ats_score.clamp(0.0, 100.0);
        let effective_search_keyword = response
            .effective_search_keyword
            .filter(|k| !k.trim().is_empty())
            .or_else(|| Some(form.skills.trim().to_string()).filter(|s| !s.is_empty()))
            .unwrap_or_else(|| DEFAULT_RECOMMENDATION_KEYWORD.to_string());
        let status = response
            .status
            .filter(|s| !s.trim().is_empty())
            .unwrap_or_else(|| status_label(ats_score).to_string());

        AnalysisResult {
            ats_score,
            status,
            missing_keywords: response.missing_keywords,
            recommendations: self
                .normalizer
                .normalize_all(&response.recommendations, &effective_search_keyword),
            effective_search_keyword,
        }
    }
}
