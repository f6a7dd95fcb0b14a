//! Service Client: the single point of entry for every HTTP call this client makes.
//!
//! Two upstreams speak the same loose JSON dialect: the search service
//! (`GET /search_jobs`) and the analysis service (`POST /recommend`). Each gets its
//! own `ServiceClient` pointed at its base URL. Orchestrators only see the
//! `SearchBackend` / `AnalysisBackend` traits.
use std::time::Duration;

use async_trait::async_trait;
use reqwest::multipart::{Form, Part};
use reqwest::{Client, Response};
use serde::de::DeserializeOwned;
use serde::Deserialize;
use serde_json::Value;
use tracing::{debug, warn};

use crate::errors::ClientError;
use crate::models::analysis::{AnalysisForm, AnalysisResponse, ResumeFile};

#[derive(Debug, Deserialize)]
struct SearchResponse {
    jobs: Vec<Value>,
}

#[derive(Debug, Deserialize)]
pub struct HealthStatus {
    pub status: String,
    #[serde(default)]
    pub message: Option<String>,
}

/// Everything sent to `POST /recommend`.
#[derive(Debug, Clone)]
pub struct AnalysisRequest {
    pub resume: ResumeFile,
    pub form: AnalysisForm,
    /// The serialized saved profile, when one exists.
    pub profile_data: Option<String>,
}

#[async_trait]
pub trait SearchBackend: Send + Sync {
    /// Raw job payloads in response order.
    async fn search_jobs(&self, keyword: &str, location: &str) -> Result<Vec<Value>, ClientError>;
}

#[async_trait]
pub trait AnalysisBackend: Send + Sync {
    async fn recommend(&self, request: &AnalysisRequest) -> Result<AnalysisResponse, ClientError>;
}

#[derive(Clone)]
pub struct ServiceClient {
    client: Client,
    base_url: String,
}

impl ServiceClient {
    pub fn new(base_url: &str, timeout: Duration) -> Result<Self, ClientError> {
        Ok(Self {
            client: Client::builder().timeout(timeout).build()?,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    /// `GET /health`
    pub async fn health(&self) -> Result<HealthStatus, ClientError> {
        let response = self.client.get(self.url("/health")).send().await?;
        read_json(response).await
    }
}

#[async_trait]
impl SearchBackend for ServiceClient {
    async fn search_jobs(&self, keyword: &str, location: &str) -> Result<Vec<Value>, ClientError> {
        let response = self
            .client
            .get(self.url("/search_jobs"))
            .query(&[("keyword", keyword), ("location", location)])
            .send()
            .await?;

        let body: SearchResponse = read_json(response).await?;
        debug!("Search service returned {} jobs", body.jobs.len());
        Ok(body.jobs)
    }
}

#[async_trait]
impl AnalysisBackend for ServiceClient {
    async fn recommend(&self, request: &AnalysisRequest) -> Result<AnalysisResponse, ClientError> {
        let resume = Part::bytes(request.resume.bytes.to_vec())
            .file_name(request.resume.file_name.clone())
            .mime_str(&request.resume.content_type)?;

        let mut form = Form::new()
            .part("resume", resume)
            .text("skills", request.form.skills.clone())
            .text("education", request.form.education.clone())
            .text("location", request.form.location.clone())
            .text("domain", request.form.domain.clone());
        if let Some(profile_data) = &request.profile_data {
            form = form.text("profile_data", profile_data.clone());
        }

        let response = self
            .client
            .post(self.url("/recommend"))
            .multipart(form)
            .send()
            .await?;

        read_json(response).await
    }
}

/// Maps a response to a typed body or one of Server / Transport / MalformedResponse.
async fn read_json<T: DeserializeOwned>(response: Response) -> Result<T, ClientError> {
    let status = response.status();
    let body = response.bytes().await?;

    if !status.is_success() {
        let message = error_message(&body);
        warn!(
            "Service returned {}: {}",
            status,
            message.as_deref().unwrap_or("<no error message>")
        );
        return Err(ClientError::Server {
            status: status.as_u16(),
            message,
        });
    }

    serde_json::from_slice(&body).map_err(|e| ClientError::MalformedResponse(e.to_string()))
}

/// Pulls `error` (a string) or `error.message` out of an error body.
fn error_message(body: &[u8]) -> Option<String> {
    let json: Value = serde_json::from_slice(body).ok()?;
    let error = json.get("error")?;
    error
        .as_str()
        .or_else(|| error.get("message").and_then(Value::as_str))
        .map(str::trim)
        .filter(|m| !m.is_empty())
        .map(String::from)
}
