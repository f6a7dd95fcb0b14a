use thiserror::Error;

pub const GENERIC_SEARCH_MESSAGE: &str = "Failed to search jobs. Please try again.";
pub const GENERIC_ANALYSIS_MESSAGE: &str = "An error occurred while analyzing your resume";

/// Client-level error type.
/// Every orchestrator failure resolves to one of these, and each variant maps to
/// a message that is safe to show the user.
#[derive(Debug, Error)]
pub enum ClientError {
    /// Local input was missing or invalid. Never reaches the network.
    #[error("Validation error: {0}")]
    Validation(String),

    /// The request could not be sent or no response arrived.
    #[error("Transport error: {0}")]
    Transport(#[from] reqwest::Error),

    /// Non-success status. `message` is the server-reported `error` field, if any.
    #[error("Server error (status {status}): {}", message.as_deref().unwrap_or("no message"))]
    Server { status: u16, message: Option<String> },

    /// Success status, but the body did not have the expected shape.
    #[error("Malformed response: {0}")]
    MalformedResponse(String),

    /// The bundled offline dataset could not be read.
    #[error("Fallback dataset unavailable: {0}")]
    FallbackExhausted(String),

    /// The persisted profile slot could not be written or removed.
    #[error("Profile storage error: {0}")]
    Storage(String),
}

impl ClientError {
    /// Message suitable for display. Technical detail is logged, not shown.
    pub fn user_message(&self) -> String {
        match self {
            ClientError::Validation(msg) => msg.clone(),
            ClientError::Server {
                message: Some(msg), ..
            } => msg.clone(),
            ClientError::Server {
                status,
                message: None,
            } => {
                tracing::error!("Server returned status {status} without a message");
                "The service could not complete the request. Please try again.".to_string()
            }
            ClientError::Transport(e) => {
                tracing::error!("Transport error: {e}");
                "Could not reach the service. Check your connection and try again.".to_string()
            }
            ClientError::MalformedResponse(detail) => {
                tracing::error!("Malformed response: {detail}");
                "The service returned an unexpected response. Please try again.".to_string()
            }
            ClientError::FallbackExhausted(detail) => {
                tracing::error!("Fallback dataset unavailable: {detail}");
                GENERIC_SEARCH_MESSAGE.to_string()
            }
            ClientError::Storage(detail) => {
                tracing::error!("Profile storage error: {detail}");
                "Your profile could not be saved. Please try again.".to_string()
            }
        }
    }

    /// The server-supplied message, when the failure carried one.
    pub fn server_message(&self) -> Option<&str> {
        match self {
            ClientError::Server {
                message: Some(msg), ..
            } => Some(msg),
            _ => None,
        }
    }
}

impl From<std::io::Error> for ClientError {
    fn from(e: std::io::Error) -> Self {
        ClientError::Storage(e.to_string())
    }
}
