//! Error types for the web clients

use thiserror::Error;

/// Errors raised inside the web clients before they are downgraded to "no data"
#[derive(Debug, Error)]
pub enum WebError {
    /// HTTP request failed
    #[error("Request failed: {0}")]
    RequestFailed(String),

    /// Server returned a non-success status
    #[error("API error (status {status}): {message}")]
    ApiError {
        /// HTTP status code
        status: u16,
        /// Error message or body
        message: String,
    },

    /// Response could not be parsed
    #[error("Parse error: {0}")]
    ParseError(String),

    /// Invalid configuration
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),
}

impl From<WebError> for research_core::ResearchError {
    fn from(err: WebError) -> Self {
        match err {
            WebError::RequestFailed(msg) => research_core::ResearchError::network(msg),
            WebError::ApiError { .. } => research_core::ResearchError::api(err.to_string()),
            WebError::ParseError(msg) => research_core::ResearchError::parse(msg),
            WebError::InvalidConfig(msg) => research_core::ResearchError::config(msg),
        }
    }
}
