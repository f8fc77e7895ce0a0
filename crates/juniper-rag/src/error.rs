//! Error types for the Juniper RAG system

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

/// Result type alias for RAG operations
pub type Result<T> = std::result::Result<T, Error>;

/// RAG system errors
#[derive(Debug, Error)]
pub enum Error {
    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Caller-supplied input rejected before entering the pipeline
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// No route matched the request
    #[error("Not found: {0}")]
    NotFound(String),

    /// Semantic index failure
    #[error("Retrieval failed: {0}")]
    Retrieval(String),

    /// Embedding error
    #[error("Embedding generation failed: {0}")]
    Embedding(String),

    /// Completion backend error
    #[error("LLM error: {0}")]
    Llm(String),

    /// A backend returned a retryable status (429 / 5xx)
    #[error("{service} temporarily unavailable: HTTP {status}")]
    Unavailable { service: &'static str, status: u16 },

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// TOML config parse error
    #[error("Config parse error: {0}")]
    Toml(#[from] toml::de::Error),

    /// HTTP request error
    #[error("HTTP request error: {0}")]
    Http(#[from] reqwest::Error),

    /// Internal error
    #[error("Internal error: {0}")]
    Internal(String),
}

impl Error {
    /// Create an invalid input error
    pub fn invalid_input(message: impl Into<String>) -> Self {
        Self::InvalidInput(message.into())
    }

    /// Create a retrieval error
    pub fn retrieval(message: impl Into<String>) -> Self {
        Self::Retrieval(message.into())
    }

    /// Create an embedding error
    pub fn embedding(message: impl Into<String>) -> Self {
        Self::Embedding(message.into())
    }

    /// Create an LLM error
    pub fn llm(message: impl Into<String>) -> Self {
        Self::Llm(message.into())
    }

    /// Create an internal error
    pub fn internal(message: impl Into<String>) -> Self {
        Self::Internal(message.into())
    }

    /// Map a non-success HTTP status: 429/5xx become `Unavailable`, the rest `Llm`
    pub fn from_status(service: &'static str, status: reqwest::StatusCode, body: &str) -> Self {
        if status.is_server_error() || status.as_u16() == 429 {
            Self::Unavailable { service, status: status.as_u16() }
        } else {
            Self::Llm(format!("{} request failed: HTTP {} - {}", service, status, body))
        }
    }

    /// Whether a retry has a chance of succeeding.
    ///
    /// Connection failures, timeouts and 429/5xx responses are transient;
    /// everything else (bad request, auth, malformed body) is permanent.
    pub fn is_transient(&self) -> bool {
        match self {
            Error::Unavailable { .. } => true,
            Error::Http(err) => {
                err.is_timeout()
                    || err.is_connect()
                    || err
                        .status()
                        .map(|s| s.is_server_error() || s.as_u16() == 429)
                        .unwrap_or(false)
            }
            _ => false,
        }
    }
}

impl IntoResponse for Error {
    fn into_response(self) -> Response {
        let (status, error_type, message) = match &self {
            Error::Config(msg) => (StatusCode::INTERNAL_SERVER_ERROR, "config_error", msg.clone()),
            Error::InvalidInput(msg) => (StatusCode::BAD_REQUEST, "invalid_input", msg.clone()),
            Error::NotFound(msg) => (StatusCode::NOT_FOUND, "not_found", msg.clone()),
            Error::Retrieval(_) | Error::Embedding(_) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                "retrieval_error",
                "Knowledge retrieval failed".to_string(),
            ),
            Error::Llm(_) | Error::Unavailable { .. } => (
                StatusCode::SERVICE_UNAVAILABLE,
                "llm_error",
                "Answer generation is unavailable".to_string(),
            ),
            Error::Json(err) => (StatusCode::BAD_REQUEST, "json_error", err.to_string()),
            Error::Io(_) | Error::Toml(_) | Error::Http(_) | Error::Internal(_) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                "internal_error",
                "Internal server error".to_string(),
            ),
        };

        if status.is_server_error() {
            tracing::error!("Request failed: {}", self);
        }

        let body = Json(json!({
            "error": {
                "type": error_type,
                "message": message,
            }
        }));

        (status, body).into_response()
    }
}
