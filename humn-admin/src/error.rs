//! Error types for humn-admin
//!
//! Every handler returns `Result<T>`; failures become a status code plus a
//! JSON `{"error": ...}` body. Server-side failures are logged here so
//! handlers can simply propagate with `?`.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use humn_common::api::types::ErrorResponse;
use thiserror::Error;
use tracing::error;

/// API error type
#[derive(Debug, Error)]
pub enum Error {
    /// Resource not found (404)
    #[error("Not found: {0}")]
    NotFound(String),

    /// Invalid request (400)
    #[error("{0}")]
    BadRequest(String),

    /// Missing or invalid admin session (401)
    #[error("Unauthorized")]
    Unauthorized,

    /// Third-party service failed or returned nothing usable (500)
    #[error("{service} failed: {message}")]
    Integration {
        service: &'static str,
        message: String,
    },

    /// Database error
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    /// Stored document could not be (de)serialized
    #[error("Document error: {0}")]
    Document(#[from] serde_json::Error),

    /// Outbound HTTP error
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// humn-common error
    #[error("Common error: {0}")]
    Common(#[from] humn_common::Error),

    /// Story content error
    #[error("Story error: {0}")]
    Story(#[from] humn_story::Error),

    /// Internal server error (500)
    #[error("Internal error: {0}")]
    Internal(String),
}

impl Error {
    pub fn integration(service: &'static str, message: impl Into<String>) -> Self {
        Error::Integration {
            service,
            message: message.into(),
        }
    }

    pub fn status(&self) -> StatusCode {
        match self {
            Error::NotFound(_) => StatusCode::NOT_FOUND,
            Error::BadRequest(_) => StatusCode::BAD_REQUEST,
            Error::Unauthorized => StatusCode::UNAUTHORIZED,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for Error {
    fn into_response(self) -> Response {
        let status = self.status();
        let message = match &self {
            Error::NotFound(_) | Error::BadRequest(_) | Error::Unauthorized => self.to_string(),
            Error::Integration { service, .. } => {
                error!("{}", self);
                format!("{} request failed", service)
            }
            _ => {
                error!("Request failed: {}", self);
                "Internal server error".to_string()
            }
        };

        (status, Json(ErrorResponse::new(message))).into_response()
    }
}

/// Result type for humn-admin
pub type Result<T> = std::result::Result<T, Error>;
