//! Shared API request/response types

use serde::{Deserialize, Serialize};

/// Admin login request body
///
/// Missing fields read as empty and never match configured credentials.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(default)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

/// Admin login response body
///
/// `{"success": true}` with 200, `{"success": false}` with 403.
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq, Eq)]
pub struct LoginResponse {
    pub success: bool,
}

/// Error response body used by every failing endpoint
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ErrorResponse {
    pub error: String,
}

impl ErrorResponse {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            error: message.into(),
        }
    }
}
