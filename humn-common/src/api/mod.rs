//! Shared HTTP API functionality
//!
//! This module contains ONLY pure functions and shared types; the axum
//! wiring lives in `humn-admin`.

pub mod auth;
pub mod types;

pub use auth::{
    cookie_value, session_cookie, verify_credentials, SessionError, SessionSigner,
    SESSION_COOKIE,
};
pub use types::{ErrorResponse, LoginRequest, LoginResponse};
