//! # HUM人N Common Library
//!
//! Shared code for the HUM人N services:
//! - Error type
//! - Bootstrap configuration (TOML + environment + compiled defaults)
//! - Story event types and the broadcast EventBus
//! - Admin session helpers shared by the HTTP surface
//! - Timestamp utilities

pub mod api;
pub mod config;
pub mod error;
pub mod events;
pub mod time;

pub use error::{Error, Result};
