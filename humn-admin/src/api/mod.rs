//! HTTP API handlers for humn-admin

pub mod auth;
pub mod cron;
pub mod email;
pub mod health;
pub mod people;
pub mod story;
pub mod ui;
pub mod voice_notes;

pub use auth::{admin_gate, is_admin, login, logout};
pub use cron::{list_cron_logs, update_referrals};
pub use email::send_welcome_email;
pub use health::health_routes;
pub use people::{add_note, list_notes, list_people, register, update_person};
pub use story::get_story;
pub use ui::{serve_admin, serve_login};
pub use voice_notes::create_voice_note;

/// `None` for absent or blank values, trimmed otherwise
pub(crate) fn non_blank(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}
