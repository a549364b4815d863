//! humn-admin library - CRM and story API service
//!
//! Serves the public story catalog, visitor registration and the
//! cookie-gated admin area (people, notes, voice notes, referral job).

use std::sync::Arc;

use axum::extract::DefaultBodyLimit;
use axum::Router;
use humn_common::api::SessionSigner;
use humn_common::config::TomlConfig;
use tower_http::services::ServeDir;
use tower_http::trace::TraceLayer;
use tracing::info;

pub mod api;
pub mod error;
pub mod services;
pub mod store;

pub use error::{Error, Result};

use services::Services;
use store::DocumentStore;

/// Largest accepted voice-note upload
pub const MAX_VOICE_NOTE_BYTES: usize = 25 * 1024 * 1024;

/// Application state shared across HTTP handlers
#[derive(Clone)]
pub struct AppState {
    pub store: Arc<dyn DocumentStore>,
    pub sessions: Arc<SessionSigner>,
    pub config: Arc<TomlConfig>,
    pub services: Services,
}

impl AppState {
    pub fn new(
        store: Arc<dyn DocumentStore>,
        sessions: SessionSigner,
        config: TomlConfig,
        services: Services,
    ) -> Self {
        Self {
            store,
            sessions: Arc::new(sessions),
            config: Arc::new(config),
            services,
        }
    }
}

/// Build application router
///
/// Everything under `/admin` and `/api/admin` requires a valid session
/// cookie; the rest is public.
pub fn build_router(state: AppState) -> Router {
    use axum::middleware;
    use axum::routing::{get, post};

    let gated = Router::new()
        .route("/admin", get(api::serve_admin))
        .route("/api/admin/people", get(api::list_people))
        .route("/api/admin/people/:id", axum::routing::patch(api::update_person))
        .route(
            "/api/admin/people/:id/notes",
            get(api::list_notes).post(api::add_note),
        )
        .route(
            "/api/admin/voice-notes",
            post(api::create_voice_note).layer(DefaultBodyLimit::max(MAX_VOICE_NOTE_BYTES)),
        )
        .route("/api/admin/cron-logs", get(api::list_cron_logs))
        .route_layer(middleware::from_fn_with_state(state.clone(), api::admin_gate));

    let public = Router::new()
        .route("/login", get(api::serve_login))
        .route("/api/login", post(api::login))
        .route("/api/logout", post(api::logout))
        .route("/api/is-admin", get(api::is_admin))
        .route("/api/story", get(api::get_story))
        .route("/api/register", post(api::register))
        .route("/api/send-welcome-email", post(api::send_welcome_email))
        .route("/api/cron/update-referrals", get(api::update_referrals))
        .merge(api::health_routes());

    let mut router = Router::new().merge(gated).merge(public);

    if let Some(dir) = &state.config.story.audio_dir {
        info!("Serving story audio from {}", dir.display());
        router = router.nest_service("/story", ServeDir::new(dir));
    }

    router.layer(TraceLayer::new_for_http()).with_state(state)
}
