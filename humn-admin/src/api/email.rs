//! Welcome email endpoint

use axum::{extract::State, Json};
use serde::{Deserialize, Serialize};
use tracing::info;

use super::non_blank;
use crate::services::welcome::welcome_email;
use crate::{AppState, Error, Result};

#[derive(Debug, Deserialize)]
pub struct WelcomeEmailRequest {
    name: Option<String>,
    email: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct WelcomeEmailResponse {
    pub id: String,
}

/// POST /api/send-welcome-email
pub async fn send_welcome_email(
    State(state): State<AppState>,
    Json(request): Json<WelcomeEmailRequest>,
) -> Result<Json<WelcomeEmailResponse>> {
    let (Some(name), Some(email)) = (non_blank(request.name), non_blank(request.email)) else {
        return Err(Error::BadRequest("Name and email are required".to_string()));
    };

    let message = welcome_email(&state.config.integrations, &name, &email);
    let id = state.services.mailer.send(message).await?;
    info!("Sent welcome email {} to {}", id, email);

    Ok(Json(WelcomeEmailResponse { id }))
}
