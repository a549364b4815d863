//! People, notes and visitor registration

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use serde::Deserialize;
use serde_json::Value;
use tracing::{info, warn};
use uuid::Uuid;

use super::non_blank;
use crate::services::welcome::welcome_email;
use crate::store::{Fields, NewNote, Note, Person};
use crate::{AppState, Error, Result};

/// Minimum digits (and leading `+`) in a usable phone number
const MIN_PHONE_LEN: usize = 10;

/// GET /api/admin/people
pub async fn list_people(State(state): State<AppState>) -> Result<Json<Vec<Person>>> {
    Ok(Json(state.store.list_people().await?))
}

/// PATCH /api/admin/people/:id
///
/// Merges the body's fields into the person.
pub async fn update_person(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(patch): Json<Fields>,
) -> Result<Json<Person>> {
    let person = state.store.update_person(&id, patch).await?;
    info!("Updated person {}", id);
    Ok(Json(person))
}

/// GET /api/admin/people/:id/notes
pub async fn list_notes(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<Vec<Note>>> {
    require_person(&state, &id).await?;
    Ok(Json(state.store.list_notes(&id).await?))
}

#[derive(Debug, Deserialize)]
pub struct AddNoteRequest {
    #[serde(default)]
    content: String,
}

/// POST /api/admin/people/:id/notes
pub async fn add_note(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(request): Json<AddNoteRequest>,
) -> Result<(StatusCode, Json<Note>)> {
    let content = request.content.trim();
    if content.is_empty() {
        return Err(Error::BadRequest("Note content is required".to_string()));
    }
    require_person(&state, &id).await?;

    let note = state.store.add_note(&id, NewNote::text(content)).await?;
    Ok((StatusCode::CREATED, Json(note)))
}

/// 404 unless the person exists
pub(crate) async fn require_person(state: &AppState, id: &str) -> Result<Person> {
    state
        .store
        .get_person(id)
        .await?
        .ok_or_else(|| Error::NotFound(format!("person {}", id)))
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RegisterRequest {
    name: Option<String>,
    phone: Option<String>,
    email: Option<String>,
    /// Account id from the identity provider; becomes the person id
    uid: Option<String>,
    referrer_id: Option<String>,
    referrer_note: Option<String>,
}

/// POST /api/register
///
/// Creates a pending person and sends the welcome email in the background.
pub async fn register(
    State(state): State<AppState>,
    Json(request): Json<RegisterRequest>,
) -> Result<(StatusCode, Json<Person>)> {
    let (Some(name), Some(phone)) = (non_blank(request.name), non_blank(request.phone)) else {
        return Err(Error::BadRequest("Name and phone are required".to_string()));
    };

    let phone = clean_phone(&phone);
    if phone.len() < MIN_PHONE_LEN {
        return Err(Error::BadRequest("Phone number looks incomplete".to_string()));
    }

    let uid = non_blank(request.uid);
    let email = non_blank(request.email);
    let id = uid.clone().unwrap_or_else(|| Uuid::new_v4().to_string());

    let mut fields = Fields::new();
    fields.insert("name".into(), Value::String(name.clone()));
    fields.insert("phone".into(), Value::String(phone));
    fields.insert("status".into(), Value::String("pending".into()));
    let optional = [
        ("email", email.clone()),
        ("uid", uid),
        ("referrerId", non_blank(request.referrer_id)),
        ("referrerNote", non_blank(request.referrer_note)),
    ];
    for (key, value) in optional {
        if let Some(value) = value {
            fields.insert(key.into(), Value::String(value));
        }
    }

    let person = state.store.put_person(&id, fields).await?;
    info!("Registered person {}", id);

    if let Some(email) = email {
        let message = welcome_email(&state.config.integrations, &name, &email);
        let mailer = state.services.mailer.clone();
        tokio::spawn(async move {
            if let Err(e) = mailer.send(message).await {
                warn!("Welcome email to {} failed: {}", email, e);
            }
        });
    }

    Ok((StatusCode::CREATED, Json(person)))
}

/// Keep digits and `+`, dropping zero-width characters and punctuation
fn clean_phone(raw: &str) -> String {
    raw.chars()
        .filter(|c| c.is_ascii_digit() || *c == '+')
        .collect()
}
