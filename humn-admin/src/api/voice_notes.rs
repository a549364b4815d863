//! Voice notes: transcribe, extract, store, enrich

use axum::{
    extract::{Multipart, State},
    Json,
};
use serde::Serialize;
use tracing::{debug, info};

use super::people::require_person;
use crate::services::extraction::{parse_extraction, person_update};
use crate::services::AudioClip;
use crate::store::{ExtractedData, NewNote};
use crate::{AppState, Error, Result};

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct VoiceNoteResponse {
    pub success: bool,
    pub note_id: String,
    pub transcript: String,
    pub extracted_data: ExtractedData,
}

/// POST /api/admin/voice-notes
///
/// Multipart form with an `audio` file and a `personId` field.
pub async fn create_voice_note(
    State(state): State<AppState>,
    mut multipart: Multipart,
) -> Result<Json<VoiceNoteResponse>> {
    let mut audio = None;
    let mut person_id = None;

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| Error::BadRequest(format!("Invalid form data: {}", e)))?
    {
        let name = field.name().map(str::to_string);
        match name.as_deref() {
            Some("audio") => {
                let file_name = field.file_name().unwrap_or("audio.webm").to_string();
                let content_type = field.content_type().map(str::to_string);
                let bytes = field
                    .bytes()
                    .await
                    .map_err(|e| Error::BadRequest(format!("Invalid audio upload: {}", e)))?;
                if !bytes.is_empty() {
                    audio = Some(AudioClip {
                        file_name,
                        content_type,
                        bytes: bytes.to_vec(),
                    });
                }
            }
            Some("personId") => {
                let text = field
                    .text()
                    .await
                    .map_err(|e| Error::BadRequest(format!("Invalid person ID: {}", e)))?;
                person_id = Some(text.trim().to_string()).filter(|id| !id.is_empty());
            }
            other => debug!("Ignoring form field {:?}", other),
        }
    }

    let (Some(audio), Some(person_id)) = (audio, person_id) else {
        return Err(Error::BadRequest(
            "Audio file and person ID are required".to_string(),
        ));
    };
    require_person(&state, &person_id).await?;

    info!(
        "Transcribing voice note for {} ({} bytes)",
        person_id,
        audio.bytes.len()
    );
    let transcript = state.services.transcriber.transcribe(audio).await?;
    let transcript = transcript.trim().to_string();
    if transcript.is_empty() {
        return Err(Error::integration("Whisper", "empty transcript"));
    }

    let reply = state.services.extractor.extract(&transcript).await?;
    let extracted = parse_extraction(&reply);

    let note = state
        .store
        .add_note(&person_id, NewNote::from_voice(&transcript, extracted.clone()))
        .await?;

    let update = person_update(&extracted);
    if !update.is_empty() {
        debug!("Enriching {} with {:?}", person_id, update.keys().collect::<Vec<_>>());
        state.store.update_person(&person_id, update).await?;
    }

    Ok(Json(VoiceNoteResponse {
        success: true,
        note_id: note.id,
        transcript,
        extracted_data: extracted,
    }))
}
