//! OpenAI Whisper transcription client

use super::{check_status, AudioClip, Transcriber};
use crate::Result;
use async_trait::async_trait;
use reqwest::multipart::{Form, Part};
use serde::Deserialize;
use tracing::debug;

const TRANSCRIPTIONS_URL: &str = "https://api.openai.com/v1/audio/transcriptions";
const MODEL: &str = "whisper-1";

#[derive(Debug, Deserialize)]
struct TranscriptionResponse {
    #[serde(default)]
    text: String,
}

/// Whisper API client
pub struct WhisperClient {
    http: reqwest::Client,
    api_key: String,
}

impl WhisperClient {
    pub fn new(http: reqwest::Client, api_key: String) -> Self {
        Self { http, api_key }
    }
}

#[async_trait]
impl Transcriber for WhisperClient {
    async fn transcribe(&self, clip: AudioClip) -> Result<String> {
        debug!(
            file = %clip.file_name,
            bytes = clip.bytes.len(),
            "Sending audio to Whisper"
        );

        let mut part = Part::bytes(clip.bytes).file_name(clip.file_name);
        if let Some(content_type) = clip.content_type.as_deref() {
            part = part.mime_str(content_type)?;
        }
        let form = Form::new().text("model", MODEL).part("file", part);

        let response = self
            .http
            .post(TRANSCRIPTIONS_URL)
            .bearer_auth(&self.api_key)
            .multipart(form)
            .send()
            .await?;
        let response = check_status("Whisper", response).await?;

        let body: TranscriptionResponse = response.json().await?;
        Ok(body.text)
    }
}
