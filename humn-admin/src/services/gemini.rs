//! Google Gemini extraction client

use super::{check_status, Extractor};
use crate::{Error, Result};
use async_trait::async_trait;
use serde::Deserialize;
use serde_json::json;
use tracing::debug;

const API_BASE: &str = "https://generativelanguage.googleapis.com/v1beta/models";
const MODEL: &str = "gemini-2.0-flash-exp";

#[derive(Debug, Deserialize)]
struct GenerateResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Debug, Deserialize)]
struct Candidate {
    content: Option<Content>,
}

#[derive(Debug, Deserialize)]
struct Content {
    #[serde(default)]
    parts: Vec<ContentPart>,
}

#[derive(Debug, Deserialize)]
struct ContentPart {
    #[serde(default)]
    text: String,
}

/// Instructions sent alongside a transcript
pub fn extraction_prompt(transcript: &str) -> String {
    format!(
        r#"Extract structured information from this transcript of a voice note about a person.

Transcript: "{}"

Please extract the following information if present:
- Occupation or profession
- Location (city, state, country)
- Meeting details (when and where the person was met)
- Birthday (format as YYYY-MM-DD if possible)
- Any other important personal information

Format the response as JSON with these keys: occupation, location, meetingDetails, birthday, otherInfo.
If information isn't available for a field, return an empty string for that field.
For birthday, return in YYYY-MM-DD format if possible, or any date format you can extract."#,
        transcript
    )
}

/// Gemini `generateContent` client
pub struct GeminiClient {
    http: reqwest::Client,
    api_key: String,
}

impl GeminiClient {
    pub fn new(http: reqwest::Client, api_key: String) -> Self {
        Self { http, api_key }
    }
}

#[async_trait]
impl Extractor for GeminiClient {
    async fn extract(&self, transcript: &str) -> Result<String> {
        debug!(chars = transcript.len(), "Requesting extraction from Gemini");

        let url = format!("{}/{}:generateContent", API_BASE, MODEL);
        let body = json!({
            "contents": [{ "parts": [{ "text": extraction_prompt(transcript) }] }]
        });

        let response = self
            .http
            .post(&url)
            .query(&[("key", self.api_key.as_str())])
            .json(&body)
            .send()
            .await?;
        let response = check_status("Gemini", response).await?;

        let reply: GenerateResponse = response.json().await?;
        let text: String = reply
            .candidates
            .into_iter()
            .next()
            .and_then(|c| c.content)
            .map(|content| content.parts.into_iter().map(|p| p.text).collect())
            .unwrap_or_default();

        if text.trim().is_empty() {
            return Err(Error::integration("Gemini", "empty response"));
        }
        Ok(text)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_prompt_embeds_transcript() {
        let prompt = extraction_prompt("She is a nurse in Ohio");
        assert!(prompt.contains("Transcript: \"She is a nurse in Ohio\""));
        assert!(prompt.contains("meetingDetails"));
    }
}
