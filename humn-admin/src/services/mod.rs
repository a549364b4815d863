//! Third-party collaborators and the pure logic around them
//!
//! Handlers only see the `Transcriber`, `Extractor` and `EmailSender`
//! traits. The HTTP clients in this module are the production
//! implementations; `Unavailable` stands in when a key is not configured.

pub mod extraction;
pub mod gemini;
pub mod referrals;
pub mod resend;
pub mod welcome;
pub mod whisper;

use crate::{Error, Result};
use async_trait::async_trait;
use humn_common::config::IntegrationsConfig;
use std::sync::Arc;
use std::time::Duration;
use tracing::warn;

pub use gemini::GeminiClient;
pub use resend::ResendClient;
pub use whisper::WhisperClient;

const USER_AGENT: &str = concat!("humn-admin/", env!("CARGO_PKG_VERSION"));
const HTTP_TIMEOUT: Duration = Duration::from_secs(60);

/// Uploaded audio
#[derive(Debug, Clone)]
pub struct AudioClip {
    pub file_name: String,
    pub content_type: Option<String>,
    pub bytes: Vec<u8>,
}

/// Speech-to-text
#[async_trait]
pub trait Transcriber: Send + Sync {
    /// Transcript text; may be empty when nothing was recognized
    async fn transcribe(&self, clip: AudioClip) -> Result<String>;
}

/// Language-model extraction over a transcript
#[async_trait]
pub trait Extractor: Send + Sync {
    /// Raw model reply, expected to contain a JSON object
    async fn extract(&self, transcript: &str) -> Result<String>;
}

/// An email ready to hand to a provider
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutgoingEmail {
    pub from: String,
    pub to: String,
    pub cc: Option<String>,
    pub reply_to: Option<String>,
    pub subject: String,
    pub html: String,
}

#[async_trait]
pub trait EmailSender: Send + Sync {
    /// Send and return the provider's message id
    async fn send(&self, email: OutgoingEmail) -> Result<String>;
}

/// Placeholder for an integration without credentials
#[derive(Debug, Clone, Copy)]
pub struct Unavailable {
    pub service: &'static str,
}

#[async_trait]
impl Transcriber for Unavailable {
    async fn transcribe(&self, _clip: AudioClip) -> Result<String> {
        Err(Error::integration(self.service, "API key not configured"))
    }
}

#[async_trait]
impl Extractor for Unavailable {
    async fn extract(&self, _transcript: &str) -> Result<String> {
        Err(Error::integration(self.service, "API key not configured"))
    }
}

#[async_trait]
impl EmailSender for Unavailable {
    async fn send(&self, _email: OutgoingEmail) -> Result<String> {
        Err(Error::integration(self.service, "API key not configured"))
    }
}

/// The set of collaborators shared by handlers
#[derive(Clone)]
pub struct Services {
    pub transcriber: Arc<dyn Transcriber>,
    pub extractor: Arc<dyn Extractor>,
    pub mailer: Arc<dyn EmailSender>,
}

impl Services {
    /// Production clients for every configured key
    pub fn from_config(config: &IntegrationsConfig) -> Result<Self> {
        let http = reqwest::Client::builder()
            .user_agent(USER_AGENT)
            .timeout(HTTP_TIMEOUT)
            .build()?;

        let transcriber: Arc<dyn Transcriber> = match &config.openai_api_key {
            Some(key) => Arc::new(WhisperClient::new(http.clone(), key.clone())),
            None => {
                warn!("OPENAI_API_KEY not set; voice notes are disabled");
                Arc::new(Unavailable { service: "Whisper" })
            }
        };
        let extractor: Arc<dyn Extractor> = match &config.gemini_api_key {
            Some(key) => Arc::new(GeminiClient::new(http.clone(), key.clone())),
            None => {
                warn!("GOOGLE_GENERATIVE_AI_API_KEY not set; voice notes are disabled");
                Arc::new(Unavailable { service: "Gemini" })
            }
        };
        let mailer: Arc<dyn EmailSender> = match &config.resend_api_key {
            Some(key) => Arc::new(ResendClient::new(http, key.clone())),
            None => {
                warn!("RESEND_API_KEY not set; welcome emails are disabled");
                Arc::new(Unavailable { service: "Resend" })
            }
        };

        Ok(Self {
            transcriber,
            extractor,
            mailer,
        })
    }

    /// Every collaborator unavailable
    pub fn unavailable() -> Self {
        Self {
            transcriber: Arc::new(Unavailable { service: "Whisper" }),
            extractor: Arc::new(Unavailable { service: "Gemini" }),
            mailer: Arc::new(Unavailable { service: "Resend" }),
        }
    }
}

/// Turn a non-success provider response into an integration error
async fn check_status(service: &'static str, response: reqwest::Response) -> Result<reqwest::Response> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }
    let body = response.text().await.unwrap_or_default();
    Err(Error::integration(service, format!("HTTP {}: {}", status.as_u16(), body)))
}
