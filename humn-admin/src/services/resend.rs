//! Resend email client

use super::{check_status, EmailSender, OutgoingEmail};
use crate::Result;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tracing::info;

const EMAILS_URL: &str = "https://api.resend.com/emails";

#[derive(Debug, Serialize)]
struct SendRequest<'a> {
    from: &'a str,
    to: [&'a str; 1],
    #[serde(skip_serializing_if = "Option::is_none")]
    cc: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    reply_to: Option<&'a str>,
    subject: &'a str,
    html: &'a str,
}

#[derive(Debug, Deserialize)]
struct SendResponse {
    #[serde(default)]
    id: String,
}

/// Resend API client
pub struct ResendClient {
    http: reqwest::Client,
    api_key: String,
}

impl ResendClient {
    pub fn new(http: reqwest::Client, api_key: String) -> Self {
        Self { http, api_key }
    }
}

#[async_trait]
impl EmailSender for ResendClient {
    async fn send(&self, email: OutgoingEmail) -> Result<String> {
        let request = SendRequest {
            from: &email.from,
            to: [&email.to],
            cc: email.cc.as_deref(),
            reply_to: email.reply_to.as_deref(),
            subject: &email.subject,
            html: &email.html,
        };

        let response = self
            .http
            .post(EMAILS_URL)
            .bearer_auth(&self.api_key)
            .json(&request)
            .send()
            .await?;
        let response = check_status("Resend", response).await?;

        let sent: SendResponse = response.json().await?;
        info!(id = %sent.id, to = %email.to, "Email sent");
        Ok(sent.id)
    }
}
