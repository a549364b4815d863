//! Stored document shapes
//!
//! People are schemaless documents: apart from `id` and `createdAt` every
//! field lives in `fields` and round-trips untouched. Notes and cron logs
//! have fixed shapes.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{Map, Value};

/// Free-form document fields
pub type Fields = Map<String, Value>;

/// Fields the store owns; never taken from a patch
pub const RESERVED_FIELDS: [&str; 2] = ["id", "createdAt"];

/// A person in the CRM
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Person {
    pub id: String,
    pub created_at: DateTime<Utc>,
    #[serde(flatten)]
    pub fields: Fields,
}

impl Person {
    pub fn field_str(&self, key: &str) -> Option<&str> {
        self.fields.get(key).and_then(Value::as_str)
    }

    /// Who referred this person, if anyone
    pub fn referrer_id(&self) -> Option<&str> {
        self.field_str("referrerId").filter(|id| !id.is_empty())
    }
}

/// Structured details pulled out of a voice-note transcript.
///
/// Every field is a string; missing or empty means "not mentioned".
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ExtractedData {
    #[serde(deserialize_with = "lenient_string")]
    pub occupation: String,
    #[serde(deserialize_with = "lenient_string")]
    pub location: String,
    #[serde(deserialize_with = "lenient_string")]
    pub meeting_details: String,
    #[serde(deserialize_with = "lenient_string")]
    pub birthday: String,
    #[serde(deserialize_with = "lenient_string")]
    pub other_info: String,
}

/// Accept `null` and non-string scalars from model output
fn lenient_string<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match Value::deserialize(deserializer)? {
        Value::String(s) => s,
        Value::Null => String::new(),
        other => other.to_string(),
    })
}

/// Note body as written by the admin or derived from a voice note
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewNote {
    pub content: String,
    #[serde(default)]
    pub is_from_voice: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub transcript: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub extracted_data: Option<ExtractedData>,
}

impl NewNote {
    pub fn text(content: impl Into<String>) -> Self {
        Self {
            content: content.into(),
            ..Self::default()
        }
    }

    pub fn from_voice(transcript: &str, extracted: ExtractedData) -> Self {
        Self {
            content: transcript.to_string(),
            is_from_voice: true,
            transcript: Some(transcript.to_string()),
            extracted_data: Some(extracted),
        }
    }
}

/// A stored note on a person
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Note {
    pub id: String,
    pub person_id: String,
    pub created_at: DateTime<Utc>,
    #[serde(flatten)]
    pub body: NewNote,
}

/// Outcome of one scheduled job run
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CronLog {
    pub operation: String,
    pub timestamp: DateTime<Utc>,
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub users_processed: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}
