//! Turning model output into person updates

use crate::store::{ExtractedData, Fields};
use humn_common::time::parse_loose_date;
use serde_json::Value;
use tracing::warn;

/// Body of the first fenced block (```json preferred), else the whole text
fn unfenced(text: &str) -> &str {
    for opener in ["```json", "```"] {
        if let Some(start) = text.find(opener) {
            let rest = &text[start + opener.len()..];
            if let Some(end) = rest.find("```") {
                return rest[..end].trim();
            }
        }
    }
    text.trim()
}

/// Parse a model reply into extracted fields.
///
/// Replies that are not valid JSON yield empty fields; the transcript is
/// still worth keeping.
pub fn parse_extraction(reply: &str) -> ExtractedData {
    match serde_json::from_str(unfenced(reply)) {
        Ok(data) => data,
        Err(e) => {
            warn!("Could not parse extraction reply: {}", e);
            ExtractedData::default()
        }
    }
}

/// Person fields to set from extracted data.
///
/// Empty values are skipped. `meetingDetails` lands in `meetingPlace`; a
/// birthday that parses as a date is stored as `YYYY-MM-DD` in `birthday`,
/// anything else as `birthdayText`.
pub fn person_update(data: &ExtractedData) -> Fields {
    let mut update = Fields::new();
    let mut set = |key: &str, value: &str| {
        let value = value.trim();
        if !value.is_empty() {
            update.insert(key.to_string(), Value::String(value.to_string()));
        }
    };

    set("occupation", &data.occupation);
    set("location", &data.location);
    set("meetingPlace", &data.meeting_details);

    match parse_loose_date(&data.birthday) {
        Some(date) => set("birthday", &date.format("%Y-%m-%d").to_string()),
        None => set("birthdayText", &data.birthday),
    }

    update
}
