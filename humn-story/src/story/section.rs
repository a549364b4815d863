//! Story section definitions

use serde::{Deserialize, Serialize};

/// Section kind
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SectionKind {
    /// Narrated story segment; advances on completion
    Narration,
    /// Display-only interstitial prompting an external action
    CallToAction,
}

/// Kind-specific section payload
///
/// Only narration carries audio, so a call-to-action with an audio
/// reference cannot be expressed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum SectionBody {
    Narration {
        /// Path or URL of the voice-over
        #[serde(rename = "audioRef", skip_serializing_if = "Option::is_none", default)]
        audio_ref: Option<String>,
    },
    CallToAction {
        /// Destination of the call-to-action button
        link: String,
        /// Rotating button labels
        texts: Vec<String>,
    },
}

/// One story section
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Section {
    pub id: String,
    /// Display label; empty for calls-to-action
    #[serde(default)]
    pub title: String,
    /// Narrative text (markdown) or prompt text
    pub content: String,
    #[serde(flatten)]
    pub body: SectionBody,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub image_url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub image_caption: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub video_url: Option<String>,
}

impl Section {
    /// Narration section with an optional voice-over
    pub fn narration(
        id: impl Into<String>,
        title: impl Into<String>,
        content: impl Into<String>,
        audio_ref: Option<String>,
    ) -> Self {
        Self {
            id: id.into(),
            title: title.into(),
            content: content.into(),
            body: SectionBody::Narration { audio_ref },
            image_url: None,
            image_caption: None,
            video_url: None,
        }
    }

    /// Call-to-action interstitial
    pub fn call_to_action(
        id: impl Into<String>,
        content: impl Into<String>,
        link: impl Into<String>,
        texts: Vec<String>,
    ) -> Self {
        Self {
            id: id.into(),
            title: String::new(),
            content: content.into(),
            body: SectionBody::CallToAction {
                link: link.into(),
                texts,
            },
            image_url: None,
            image_caption: None,
            video_url: None,
        }
    }

    pub fn kind(&self) -> SectionKind {
        match self.body {
            SectionBody::Narration { .. } => SectionKind::Narration,
            SectionBody::CallToAction { .. } => SectionKind::CallToAction,
        }
    }

    pub fn is_narration(&self) -> bool {
        self.kind() == SectionKind::Narration
    }

    /// Voice-over reference, narration only
    pub fn audio_ref(&self) -> Option<&str> {
        match &self.body {
            SectionBody::Narration { audio_ref } => audio_ref.as_deref(),
            SectionBody::CallToAction { .. } => None,
        }
    }
}
