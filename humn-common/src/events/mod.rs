//! Event types for the HUM人N story player
//!
//! Provides the story event definitions and the EventBus they travel on.

mod playback_types;

pub use playback_types::{PlaybackSpeed, PlaybackState};

use serde::{Deserialize, Serialize};
use tokio::sync::broadcast;

/// Where the story view should scroll to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ScrollTarget {
    /// Top of the page (replay)
    Top,
    /// The card of the section at `index`
    Section { index: usize },
}

/// Story playback events
///
/// Emitted by the playback engine after each committed transition and
/// consumed by whatever renders the controls. Serializable so they can be
/// forwarded to a browser unchanged.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum StoryEvent {
    /// A new narration resource is being acquired
    SectionLoading {
        /// Catalog index of the section
        index: usize,
        /// Section identifier
        section_id: String,
        timestamp: chrono::DateTime<chrono::Utc>,
    },

    /// Playback state changed (Loading / Playing / Paused)
    PlaybackStateChanged {
        old_state: PlaybackState,
        new_state: PlaybackState,
        /// Section the change applies to
        index: usize,
        timestamp: chrono::DateTime<chrono::Utc>,
    },

    /// Progress within the current section moved
    ProgressUpdated {
        index: usize,
        /// Fraction in [0, 1]
        progress: f64,
        timestamp: chrono::DateTime<chrono::Utc>,
    },

    /// Listener changed narration speed
    SpeedChanged {
        speed: PlaybackSpeed,
        timestamp: chrono::DateTime<chrono::Utc>,
    },

    /// The final narration finished; nothing left to auto-advance to
    StoryEnded {
        timestamp: chrono::DateTime<chrono::Utc>,
    },

    /// The current media resource failed to load or start
    ///
    /// Recoverable: the session is left Paused on the same section.
    MediaFailed {
        index: usize,
        reason: String,
        timestamp: chrono::DateTime<chrono::Utc>,
    },

    /// The view should scroll
    ScrollRequested {
        target: ScrollTarget,
        timestamp: chrono::DateTime<chrono::Utc>,
    },
}

impl StoryEvent {
    /// Event name used in logs
    pub fn event_type(&self) -> &'static str {
        match self {
            StoryEvent::SectionLoading { .. } => "SectionLoading",
            StoryEvent::PlaybackStateChanged { .. } => "PlaybackStateChanged",
            StoryEvent::ProgressUpdated { .. } => "ProgressUpdated",
            StoryEvent::SpeedChanged { .. } => "SpeedChanged",
            StoryEvent::StoryEnded { .. } => "StoryEnded",
            StoryEvent::MediaFailed { .. } => "MediaFailed",
            StoryEvent::ScrollRequested { .. } => "ScrollRequested",
        }
    }
}

/// Broadcast bus for story events
///
/// Thin wrapper over `tokio::sync::broadcast`. Slow subscribers lose the
/// oldest events once `capacity` is exceeded.
#[derive(Debug, Clone)]
pub struct EventBus {
    tx: broadcast::Sender<StoryEvent>,
}

impl EventBus {
    /// Creates a new EventBus with specified channel capacity
    pub fn new(capacity: usize) -> Self {
        let (tx, _) = broadcast::channel(capacity);
        Self { tx }
    }

    /// Subscribe to all future events
    pub fn subscribe(&self) -> broadcast::Receiver<StoryEvent> {
        self.tx.subscribe()
    }

    /// Emit an event, ignoring if no subscribers are listening
    pub fn emit_lossy(&self, event: StoryEvent) {
        let _ = self.tx.send(event);
    }
}

impl Default for EventBus {
    fn default() -> Self {
        Self::new(256)
    }
}
