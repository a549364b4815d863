//! Playback-related type definitions
//!
//! Supporting types for the story playback state machine.

use serde::{Deserialize, Serialize};

/// Playback state enumeration
///
/// "Ended" is not a state of its own: it is `Paused` with the session's
/// `ended` flag set.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum PlaybackState {
    /// A media resource is being acquired and buffered
    Loading,
    /// Narration audio is playing
    Playing,
    /// Stopped in place; waiting for the listener
    Paused,
}

impl std::fmt::Display for PlaybackState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            PlaybackState::Loading => write!(f, "loading"),
            PlaybackState::Playing => write!(f, "playing"),
            PlaybackState::Paused => write!(f, "paused"),
        }
    }
}

/// Narration speed multiplier
///
/// The listener cycles through a fixed list: 1x → 1.5x → 2x → 2.5x → 1x.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
pub enum PlaybackSpeed {
    #[default]
    #[serde(rename = "1x")]
    Normal,
    #[serde(rename = "1.5x")]
    OneAndHalf,
    #[serde(rename = "2x")]
    Double,
    #[serde(rename = "2.5x")]
    DoubleAndHalf,
}

impl PlaybackSpeed {
    /// All speeds in cycle order
    pub const CYCLE: [PlaybackSpeed; 4] = [
        PlaybackSpeed::Normal,
        PlaybackSpeed::OneAndHalf,
        PlaybackSpeed::Double,
        PlaybackSpeed::DoubleAndHalf,
    ];

    /// Next speed in the cycle, wrapping back to 1x
    pub fn next(self) -> Self {
        let index = Self::CYCLE
            .iter()
            .position(|speed| *speed == self)
            .unwrap_or(0);
        Self::CYCLE[(index + 1) % Self::CYCLE.len()]
    }

    /// Rate multiplier handed to the media resource
    pub fn rate(self) -> f64 {
        match self {
            PlaybackSpeed::Normal => 1.0,
            PlaybackSpeed::OneAndHalf => 1.5,
            PlaybackSpeed::Double => 2.0,
            PlaybackSpeed::DoubleAndHalf => 2.5,
        }
    }

    /// Label shown on the speed control
    pub fn label(self) -> &'static str {
        match self {
            PlaybackSpeed::Normal => "1x",
            PlaybackSpeed::OneAndHalf => "1.5x",
            PlaybackSpeed::Double => "2x",
            PlaybackSpeed::DoubleAndHalf => "2.5x",
        }
    }
}

impl std::fmt::Display for PlaybackSpeed {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}
