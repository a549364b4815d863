//! Per-visit playback session state

use humn_common::events::{PlaybackSpeed, PlaybackState};
use serde::Serialize;

/// Mutable state of one story view
///
/// Owned by `PlaybackEngine`; callers only ever see copies.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PlaybackSession {
    /// Section being played; always a narration
    pub current_index: usize,
    pub state: PlaybackState,
    /// Final narration finished with nothing left to advance to
    pub ended: bool,
    /// Live resource reported ready and has not failed since
    pub ready: bool,
    /// Live resource (or its acquisition) failed; a toggle retries
    pub failed: bool,
    /// Position within the current section, in [0, 1]
    pub progress: f64,
    pub speed: PlaybackSpeed,
    /// Next ready resource starts without a user gesture
    pub pending_autoplay: bool,
}

impl PlaybackSession {
    /// Fresh session positioned at `index`
    pub fn new(index: usize) -> Self {
        Self {
            current_index: index,
            state: PlaybackState::Loading,
            ended: false,
            ready: false,
            failed: false,
            progress: 0.0,
            speed: PlaybackSpeed::Normal,
            pending_autoplay: false,
        }
    }

    pub fn is_loading(&self) -> bool {
        self.state == PlaybackState::Loading
    }
}
