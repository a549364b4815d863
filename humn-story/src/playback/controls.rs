//! Listener controls and their availability

use super::session::PlaybackSession;
use humn_common::events::PlaybackSpeed;
use serde::Serialize;

/// A listener action
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Control {
    TogglePlayPause,
    SkipBack,
    SkipForward,
    CycleSpeed,
    /// Explicit jump to a catalog index (section card clicked)
    Seek(usize),
}

/// Which controls are enabled for the current session
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ControlAvailability {
    pub play_pause: bool,
    pub skip_back: bool,
    pub skip_forward: bool,
    pub speed: bool,
}

impl ControlAvailability {
    pub fn for_session(session: &PlaybackSession, section_count: usize) -> Self {
        let settled = session.ready && !session.is_loading();
        let current = session.current_index;

        Self {
            play_pause: settled || session.ended || session.failed,
            skip_back: settled && current > 0,
            skip_forward: settled && current + 1 < section_count,
            speed: settled,
        }
    }

    /// Whether `control` may be applied right now
    pub fn allows(&self, control: Control) -> bool {
        match control {
            Control::TogglePlayPause => self.play_pause,
            Control::SkipBack => self.skip_back,
            Control::SkipForward => self.skip_forward,
            Control::CycleSpeed => self.speed,
            // Section cards stay clickable while loading
            Control::Seek(_) => true,
        }
    }
}

/// Whole-story progress: completed sections plus the current fraction
pub fn overall_progress(session: &PlaybackSession, section_count: usize) -> f64 {
    if section_count == 0 {
        return 0.0;
    }
    ((session.current_index as f64 + session.progress) / section_count as f64).clamp(0.0, 1.0)
}

/// Label shown on the speed button
pub fn speed_label(speed: PlaybackSpeed) -> &'static str {
    speed.label()
}

/// Physical key of a key press
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Key {
    Space,
    Enter,
    Char(char),
    Other,
}

/// What held keyboard focus when the key was pressed
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Focus {
    #[default]
    Document,
    TextInput,
    TextArea,
}

impl Focus {
    pub fn is_text_entry(self) -> bool {
        matches!(self, Focus::TextInput | Focus::TextArea)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct KeyPress {
    pub key: Key,
    pub focus: Focus,
}

impl KeyPress {
    pub fn new(key: Key, focus: Focus) -> Self {
        Self { key, focus }
    }
}

/// Global keyboard binding.
///
/// Space toggles playback unless the listener is typing or the toggle is
/// disabled.
pub fn control_for_key(press: &KeyPress, availability: &ControlAvailability) -> Option<Control> {
    if press.focus.is_text_entry() {
        return None;
    }
    match press.key {
        Key::Space if availability.play_pause => Some(Control::TogglePlayPause),
        _ => None,
    }
}
