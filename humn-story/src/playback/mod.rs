//! Story playback state machine and its effect layer

pub mod controls;
pub mod engine;
pub mod media;
pub mod navigator;
pub mod session;

pub use controls::{Control, ControlAvailability, Focus, Key, KeyPress};
pub use engine::PlaybackEngine;
pub use media::{MediaBackend, MediaError, MediaEvent, MediaEventKind, ResourceId};
pub use navigator::{Direction, SectionNavigator};
pub use session::PlaybackSession;
