//! Terminal rehearsal of the story
//!
//! Runs the real playback engine against a clock instead of audio so the
//! pacing of a catalog can be checked without a browser.

pub mod clock_media;
pub mod player;

pub use clock_media::ClockMedia;
pub use player::{parse_command, run, Command, RehearsalOptions};
