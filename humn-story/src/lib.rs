//! # HUM人N Story Library (humn-story)
//!
//! Sequential story playback with audio-driven section transitions.
//!
//! **Purpose:** Hold the ordered story catalog, decide which narration plays
//! next, and run the single-track playback state machine that reacts to
//! media lifecycle events.
//!
//! **Architecture:** `story` is static input, `playback` is the state
//! machine plus its effect seam (`MediaBackend`), `rehearsal` drives the
//! machine from a terminal against a clock-driven backend.

pub mod error;
pub mod playback;
pub mod rehearsal;
pub mod story;

pub use error::{Error, Result};
pub use playback::{PlaybackEngine, SectionNavigator};
pub use story::{Section, SectionCatalog, SectionKind};
