//! Media effect layer
//!
//! The engine never touches audio directly. It asks a `MediaBackend` to
//! acquire, start, pause, re-rate and release resources, and the backend
//! reports lifecycle events back through `PlaybackEngine::handle_media_event`.
//!
//! Every resource is identified by a `ResourceId` that is never reused within
//! a session. The engine only honours events carrying the id of its live
//! resource, which is how a released resource's listeners are "detached".

use thiserror::Error;

/// Identifier of one acquired media resource
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ResourceId(pub u64);

impl std::fmt::Display for ResourceId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "res#{}", self.0)
    }
}

/// Recoverable media failures
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum MediaError {
    /// The resource could not be fetched or decoded
    #[error("Media load failed: {0}")]
    Load(String),

    /// Playback start was refused (e.g. autoplay without a user gesture)
    #[error("Playback refused: {0}")]
    PlayRefused(String),

    /// The section has no narration audio to load
    #[error("Section has no audio")]
    NoSource,

    /// The backend does not know this resource
    #[error("Unknown resource {0}")]
    UnknownResource(ResourceId),
}

/// Media lifecycle notifications
#[derive(Debug, Clone, PartialEq)]
pub enum MediaEventKind {
    /// Fully buffered; playable through
    Ready,
    /// Playback position moved (seconds)
    Progress { position: f64, duration: f64 },
    /// Reached the end of the narration
    Completed,
    /// Load or decode failed
    Failed { reason: String },
}

/// Event from a specific resource
#[derive(Debug, Clone, PartialEq)]
pub struct MediaEvent {
    pub resource: ResourceId,
    pub kind: MediaEventKind,
}

impl MediaEvent {
    pub fn new(resource: ResourceId, kind: MediaEventKind) -> Self {
        Self { resource, kind }
    }
}

/// Effect layer translating engine transitions into media operations
///
/// Implementations must not call back into the engine synchronously;
/// lifecycle events are delivered later through the owner's event loop.
pub trait MediaBackend {
    /// Acquire a resource for `source` and begin preloading it at `rate`
    fn acquire(&mut self, id: ResourceId, source: &str, rate: f64) -> Result<(), MediaError>;

    /// Start playback. `Ok` means playback has actually started.
    fn play(&mut self, id: ResourceId) -> Result<(), MediaError>;

    fn pause(&mut self, id: ResourceId);

    fn set_rate(&mut self, id: ResourceId, rate: f64);

    /// Stop and discard the resource; no further events may be honoured
    fn release(&mut self, id: ResourceId);
}

impl<M: MediaBackend + ?Sized> MediaBackend for Box<M> {
    fn acquire(&mut self, id: ResourceId, source: &str, rate: f64) -> Result<(), MediaError> {
        (**self).acquire(id, source, rate)
    }

    fn play(&mut self, id: ResourceId) -> Result<(), MediaError> {
        (**self).play(id)
    }

    fn pause(&mut self, id: ResourceId) {
        (**self).pause(id)
    }

    fn set_rate(&mut self, id: ResourceId, rate: f64) {
        (**self).set_rate(id, rate)
    }

    fn release(&mut self, id: ResourceId) {
        (**self).release(id)
    }
}
