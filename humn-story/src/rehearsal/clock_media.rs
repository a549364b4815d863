//! Clock-driven media backend
//!
//! Stands in for real audio: every narration "plays" for a fixed duration,
//! scaled by the playback rate, and position only moves when the owner calls
//! `advance`. Lifecycle events go out on an unbounded channel so they reach
//! the engine from the event loop, never re-entrantly.

use crate::playback::{MediaBackend, MediaError, MediaEvent, MediaEventKind, ResourceId};
use std::collections::HashMap;
use std::path::PathBuf;
use std::time::Duration;
use tokio::sync::mpsc;
use tracing::debug;

#[derive(Debug, Clone)]
struct Track {
    source: String,
    position: f64,
    duration: f64,
    rate: f64,
    playing: bool,
}

/// Media backend whose time is advanced explicitly
#[derive(Debug)]
pub struct ClockMedia {
    tracks: HashMap<ResourceId, Track>,
    events: mpsc::UnboundedSender<MediaEvent>,
    section_duration: f64,
    /// When set, sources must exist under this directory
    audio_root: Option<PathBuf>,
}

impl ClockMedia {
    pub fn new(events: mpsc::UnboundedSender<MediaEvent>, section_duration: Duration) -> Self {
        Self {
            tracks: HashMap::new(),
            events,
            section_duration: section_duration.as_secs_f64(),
            audio_root: None,
        }
    }

    /// Fail acquisition of sources missing under `root`
    pub fn with_audio_root(mut self, root: Option<PathBuf>) -> Self {
        self.audio_root = root;
        self
    }

    /// Number of resources currently held
    pub fn resource_count(&self) -> usize {
        self.tracks.len()
    }

    /// Move every playing track forward by `elapsed` wall time
    pub fn advance(&mut self, elapsed: Duration) {
        let elapsed = elapsed.as_secs_f64();
        let mut outgoing = Vec::new();

        for (&id, track) in self.tracks.iter_mut().filter(|(_, t)| t.playing) {
            track.position = (track.position + elapsed * track.rate).min(track.duration);
            outgoing.push(MediaEvent::new(
                id,
                MediaEventKind::Progress {
                    position: track.position,
                    duration: track.duration,
                },
            ));

            if track.position >= track.duration {
                track.playing = false;
                debug!("{} finished ({})", id, track.source);
                outgoing.push(MediaEvent::new(id, MediaEventKind::Completed));
            }
        }

        for event in outgoing {
            self.send(event);
        }
    }

    fn send(&self, event: MediaEvent) {
        // Receiver gone means the session is shutting down
        let _ = self.events.send(event);
    }

    fn missing_source(&self, source: &str) -> Option<String> {
        let root = self.audio_root.as_ref()?;
        let path = root.join(source.trim_start_matches('/'));
        (!path.is_file()).then(|| format!("{} not found", path.display()))
    }
}

impl MediaBackend for ClockMedia {
    fn acquire(&mut self, id: ResourceId, source: &str, rate: f64) -> Result<(), MediaError> {
        if let Some(reason) = self.missing_source(source) {
            self.send(MediaEvent::new(id, MediaEventKind::Failed { reason }));
            return Ok(());
        }

        self.tracks.insert(
            id,
            Track {
                source: source.to_string(),
                position: 0.0,
                duration: self.section_duration,
                rate,
                playing: false,
            },
        );
        self.send(MediaEvent::new(id, MediaEventKind::Ready));
        Ok(())
    }

    fn play(&mut self, id: ResourceId) -> Result<(), MediaError> {
        let track = self
            .tracks
            .get_mut(&id)
            .ok_or(MediaError::UnknownResource(id))?;
        track.playing = true;
        Ok(())
    }

    fn pause(&mut self, id: ResourceId) {
        if let Some(track) = self.tracks.get_mut(&id) {
            track.playing = false;
        }
    }

    fn set_rate(&mut self, id: ResourceId, rate: f64) {
        if let Some(track) = self.tracks.get_mut(&id) {
            track.rate = rate;
        }
    }

    fn release(&mut self, id: ResourceId) {
        self.tracks.remove(&id);
    }
}
