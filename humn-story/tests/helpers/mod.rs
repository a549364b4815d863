//! Recording media backend for engine tests
//!
//! Logs every call the engine makes and lets a test script failures.
//! Lifecycle events are injected by the test through `handle_media_event`.

use humn_common::events::{EventBus, StoryEvent};
use humn_story::playback::{
    MediaBackend, MediaError, MediaEvent, MediaEventKind, PlaybackEngine, ResourceId,
};
use humn_story::{Section, SectionCatalog};
use std::collections::BTreeSet;
use tokio::sync::broadcast;

#[derive(Debug, Clone, PartialEq)]
pub enum Call {
    Acquire(ResourceId, String, f64),
    Play(ResourceId),
    Pause(ResourceId),
    SetRate(ResourceId, f64),
    Release(ResourceId),
}

#[derive(Debug, Default)]
pub struct RecordingMedia {
    pub calls: Vec<Call>,
    /// Resources acquired and not yet released
    pub held: BTreeSet<ResourceId>,
    pub refuse_play: bool,
    pub fail_acquire: bool,
}

impl RecordingMedia {
    pub fn plays(&self) -> usize {
        self.calls.iter().filter(|c| matches!(c, Call::Play(_))).count()
    }

    pub fn last_rate(&self) -> Option<f64> {
        self.calls.iter().rev().find_map(|c| match c {
            Call::SetRate(_, rate) => Some(*rate),
            _ => None,
        })
    }
}

impl MediaBackend for RecordingMedia {
    fn acquire(&mut self, id: ResourceId, source: &str, rate: f64) -> Result<(), MediaError> {
        self.calls.push(Call::Acquire(id, source.to_string(), rate));
        if self.fail_acquire {
            return Err(MediaError::Load(format!("{} unreachable", source)));
        }
        self.held.insert(id);
        Ok(())
    }

    fn play(&mut self, id: ResourceId) -> Result<(), MediaError> {
        self.calls.push(Call::Play(id));
        if self.refuse_play {
            return Err(MediaError::PlayRefused("no user gesture".to_string()));
        }
        Ok(())
    }

    fn pause(&mut self, id: ResourceId) {
        self.calls.push(Call::Pause(id));
    }

    fn set_rate(&mut self, id: ResourceId, rate: f64) {
        self.calls.push(Call::SetRate(id, rate));
    }

    fn release(&mut self, id: ResourceId) {
        self.calls.push(Call::Release(id));
        self.held.remove(&id);
    }
}

/// Catalog from a layout string: 'N' narration, 'C' call-to-action
pub fn catalog(layout: &str) -> SectionCatalog {
    let sections = layout
        .chars()
        .enumerate()
        .map(|(i, kind)| match kind {
            'N' => Section::narration(
                format!("n{}", i),
                format!("Narration {}", i),
                "text",
                Some(format!("/story/n{}.mp3", i)),
            ),
            _ => Section::call_to_action(
                format!("c{}", i),
                "Join us?",
                "https://example.com",
                vec!["Join".to_string()],
            ),
        })
        .collect();
    SectionCatalog::new(sections).expect("valid test catalog")
}

pub fn engine(layout: &str) -> (PlaybackEngine<RecordingMedia>, broadcast::Receiver<StoryEvent>) {
    let events = EventBus::new(1024);
    let rx = events.subscribe();
    (
        PlaybackEngine::new(catalog(layout), RecordingMedia::default(), events),
        rx,
    )
}

pub fn live(engine: &PlaybackEngine<RecordingMedia>) -> ResourceId {
    engine.live_resource().expect("a live resource")
}

pub fn ready(engine: &mut PlaybackEngine<RecordingMedia>) {
    let id = live(engine);
    engine.handle_media_event(MediaEvent::new(id, MediaEventKind::Ready));
}

pub fn progress(engine: &mut PlaybackEngine<RecordingMedia>, position: f64, duration: f64) {
    let id = live(engine);
    engine.handle_media_event(MediaEvent::new(id, MediaEventKind::Progress { position, duration }));
}

pub fn complete(engine: &mut PlaybackEngine<RecordingMedia>) {
    let id = live(engine);
    engine.handle_media_event(MediaEvent::new(id, MediaEventKind::Completed));
}

pub fn fail(engine: &mut PlaybackEngine<RecordingMedia>) {
    let id = live(engine);
    engine.handle_media_event(MediaEvent::new(
        id,
        MediaEventKind::Failed {
            reason: "decode error".to_string(),
        },
    ));
}

/// Drain everything emitted so far
pub fn drain(rx: &mut broadcast::Receiver<StoryEvent>) -> Vec<StoryEvent> {
    let mut events = Vec::new();
    while let Ok(event) = rx.try_recv() {
        events.push(event);
    }
    events
}
