//! Story playback engine
//!
//! Single-track state machine over a `SectionCatalog`:
//!
//! ```text
//! Loading ──ready──▶ Paused ◀──toggle──▶ Playing
//!    ▲  └─ready+autoplay──────────────────▶ │
//!    │                                      │ complete
//!    └──── next narration / seek / replay ◀─┘
//! ```
//!
//! "Ended" is `Paused` with `ended` set; the only way out is a replay.
//!
//! Every transition runs on the caller's thread. Side effects go through the
//! `MediaBackend` and the `EventBus`; no failure escapes as an error.

use super::controls::{self, Control, ControlAvailability, KeyPress};
use super::media::{MediaBackend, MediaError, MediaEvent, MediaEventKind, ResourceId};
use super::navigator::SectionNavigator;
use super::session::PlaybackSession;
use crate::story::{Section, SectionCatalog};
use humn_common::events::{EventBus, PlaybackState, ScrollTarget, StoryEvent};
use humn_common::time;
use tracing::{debug, info, trace, warn};

/// Playback engine owning the session and its single live media resource
pub struct PlaybackEngine<M: MediaBackend> {
    catalog: SectionCatalog,
    media: M,
    session: PlaybackSession,
    /// The only resource whose events are honoured
    live: Option<ResourceId>,
    next_resource: u64,
    events: EventBus,
}

impl<M: MediaBackend> PlaybackEngine<M> {
    /// Mount a session: position on the first narration and start loading it
    pub fn new(catalog: SectionCatalog, media: M, events: EventBus) -> Self {
        let start = SectionNavigator::new(&catalog).first_narration().unwrap_or(0);
        info!(
            "Story session mounted: {} sections, starting at {}",
            catalog.len(),
            start
        );

        let mut engine = Self {
            catalog,
            media,
            session: PlaybackSession::new(start),
            live: None,
            next_resource: 1,
            events,
        };
        engine.load(start);
        engine
    }

    pub fn catalog(&self) -> &SectionCatalog {
        &self.catalog
    }

    pub fn session(&self) -> &PlaybackSession {
        &self.session
    }

    pub fn media(&self) -> &M {
        &self.media
    }

    /// Backend access for drivers that advance it (e.g. a clock).
    ///
    /// Resource lifecycle stays with the engine.
    pub fn media_mut(&mut self) -> &mut M {
        &mut self.media
    }

    pub fn events(&self) -> &EventBus {
        &self.events
    }

    pub fn current_section(&self) -> Option<&Section> {
        self.catalog.get(self.session.current_index)
    }

    /// Resource currently attached to the session
    pub fn live_resource(&self) -> Option<ResourceId> {
        self.live
    }

    pub fn controls(&self) -> ControlAvailability {
        ControlAvailability::for_session(&self.session, self.catalog.len())
    }

    /// Whole-story progress in [0, 1]
    pub fn overall_progress(&self) -> f64 {
        controls::overall_progress(&self.session, self.catalog.len())
    }

    // ------------------------------------------------------------------
    // Listener-facing transitions
    // ------------------------------------------------------------------

    /// Play/pause; replays after the end and retries after a failure
    pub fn toggle_play_pause(&mut self) {
        if self.session.ended {
            let start = SectionNavigator::new(&self.catalog)
                .first_narration()
                .unwrap_or(0);
            info!("Replaying story from section {}", start);
            self.emit(StoryEvent::ScrollRequested {
                target: ScrollTarget::Top,
                timestamp: time::now(),
            });
            self.session.pending_autoplay = true;
            self.load(start);
            return;
        }

        if self.session.failed {
            let index = self.session.current_index;
            info!("Retrying section {}", index);
            self.session.pending_autoplay = true;
            self.load(index);
            return;
        }

        let Some(id) = self.live else {
            debug!("Toggle ignored: no media resource attached");
            return;
        };
        if !self.session.ready {
            debug!("Toggle ignored: section {} not ready", self.session.current_index);
            return;
        }

        match self.session.state {
            PlaybackState::Playing => {
                self.media.pause(id);
                self.set_state(PlaybackState::Paused);
            }
            PlaybackState::Paused => {
                let first = SectionNavigator::new(&self.catalog).first_narration();
                if Some(self.session.current_index) == first && self.session.progress == 0.0 {
                    self.emit(StoryEvent::ScrollRequested {
                        target: ScrollTarget::Section {
                            index: self.session.current_index,
                        },
                        timestamp: time::now(),
                    });
                }
                self.start_playback(id);
            }
            PlaybackState::Loading => {
                debug!("Toggle ignored while loading");
            }
        }
    }

    /// Advance the narration speed cycle
    pub fn cycle_speed(&mut self) {
        let speed = self.session.speed.next();
        self.session.speed = speed;
        if let Some(id) = self.live {
            self.media.set_rate(id, speed.rate());
        }
        debug!("Playback speed set to {}", speed);
        self.emit(StoryEvent::SpeedChanged {
            speed,
            timestamp: time::now(),
        });
    }

    /// Jump to a section.
    ///
    /// Calls-to-action resolve to the nearest narration in the direction of
    /// travel. Selecting the current section while paused acts as
    /// play/pause: it resumes in place, or replays once the story ended.
    pub fn seek(&mut self, index: usize) {
        let current = self.session.current_index;
        let Some(target) = SectionNavigator::new(&self.catalog).resolve_seek(index, current) else {
            debug!("Seek to {} has no narration target; ignoring", index);
            return;
        };

        if target == current && self.session.state == PlaybackState::Paused {
            self.toggle_play_pause();
            return;
        }

        debug!("Seeking from section {} to {}", current, target);
        self.session.pending_autoplay = true;
        self.emit(StoryEvent::ScrollRequested {
            target: ScrollTarget::Section { index: target },
            timestamp: time::now(),
        });
        self.load(target);
    }

    /// Previous section (no-op on the first)
    pub fn skip_back(&mut self) {
        let current = self.session.current_index;
        if current > 0 {
            self.seek(current - 1);
        }
    }

    /// Next section (no-op on the last)
    pub fn skip_forward(&mut self) {
        let current = self.session.current_index;
        if current + 1 < self.catalog.len() {
            self.seek(current + 1);
        }
    }

    /// Apply a control if it is currently available.
    ///
    /// Returns whether the control was accepted.
    pub fn apply(&mut self, control: Control) -> bool {
        if !self.controls().allows(control) {
            debug!("Control {:?} unavailable in {:?}", control, self.session.state);
            return false;
        }

        match control {
            Control::TogglePlayPause => self.toggle_play_pause(),
            Control::SkipBack => self.skip_back(),
            Control::SkipForward => self.skip_forward(),
            Control::CycleSpeed => self.cycle_speed(),
            Control::Seek(index) => self.seek(index),
        }
        true
    }

    /// Global keyboard binding (space bar → play/pause)
    pub fn handle_key(&mut self, press: KeyPress) -> bool {
        match controls::control_for_key(&press, &self.controls()) {
            Some(control) => self.apply(control),
            None => false,
        }
    }

    // ------------------------------------------------------------------
    // Media lifecycle
    // ------------------------------------------------------------------

    /// Feed a lifecycle event from the backend.
    ///
    /// Events from anything but the live resource are dropped.
    pub fn handle_media_event(&mut self, event: MediaEvent) {
        if self.live != Some(event.resource) {
            debug!(
                "Dropping {:?} from detached resource {}",
                event.kind, event.resource
            );
            return;
        }

        match event.kind {
            MediaEventKind::Ready => self.on_resource_ready(event.resource),
            MediaEventKind::Progress { position, duration } => self.on_progress(position, duration),
            MediaEventKind::Completed => self.on_section_complete(),
            MediaEventKind::Failed { reason } => self.fail(MediaError::Load(reason)),
        }
    }

    /// Release the live resource; the session is over
    pub fn shutdown(&mut self) {
        if self.live.is_some() {
            info!("Story session unmounted");
        }
        self.teardown();
    }

    fn on_resource_ready(&mut self, id: ResourceId) {
        if self.session.ready {
            debug!("Duplicate ready from {}", id);
            return;
        }

        self.session.ready = true;
        self.session.failed = false;
        self.media.set_rate(id, self.session.speed.rate());

        if self.session.pending_autoplay {
            self.session.pending_autoplay = false;
            self.start_playback(id);
        } else {
            self.set_state(PlaybackState::Paused);
        }
    }

    fn on_progress(&mut self, position: f64, duration: f64) {
        if !duration.is_finite() || duration <= 0.0 || !position.is_finite() {
            return;
        }

        let progress = (position / duration).clamp(0.0, 1.0);
        self.session.progress = progress;
        self.emit(StoryEvent::ProgressUpdated {
            index: self.session.current_index,
            progress,
            timestamp: time::now(),
        });
    }

    fn on_section_complete(&mut self) {
        let current = self.session.current_index;
        match SectionNavigator::new(&self.catalog).next_narration_after(current) {
            Some(next) => {
                info!("Section {} complete, continuing with {}", current, next);
                self.session.pending_autoplay = true;
                self.emit(StoryEvent::ScrollRequested {
                    target: ScrollTarget::Section { index: next },
                    timestamp: time::now(),
                });
                self.load(next);
            }
            None => {
                info!("Story complete after section {}", current);
                self.session.ended = true;
                self.set_state(PlaybackState::Paused);
                self.emit(StoryEvent::StoryEnded {
                    timestamp: time::now(),
                });
            }
        }
    }

    // ------------------------------------------------------------------
    // Internals
    // ------------------------------------------------------------------

    /// Tear down the live resource and acquire one for `index`
    fn load(&mut self, index: usize) {
        self.teardown();

        self.session.current_index = index;
        self.session.progress = 0.0;
        self.session.ended = false;
        self.session.ready = false;
        self.session.failed = false;

        let (section_id, source) = match self.catalog.get(index) {
            Some(section) => (section.id.clone(), section.audio_ref().map(str::to_string)),
            None => {
                warn!("Load requested for missing section {}", index);
                return;
            }
        };

        self.emit(StoryEvent::SectionLoading {
            index,
            section_id: section_id.clone(),
            timestamp: time::now(),
        });
        self.set_state(PlaybackState::Loading);

        let Some(source) = source else {
            self.fail(MediaError::NoSource);
            return;
        };

        let id = ResourceId(self.next_resource);
        self.next_resource += 1;

        match self.media.acquire(id, &source, self.session.speed.rate()) {
            Ok(()) => {
                debug!("Acquired {} for section '{}' ({})", id, section_id, source);
                self.live = Some(id);
            }
            Err(error) => self.fail(error),
        }
    }

    /// Stop, detach and release the live resource
    fn teardown(&mut self) {
        if let Some(id) = self.live.take() {
            self.media.pause(id);
            self.media.release(id);
            debug!("Released {}", id);
        }
    }

    fn start_playback(&mut self, id: ResourceId) {
        match self.media.play(id) {
            Ok(()) => self.set_state(PlaybackState::Playing),
            Err(error) => {
                warn!(
                    "Playback did not start on section {}: {}",
                    self.session.current_index, error
                );
                self.set_state(PlaybackState::Paused);
            }
        }
    }

    /// Recoverable media failure: stay on the section, paused
    fn fail(&mut self, error: MediaError) {
        let index = self.session.current_index;
        warn!("Media failure on section {}: {}", index, error);

        self.session.ready = false;
        self.session.failed = true;
        self.set_state(PlaybackState::Paused);
        self.emit(StoryEvent::MediaFailed {
            index,
            reason: error.to_string(),
            timestamp: time::now(),
        });
    }

    fn set_state(&mut self, new_state: PlaybackState) {
        let old_state = self.session.state;
        if old_state == new_state {
            return;
        }

        self.session.state = new_state;
        debug!("Playback state {} -> {}", old_state, new_state);
        self.emit(StoryEvent::PlaybackStateChanged {
            old_state,
            new_state,
            index: self.session.current_index,
            timestamp: time::now(),
        });
    }

    fn emit(&self, event: StoryEvent) {
        trace!("Emitting {}", event.event_type());
        self.events.emit_lossy(event);
    }
}

impl<M: MediaBackend> Drop for PlaybackEngine<M> {
    fn drop(&mut self) {
        self.teardown();
    }
}
