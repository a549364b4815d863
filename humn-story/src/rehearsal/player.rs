//! Interactive terminal session
//!
//! Reads one command per line from stdin and renders engine events to
//! stdout. A single task owns the engine; stdin, media events, the clock
//! tick and the event bus are multiplexed with `select!`.

use super::clock_media::ClockMedia;
use crate::error::{Error, Result};
use crate::playback::{Control, Focus, Key, KeyPress, MediaBackend, PlaybackEngine};
use crate::story::{Section, SectionCatalog, SectionKind};
use humn_common::events::{EventBus, ScrollTarget, StoryEvent};
use std::path::PathBuf;
use std::time::Duration;
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::sync::{broadcast, mpsc};
use tokio::time::{Instant, MissedTickBehavior};
use tracing::{info, warn};

/// Rehearsal session settings
#[derive(Debug, Clone)]
pub struct RehearsalOptions {
    /// How long each narration plays at 1x
    pub section_duration: Duration,
    /// Clock resolution
    pub tick: Duration,
    /// Require narration files to exist under this directory
    pub audio_root: Option<PathBuf>,
}

impl Default for RehearsalOptions {
    fn default() -> Self {
        Self {
            section_duration: Duration::from_secs(20),
            tick: Duration::from_millis(250),
            audio_root: None,
        }
    }
}

/// One line of listener input
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    /// Space bar (a bare line)
    Key(Key),
    Control(Control),
    Status,
    Help,
    Quit,
}

/// Parse a command line
pub fn parse_command(line: &str) -> Result<Command> {
    let line = line.trim();
    if line.is_empty() {
        return Ok(Command::Key(Key::Space));
    }

    let mut parts = line.split_whitespace();
    let head = parts.next().unwrap_or_default();
    let command = match head {
        "p" | "play" | "pause" => Command::Control(Control::TogglePlayPause),
        "n" | "next" => Command::Control(Control::SkipForward),
        "b" | "back" => Command::Control(Control::SkipBack),
        "s" | "speed" => Command::Control(Control::CycleSpeed),
        "g" | "go" => {
            let index = parts
                .next()
                .and_then(|arg| arg.parse::<usize>().ok())
                .ok_or_else(|| Error::Command(format!("'{}' needs a section index", head)))?;
            Command::Control(Control::Seek(index))
        }
        "?" | "status" => Command::Status,
        "h" | "help" => Command::Help,
        "q" | "quit" | "exit" => Command::Quit,
        other => return Err(Error::Command(other.to_string())),
    };
    Ok(command)
}

/// Run an interactive rehearsal until `q` or end of input
pub async fn run(catalog: SectionCatalog, options: RehearsalOptions) -> Result<()> {
    let (media_tx, mut media_rx) = mpsc::unbounded_channel();
    let media = ClockMedia::new(media_tx, options.section_duration)
        .with_audio_root(options.audio_root.clone());

    let events = EventBus::default();
    let mut story_rx = events.subscribe();
    let mut engine = PlaybackEngine::new(catalog, media, events);

    print_catalog(engine.catalog());
    print_help();

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    let mut ticker = tokio::time::interval(options.tick);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
    let mut last_tick = Instant::now();

    loop {
        tokio::select! {
            line = lines.next_line() => {
                let Some(line) = line? else {
                    info!("Input closed, ending rehearsal");
                    break;
                };
                match parse_command(&line) {
                    Ok(Command::Quit) => break,
                    Ok(Command::Help) => print_help(),
                    Ok(Command::Status) => print_status(&engine),
                    Ok(Command::Key(key)) => {
                        if !engine.handle_key(KeyPress::new(key, Focus::Document)) {
                            println!("  (not available right now)");
                        }
                    }
                    Ok(Command::Control(control)) => {
                        if !engine.apply(control) {
                            println!("  (not available right now)");
                        }
                    }
                    Err(e) => println!("  {} (h for help)", e),
                }
            }
            Some(event) = media_rx.recv() => {
                engine.handle_media_event(event);
            }
            _ = ticker.tick() => {
                let now = Instant::now();
                engine.media_mut().advance(now - last_tick);
                last_tick = now;
            }
            received = story_rx.recv() => match received {
                Ok(event) => render(&engine, &event),
                Err(broadcast::error::RecvError::Lagged(skipped)) => {
                    warn!("Renderer lagged, skipped {} events", skipped);
                }
                Err(broadcast::error::RecvError::Closed) => break,
            },
        }
    }

    engine.shutdown();
    Ok(())
}

fn render<M: MediaBackend>(engine: &PlaybackEngine<M>, event: &StoryEvent) {
    let catalog = engine.catalog();
    let title = |index: usize| catalog.get(index).map(label).unwrap_or_default();

    match event {
        StoryEvent::SectionLoading { index, .. } => {
            println!("… loading [{}] {}", index, title(*index));
        }
        StoryEvent::PlaybackStateChanged { new_state, .. } => {
            println!("  {}", new_state);
            print_status(engine);
        }
        StoryEvent::SpeedChanged { speed, .. } => println!("  speed {}", speed),
        StoryEvent::StoryEnded { .. } => println!("■ story complete (press enter to replay)"),
        StoryEvent::MediaFailed { index, reason, .. } => {
            println!("✗ [{}] {} failed: {} (press enter to retry)", index, title(*index), reason);
        }
        StoryEvent::ScrollRequested { target, .. } => match target {
            ScrollTarget::Top => println!("↑ back to the top"),
            ScrollTarget::Section { index } => println!("↓ [{}] {}", index, title(*index)),
        },
        // Position is shown on demand with `?`
        StoryEvent::ProgressUpdated { .. } => {}
    }
}

fn print_status<M: MediaBackend>(engine: &PlaybackEngine<M>) {
    let session = engine.session();
    let available = engine.controls();
    println!(
        "  [{}/{}] {} {} section {:.0}% story {:.0}%{}{}",
        session.current_index + 1,
        engine.catalog().len(),
        session.state,
        session.speed.label(),
        session.progress * 100.0,
        engine.overall_progress() * 100.0,
        if available.skip_back { " «b" } else { "" },
        if available.skip_forward { " n»" } else { "" },
    );
}

fn print_catalog(catalog: &SectionCatalog) {
    for (index, section) in catalog.iter().enumerate() {
        let marker = match section.kind() {
            SectionKind::Narration => "♪",
            SectionKind::CallToAction => "→",
        };
        println!("{:>2} {} {}", index, marker, label(section));
    }
}

fn label(section: &Section) -> String {
    if section.title.is_empty() {
        section.id.clone()
    } else {
        section.title.clone()
    }
}

fn print_help() {
    println!("enter: play/pause  n: next  b: back  s: speed  g <i>: go to section  ?: status  q: quit");
}
