//! HUM人N story player (humn-story) - Main entry point
//!
//! `catalog` prints the story as a given audience would see it;
//! `rehearse` plays it interactively in the terminal against a clock.

use std::path::PathBuf;
use std::time::Duration;

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use humn_common::config::TomlConfig;
use humn_story::rehearsal::{self, RehearsalOptions};
use humn_story::story::{hum_story, StoryAudience, StoryOptions};
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// Command-line arguments for humn-story
#[derive(Parser, Debug)]
#[command(name = "humn-story")]
#[command(about = "HUM人N story catalog and terminal rehearsal player")]
#[command(version)]
struct Cli {
    /// Config file (defaults to the platform config location)
    #[arg(short, long, env = "HUMN_CONFIG")]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Print the story catalog
    Catalog {
        #[command(flatten)]
        audience: AudienceArgs,

        /// Emit JSON instead of a listing
        #[arg(long)]
        json: bool,
    },

    /// Play the story in the terminal
    Rehearse {
        #[command(flatten)]
        audience: AudienceArgs,

        /// Seconds each narration plays at 1x
        #[arg(long)]
        section_secs: Option<u64>,

        /// Fail narrations whose audio file is missing under this directory
        #[arg(long)]
        audio_root: Option<PathBuf>,
    },
}

#[derive(Args, Debug)]
struct AudienceArgs {
    /// Visitor name from an invite link
    #[arg(long)]
    visitor: Option<String>,

    /// Signed-in member name (hides calls-to-action)
    #[arg(long)]
    member: Option<String>,
}

impl From<AudienceArgs> for StoryAudience {
    fn from(args: AudienceArgs) -> Self {
        StoryAudience {
            visitor_name: args.visitor,
            member_name: args.member,
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let config = TomlConfig::load(cli.config.as_deref()).context("Failed to load configuration")?;

    // Logs go to stderr; stdout belongs to the player
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| format!("humn_story={}", config.logging.level).into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    match cli.command {
        Command::Catalog { audience, json } => {
            let options = StoryOptions::from_config(&config.story, audience.into());
            let catalog = hum_story(&options).context("Failed to build story catalog")?;

            if json {
                let text = serde_json::to_string_pretty(&catalog)
                    .context("Failed to serialize catalog")?;
                println!("{}", text);
            } else {
                for (index, section) in catalog.iter().enumerate() {
                    println!("{:>2}  {:<14} {:?}", index, section.id, section.kind());
                }
            }
        }
        Command::Rehearse {
            audience,
            section_secs,
            audio_root,
        } => {
            let options = StoryOptions::from_config(&config.story, audience.into());
            let catalog = hum_story(&options).context("Failed to build story catalog")?;
            let secs = section_secs.unwrap_or(config.story.rehearsal_section_secs).max(1);

            info!(
                "Rehearsing {} sections at {}s per narration",
                catalog.len(),
                secs
            );

            rehearsal::run(
                catalog,
                RehearsalOptions {
                    section_duration: Duration::from_secs(secs),
                    audio_root,
                    ..RehearsalOptions::default()
                },
            )
            .await
            .context("Rehearsal failed")?;
        }
    }

    Ok(())
}
