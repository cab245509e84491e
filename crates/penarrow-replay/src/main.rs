//! PenArrow gesture replay
//!
//! Feeds a recorded pointer gesture through the arrow tool and prints every
//! finished stroke as JSON.
//!
//! ## Gesture format
//!
//! A JSON array of pointer events:
//! ```json
//! [
//!   { "type": "down", "position": { "x": 0.0, "y": 0.0 } },
//!   { "type": "move", "position": { "x": 60.0, "y": 4.0 } },
//!   { "type": "up", "position": { "x": 100.0, "y": 5.0 }, "modifiers": { "shift": true } }
//! ]
//! ```

use clap::Parser;
use penarrow_core::{ArrowTool, PointerEvent, SettingsError, SnapSettings, Stroke};
use std::fs;
use std::path::PathBuf;
use std::process::ExitCode;
use thiserror::Error;

#[derive(Parser, Debug)]
#[command(name = "penarrow-replay")]
#[command(version, about = "Replay a pointer gesture through the arrow tool")]
struct Cli {
    /// JSON file with the recorded pointer events
    gesture: PathBuf,

    /// Snap settings file (defaults to the user settings file)
    #[arg(long, short = 's', value_name = "FILE")]
    settings: Option<PathBuf>,
}

#[derive(Debug, Error)]
enum ReplayError {
    #[error("Failed to read {}: {source}", path.display())]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("Invalid gesture: {0}")]
    Gesture(serde_json::Error),
    #[error(transparent)]
    Settings(#[from] SettingsError),
    #[error("Failed to encode strokes: {0}")]
    Output(serde_json::Error),
}

/// Run every event through a fresh arrow tool, collecting finished strokes.
fn replay(events: &[PointerEvent], settings: &SnapSettings) -> Vec<Stroke> {
    let mut tool = ArrowTool::new();
    let strokes: Vec<Stroke> = events
        .iter()
        .filter_map(|event| tool.handle_pointer_event(*event, settings))
        .collect();

    if tool.is_active() {
        log::warn!("Gesture ended without a pointer release; dropping the unfinished stroke");
    }
    strokes
}

fn load_settings(path: Option<PathBuf>) -> Result<SnapSettings, ReplayError> {
    let settings = match path {
        Some(path) => SnapSettings::load(&path)?,
        None => SnapSettings::load_or_default(&SnapSettings::default_path()?)?,
    };
    log::debug!("Using settings {:?}", settings);
    Ok(settings)
}

fn run(cli: Cli) -> Result<String, ReplayError> {
    let settings = load_settings(cli.settings)?;

    let json = fs::read_to_string(&cli.gesture).map_err(|source| ReplayError::Io {
        path: cli.gesture.clone(),
        source,
    })?;
    let events: Vec<PointerEvent> = serde_json::from_str(&json).map_err(ReplayError::Gesture)?;
    log::info!("Replaying {} pointer events from {}", events.len(), cli.gesture.display());

    let strokes = replay(&events, &settings);
    log::info!("Produced {} strokes", strokes.len());

    serde_json::to_string_pretty(&strokes).map_err(ReplayError::Output)
}

fn main() -> ExitCode {
    env_logger::init();

    match run(Cli::parse()) {
        Ok(output) => {
            println!("{}", output);
            ExitCode::SUCCESS
        }
        Err(e) => {
            log::error!("{}", e);
            eprintln!("penarrow-replay: {}", e);
            ExitCode::FAILURE
        }
    }
}
