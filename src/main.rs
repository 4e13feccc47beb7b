//! spectrace - draw the spectral trace of a track
//!
//! Headless by default: the track is played offline and the final frame is
//! written as PNG. `--live` opens a window and plays through the speakers.

use clap::Parser;
use std::process::ExitCode;

use spectrace::audio::TrackLibrary;
use spectrace::cli::Args;
use spectrace::config::Config;
use spectrace::recording::Recorder;
use spectrace::{logging, Result};

fn main() -> ExitCode {
    logging::init(tracing::Level::INFO);
    let args = Args::parse();

    match run(&args) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            tracing::error!("{}", e);
            ExitCode::FAILURE
        }
    }
}

fn run(args: &Args) -> Result<()> {
    if let Some(path) = &args.write_config {
        Config::write_template(path)?;
        tracing::info!(path = %path.display(), "Wrote config template");
        return Ok(());
    }

    let config = args.resolve_config()?;
    let mut library = match args.seed {
        Some(seed) => TrackLibrary::seeded(args.tracks.clone(), seed)?,
        None => TrackLibrary::new(args.tracks.clone())?,
    };
    tracing::info!(tracks = args.tracks.len(), "Track library ready");

    if args.live {
        return run_live(config, library);
    }

    let recorder = Recorder::new(config, args.recording_config()?);
    recorder.record(&mut library)?;
    Ok(())
}

#[cfg(feature = "live")]
fn run_live(config: Config, library: TrackLibrary) -> Result<()> {
    spectrace::live::run(config, library)
}

#[cfg(not(feature = "live"))]
fn run_live(_config: Config, _library: TrackLibrary) -> Result<()> {
    Err(spectrace::SpectraceError::Graphics(
        "built without the `live` feature".to_string(),
    ))
}
