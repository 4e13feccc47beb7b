//! Command-line argument parsing.

use clap::Parser;
use std::path::PathBuf;

use crate::config::Config;
use crate::error::{Result, SpectraceError};
use crate::params::RecordingConfig;

/// Command line arguments
#[derive(Parser, Debug)]
#[command(name = "spectrace")]
#[command(about = "Draws a monochrome trace of an audio track's spectral features", long_about = None)]
pub struct Args {
    /// WAV files to choose from (one is picked at random per playback)
    #[arg(value_name = "TRACKS")]
    pub tracks: Vec<PathBuf>,

    /// TOML config file
    #[arg(long, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Write a commented config template to PATH and exit
    #[arg(long, value_name = "PATH")]
    pub write_config: Option<PathBuf>,

    /// Final frame (PNG) written by the headless recorder
    #[arg(long, short, value_name = "PATH", default_value = "spectrace.png")]
    pub output: PathBuf,

    /// Directory for intermediate frames
    #[arg(long, value_name = "DIR")]
    pub frames_dir: Option<PathBuf>,

    /// Save every Nth tick to the frames directory
    #[arg(long, value_name = "N", default_value = "1")]
    pub capture_every: usize,

    /// Ticks per second of audio (overrides config)
    #[arg(long, value_name = "N")]
    pub fps: Option<u32>,

    /// Output size, e.g. 800x800 (overrides config)
    #[arg(long, value_name = "WxH", value_parser = parse_size)]
    pub size: Option<(u32, u32)>,

    /// Seed for track selection
    #[arg(long, value_name = "N")]
    pub seed: Option<u64>,

    /// Playback volume for live mode (overrides config)
    #[arg(long, value_name = "V")]
    pub volume: Option<f32>,

    /// Open a window and play through the audio device
    #[arg(long)]
    pub live: bool,
}

impl Args {
    /// Load the config file (or defaults) and apply command-line overrides
    pub fn resolve_config(&self) -> Result<Config> {
        let mut config = Config::load_or_default(self.config.as_deref())?;

        if let Some(fps) = self.fps {
            config.render.ticks_per_second = fps;
        }
        if let Some((width, height)) = self.size {
            config.render.width = width;
            config.render.height = height;
        }
        if let Some(volume) = self.volume {
            config.render.volume = volume;
        }

        config.validate()?;
        Ok(config)
    }

    /// Recording configuration for headless mode
    pub fn recording_config(&self) -> Result<RecordingConfig> {
        if self.capture_every == 0 {
            return Err(SpectraceError::InvalidConfig(
                "--capture-every must be > 0".to_string(),
            ));
        }
        Ok(RecordingConfig {
            output_path: self.output.clone(),
            frames_dir: self.frames_dir.clone(),
            capture_every: self.capture_every,
        })
    }
}

/// Parse `WIDTHxHEIGHT`
fn parse_size(s: &str) -> std::result::Result<(u32, u32), String> {
    let (width, height) = s
        .split_once(['x', 'X'])
        .ok_or_else(|| format!("expected WIDTHxHEIGHT, got '{}'", s))?;
    let width = width
        .trim()
        .parse()
        .map_err(|e| format!("bad width '{}': {}", width, e))?;
    let height = height
        .trim()
        .parse()
        .map_err(|e| format!("bad height '{}': {}", height, e))?;
    Ok((width, height))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_size() {
        assert_eq!(parse_size("800x600"), Ok((800, 600)));
        assert_eq!(parse_size("64X32"), Ok((64, 32)));
        assert!(parse_size("800").is_err());
        assert!(parse_size("ax1").is_err());
    }

    #[test]
    fn test_overrides_apply_on_top_of_config() {
        let args = Args::parse_from([
            "spectrace",
            "a.wav",
            "b.wav",
            "--fps",
            "30",
            "--size",
            "320x240",
            "--seed",
            "9",
        ]);

        assert_eq!(args.tracks.len(), 2);
        assert_eq!(args.seed, Some(9));
        assert!(!args.live);

        let config = args.resolve_config().unwrap();
        assert_eq!(config.render.ticks_per_second, 30);
        assert_eq!((config.render.width, config.render.height), (320, 240));
        assert_eq!(config.visual, Config::default().visual);
    }

    #[test]
    fn test_invalid_overrides_are_rejected() {
        let args = Args::parse_from(["spectrace", "--fps", "0"]);
        assert!(args.resolve_config().is_err());

        let args = Args::parse_from(["spectrace", "--capture-every", "0"]);
        assert!(args.recording_config().is_err());
    }
}
