//! Output surface and recording configuration.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::error::{Result, SpectraceError};

/// Output surface configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RenderConfig {
    /// Output width (pixels)
    pub width: u32,

    /// Output height (pixels)
    pub height: u32,

    /// Pipeline ticks per second of audio (display refresh rate)
    pub ticks_per_second: u32,

    /// Playback gain for the live audio output (1.0 = unity)
    pub volume: f32,
}

impl Default for RenderConfig {
    fn default() -> Self {
        Self {
            width: 800,
            height: 800,
            ticks_per_second: 60,
            volume: 1.0,
        }
    }
}

/// Loudest gain the live volume keys can reach
pub const MAX_VOLUME: f32 = 2.0;

impl RenderConfig {
    /// Nudge the live playback gain by `delta`, clamped to `0..=MAX_VOLUME`
    pub fn adjust_volume(&mut self, delta: f32) -> f32 {
        let volume = if self.volume.is_finite() { self.volume } else { 1.0 };
        self.volume = (volume + delta).clamp(0.0, MAX_VOLUME);
        self.volume
    }

    pub fn validate(&self) -> Result<()> {
        if self.width == 0 || self.height == 0 {
            return Err(SpectraceError::InvalidConfig(format!(
                "output size must be non-empty, got {}x{}",
                self.width, self.height
            )));
        }
        if self.ticks_per_second == 0 {
            return Err(SpectraceError::InvalidConfig(
                "ticks_per_second must be > 0".to_string(),
            ));
        }
        if !(self.volume >= 0.0 && self.volume.is_finite()) {
            return Err(SpectraceError::InvalidConfig(format!(
                "volume must be finite and >= 0, got {}",
                self.volume
            )));
        }
        Ok(())
    }
}

/// Headless recording configuration
#[derive(Debug, Clone)]
pub struct RecordingConfig {
    /// Final composite frame (PNG)
    pub output_path: PathBuf,

    /// Directory for intermediate frames (None = final frame only)
    pub frames_dir: Option<PathBuf>,

    /// Save every Nth tick to `frames_dir`
    pub capture_every: usize,
}

impl RecordingConfig {
    pub fn new(output_path: impl Into<PathBuf>) -> Self {
        Self {
            output_path: output_path.into(),
            frames_dir: None,
            capture_every: 1,
        }
    }

    /// Whether tick `tick` should be written to the frames directory
    pub fn captures(&self, tick: usize) -> bool {
        self.frames_dir.is_some() && tick % self.capture_every.max(1) == 0
    }

    /// Path for an intermediate frame
    pub fn frame_path(&self, dir: &Path, frame_num: usize) -> PathBuf {
        dir.join(format!("frame_{:05}.png", frame_num))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_capture_schedule() {
        let mut config = RecordingConfig::new("out.png");
        assert!(!config.captures(0));

        config.frames_dir = Some(PathBuf::from("frames"));
        config.capture_every = 30;
        assert!(config.captures(0));
        assert!(!config.captures(29));
        assert!(config.captures(60));

        let path = config.frame_path(Path::new("frames"), 7);
        assert_eq!(path, PathBuf::from("frames/frame_00007.png"));
    }

    #[test]
    fn test_render_config_validation() {
        assert!(RenderConfig::default().validate().is_ok());

        let config = RenderConfig {
            ticks_per_second: 0,
            ..Default::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_volume_steps_are_clamped() {
        let mut config = RenderConfig::default();

        assert!((config.adjust_volume(0.1) - 1.1).abs() < 1e-6);
        assert!((config.adjust_volume(-0.2) - 0.9).abs() < 1e-6);

        for _ in 0..30 {
            config.adjust_volume(0.1);
        }
        assert_eq!(config.volume, MAX_VOLUME);

        for _ in 0..40 {
            config.adjust_volume(-0.1);
        }
        assert_eq!(config.volume, 0.0);
        assert!(config.validate().is_ok());
    }
}
