//! Headless recorder: plays a track offline and writes composite frames.

use std::fs;
use std::path::{Path, PathBuf};

use crate::analysis::SpectrumAnalyser;
use crate::audio::{OfflineTransport, Track, TrackLibrary};
use crate::config::Config;
use crate::error::Result;
use crate::mapping::CanvasSize;
use crate::params::RecordingConfig;
use crate::session::Session;

/// What a finished recording produced
#[derive(Debug, Clone)]
pub struct RecordingSummary {
    pub track: PathBuf,
    pub ticks: u64,
    pub frames_written: usize,
    pub output_path: PathBuf,
    /// Black pixels in the final frame
    pub black_pixels: usize,
}

/// Runs whole tracks through a fresh session at a fixed tick rate
pub struct Recorder {
    config: Config,
    recording: RecordingConfig,
}

impl Recorder {
    pub fn new(config: Config, recording: RecordingConfig) -> Self {
        Self { config, recording }
    }

    /// Pick a random track from `library` and record it
    pub fn record(&self, library: &mut TrackLibrary) -> Result<RecordingSummary> {
        let mut session = Session::new(&self.config)?;
        session.begin_loading()?;

        let track = match library.load_random() {
            Ok(track) => track,
            Err(e) => {
                session.load_failed()?;
                return Err(e);
            }
        };
        session.loaded()?;

        self.run(session, &track)
    }

    /// Record an already decoded track
    pub fn record_track(&self, track: &Track) -> Result<RecordingSummary> {
        let mut session = Session::new(&self.config)?;
        session.begin_loading()?;
        session.loaded()?;
        self.run(session, track)
    }

    fn run(&self, mut session: Session, track: &Track) -> Result<RecordingSummary> {
        let render = &self.config.render;
        let canvas = CanvasSize::new(render.width, render.height);
        let window = self.config.analysis.fft_size;

        if let Some(dir) = &self.recording.frames_dir {
            fs::create_dir_all(dir)?;
        }

        let mut transport = OfflineTransport::new(track, render.ticks_per_second);
        let mut analyser = SpectrumAnalyser::new(self.config.analysis.clone());
        let total_ticks = transport.total_ticks();
        let progress_every = render.ticks_per_second as u64 * 10;

        tracing::info!(
            track = %track.path.display(),
            ticks = total_ticks,
            size = %format!("{}x{}", render.width, render.height),
            "Recording"
        );

        session.play()?;
        let mut frames_written = 0;
        while transport.advance() {
            let tick = transport.tick() - 1;
            let frame = analyser.analyse(transport.history(window), track.sample_rate as f32);
            session.update(Some(&frame), canvas);

            if let Some(dir) = self.recording.frames_dir.as_deref() {
                if self.recording.captures(tick as usize) {
                    let path = self.recording.frame_path(dir, frames_written);
                    session.render(render.width, render.height).save(&path)?;
                    frames_written += 1;
                }
            }

            if tick > 0 && tick % progress_every == 0 {
                tracing::info!(
                    "Progress: {:.0}% ({}/{} ticks)",
                    tick as f64 / total_ticks.max(1) as f64 * 100.0,
                    tick,
                    total_ticks
                );
            }
        }
        session.finish()?;

        let frame = session.render(render.width, render.height);
        ensure_parent_dir(&self.recording.output_path)?;
        frame.save(&self.recording.output_path)?;

        let summary = RecordingSummary {
            track: track.path.clone(),
            ticks: transport.tick(),
            frames_written,
            output_path: self.recording.output_path.clone(),
            black_pixels: frame.black_pixel_count(),
        };
        tracing::info!(
            output = %summary.output_path.display(),
            frames = summary.frames_written,
            black_pixels = summary.black_pixels,
            "Recording complete"
        );
        Ok(summary)
    }
}

fn ensure_parent_dir(path: &Path) -> Result<()> {
    match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => Ok(fs::create_dir_all(parent)?),
        _ => Ok(()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    fn chirp(seconds: f32, sample_rate: u32) -> Track {
        let len = (seconds * sample_rate as f32) as usize;
        let samples = (0..len)
            .map(|i| {
                let t = i as f32 / sample_rate as f32;
                let freq = 200.0 + 3000.0 * t;
                let envelope = if (t * 4.0) as u32 % 2 == 0 { 0.8 } else { 0.05 };
                envelope * (2.0 * std::f32::consts::PI * freq * t).sin()
            })
            .collect();
        Track {
            path: PathBuf::from("chirp.wav"),
            samples: Arc::new(samples),
            sample_rate,
        }
    }

    fn small_config() -> Config {
        let mut config = Config::default();
        config.render.width = 160;
        config.render.height = 120;
        config.render.ticks_per_second = 30;
        config.visual.low_res_width = 128;
        config.visual.low_res_height = 96;
        config
    }

    #[test]
    fn test_record_track_writes_final_frame() {
        let dir = tempfile::tempdir().unwrap();
        let output = dir.path().join("out").join("trace.png");
        let recorder = Recorder::new(small_config(), RecordingConfig::new(&output));

        let summary = recorder.record_track(&chirp(1.0, 8_000)).unwrap();

        assert_eq!(summary.ticks, 30);
        assert_eq!(summary.frames_written, 0);
        let image = image::open(&output).unwrap().to_rgba8();
        assert_eq!(image.dimensions(), (160, 120));
        assert!(image
            .pixels()
            .all(|p| p.0 == [0, 0, 0, 255] || p.0 == [255, 255, 255, 255]));
    }

    #[test]
    fn test_frames_are_captured_on_schedule() {
        let dir = tempfile::tempdir().unwrap();
        let frames = dir.path().join("frames");
        let mut recording = RecordingConfig::new(dir.path().join("final.png"));
        recording.frames_dir = Some(frames.clone());
        recording.capture_every = 10;

        let recorder = Recorder::new(small_config(), recording);
        let summary = recorder.record_track(&chirp(1.0, 8_000)).unwrap();

        // Ticks 0, 10 and 20
        assert_eq!(summary.frames_written, 3);
        assert!(frames.join("frame_00000.png").exists());
        assert!(frames.join("frame_00002.png").exists());
        assert!(!frames.join("frame_00003.png").exists());
    }

    #[test]
    fn test_missing_track_surfaces_error() {
        let dir = tempfile::tempdir().unwrap();
        let recorder = Recorder::new(
            small_config(),
            RecordingConfig::new(dir.path().join("final.png")),
        );
        let mut library =
            TrackLibrary::seeded(vec![dir.path().join("missing.wav")], 1).unwrap();

        assert!(recorder.record(&mut library).is_err());
        assert!(!dir.path().join("final.png").exists());
    }
}
