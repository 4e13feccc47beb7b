//! Track decoding, random track selection and playback transports.
//!
//! Tracks are decoded up front into a mono `f32` buffer. The offline
//! transport walks that buffer at a fixed tick rate; the live system (behind
//! the `live` feature) plays it through the default output device.

#[cfg(feature = "live")]
mod system;
mod transport;

#[cfg(feature = "live")]
pub use system::AudioSystem;
pub use transport::{OfflineTransport, Playhead};

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::path::{Path, PathBuf};
use std::sync::Arc;

use crate::error::{Result, SpectraceError};

/// A decoded, mono-downmixed track
#[derive(Debug, Clone)]
pub struct Track {
    pub path: PathBuf,
    /// Samples in -1..1, shared with the playback thread
    pub samples: Arc<Vec<f32>>,
    pub sample_rate: u32,
}

impl Track {
    /// Decode a PCM WAV file (integer or float samples, any channel count)
    pub fn load(path: &Path) -> Result<Self> {
        let reader = hound::WavReader::open(path)?;
        let spec = reader.spec();
        let channels = spec.channels as usize;

        let interleaved: Vec<f32> = match spec.sample_format {
            hound::SampleFormat::Float => reader
                .into_samples::<f32>()
                .collect::<std::result::Result<_, _>>()?,
            hound::SampleFormat::Int => {
                let full_scale = (1i64 << (spec.bits_per_sample - 1)) as f32;
                reader
                    .into_samples::<i32>()
                    .map(|s| s.map(|s| s as f32 / full_scale))
                    .collect::<std::result::Result<_, _>>()?
            }
        };

        if channels == 0 || interleaved.len() < channels {
            return Err(SpectraceError::UnsupportedTrack {
                path: path.display().to_string(),
                reason: "no audio frames".to_string(),
            });
        }

        let samples = downmix(&interleaved, channels);
        tracing::info!(
            path = %path.display(),
            sample_rate = spec.sample_rate,
            channels,
            seconds = samples.len() as f32 / spec.sample_rate as f32,
            "Loaded track"
        );

        Ok(Self {
            path: path.to_path_buf(),
            samples: Arc::new(samples),
            sample_rate: spec.sample_rate,
        })
    }

    pub fn duration_secs(&self) -> f32 {
        self.samples.len() as f32 / self.sample_rate as f32
    }
}

/// Average interleaved channels into one
pub fn downmix(interleaved: &[f32], channels: usize) -> Vec<f32> {
    if channels <= 1 {
        return interleaved.to_vec();
    }
    interleaved
        .chunks_exact(channels)
        .map(|frame| frame.iter().sum::<f32>() / channels as f32)
        .collect()
}

/// Candidate tracks plus the random source used to pick between them
pub struct TrackLibrary {
    paths: Vec<PathBuf>,
    rng: StdRng,
}

impl TrackLibrary {
    /// Library with an entropy-seeded picker
    pub fn new(paths: Vec<PathBuf>) -> Result<Self> {
        Self::with_rng(paths, StdRng::from_os_rng())
    }

    /// Library with a reproducible picker
    pub fn seeded(paths: Vec<PathBuf>, seed: u64) -> Result<Self> {
        Self::with_rng(paths, StdRng::seed_from_u64(seed))
    }

    fn with_rng(paths: Vec<PathBuf>, rng: StdRng) -> Result<Self> {
        if paths.is_empty() {
            return Err(SpectraceError::NoTracks);
        }
        Ok(Self { paths, rng })
    }

    /// Pick a path uniformly at random
    pub fn pick(&mut self) -> &Path {
        let index = self.rng.random_range(0..self.paths.len());
        &self.paths[index]
    }

    /// Pick a path and decode it
    pub fn load_random(&mut self) -> Result<Track> {
        let path = self.pick().to_path_buf();
        Track::load(&path)
    }
}
