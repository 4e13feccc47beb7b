//! Live playback of a decoded track through the default output device.

use cpal::traits::{DeviceTrait, HostTrait, StreamTrait};
use std::sync::atomic::{AtomicBool, AtomicU32, AtomicUsize, Ordering};
use std::sync::Arc;

use super::{Playhead, Track};
use crate::error::{Result, SpectraceError};

/// State shared with the audio callback thread
struct PlaybackShared {
    /// Track samples played so far
    position: AtomicUsize,
    paused: AtomicBool,
    finished: AtomicBool,
    /// f32 gain stored as bits
    volume: AtomicU32,
}

/// Audio output stream playing one track
pub struct AudioSystem {
    shared: Arc<PlaybackShared>,
    samples: Arc<Vec<f32>>,
    sample_rate: u32,

    /// Audio output stream (kept alive)
    _stream: cpal::Stream,
}

impl AudioSystem {
    /// Open the default device and queue `track`, initially paused
    pub fn new(track: &Track, volume: f32) -> Result<Self> {
        let host = cpal::default_host();
        let device = host
            .default_output_device()
            .ok_or_else(|| SpectraceError::AudioDevice("no output device found".to_string()))?;

        let config = device
            .default_output_config()
            .map_err(|e| SpectraceError::AudioDevice(e.to_string()))?;

        if config.sample_format() != cpal::SampleFormat::F32 {
            return Err(SpectraceError::AudioDevice(format!(
                "unsupported sample format {:?}",
                config.sample_format()
            )));
        }

        let device_rate = config.sample_rate().0;
        let channels = config.channels() as usize;
        tracing::info!(
            device = %device.name().unwrap_or_else(|_| "Unknown".to_string()),
            device_rate,
            track_rate = track.sample_rate,
            "Audio output"
        );

        let shared = Arc::new(PlaybackShared {
            position: AtomicUsize::new(0),
            paused: AtomicBool::new(true),
            finished: AtomicBool::new(false),
            volume: AtomicU32::new(volume.to_bits()),
        });

        // Nearest-sample resampling from track rate to device rate
        let step = track.sample_rate as f64 / device_rate as f64;
        let mut cursor = 0.0f64;
        let samples = Arc::clone(&track.samples);
        let callback_shared = Arc::clone(&shared);

        let stream = device
            .build_output_stream(
                &config.into(),
                move |data: &mut [f32], _: &cpal::OutputCallbackInfo| {
                    let shared = &callback_shared;
                    if shared.paused.load(Ordering::Relaxed)
                        || shared.finished.load(Ordering::Relaxed)
                    {
                        data.fill(0.0);
                        return;
                    }

                    let gain = f32::from_bits(shared.volume.load(Ordering::Relaxed));
                    for frame in data.chunks_mut(channels.max(1)) {
                        let index = cursor as usize;
                        let sample = match samples.get(index) {
                            Some(s) => (s * gain).clamp(-1.0, 1.0),
                            None => {
                                shared.finished.store(true, Ordering::Relaxed);
                                0.0
                            }
                        };
                        frame.fill(sample);
                        cursor += step;
                    }
                    shared
                        .position
                        .store((cursor as usize).min(samples.len()), Ordering::Relaxed);
                },
                |err| tracing::error!("Audio stream error: {}", err),
                None,
            )
            .map_err(|e| SpectraceError::AudioDevice(e.to_string()))?;

        stream
            .play()
            .map_err(|e| SpectraceError::AudioDevice(e.to_string()))?;

        Ok(Self {
            shared,
            samples: Arc::clone(&track.samples),
            sample_rate: track.sample_rate,
            _stream: stream,
        })
    }

    pub fn play(&self) {
        self.shared.paused.store(false, Ordering::Relaxed);
    }

    pub fn pause(&self) {
        self.shared.paused.store(true, Ordering::Relaxed);
    }

    pub fn set_volume(&self, volume: f32) {
        self.shared.volume.store(volume.to_bits(), Ordering::Relaxed);
    }

    pub fn sample_rate(&self) -> u32 {
        self.sample_rate
    }

    /// Samples ending at the playhead (analyser input)
    pub fn history(&self, window: usize) -> &[f32] {
        self.recent(&self.samples, window)
    }
}

impl Playhead for AudioSystem {
    fn position(&self) -> usize {
        self.shared.position.load(Ordering::Relaxed)
    }

    fn is_finished(&self) -> bool {
        self.shared.finished.load(Ordering::Relaxed)
    }
}
