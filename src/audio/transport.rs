//! Playhead abstraction and the fixed-rate offline transport.

use std::sync::Arc;

use super::Track;

/// Anything that knows how far into a track playback has got
pub trait Playhead {
    /// Samples played so far
    fn position(&self) -> usize;

    /// True once the whole track has been played
    fn is_finished(&self) -> bool;

    /// Up to `window` samples ending at the playhead
    fn recent<'a>(&self, samples: &'a [f32], window: usize) -> &'a [f32] {
        let end = self.position().min(samples.len());
        &samples[end.saturating_sub(window)..end]
    }
}

/// Steps through a decoded track at `ticks_per_second`, no device needed
#[derive(Debug, Clone)]
pub struct OfflineTransport {
    samples: Arc<Vec<f32>>,
    sample_rate: u32,
    ticks_per_second: u32,
    tick: u64,
}

impl OfflineTransport {
    pub fn new(track: &Track, ticks_per_second: u32) -> Self {
        Self {
            samples: Arc::clone(&track.samples),
            sample_rate: track.sample_rate,
            ticks_per_second: ticks_per_second.max(1),
            tick: 0,
        }
    }

    pub fn tick(&self) -> u64 {
        self.tick
    }

    /// Total ticks needed to play the track to its end
    pub fn total_ticks(&self) -> u64 {
        let len = self.samples.len() as u64;
        let rate = self.sample_rate as u64;
        (len * self.ticks_per_second as u64).div_ceil(rate.max(1))
    }

    /// Move the playhead forward one tick
    ///
    /// Returns false (without moving) once the track has finished.
    pub fn advance(&mut self) -> bool {
        if self.is_finished() {
            return false;
        }
        self.tick += 1;
        true
    }

    /// Samples ending at the playhead (analyser input)
    pub fn history(&self, window: usize) -> &[f32] {
        self.recent(&self.samples, window)
    }
}

impl Playhead for OfflineTransport {
    fn position(&self) -> usize {
        let played = self.tick * self.sample_rate as u64 / self.ticks_per_second as u64;
        (played as usize).min(self.samples.len())
    }

    fn is_finished(&self) -> bool {
        self.position() >= self.samples.len()
    }
}
