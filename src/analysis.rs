//! Short-time spectrum analysis feeding the feature pipeline.
//!
//! Produces one [`FrequencyFrame`] of dB magnitudes per tick from the samples
//! that precede the playhead, the same way a browser analyser node does:
//! Blackman window, magnitudes scaled by 1/N, smoothed across frames, then
//! converted to decibels.

mod window;

pub use window::{blackman_coefficients, blackman_window};

use rustfft::{num_complex::Complex, Fft, FftPlanner};
use std::sync::Arc;

use crate::params::AnalysisParams;

/// One frame of log-magnitude bins plus the rate they were sampled at
#[derive(Debug, Clone, PartialEq)]
pub struct FrequencyFrame {
    /// Magnitude per bin in dB; silent bins are `-inf`
    pub magnitudes_db: Vec<f32>,
    /// Sample rate of the analysed signal (Hz)
    pub sample_rate: f32,
}

impl FrequencyFrame {
    pub fn new(magnitudes_db: Vec<f32>, sample_rate: f32) -> Self {
        Self {
            magnitudes_db,
            sample_rate,
        }
    }

    pub fn bin_count(&self) -> usize {
        self.magnitudes_db.len()
    }

    pub fn nyquist(&self) -> f32 {
        self.sample_rate / 2.0
    }
}

/// FFT analyser with pre-computed plan, window and smoothing memory
pub struct SpectrumAnalyser {
    params: AnalysisParams,
    fft: Arc<dyn Fft<f32>>,
    window: Vec<f32>,
    buffer: Vec<Complex<f32>>,
    /// Smoothed linear magnitudes, one per bin
    smoothed: Vec<f32>,
}

impl SpectrumAnalyser {
    pub fn new(params: AnalysisParams) -> Self {
        let mut planner = FftPlanner::new();
        let fft = planner.plan_fft_forward(params.fft_size);

        Self {
            fft,
            window: blackman_coefficients(params.fft_size),
            buffer: vec![Complex::new(0.0, 0.0); params.fft_size],
            smoothed: vec![0.0; params.bin_count()],
            params,
        }
    }

    /// Forget the inter-frame smoothing memory
    pub fn reset(&mut self) {
        self.smoothed.iter_mut().for_each(|m| *m = 0.0);
    }

    /// Analyse the last `fft_size` samples of `history`
    ///
    /// Shorter histories are zero-padded at the front, as if the signal had
    /// been silent before it started.
    pub fn analyse(&mut self, history: &[f32], sample_rate: f32) -> FrequencyFrame {
        let size = self.params.fft_size;
        let available = history.len().min(size);
        let padding = size - available;
        let recent = &history[history.len() - available..];

        for (i, slot) in self.buffer.iter_mut().enumerate() {
            let sample = if i < padding { 0.0 } else { recent[i - padding] };
            *slot = Complex::new(sample * self.window[i], 0.0);
        }

        self.fft.process(&mut self.buffer);

        let tau = self.params.smoothing_time_constant;
        let scale = 1.0 / size as f32;
        let magnitudes_db = self
            .smoothed
            .iter_mut()
            .zip(self.buffer.iter())
            .map(|(smoothed, bin)| {
                let magnitude = bin.norm() * scale;
                let mut next = tau * *smoothed + (1.0 - tau) * magnitude;
                if !next.is_finite() {
                    next = 0.0;
                }
                *smoothed = next;
                linear_to_db(next)
            })
            .collect();

        FrequencyFrame::new(magnitudes_db, sample_rate)
    }
}

/// Linear magnitude to decibels (`-inf` for silence)
pub fn linear_to_db(magnitude: f32) -> f32 {
    if magnitude > 0.0 {
        20.0 * magnitude.log10()
    } else {
        f32::NEG_INFINITY
    }
}

/// Decibels to linear magnitude
pub fn db_to_linear(db: f32) -> f32 {
    10.0f32.powf(db / 20.0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::f32::consts::PI;

    fn sine(freq_hz: f32, sample_rate: f32, len: usize) -> Vec<f32> {
        (0..len)
            .map(|i| (2.0 * PI * freq_hz * i as f32 / sample_rate).sin())
            .collect()
    }

    #[test]
    fn test_frame_has_half_fft_size_bins() {
        let mut analyser = SpectrumAnalyser::new(AnalysisParams::default());
        let frame = analyser.analyse(&[0.0; 4096], 44_100.0);

        assert_eq!(frame.bin_count(), 1024);
        assert_eq!(frame.nyquist(), 22_050.0);
    }

    #[test]
    fn test_silence_is_negative_infinity() {
        let mut analyser = SpectrumAnalyser::new(AnalysisParams::default());
        let frame = analyser.analyse(&[], 48_000.0);

        assert!(frame
            .magnitudes_db
            .iter()
            .all(|&db| db == f32::NEG_INFINITY));
    }

    #[test]
    fn test_sine_peaks_at_its_bin() {
        let params = AnalysisParams {
            smoothing_time_constant: 0.0,
            ..Default::default()
        };
        let sample_rate = 44_100.0;
        let expected_bin = params.hz_to_bin(1_000.0, sample_rate as u32);

        let mut analyser = SpectrumAnalyser::new(params);
        let frame = analyser.analyse(&sine(1_000.0, sample_rate, 2048), sample_rate);

        let peak = frame
            .magnitudes_db
            .iter()
            .enumerate()
            .max_by(|a, b| a.1.total_cmp(b.1))
            .map(|(i, _)| i)
            .unwrap();

        assert!(peak.abs_diff(expected_bin) <= 1);
    }

    #[test]
    fn test_smoothing_carries_previous_frame() {
        let sample_rate = 44_100.0;
        let tone = sine(2_000.0, sample_rate, 2048);

        let mut analyser = SpectrumAnalyser::new(AnalysisParams::default());
        let loud = analyser.analyse(&tone, sample_rate);
        let after_silence = analyser.analyse(&[0.0; 2048], sample_rate);

        // Smoothed decay keeps energy around for a frame
        let bin = 93; // ~2kHz
        assert!(after_silence.magnitudes_db[bin].is_finite());
        assert!(after_silence.magnitudes_db[bin] < loud.magnitudes_db[bin]);

        analyser.reset();
        let reset = analyser.analyse(&[0.0; 2048], sample_rate);
        assert_eq!(reset.magnitudes_db[bin], f32::NEG_INFINITY);
    }

    #[test]
    fn test_db_conversion() {
        assert_eq!(linear_to_db(1.0), 0.0);
        assert!((linear_to_db(0.1) + 20.0).abs() < 1e-4);
        assert_eq!(linear_to_db(0.0), f32::NEG_INFINITY);
        assert!((db_to_linear(-20.0) - 0.1).abs() < 1e-6);
        assert_eq!(db_to_linear(f32::NEG_INFINITY), 0.0);
    }
}
