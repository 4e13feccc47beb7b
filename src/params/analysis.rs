//! Frequency analysis configuration.

use serde::{Deserialize, Serialize};

use crate::error::{Result, SpectraceError};

/// Spectrum analyser configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AnalysisParams {
    /// FFT window size in samples (must be power of 2)
    /// 2048 = ~46ms at 44.1kHz, 1024 bins per frame
    pub fft_size: usize,

    /// Inter-frame magnitude smoothing (0 = none, towards 1 = sluggish)
    pub smoothing_time_constant: f32,
}

impl Default for AnalysisParams {
    fn default() -> Self {
        Self {
            fft_size: 2048,
            smoothing_time_constant: 0.7,
        }
    }
}

impl AnalysisParams {
    /// Number of frequency bins produced per frame
    pub fn bin_count(&self) -> usize {
        self.fft_size / 2
    }

    /// Convert frequency (Hz) to bin index for a given sample rate
    pub fn hz_to_bin(&self, hz: f32, sample_rate_hz: u32) -> usize {
        ((hz * self.fft_size as f32) / sample_rate_hz as f32) as usize
    }

    /// Validate configuration (FFT size must be power of 2, etc.)
    pub fn validate(&self) -> Result<()> {
        if !self.fft_size.is_power_of_two() || self.fft_size < 32 {
            return Err(SpectraceError::InvalidConfig(format!(
                "fft_size must be a power of 2 >= 32, got {}",
                self.fft_size
            )));
        }
        if !(0.0..=1.0).contains(&self.smoothing_time_constant) {
            return Err(SpectraceError::InvalidConfig(format!(
                "smoothing_time_constant must be within 0..=1, got {}",
                self.smoothing_time_constant
            )));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hz_to_bin() {
        let params = AnalysisParams::default();

        // 44100 / 2048 ≈ 21.5 Hz per bin
        assert_eq!(params.hz_to_bin(0.0, 44_100), 0);
        assert_eq!(params.hz_to_bin(21.6, 44_100), 1);
        assert_eq!(params.hz_to_bin(11_025.0, 44_100), 512);
    }

    #[test]
    fn test_validate_rejects_bad_fft_size() {
        let params = AnalysisParams {
            fft_size: 1000,
            ..Default::default()
        };
        assert!(params.validate().is_err());

        let params = AnalysisParams {
            fft_size: 16,
            ..Default::default()
        };
        assert!(params.validate().is_err());

        assert!(AnalysisParams::default().validate().is_ok());
        assert_eq!(AnalysisParams::default().bin_count(), 1024);
    }
}
