//! Per-frame spectral feature extraction.

use super::{Feature, FeatureVector};
use crate::analysis::FrequencyFrame;

/// Guards divisions and logarithms against exact zeros
const EPSILON: f64 = 1e-12;

/// Fraction of total magnitude that defines the rolloff bin
pub const ROLLOFF_FRACTION: f64 = 0.85;

/// Computes the ten features and remembers the previous frame for flux
#[derive(Debug, Clone, Default)]
pub struct SpectralFeatureExtractor {
    /// Linear magnitudes of the last processed frame (None after reset)
    previous: Option<Vec<f64>>,
}

impl SpectralFeatureExtractor {
    pub fn new() -> Self {
        Self::default()
    }

    /// Forget the previous frame so the next flux is measured against silence
    pub fn reset(&mut self) {
        self.previous = None;
    }

    pub fn previous_magnitudes(&self) -> Option<&[f64]> {
        self.previous.as_deref()
    }

    /// Extract features from `frame` and store its magnitudes for the next call
    pub fn extract(&mut self, frame: &FrequencyFrame) -> FeatureVector {
        let magnitudes: Vec<f64> = frame
            .magnitudes_db
            .iter()
            .map(|&db| {
                let magnitude = 10f64.powf(db as f64 / 20.0);
                if magnitude.is_finite() {
                    magnitude
                } else {
                    0.0
                }
            })
            .collect();

        // A bin-count change means the stored frame is from another layout
        let previous = self
            .previous
            .as_deref()
            .filter(|prev| prev.len() == magnitudes.len());

        let features = compute_features(&magnitudes, previous);
        self.previous = Some(magnitudes);
        features
    }
}

/// Evaluate every feature over linear magnitudes
fn compute_features(magnitudes: &[f64], previous: Option<&[f64]>) -> FeatureVector {
    let mut features = FeatureVector::splat(0.0);
    let n = magnitudes.len();
    if n == 0 {
        features[Feature::Rolloff] = 1.0;
        return features;
    }
    let count = n as f64;

    // Bin positions are expressed as fractions of nyquist (i / N)
    let position = |i: usize| i as f64 / count;

    let total: f64 = magnitudes.iter().sum();
    let power: f64 = magnitudes.iter().map(|m| m * m).sum();

    let centroid = if total > 0.0 {
        magnitudes
            .iter()
            .enumerate()
            .map(|(i, m)| position(i) * m)
            .sum::<f64>()
            / total
    } else {
        0.0
    };
    features[Feature::Centroid] = centroid;

    features[Feature::Energy] = (1.0 + power).log10();

    let flux_raw: f64 = match previous {
        Some(prev) => magnitudes
            .iter()
            .zip(prev)
            .map(|(m, p)| (m - p).max(0.0).powi(2))
            .sum(),
        None => power,
    };
    features[Feature::Flux] = (1.0 + 10.0 * flux_raw).log10();

    let log_sum: f64 = magnitudes.iter().map(|m| (m + EPSILON).ln()).sum();
    let geometric_mean = (log_sum / count).exp();
    let arithmetic_mean = magnitudes.iter().map(|m| m + EPSILON).sum::<f64>() / count;
    features[Feature::Flatness] = geometric_mean / (arithmetic_mean + EPSILON);

    features[Feature::Rolloff] = rolloff(magnitudes, total);

    let spread_num: f64 = magnitudes
        .iter()
        .enumerate()
        .map(|(i, m)| m * (position(i) - centroid).powi(2))
        .sum();
    let spread_den = if total != 0.0 { total } else { 1.0 };
    features[Feature::Spread] = (spread_num / spread_den).sqrt();

    if n > 1 {
        let entropy: f64 = magnitudes
            .iter()
            .map(|m| m / (total + EPSILON))
            .filter(|&p| p > 0.0)
            .map(|p| -p * p.log2())
            .sum();
        features[Feature::Entropy] = entropy / count.log2();
    }

    let peak = magnitudes.iter().copied().fold(0.0, f64::max);
    features[Feature::Crest] = peak / (arithmetic_mean + EPSILON);

    let (mut sum_x, mut sum_y, mut sum_xy, mut sum_xx) = (0.0, 0.0, 0.0, 0.0);
    for (i, &m) in magnitudes.iter().enumerate() {
        let x = i as f64;
        sum_x += x;
        sum_y += m;
        sum_xy += x * m;
        sum_xx += x * x;
    }
    features[Feature::Slope] =
        (count * sum_xy - sum_x * sum_y) / (count * sum_xx - sum_x * sum_x + EPSILON);

    // Same formula as energy on purpose; kept separate so it can diverge
    features[Feature::Density] = (1.0 + power).log10();

    features
}

fn rolloff(magnitudes: &[f64], total: f64) -> f64 {
    if total <= 0.0 {
        return 1.0;
    }
    let threshold = total * ROLLOFF_FRACTION;
    let mut cumulative = 0.0;
    for (i, m) in magnitudes.iter().enumerate() {
        cumulative += m;
        if cumulative >= threshold {
            return i as f64 / magnitudes.len() as f64;
        }
    }
    1.0
}

#[cfg(test)]
mod tests {
    use super::*;

    const BINS: usize = 1024;

    fn silent_frame() -> FrequencyFrame {
        FrequencyFrame::new(vec![f32::NEG_INFINITY; BINS], 44_100.0)
    }

    fn single_bin_frame(bin: usize, db: f32) -> FrequencyFrame {
        let mut frame = silent_frame();
        frame.magnitudes_db[bin] = db;
        frame
    }

    fn assert_all_finite(features: &FeatureVector) {
        for (feature, value) in features.iter() {
            assert!(value.is_finite(), "{} is not finite: {}", feature, value);
        }
    }

    #[test]
    fn test_all_zero_spectrum_is_finite() {
        let mut extractor = SpectralFeatureExtractor::new();
        let features = extractor.extract(&silent_frame());

        assert_all_finite(&features);
        assert_eq!(features[Feature::Centroid], 0.0);
        assert_eq!(features[Feature::Rolloff], 1.0);
        assert_eq!(features[Feature::Crest], 0.0);
        assert!((features[Feature::Flatness] - 0.5).abs() < 1e-9);
        assert_eq!(features[Feature::Energy], 0.0);
        assert_eq!(features[Feature::Entropy], 0.0);
    }

    #[test]
    fn test_empty_frame() {
        let mut extractor = SpectralFeatureExtractor::new();
        let features = extractor.extract(&FrequencyFrame::new(Vec::new(), 44_100.0));

        assert_all_finite(&features);
        assert_eq!(features[Feature::Rolloff], 1.0);
    }

    #[test]
    fn test_first_frame_flux_uses_silent_previous() {
        let frame = FrequencyFrame::new(vec![-6.0; BINS], 44_100.0);
        let magnitude = 10f64.powf(-6.0 / 20.0);
        let power = magnitude * magnitude * BINS as f64;

        let mut extractor = SpectralFeatureExtractor::new();
        let features = extractor.extract(&frame);

        let expected = (1.0 + 10.0 * power).log10();
        assert!((features[Feature::Flux] - expected).abs() < 1e-9);
    }

    #[test]
    fn test_identical_frames_have_zero_flux() {
        let frame = FrequencyFrame::new(
            (0..BINS).map(|i| -20.0 - (i % 7) as f32).collect(),
            44_100.0,
        );

        let mut extractor = SpectralFeatureExtractor::new();
        extractor.extract(&frame);
        let features = extractor.extract(&frame);

        assert_eq!(features[Feature::Flux], 0.0);
    }

    #[test]
    fn test_flux_ignores_decreasing_bins() {
        let mut extractor = SpectralFeatureExtractor::new();
        extractor.extract(&FrequencyFrame::new(vec![0.0; BINS], 44_100.0));
        let features = extractor.extract(&silent_frame());

        assert_eq!(features[Feature::Flux], 0.0);
    }

    #[test]
    fn test_reset_forgets_previous_frame() {
        let frame = FrequencyFrame::new(vec![-12.0; BINS], 44_100.0);
        let mut extractor = SpectralFeatureExtractor::new();

        let first = extractor.extract(&frame);
        assert!(extractor.previous_magnitudes().is_some());

        extractor.reset();
        assert!(extractor.previous_magnitudes().is_none());

        let after_reset = extractor.extract(&frame);
        assert_eq!(first[Feature::Flux], after_reset[Feature::Flux]);
        assert!(after_reset[Feature::Flux] > 0.0);
    }

    #[test]
    fn test_bin_count_change_drops_previous() {
        let mut extractor = SpectralFeatureExtractor::new();
        extractor.extract(&FrequencyFrame::new(vec![0.0; 512], 44_100.0));
        let features = extractor.extract(&FrequencyFrame::new(vec![0.0; BINS], 44_100.0));

        let expected = (1.0 + 10.0 * BINS as f64).log10();
        assert!((features[Feature::Flux] - expected).abs() < 1e-9);
    }

    #[test]
    fn test_single_bin_at_half_nyquist() {
        let bin = BINS / 2;
        let mut extractor = SpectralFeatureExtractor::new();
        let features = extractor.extract(&single_bin_frame(bin, 0.0));

        assert!((features[Feature::Centroid] - 0.5).abs() < 1e-9);
        assert!((features[Feature::Rolloff] - bin as f64 / BINS as f64).abs() < 1e-9);
        assert!(features[Feature::Spread].abs() < 1e-9);
        assert!(features[Feature::Entropy].abs() < 1e-9);
        assert!((features[Feature::Crest] - BINS as f64).abs() < 1e-3);
        assert_all_finite(&features);
    }

    #[test]
    fn test_flat_spectrum() {
        let mut extractor = SpectralFeatureExtractor::new();
        let features = extractor.extract(&FrequencyFrame::new(vec![-10.0; BINS], 44_100.0));

        assert!((features[Feature::Flatness] - 1.0).abs() < 1e-6);
        assert!((features[Feature::Entropy] - 1.0).abs() < 1e-6);
        assert!((features[Feature::Crest] - 1.0).abs() < 1e-6);
        assert!(features[Feature::Slope].abs() < 1e-9);
        assert!((features[Feature::Centroid] - 0.5 * (BINS - 1) as f64 / BINS as f64).abs() < 1e-9);
    }

    #[test]
    fn test_slope_sign_follows_tilt() {
        let falling = FrequencyFrame::new(
            (0..BINS).map(|i| -(i as f32) * 0.05).collect(),
            44_100.0,
        );
        let rising = FrequencyFrame::new(
            (0..BINS).map(|i| -((BINS - i) as f32) * 0.05).collect(),
            44_100.0,
        );

        let mut extractor = SpectralFeatureExtractor::new();
        assert!(extractor.extract(&falling)[Feature::Slope] < 0.0);
        assert!(extractor.extract(&rising)[Feature::Slope] > 0.0);
    }

    #[test]
    fn test_density_matches_energy() {
        let mut extractor = SpectralFeatureExtractor::new();
        let features = extractor.extract(&single_bin_frame(10, 6.0));

        assert_eq!(features[Feature::Density], features[Feature::Energy]);
        assert!(features[Feature::Energy] > 0.0);
    }

    #[test]
    fn test_non_finite_input_is_treated_as_silence() {
        let mut frame = single_bin_frame(BINS / 2, 0.0);
        frame.magnitudes_db[3] = f32::NAN;
        frame.magnitudes_db[4] = f32::INFINITY;

        let mut extractor = SpectralFeatureExtractor::new();
        let features = extractor.extract(&frame);

        assert_all_finite(&features);
        assert!((features[Feature::Centroid] - 0.5).abs() < 1e-9);
    }
}
