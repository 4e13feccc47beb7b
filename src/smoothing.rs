//! Two-stage exponential smoothing of feature values.
//!
//! Each feature is scaled by its gain, passed through a first EMA, and the
//! first EMA is passed through a second one. The cascade lags more than a
//! single EMA but suppresses audio transients in the drawn trace.

use crate::features::{Feature, FeatureMap, FeatureVector};

/// Exponential moving average step: `inertia * previous + (1 - inertia) * value`
pub fn ema(previous: f64, value: f64, inertia: f64) -> f64 {
    inertia * previous + (1.0 - inertia) * value
}

/// Replace a non-finite slot with `seed`
///
/// Returns `true` when the slot was re-seeded.
pub fn reseed_if_non_finite(slot: &mut f64, seed: f64) -> bool {
    if slot.is_finite() {
        false
    } else {
        *slot = seed;
        true
    }
}

/// First- and second-pass EMA values per feature
#[derive(Debug, Clone, PartialEq)]
pub struct SmoothingState {
    pub first_pass: FeatureMap<f64>,
    pub second_pass: FeatureMap<f64>,
}

impl Default for SmoothingState {
    fn default() -> Self {
        Self {
            first_pass: FeatureMap::splat(0.0),
            second_pass: FeatureMap::splat(0.0),
        }
    }
}

impl SmoothingState {
    /// Zero both passes (start of a playback session)
    pub fn reset(&mut self) {
        *self = Self::default();
    }

    /// Smoothed output used for mapping
    pub fn value(&self, feature: Feature) -> f64 {
        self.second_pass[feature]
    }
}

/// Applies gains and the cascaded EMA with a shared inertia
#[derive(Debug, Clone)]
pub struct TemporalSmoother {
    gains: FeatureMap<f64>,
    inertia: f64,
}

impl TemporalSmoother {
    pub fn new(gains: FeatureMap<f64>, inertia: f64) -> Self {
        Self { gains, inertia }
    }

    /// Fold one frame of raw features into `state`
    pub fn update(&self, raw: &FeatureVector, state: &mut SmoothingState) {
        for feature in Feature::ALL {
            let post_gain = raw[feature] * self.gains[feature];

            let first = &mut state.first_pass[feature];
            let second = &mut state.second_pass[feature];

            // Both guards run before either pass moves
            if reseed_if_non_finite(first, post_gain) {
                tracing::debug!(%feature, "re-seeded first smoothing pass");
            }
            if reseed_if_non_finite(second, *first) {
                tracing::debug!(%feature, "re-seeded second smoothing pass");
            }

            *first = ema(*first, post_gain, self.inertia);
            *second = ema(*second, *first, self.inertia);
        }
    }
}
