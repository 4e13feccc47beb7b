//! Feature gains, smoothing inertia and axis selection.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::error::{Result, SpectraceError};
use crate::features::{Feature, FeatureMap};

/// Mapping from smoothed features to cursor axes
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MappingParams {
    /// Feature driving the horizontal axis
    pub x_feature: Feature,

    /// Feature driving the vertical axis (larger values draw higher)
    pub y_feature: Feature,

    /// Multiplier applied to the X feature before clamping to 0..1
    pub x_scale: f64,

    /// Multiplier applied to the Y feature before clamping to 0..1
    pub y_scale: f64,

    /// EMA retention shared by both smoothing passes and the cursor
    /// 0.97 at 60 ticks/s ≈ half-life of 23 ticks (~0.4 s)
    pub inertia: f64,

    /// Per-feature gain overrides on top of [`MappingParams::base_gain`]
    pub gain: BTreeMap<Feature, f64>,
}

impl Default for MappingParams {
    fn default() -> Self {
        Self {
            x_feature: Feature::Flux,
            y_feature: Feature::Density,
            x_scale: 8.0,
            y_scale: 2.0,
            inertia: 0.97,
            gain: BTreeMap::new(),
        }
    }
}

impl MappingParams {
    /// Gain bringing each raw feature into a comparable range
    pub fn base_gain(feature: Feature) -> f64 {
        match feature {
            Feature::Centroid => 1.0,
            Feature::Energy => 300.0,
            Feature::Flux => 600.0,
            Feature::Flatness => 1.0,
            Feature::Rolloff => 1.0,
            Feature::Spread => 1.0,
            Feature::Entropy => 1.0,
            Feature::Crest => 0.001,
            Feature::Slope => -1_000_000.0,
            Feature::Density => 1000.0,
        }
    }

    /// Effective gain table (base gains with overrides applied)
    pub fn gains(&self) -> FeatureMap<f64> {
        FeatureMap::from_fn(|feature| {
            self.gain
                .get(&feature)
                .copied()
                .unwrap_or_else(|| Self::base_gain(feature))
        })
    }

    pub fn validate(&self) -> Result<()> {
        if !(self.inertia > 0.0 && self.inertia < 1.0) {
            return Err(SpectraceError::InvalidConfig(format!(
                "inertia must be strictly between 0 and 1, got {}",
                self.inertia
            )));
        }
        if !self.x_scale.is_finite() || !self.y_scale.is_finite() {
            return Err(SpectraceError::InvalidConfig(
                "axis scales must be finite".to_string(),
            ));
        }
        if let Some((feature, _)) = self.gain.iter().find(|(_, g)| !g.is_finite()) {
            return Err(SpectraceError::InvalidConfig(format!(
                "gain for {} must be finite",
                feature
            )));
        }
        Ok(())
    }
}
