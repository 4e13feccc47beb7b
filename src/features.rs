//! Spectral feature vocabulary and per-feature tables.
//!
//! The ten features are a closed set; tables keyed by them are fixed-size
//! arrays indexed through [`Feature`].

mod extractor;

pub use extractor::{SpectralFeatureExtractor, ROLLOFF_FRACTION};

use serde::{Deserialize, Serialize};
use std::fmt;
use std::ops::{Index, IndexMut};
use std::str::FromStr;

/// One of the ten scalar descriptors computed per frame
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Feature {
    Centroid,
    Energy,
    Flux,
    Flatness,
    Rolloff,
    Spread,
    Entropy,
    Crest,
    Slope,
    Density,
}

impl Feature {
    pub const COUNT: usize = 10;

    /// All features in canonical order
    pub const ALL: [Feature; Feature::COUNT] = [
        Feature::Centroid,
        Feature::Energy,
        Feature::Flux,
        Feature::Flatness,
        Feature::Rolloff,
        Feature::Spread,
        Feature::Entropy,
        Feature::Crest,
        Feature::Slope,
        Feature::Density,
    ];

    pub fn name(self) -> &'static str {
        match self {
            Feature::Centroid => "centroid",
            Feature::Energy => "energy",
            Feature::Flux => "flux",
            Feature::Flatness => "flatness",
            Feature::Rolloff => "rolloff",
            Feature::Spread => "spread",
            Feature::Entropy => "entropy",
            Feature::Crest => "crest",
            Feature::Slope => "slope",
            Feature::Density => "density",
        }
    }

    fn index(self) -> usize {
        self as usize
    }
}

impl fmt::Display for Feature {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Feature {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim().to_lowercase();
        Feature::ALL
            .into_iter()
            .find(|feature| feature.name() == wanted)
            .ok_or_else(|| format!("unknown feature '{}'", s))
    }
}

/// Fixed-size table holding one value per feature
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FeatureMap<T> {
    values: [T; Feature::COUNT],
}

impl<T: Copy> FeatureMap<T> {
    /// Table with every entry set to `value`
    pub fn splat(value: T) -> Self {
        Self {
            values: [value; Feature::COUNT],
        }
    }

    /// Table built by evaluating `f` for each feature
    pub fn from_fn(mut f: impl FnMut(Feature) -> T) -> Self {
        let mut values = [f(Feature::Centroid); Feature::COUNT];
        for feature in Feature::ALL.into_iter().skip(1) {
            values[feature.index()] = f(feature);
        }
        Self { values }
    }

    pub fn get(&self, feature: Feature) -> T {
        self.values[feature.index()]
    }

    pub fn set(&mut self, feature: Feature, value: T) {
        self.values[feature.index()] = value;
    }

    /// Iterate `(feature, value)` pairs in canonical order
    pub fn iter(&self) -> impl Iterator<Item = (Feature, T)> + '_ {
        Feature::ALL.into_iter().map(move |feature| (feature, self.get(feature)))
    }
}

impl<T> Index<Feature> for FeatureMap<T> {
    type Output = T;

    fn index(&self, feature: Feature) -> &T {
        &self.values[feature.index()]
    }
}

impl<T> IndexMut<Feature> for FeatureMap<T> {
    fn index_mut(&mut self, feature: Feature) -> &mut T {
        &mut self.values[feature.index()]
    }
}

/// Raw feature values for one frame
pub type FeatureVector = FeatureMap<f64>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_feature_names_round_trip() {
        for feature in Feature::ALL {
            assert_eq!(feature.name().parse::<Feature>(), Ok(feature));
        }
        assert_eq!(" Flux ".parse::<Feature>(), Ok(Feature::Flux));
        assert!("loudness".parse::<Feature>().is_err());
    }

    #[test]
    fn test_feature_map_indexing() {
        let mut map = FeatureMap::splat(0.0);
        map[Feature::Slope] = -2.5;
        map.set(Feature::Crest, 4.0);

        assert_eq!(map.get(Feature::Slope), -2.5);
        assert_eq!(map[Feature::Crest], 4.0);
        assert_eq!(map[Feature::Centroid], 0.0);

        let order: Vec<Feature> = map.iter().map(|(feature, _)| feature).collect();
        assert_eq!(order, Feature::ALL.to_vec());
    }

    #[test]
    fn test_feature_map_from_fn() {
        let map = FeatureMap::from_fn(|feature| feature.name().len());
        assert_eq!(map[Feature::Flux], 4);
        assert_eq!(map[Feature::Density], 7);
    }
}
