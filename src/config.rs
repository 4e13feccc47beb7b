//! TOML configuration file.
//!
//! Every section and key is optional; missing values fall back to the
//! parameter defaults in [`crate::params`].

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

use crate::error::Result;
use crate::params::{AnalysisParams, MappingParams, RenderConfig, VisualParams};

/// Commented template written by `--write-config`
pub const CONFIG_TEMPLATE: &str = r#"# spectrace configuration

[analysis]
# fft_size = 2048                   # Power of two, bins = fft_size / 2
# smoothing_time_constant = 0.7     # Analyser inter-frame smoothing (0-1)

[mapping]
# x_feature = "flux"
# y_feature = "density"
# x_scale = 8.0
# y_scale = 2.0
# inertia = 0.97                    # EMA retention, strictly between 0 and 1

[mapping.gain]
# flux = 600.0
# density = 1000.0

[visual]
# low_res_width = 512
# low_res_height = 480
# blur_radius = 3.6                 # Low-res pixels, 0 disables
# blur_iterations = 3               # Reserved
# blur_kernel = "gaussian"          # "gaussian" or "native"
# threshold = 246                   # Red level above which a pixel is white
# margin = 40.0
# edge_cushion = 10.0
# stroke_width = 0.4
# halo_ratio = 0.4

[render]
# width = 800
# height = 800
# ticks_per_second = 60
# volume = 1.0
"#;

/// Whole-program configuration
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub analysis: AnalysisParams,
    pub mapping: MappingParams,
    pub visual: VisualParams,
    pub render: RenderConfig,
}

impl Config {
    /// Parse a TOML document and validate it
    pub fn from_toml(text: &str) -> Result<Self> {
        let config: Config = toml::from_str(text)?;
        config.validate()?;
        Ok(config)
    }

    /// Load from a file
    pub fn load(path: &Path) -> Result<Self> {
        let text = fs::read_to_string(path)?;
        let config = Self::from_toml(&text)?;
        tracing::info!(path = %path.display(), "Loaded config");
        Ok(config)
    }

    /// Load from `path` if given, else defaults
    pub fn load_or_default(path: Option<&Path>) -> Result<Self> {
        match path {
            Some(path) => Self::load(path),
            None => Ok(Self::default()),
        }
    }

    /// Write the commented template (fails if the file exists)
    pub fn write_template(path: &Path) -> Result<()> {
        let mut file = fs::OpenOptions::new()
            .write(true)
            .create_new(true)
            .open(path)?;
        std::io::Write::write_all(&mut file, CONFIG_TEMPLATE.as_bytes())?;
        Ok(())
    }

    pub fn validate(&self) -> Result<()> {
        self.analysis.validate()?;
        self.mapping.validate()?;
        self.visual.validate()?;
        self.render.validate()?;
        Ok(())
    }
}
