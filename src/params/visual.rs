//! Trace raster, stroke and composite parameters.

use serde::{Deserialize, Serialize};

use crate::error::{Result, SpectraceError};

/// Which blur implementation the composite stage uses
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BlurKernel {
    /// Separable Gaussian with transparent surroundings
    #[default]
    Gaussian,
    /// `image` crate's built-in blur
    Native,
}

/// Look of the accumulated trace
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct VisualParams {
    /// Low-res raster width (pixels, independent of output size)
    pub low_res_width: u32,

    /// Low-res raster height (pixels)
    pub low_res_height: u32,

    /// Blur standard deviation in low-res pixels (0 disables blur)
    pub blur_radius: f32,

    /// Accepted for compatibility; has no effect
    pub blur_iterations: u32,

    /// Blur implementation
    pub blur_kernel: BlurKernel,

    /// Red level (0-255) above which a composite pixel turns white
    pub threshold: u8,

    /// Margin around the drawable area (output pixels)
    pub margin: f32,

    /// Extra inset inside the margin (output pixels)
    pub edge_cushion: f32,

    /// Core stroke width per unit of raster/output scale
    /// 0.4 at 512px raster on an 800px canvas ≈ 0.26 raster pixels
    pub stroke_width: f32,

    /// Halo stroke width as a fraction of the core width
    pub halo_ratio: f32,
}

impl Default for VisualParams {
    fn default() -> Self {
        Self {
            low_res_width: 512,
            low_res_height: 480,
            blur_radius: 3.6,
            blur_iterations: 3,
            blur_kernel: BlurKernel::Gaussian,
            threshold: 246,
            margin: 40.0,
            edge_cushion: 10.0,
            stroke_width: 0.4,
            halo_ratio: 0.4,
        }
    }
}

impl VisualParams {
    /// Margin plus cushion: distance from canvas edge to the drawable area
    pub fn inset(&self) -> f32 {
        self.margin + self.edge_cushion
    }

    pub fn validate(&self) -> Result<()> {
        if self.low_res_width == 0 || self.low_res_height == 0 {
            return Err(SpectraceError::InvalidConfig(format!(
                "low-res raster must be non-empty, got {}x{}",
                self.low_res_width, self.low_res_height
            )));
        }
        if !(self.blur_radius >= 0.0 && self.blur_radius.is_finite()) {
            return Err(SpectraceError::InvalidConfig(format!(
                "blur_radius must be finite and >= 0, got {}",
                self.blur_radius
            )));
        }
        if !(self.stroke_width > 0.0 && self.halo_ratio > 0.0 && self.halo_ratio < 1.0) {
            return Err(SpectraceError::InvalidConfig(
                "stroke_width must be > 0 and halo_ratio within (0, 1)".to_string(),
            ));
        }
        if self.margin < 0.0 || self.edge_cushion < 0.0 {
            return Err(SpectraceError::InvalidConfig(
                "margin and edge_cushion must be >= 0".to_string(),
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_validate() {
        let params = VisualParams::default();
        assert!(params.validate().is_ok());
        assert_eq!(params.inset(), 50.0);
    }

    #[test]
    fn test_rejects_halo_wider_than_core() {
        let params = VisualParams {
            halo_ratio: 1.5,
            ..Default::default()
        };
        assert!(params.validate().is_err());
    }
}
