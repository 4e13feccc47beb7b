//! Blur, upscale and threshold the trace into the displayed frame.

mod blur;

pub use blur::{gaussian_kernel, GaussianBlur, NativeBlur, PostProcess};

use image::imageops::{self, FilterType};
use image::{Rgba, RgbaImage};
use std::path::Path;

use crate::error::Result;
use crate::params::{BlurKernel, VisualParams};
use crate::raster::LowResRaster;

const WHITE: Rgba<u8> = Rgba([255, 255, 255, 255]);
const BLACK: Rgba<u8> = Rgba([0, 0, 0, 255]);

/// Monochrome frame at output resolution
#[derive(Debug, Clone)]
pub struct CompositeFrame {
    image: RgbaImage,
}

impl CompositeFrame {
    pub fn width(&self) -> u32 {
        self.image.width()
    }

    pub fn height(&self) -> u32 {
        self.image.height()
    }

    pub fn image(&self) -> &RgbaImage {
        &self.image
    }

    /// Tightly packed RGBA8 bytes, row-major
    pub fn as_bytes(&self) -> &[u8] {
        self.image.as_raw()
    }

    pub fn black_pixel_count(&self) -> usize {
        self.image.pixels().filter(|p| **p == BLACK).count()
    }

    /// True when every pixel is white
    pub fn is_blank(&self) -> bool {
        self.image.pixels().all(|p| *p == WHITE)
    }

    /// Write as PNG
    pub fn save(&self, path: &Path) -> Result<()> {
        self.image.save(path)?;
        Ok(())
    }
}

/// Turns the low-res raster into the final black/white frame
pub struct CompositeRenderer {
    blur: Option<Box<dyn PostProcess>>,
    threshold: u8,
}

impl CompositeRenderer {
    pub fn new(blur: Option<Box<dyn PostProcess>>, threshold: u8) -> Self {
        Self { blur, threshold }
    }

    pub fn from_params(visual: &VisualParams) -> Self {
        let blur: Option<Box<dyn PostProcess>> = if visual.blur_radius > 0.0 {
            Some(match visual.blur_kernel {
                BlurKernel::Gaussian => Box::new(GaussianBlur::new(visual.blur_radius)),
                BlurKernel::Native => Box::new(NativeBlur::new(visual.blur_radius)),
            })
        } else {
            None
        };
        Self::new(blur, visual.threshold)
    }

    /// Compose one output frame of `width`x`height`
    pub fn render(&self, raster: &LowResRaster, width: u32, height: u32) -> CompositeFrame {
        let source = raster.to_image();
        let blurred = match &self.blur {
            Some(stage) => stage.process(&source),
            None => source,
        };

        let flattened = flatten_onto_white(&blurred);
        let mut image = imageops::resize(&flattened, width, height, FilterType::CatmullRom);

        for pixel in image.pixels_mut() {
            *pixel = if pixel[0] > self.threshold { WHITE } else { BLACK };
        }

        CompositeFrame { image }
    }
}

/// Source-over composite onto an opaque white background
fn flatten_onto_white(image: &RgbaImage) -> RgbaImage {
    let mut out = RgbaImage::from_pixel(image.width(), image.height(), WHITE);
    imageops::overlay(&mut out, image, 0, 0);
    out
}
