//! Persistent low-resolution raster holding the accumulated trace.

mod stroke;

pub use stroke::{StrokeAccumulator, StrokeOutcome, StrokeSegment};

use image::{Rgba, RgbaImage};
use tiny_skia::{Color, Pixmap};

use crate::error::{Result, SpectraceError};

/// Fixed-size opaque bitmap, white until strokes land on it
pub struct LowResRaster {
    pixmap: Pixmap,
}

impl LowResRaster {
    pub fn new(width: u32, height: u32) -> Result<Self> {
        let mut pixmap =
            Pixmap::new(width, height).ok_or(SpectraceError::RasterAllocation { width, height })?;
        pixmap.fill(Color::WHITE);
        Ok(Self { pixmap })
    }

    pub fn width(&self) -> u32 {
        self.pixmap.width()
    }

    pub fn height(&self) -> u32 {
        self.pixmap.height()
    }

    /// Wipe the trace back to white
    pub fn clear(&mut self) {
        self.pixmap.fill(Color::WHITE);
    }

    pub(crate) fn pixmap_mut(&mut self) -> &mut Pixmap {
        &mut self.pixmap
    }

    /// Red channel at (x, y); 255 is untouched paper
    pub fn level_at(&self, x: u32, y: u32) -> Option<u8> {
        if x >= self.width() || y >= self.height() {
            return None;
        }
        self.pixmap
            .pixel(x, y)
            .map(|pixel| pixel.demultiply().red())
    }

    /// True when no pixel has been darkened
    pub fn is_blank(&self) -> bool {
        self.pixmap
            .pixels()
            .iter()
            .all(|pixel| pixel.red() == 255 && pixel.green() == 255 && pixel.blue() == 255)
    }

    /// Copy into a straight-alpha RGBA image
    pub fn to_image(&self) -> RgbaImage {
        RgbaImage::from_fn(self.width(), self.height(), |x, y| {
            match self.pixmap.pixel(x, y) {
                Some(pixel) => {
                    let color = pixel.demultiply();
                    Rgba([color.red(), color.green(), color.blue(), color.alpha()])
                }
                None => Rgba([255, 255, 255, 255]),
            }
        })
    }
}
