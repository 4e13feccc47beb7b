//! Pluggable blur stages for the composite pass.

use image::{imageops, Rgba, RgbaImage};

/// A raster-in, raster-out post-process stage
pub trait PostProcess: Send {
    fn process(&self, raster: &RgbaImage) -> RgbaImage;
}

/// Separable Gaussian blur over premultiplied RGBA
///
/// Pixels outside the raster count as transparent, so the blurred border
/// fades out instead of smearing edge pixels outward.
#[derive(Debug, Clone)]
pub struct GaussianBlur {
    kernel: Vec<f32>,
}

impl GaussianBlur {
    /// Blur with standard deviation `sigma` (pixels)
    pub fn new(sigma: f32) -> Self {
        Self {
            kernel: gaussian_kernel(sigma),
        }
    }
}

/// Normalized kernel covering ±3 sigma
pub fn gaussian_kernel(sigma: f32) -> Vec<f32> {
    if !(sigma > 0.0) {
        return vec![1.0];
    }
    let radius = (sigma * 3.0).ceil() as i32;
    let denom = 2.0 * sigma * sigma;
    let weights: Vec<f32> = (-radius..=radius)
        .map(|x| (-(x * x) as f32 / denom).exp())
        .collect();
    let total: f32 = weights.iter().sum();
    weights.into_iter().map(|w| w / total).collect()
}

impl PostProcess for GaussianBlur {
    fn process(&self, raster: &RgbaImage) -> RgbaImage {
        let (width, height) = raster.dimensions();
        let (w, h) = (width as usize, height as usize);

        let premultiplied: Vec<[f32; 4]> = raster
            .pixels()
            .map(|Rgba([r, g, b, a])| {
                let alpha = *a as f32 / 255.0;
                [
                    *r as f32 / 255.0 * alpha,
                    *g as f32 / 255.0 * alpha,
                    *b as f32 / 255.0 * alpha,
                    alpha,
                ]
            })
            .collect();

        let horizontal = convolve(&premultiplied, w, h, &self.kernel, w, 1);
        let blurred = convolve(&horizontal, h, w, &self.kernel, 1, w);

        RgbaImage::from_fn(width, height, |x, y| {
            let [r, g, b, a] = blurred[y as usize * w + x as usize];
            if a <= f32::EPSILON {
                return Rgba([0, 0, 0, 0]);
            }
            let channel = |c: f32| ((c / a).clamp(0.0, 1.0) * 255.0).round() as u8;
            Rgba([
                channel(r),
                channel(g),
                channel(b),
                (a.clamp(0.0, 1.0) * 255.0).round() as u8,
            ])
        })
    }
}

/// 1D convolution along lines of `len` pixels
///
/// `step` is the stride between neighbours on a line, `line_stride` the
/// stride between the starts of successive lines.
fn convolve(
    src: &[[f32; 4]],
    len: usize,
    lines: usize,
    kernel: &[f32],
    line_stride: usize,
    step: usize,
) -> Vec<[f32; 4]> {
    let radius = (kernel.len() / 2) as isize;
    let mut out = vec![[0.0f32; 4]; src.len()];

    for line in 0..lines {
        let base = line * line_stride;
        for i in 0..len {
            let mut acc = [0.0f32; 4];
            for (k, weight) in kernel.iter().enumerate() {
                let j = i as isize + k as isize - radius;
                if j < 0 || j >= len as isize {
                    continue;
                }
                let pixel = src[base + j as usize * step];
                for c in 0..4 {
                    acc[c] += pixel[c] * weight;
                }
            }
            out[base + i * step] = acc;
        }
    }
    out
}

/// The `image` crate's own Gaussian blur (edge pixels are extended)
#[derive(Debug, Clone)]
pub struct NativeBlur {
    sigma: f32,
}

impl NativeBlur {
    pub fn new(sigma: f32) -> Self {
        Self { sigma }
    }
}

impl PostProcess for NativeBlur {
    fn process(&self, raster: &RgbaImage) -> RgbaImage {
        imageops::blur(raster, self.sigma)
    }
}
