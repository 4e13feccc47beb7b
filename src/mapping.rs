//! Feature-space to canvas-space cursor mapping.

use glam::Vec2;

use crate::features::Feature;
use crate::params::{MappingParams, VisualParams};
use crate::smoothing::{ema, SmoothingState};

/// Output canvas dimensions (pixels)
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CanvasSize {
    pub width: f32,
    pub height: f32,
}

impl CanvasSize {
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            width: width as f32,
            height: height as f32,
        }
    }
}

/// One axis: which smoothed feature drives it and by how much
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AxisBinding {
    pub feature: Feature,
    pub scale: f64,
}

impl AxisBinding {
    /// Scaled feature value clamped to 0..1 (non-finite reads as 0)
    fn normalized(&self, state: &SmoothingState) -> f32 {
        let value = state.value(self.feature) * self.scale;
        if value.is_nan() {
            0.0
        } else {
            value.clamp(0.0, 1.0) as f32
        }
    }
}

/// Maps two smoothed features onto a bounded, smoothed cursor
#[derive(Debug, Clone)]
pub struct CoordinateMapper {
    pub x: AxisBinding,
    pub y: AxisBinding,
    margin: f32,
    edge_cushion: f32,
    inertia: f64,
}

impl CoordinateMapper {
    pub fn new(
        x: AxisBinding,
        y: AxisBinding,
        margin: f32,
        edge_cushion: f32,
        inertia: f64,
    ) -> Self {
        Self {
            x,
            y,
            margin,
            edge_cushion,
            inertia,
        }
    }

    pub fn from_params(mapping: &MappingParams, visual: &VisualParams) -> Self {
        Self::new(
            AxisBinding {
                feature: mapping.x_feature,
                scale: mapping.x_scale,
            },
            AxisBinding {
                feature: mapping.y_feature,
                scale: mapping.y_scale,
            },
            visual.margin,
            visual.edge_cushion,
            mapping.inertia,
        )
    }

    /// Drawable rectangle as (min, max) corners
    pub fn bounds(&self, canvas: CanvasSize) -> (Vec2, Vec2) {
        let inset = self.margin + self.edge_cushion;
        (
            Vec2::splat(inset),
            Vec2::new(canvas.width - inset, canvas.height - inset),
        )
    }

    /// Target point before cursor smoothing
    ///
    /// The Y axis is inverted so larger feature values land nearer the top.
    pub fn target(&self, state: &SmoothingState, canvas: CanvasSize) -> Vec2 {
        let (min, max) = self.bounds(canvas);
        let x_norm = self.x.normalized(state);
        let y_norm = self.y.normalized(state);

        Vec2::new(
            min.x + x_norm * (max.x - min.x),
            max.y - y_norm * (max.y - min.y),
        )
    }

    /// Advance `cursor` towards the current target and return it
    ///
    /// An empty cursor (session start) is seeded with the target directly.
    pub fn map(
        &self,
        state: &SmoothingState,
        canvas: CanvasSize,
        cursor: &mut Option<Vec2>,
    ) -> Vec2 {
        let target = self.target(state, canvas);
        let next = match *cursor {
            Some(previous) => Vec2::new(
                ema(previous.x as f64, target.x as f64, self.inertia) as f32,
                ema(previous.y as f64, target.y as f64, self.inertia) as f32,
            ),
            None => target,
        };
        *cursor = Some(next);
        next
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn mapper() -> CoordinateMapper {
        CoordinateMapper::from_params(&MappingParams::default(), &VisualParams::default())
    }

    fn state_with(x: f64, y: f64) -> SmoothingState {
        let mut state = SmoothingState::default();
        state.second_pass[Feature::Flux] = x;
        state.second_pass[Feature::Density] = y;
        state
    }

    #[test]
    fn test_first_point_is_seeded_directly() {
        let canvas = CanvasSize::new(800, 800);
        let mut cursor = None;

        let point = mapper().map(&state_with(0.0, 0.0), canvas, &mut cursor);

        // Zero features: left edge, bottom edge
        assert_eq!(point, Vec2::new(50.0, 750.0));
        assert_eq!(cursor, Some(point));
    }

    #[test]
    fn test_y_axis_is_inverted() {
        let canvas = CanvasSize::new(800, 600);
        let mapper = mapper();

        // x_scale 8, y_scale 2: 1/8 and 1/2 saturate both axes
        let top_right = mapper.target(&state_with(1.0 / 8.0, 0.5), canvas);
        assert_eq!(top_right, Vec2::new(750.0, 50.0));

        let middle = mapper.target(&state_with(1.0 / 16.0, 0.25), canvas);
        assert_eq!(middle, Vec2::new(400.0, 300.0));
    }

    #[test]
    fn test_cursor_is_smoothed_after_first_point() {
        let canvas = CanvasSize::new(800, 800);
        let mapper = mapper();
        let mut cursor = None;

        mapper.map(&state_with(0.0, 0.0), canvas, &mut cursor);
        let next = mapper.map(&state_with(1.0, 1.0), canvas, &mut cursor);

        // 3% of the way from (50, 750) to (750, 50)
        assert!((next.x - 71.0).abs() < 1e-3);
        assert!((next.y - 729.0).abs() < 1e-3);
    }

    #[test]
    fn test_output_stays_in_bounds() {
        let mapper = mapper();
        let extremes = [
            -1e12,
            -1.0,
            0.0,
            0.01,
            0.3,
            1.0,
            1e12,
            f64::INFINITY,
            f64::NEG_INFINITY,
            f64::NAN,
        ];

        let canvases = [
            CanvasSize::new(100, 100),
            CanvasSize::new(800, 600),
            CanvasSize::new(1920, 400),
        ];

        for canvas in canvases {
            let (min, max) = mapper.bounds(canvas);
            let mut cursor = None;
            for &x in &extremes {
                for &y in &extremes {
                    let point = mapper.map(&state_with(x, y), canvas, &mut cursor);
                    assert!(point.x >= min.x - 1e-3 && point.x <= max.x + 1e-3);
                    assert!(point.y >= min.y - 1e-3 && point.y <= max.y + 1e-3);
                }
            }
        }
    }
}
