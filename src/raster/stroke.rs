//! Core + halo line strokes from the previous cursor point.

use glam::Vec2;
use tiny_skia::{FillRule, LineCap, Paint, PathBuilder, Pixmap, Stroke, Transform};

use super::LowResRaster;
use crate::mapping::CanvasSize;
use crate::params::VisualParams;

/// A segment drawn into the raster (raster coordinates)
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct StrokeSegment {
    pub from: Vec2,
    pub to: Vec2,
    pub core_width: f32,
    pub halo_width: f32,
}

/// What a pushed cursor point did to the raster
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum StrokeOutcome {
    /// First point after reset: stored, nothing drawn
    Anchored(Vec2),
    /// One segment drawn from the stored point
    Drawn(StrokeSegment),
}

/// Turns successive cursor positions into strokes on the raster
#[derive(Debug, Clone)]
pub struct StrokeAccumulator {
    /// Last point in raster space (None after reset)
    previous: Option<Vec2>,
    stroke_width: f32,
    halo_ratio: f32,
}

impl StrokeAccumulator {
    pub fn new(stroke_width: f32, halo_ratio: f32) -> Self {
        Self {
            previous: None,
            stroke_width,
            halo_ratio,
        }
    }

    pub fn from_params(visual: &VisualParams) -> Self {
        Self::new(visual.stroke_width, visual.halo_ratio)
    }

    pub fn reset(&mut self) {
        self.previous = None;
    }

    pub fn previous(&self) -> Option<Vec2> {
        self.previous
    }

    /// Rescale a canvas-space point into raster space, per axis
    pub fn to_raster_space(cursor: Vec2, canvas: CanvasSize, raster: &LowResRaster) -> Vec2 {
        Vec2::new(
            cursor.x / canvas.width * raster.width() as f32,
            cursor.y / canvas.height * raster.height() as f32,
        )
    }

    /// Add the cursor to the trace
    pub fn push(
        &mut self,
        raster: &mut LowResRaster,
        cursor: Vec2,
        canvas: CanvasSize,
    ) -> StrokeOutcome {
        let point = Self::to_raster_space(cursor, canvas, raster);

        let Some(from) = self.previous.replace(point) else {
            return StrokeOutcome::Anchored(point);
        };

        let core_width = self.stroke_width * (raster.width() as f32 / canvas.width);
        let segment = StrokeSegment {
            from,
            to: point,
            core_width,
            halo_width: core_width * self.halo_ratio,
        };

        let pixmap = raster.pixmap_mut();
        draw_round_segment(pixmap, segment.from, segment.to, segment.core_width);
        draw_round_segment(pixmap, segment.from, segment.to, segment.halo_width);

        StrokeOutcome::Drawn(segment)
    }
}

/// Solid black, round-capped, anti-aliased segment
fn draw_round_segment(pixmap: &mut Pixmap, from: Vec2, to: Vec2, width: f32) {
    if !(width > 0.0 && from.is_finite() && to.is_finite()) {
        return;
    }

    let mut paint = Paint::default();
    paint.set_color_rgba8(0, 0, 0, 255);
    paint.anti_alias = true;

    // A zero-length round-capped line is a dot
    if from.distance_squared(to) < f32::EPSILON {
        if let Some(dot) = PathBuilder::from_circle(to.x, to.y, width / 2.0) {
            pixmap.fill_path(&dot, &paint, FillRule::Winding, Transform::identity(), None);
        }
        return;
    }

    let mut builder = PathBuilder::new();
    builder.move_to(from.x, from.y);
    builder.line_to(to.x, to.y);
    let Some(path) = builder.finish() else {
        return;
    };

    let stroke = Stroke {
        width,
        line_cap: LineCap::Round,
        ..Stroke::default()
    };
    pixmap.stroke_path(&path, &paint, &stroke, Transform::identity(), None);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_first_point_only_anchors() {
        let mut raster = LowResRaster::new(512, 480).unwrap();
        let mut strokes = StrokeAccumulator::from_params(&VisualParams::default());
        let canvas = CanvasSize::new(800, 800);

        let outcome = strokes.push(&mut raster, Vec2::new(400.0, 400.0), canvas);

        assert_eq!(outcome, StrokeOutcome::Anchored(Vec2::new(256.0, 240.0)));
        assert_eq!(strokes.previous(), Some(Vec2::new(256.0, 240.0)));
        assert!(raster.is_blank());
    }

    #[test]
    fn test_second_point_draws_one_segment() {
        let mut raster = LowResRaster::new(512, 480).unwrap();
        let mut strokes = StrokeAccumulator::from_params(&VisualParams::default());
        let canvas = CanvasSize::new(800, 800);

        strokes.push(&mut raster, Vec2::new(100.0, 100.0), canvas);
        let outcome = strokes.push(&mut raster, Vec2::new(700.0, 700.0), canvas);

        let StrokeOutcome::Drawn(segment) = outcome else {
            panic!("expected a drawn segment, got {:?}", outcome);
        };
        assert_eq!(segment.from, Vec2::new(64.0, 60.0));
        assert_eq!(segment.to, Vec2::new(448.0, 420.0));
        assert!(segment.core_width > segment.halo_width);
        assert!((segment.core_width - 0.4 * 512.0 / 800.0).abs() < 1e-6);
        assert_eq!(strokes.previous(), Some(segment.to));
        assert!(!raster.is_blank());
    }

    #[test]
    fn test_wide_stroke_darkens_its_path() {
        let mut raster = LowResRaster::new(100, 100).unwrap();
        let mut strokes = StrokeAccumulator::new(6.0, 0.4);
        let canvas = CanvasSize::new(100, 100);

        strokes.push(&mut raster, Vec2::new(10.5, 50.5), canvas);
        strokes.push(&mut raster, Vec2::new(90.5, 50.5), canvas);

        assert_eq!(raster.level_at(50, 50), Some(0));
        assert_eq!(raster.level_at(50, 10), Some(255));
        // Round cap reaches past the end point
        assert!(raster.level_at(92, 50).unwrap() < 128);
    }

    #[test]
    fn test_repeated_point_draws_a_dot() {
        let mut raster = LowResRaster::new(100, 100).unwrap();
        let mut strokes = StrokeAccumulator::new(6.0, 0.4);
        let canvas = CanvasSize::new(100, 100);

        strokes.push(&mut raster, Vec2::new(30.5, 30.5), canvas);
        let outcome = strokes.push(&mut raster, Vec2::new(30.5, 30.5), canvas);

        assert!(matches!(outcome, StrokeOutcome::Drawn(_)));
        assert_eq!(raster.level_at(30, 30), Some(0));
    }

    #[test]
    fn test_reset_forgets_anchor() {
        let mut raster = LowResRaster::new(64, 64).unwrap();
        let mut strokes = StrokeAccumulator::new(1.0, 0.5);
        let canvas = CanvasSize::new(64, 64);

        strokes.push(&mut raster, Vec2::new(5.0, 5.0), canvas);
        strokes.reset();

        let outcome = strokes.push(&mut raster, Vec2::new(20.0, 20.0), canvas);
        assert_eq!(outcome, StrokeOutcome::Anchored(Vec2::new(20.0, 20.0)));
    }
}
