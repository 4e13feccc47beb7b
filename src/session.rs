//! Playback session: state machine plus the per-session pipeline context.
//!
//! A [`Session`] owns everything that must be reset when a new playback
//! starts (smoothing state, previous magnitudes, cursor, stroke anchor and
//! the low-res raster). Two sessions never share state.

use glam::Vec2;
use std::fmt;

use crate::analysis::FrequencyFrame;
use crate::composite::{CompositeFrame, CompositeRenderer};
use crate::config::Config;
use crate::error::{Result, SpectraceError};
use crate::features::{FeatureVector, SpectralFeatureExtractor};
use crate::mapping::{CanvasSize, CoordinateMapper};
use crate::raster::{LowResRaster, StrokeAccumulator, StrokeOutcome};
use crate::smoothing::{SmoothingState, TemporalSmoother};

/// Where the session is in the load / play lifecycle
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    /// No track decoded yet
    Idle,
    /// Track is being decoded
    Loading,
    /// Track decoded, playback not started
    Ready,
    Playing,
    Paused,
    /// Track ran out; a new one must be loaded before playing again
    Finished,
}

impl fmt::Display for SessionState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            SessionState::Idle => "idle",
            SessionState::Loading => "loading",
            SessionState::Ready => "ready",
            SessionState::Playing => "playing",
            SessionState::Paused => "paused",
            SessionState::Finished => "finished",
        };
        f.write_str(name)
    }
}

/// Transport events driving [`SessionState`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionEvent {
    BeginLoading,
    Loaded,
    LoadFailed,
    Play,
    Pause,
    Finish,
}

impl fmt::Display for SessionEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            SessionEvent::BeginLoading => "begin loading",
            SessionEvent::Loaded => "finish loading",
            SessionEvent::LoadFailed => "fail loading",
            SessionEvent::Play => "play",
            SessionEvent::Pause => "pause",
            SessionEvent::Finish => "finish",
        };
        f.write_str(name)
    }
}

/// What one `update` call did
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TickReport {
    pub features: FeatureVector,
    pub cursor: Vec2,
    pub stroke: StrokeOutcome,
}

/// One playback session and its pipeline
pub struct Session {
    state: SessionState,
    has_track: bool,

    extractor: SpectralFeatureExtractor,
    smoother: TemporalSmoother,
    smoothing: SmoothingState,
    mapper: CoordinateMapper,
    cursor: Option<Vec2>,
    strokes: StrokeAccumulator,
    raster: LowResRaster,
    renderer: CompositeRenderer,
}

impl Session {
    pub fn new(config: &Config) -> Result<Self> {
        let raster = LowResRaster::new(config.visual.low_res_width, config.visual.low_res_height)?;

        Ok(Self {
            state: SessionState::Idle,
            has_track: false,
            extractor: SpectralFeatureExtractor::new(),
            smoother: TemporalSmoother::new(config.mapping.gains(), config.mapping.inertia),
            smoothing: SmoothingState::default(),
            mapper: CoordinateMapper::from_params(&config.mapping, &config.visual),
            cursor: None,
            strokes: StrokeAccumulator::from_params(&config.visual),
            raster,
            renderer: CompositeRenderer::from_params(&config.visual),
        })
    }

    pub fn state(&self) -> SessionState {
        self.state
    }

    pub fn is_playing(&self) -> bool {
        self.state == SessionState::Playing
    }

    /// True when a play request has to load a new track first
    pub fn needs_track(&self) -> bool {
        matches!(self.state, SessionState::Idle | SessionState::Finished)
    }

    /// Apply a transport event
    ///
    /// Rejected events leave the session untouched.
    pub fn handle(&mut self, event: SessionEvent) -> Result<SessionState> {
        use SessionState::*;

        let next = match (self.state, event) {
            (Idle | Ready | Finished, SessionEvent::BeginLoading) => Loading,
            (Loading, SessionEvent::Loaded) => Ready,
            (Loading, SessionEvent::LoadFailed) if self.has_track => Ready,
            (Loading, SessionEvent::LoadFailed) => Idle,
            (Ready | Paused, SessionEvent::Play) => Playing,
            (Playing, SessionEvent::Pause) => Paused,
            (Playing, SessionEvent::Finish) => Finished,
            (from, event) => return Err(SpectraceError::InvalidTransition { from, event }),
        };

        match (self.state, event) {
            (_, SessionEvent::Loaded) => self.has_track = true,
            (Ready, SessionEvent::Play) => self.reset(),
            _ => {}
        }

        tracing::info!(from = %self.state, to = %next, "Session transition");
        self.state = next;
        Ok(next)
    }

    pub fn begin_loading(&mut self) -> Result<SessionState> {
        self.handle(SessionEvent::BeginLoading)
    }

    pub fn loaded(&mut self) -> Result<SessionState> {
        self.handle(SessionEvent::Loaded)
    }

    pub fn load_failed(&mut self) -> Result<SessionState> {
        self.handle(SessionEvent::LoadFailed)
    }

    /// Start (from Ready, with a reset) or resume (from Paused)
    pub fn play(&mut self) -> Result<SessionState> {
        self.handle(SessionEvent::Play)
    }

    pub fn pause(&mut self) -> Result<SessionState> {
        self.handle(SessionEvent::Pause)
    }

    pub fn finish(&mut self) -> Result<SessionState> {
        self.handle(SessionEvent::Finish)
    }

    /// Clear all per-session pipeline state
    pub fn reset(&mut self) {
        self.smoothing.reset();
        self.extractor.reset();
        self.cursor = None;
        self.strokes.reset();
        self.raster.clear();
        tracing::debug!("Pipeline reset");
    }

    /// Run extractor, smoother, mapper and accumulator for one tick
    ///
    /// Does nothing unless playing with a frame available.
    pub fn update(
        &mut self,
        frame: Option<&FrequencyFrame>,
        canvas: CanvasSize,
    ) -> Option<TickReport> {
        if !self.is_playing() {
            return None;
        }
        let frame = frame?;

        let features = self.extractor.extract(frame);
        self.smoother.update(&features, &mut self.smoothing);
        let cursor = self.mapper.map(&self.smoothing, canvas, &mut self.cursor);
        let stroke = self.strokes.push(&mut self.raster, cursor, canvas);

        Some(TickReport {
            features,
            cursor,
            stroke,
        })
    }

    /// Compose the current frame; runs regardless of playback state
    pub fn render(&self, width: u32, height: u32) -> CompositeFrame {
        self.renderer.render(&self.raster, width, height)
    }

    pub fn cursor(&self) -> Option<Vec2> {
        self.cursor
    }

    pub fn smoothing(&self) -> &SmoothingState {
        &self.smoothing
    }

    pub fn raster(&self) -> &LowResRaster {
        &self.raster
    }

    pub fn extractor(&self) -> &SpectralFeatureExtractor {
        &self.extractor
    }
}
