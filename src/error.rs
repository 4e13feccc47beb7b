//! Error types for track loading, configuration, sessions and output.

use thiserror::Error;

use crate::session::{SessionEvent, SessionState};

/// Errors surfaced by the outer layers (files, config, transport, devices).
///
/// The per-frame pipeline never produces one of these; numeric trouble is
/// recovered in place.
#[derive(Error, Debug)]
pub enum SpectraceError {
    /// I/O error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// WAV decoding error
    #[error("WAV error: {0}")]
    Wav(#[from] hound::Error),

    /// Image encoding error
    #[error("Image error: {0}")]
    Image(#[from] image::ImageError),

    /// Config file could not be parsed
    #[error("Config parse error: {0}")]
    ConfigParse(#[from] toml::de::Error),

    /// Config parsed but holds an unusable value
    #[error("Invalid config: {0}")]
    InvalidConfig(String),

    /// Track decoded to nothing usable
    #[error("Unsupported track '{path}': {reason}")]
    UnsupportedTrack { path: String, reason: String },

    /// No tracks to choose from
    #[error("Track library is empty")]
    NoTracks,

    /// Session event not allowed in the current state
    #[error("Cannot {event} while {from}")]
    InvalidTransition {
        from: SessionState,
        event: SessionEvent,
    },

    /// Raster could not be allocated
    #[error("Cannot allocate {width}x{height} raster")]
    RasterAllocation { width: u32, height: u32 },

    /// Audio output device error
    #[error("Audio device error: {0}")]
    AudioDevice(String),

    /// GPU / window error
    #[error("Graphics error: {0}")]
    Graphics(String),
}

/// Result type for spectrace operations
pub type Result<T> = std::result::Result<T, SpectraceError>;
