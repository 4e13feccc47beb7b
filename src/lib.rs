//! spectrace - spectral feature traces of audio tracks
//!
//! Ten spectral features are extracted per analysis frame, smoothed, and
//! two of them steer a cursor whose path accumulates into a low-res raster.
//! The raster is blurred and thresholded into a black-and-white frame.

pub mod analysis;
pub mod audio;
pub mod cli;
pub mod composite;
pub mod config;
pub mod error;
pub mod features;
pub mod logging;
pub mod mapping;
pub mod params;
pub mod raster;
pub mod recording;
pub mod session;
pub mod smoothing;

#[cfg(feature = "live")]
pub mod live;
#[cfg(feature = "live")]
pub mod rendering;

pub use error::{Result, SpectraceError};
