//! Parameter definitions with units and documented semantics.
//!
//! Every tunable lives here with:
//! - Units (pixels, Hz, samples, 0-255 levels)
//! - Documented ranges and meanings
//! - Defaults matching the reference look of the trace

mod analysis;
mod mapping;
mod render;
mod visual;

// Re-export all types
pub use analysis::AnalysisParams;
pub use mapping::MappingParams;
pub use render::{RecordingConfig, RenderConfig};
pub use visual::{BlurKernel, VisualParams};
