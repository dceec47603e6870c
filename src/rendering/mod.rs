//! Rendering for the lensing renderer.
//!
//! This module handles everything between the scene description and the
//! output pixels: per-pixel orbital basis construction, geodesic ray
//! tracing, sky texture sampling, and the parallel frame driver.

pub mod camera;
pub mod ray_tracer;
pub mod renderer;
pub mod sky;

// Re-export commonly used items
pub use renderer::{render, ProgressFn, RenderStats};
pub use sky::SkyTexture;

/// Rendering error types. All of these are setup-time failures; per-pixel
/// failures are absorbed into fallback colors and never propagate.
#[derive(Debug, thiserror::Error)]
pub enum RenderError {
    #[error("sky texture is empty")]
    EmptyTexture,
    #[error("texture pixel buffer does not match {width}x{height}")]
    TextureShape { width: u32, height: u32 },
    #[error("output buffer assembly failed for {width}x{height}")]
    BufferMismatch { width: u32, height: u32 },
}
