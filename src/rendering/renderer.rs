//! Frame driver: iterates pixels in parallel, writes the output image, and
//! reports progress.

use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Instant;

use image::RgbImage;
use log::{debug, info};
use rayon::prelude::*;
use serde::Serialize;

use crate::scene::Scene;

use super::ray_tracer::{trace_pixel, TraceOutcome};
use super::sky::SkyTexture;
use super::RenderError;

/// Color substituted for rays that never reach the sky.
pub const CAPTURE_COLOR: [u8; 3] = [0, 0, 0];

/// Observer invoked after each completed pixel with `(done, total)`.
/// Called from worker threads, so it must be `Sync`; ordering across pixels
/// is not guaranteed.
pub type ProgressFn = dyn Fn(u64, u64) + Sync;

/// Outcome tallies and timing for one rendered frame.
#[derive(Debug, Clone, Serialize)]
pub struct RenderStats {
    pub width: u32,
    pub height: u32,
    pub escaped: u64,
    pub captured: u64,
    pub undetermined: u64,
    pub elapsed_secs: f64,
}

/// Render the whole frame.
///
/// Each pixel reads only the shared immutable scene and texture and writes
/// its own output slot, so the loop parallelizes without locks; only the
/// tallies and the progress counter are (relaxed) atomics.
pub fn render(
    scene: &Scene,
    sky: &SkyTexture,
    progress: Option<&(dyn Fn(u64, u64) + Sync)>,
) -> Result<(RgbImage, RenderStats), RenderError> {
    let width = scene.width;
    let height = scene.height;
    let total = u64::from(width) * u64::from(height);
    let started = Instant::now();

    let escaped = AtomicU64::new(0);
    let captured = AtomicU64::new(0);
    let undetermined = AtomicU64::new(0);
    let done = AtomicU64::new(0);

    let mut buf = vec![[0u8; 3]; total as usize];
    buf.par_iter_mut().enumerate().for_each(|(i, slot)| {
        let x = (i as u64 % u64::from(width)) as u32;
        let y = (i as u64 / u64::from(width)) as u32;
        *slot = match trace_pixel(scene, x, y) {
            TraceOutcome::Escaped(dir) => {
                escaped.fetch_add(1, Ordering::Relaxed);
                sky.sample_direction(&dir)
            }
            TraceOutcome::Captured => {
                captured.fetch_add(1, Ordering::Relaxed);
                CAPTURE_COLOR
            }
            TraceOutcome::Undetermined => {
                undetermined.fetch_add(1, Ordering::Relaxed);
                CAPTURE_COLOR
            }
        };
        if let Some(report) = progress {
            report(done.fetch_add(1, Ordering::Relaxed) + 1, total);
        }
    });

    let stats = RenderStats {
        width,
        height,
        escaped: escaped.into_inner(),
        captured: captured.into_inner(),
        undetermined: undetermined.into_inner(),
        elapsed_secs: started.elapsed().as_secs_f64(),
    };
    debug!(
        "tallies: {} escaped, {} captured, {} undetermined",
        stats.escaped, stats.captured, stats.undetermined
    );
    info!(
        "rendered {}x{} in {:.2}s",
        width, height, stats.elapsed_secs
    );

    let raw: Vec<u8> = buf.into_iter().flatten().collect();
    let frame = RgbImage::from_raw(width, height, raw)
        .ok_or(RenderError::BufferMismatch { width, height })?;
    Ok((frame, stats))
}
