//! Per-pixel geodesic tracing: orbital basis, integration, classification.

use log::{log_enabled, trace, Level};

use crate::physics::{OrbitIntegrator, Vec3};
use crate::scene::Scene;

use super::camera::{pixel_direction, ray_basis};

/// Terminal classification of a traced ray. Every pixel ends in exactly one
/// of these.
#[derive(Debug, Clone, PartialEq)]
pub enum TraceOutcome {
    /// The ray reached the background sky travelling in this direction.
    Escaped(Vec3),
    /// The ray fell into the compact mass (integration broke down).
    Captured,
    /// The step cap elapsed before escape or capture. Rendered like a
    /// captured ray, tallied separately.
    Undetermined,
}

/// Trace the ray through pixel `(x, y)` of the scene.
///
/// The orbital state advances in fixed `phi` steps while the integrator
/// succeeds and the inverse radius stays positive; `u <= 0` means the ray
/// has run off to infinity and escapes along `cos(phi) n + sin(phi) t`.
pub fn trace_pixel(scene: &Scene, x: u32, y: u32) -> TraceOutcome {
    let d0 = pixel_direction(scene, x, y);
    let Some(basis) = ray_basis(scene, &d0) else {
        // Radial ray: no orbital plane. Toward the hole it plunges straight
        // in; away from it, it leaves undeflected.
        return if d0.dot(&scene.n) < 0.0 {
            TraceOutcome::Captured
        } else {
            TraceOutcome::Escaped(d0)
        };
    };

    let mut integrator = OrbitIntegrator::new(scene.orbit_k, scene.phi_step, basis.initial);
    for _ in 0..scene.max_steps {
        match integrator.step() {
            Err(err) => {
                trace!("pixel ({x}, {y}) captured: {err}");
                return TraceOutcome::Captured;
            }
            Ok([u, _]) => {
                let phi = integrator.phi();
                if u <= 0.0 {
                    return TraceOutcome::Escaped(phi.cos() * scene.n + phi.sin() * basis.t);
                }
                if log_enabled!(Level::Trace) {
                    let pos = (phi.cos() * scene.n + phi.sin() * basis.t) / u;
                    trace!(
                        "pixel ({x}, {y}) phi {phi:.4} r {:.4} at ({:.3}, {:.3}, {:.3})",
                        1.0 / u,
                        pos.x,
                        pos.y,
                        pos.z
                    );
                }
            }
        }
    }
    TraceOutcome::Undetermined
}
