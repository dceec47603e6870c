//! Global constants for the renderer.
//!
//! Orbit quantities are expressed in units of the camera-to-hole geometry;
//! the orbit constant folds the relativistic correction into a single number.

// ---------------------------------------------------------------------------
// Orbit Model Constants
// ---------------------------------------------------------------------------
pub const DEFAULT_ORBIT_K: f64 = 1.5; // normalized relativistic correction term
pub const DEFAULT_PHI_STEP: f64 = 0.01; // orbital angle step (radians)

// ---------------------------------------------------------------------------
// Numerical / Integration Constants
// ---------------------------------------------------------------------------
pub const MAX_INTEGRATION_STEPS: usize = 20_000; // upper bound on orbit steps
pub const NEWTON_TOL: f64 = 1e-10; // relative tolerance per implicit stage
pub const MAX_NEWTON_ITERATIONS: usize = 12;

// ---------------------------------------------------------------------------
// Geometry Constants
// ---------------------------------------------------------------------------
pub const DEGENERATE_BASIS_EPS: f64 = 1e-12; // tangential component cutoff
