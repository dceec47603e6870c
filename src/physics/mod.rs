//! Physics for the lensing model.
//!
//! This module contains the photon orbit equation, its parameters, and the
//! stiff integrator that advances a ray's orbital state angle by angle.

pub mod constants;
pub mod integrator;
pub mod orbit;

// Re-export commonly used items
pub use integrator::OrbitIntegrator;
pub use orbit::OrbitState;

/// Common 3D vector type for ray geometry.
pub type Vec3 = nalgebra::Vector3<f64>;
