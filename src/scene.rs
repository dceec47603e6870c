//! Scene setup: the immutable geometry and integration parameters derived
//! once from configuration before rendering begins.

use thiserror::Error;

use crate::physics::Vec3;

/// Configuration rejected at setup time. These abort the run before any
/// pixel is traced; per-pixel failures never surface here.
#[derive(Debug, Error)]
pub enum SceneError {
    #[error("resolution must be positive, got {width}x{height}")]
    BadResolution { width: u32, height: u32 },
    #[error("field of view must lie in (0, 180) degrees, got {0}")]
    BadFov(f64),
    #[error("black hole offset must be finite and nonzero")]
    DegenerateOffset,
    #[error("orbit constant must be finite, got {0}")]
    BadOrbitK(f64),
    #[error("phi step must be positive and finite, got {0}")]
    BadPhiStep(f64),
    #[error("max steps must be positive")]
    BadMaxSteps,
}

/// Process-wide immutable render geometry.
///
/// Built once at startup with the black hole at the origin; every per-pixel
/// computation borrows it read-only. The derived quantities (`n`, `u0`,
/// `pp_distance`) are computed here exactly once, never per pixel.
#[derive(Debug, Clone)]
pub struct Scene {
    pub width: u32,
    pub height: u32,
    /// Horizontal field of view in radians.
    pub fov: f64,
    /// Camera position, hole-centered coordinates.
    pub camera_pos: Vec3,
    /// Outward radial unit vector at the camera (hole -> camera). Together
    /// with a pixel's tangential vector it spans that ray's orbital plane,
    /// and `r(phi) = (cos(phi) n + sin(phi) t) / u` starts at the camera.
    pub n: Vec3,
    /// Inverse camera-to-hole distance, the initial orbital state `u(0)`.
    pub u0: f64,
    /// Pixel-plane distance of the pinhole projection.
    pub pp_distance: f64,
    pub orbit_k: f64,
    pub phi_step: f64,
    pub max_steps: usize,
}

impl Scene {
    /// Validate the configuration and derive the per-run constants.
    ///
    /// `black_hole_offset` is the hole's position in camera coordinates
    /// (the camera looks down -Z); internally the hole sits at the origin
    /// and the camera at the negated offset.
    pub fn new(
        width: u32,
        height: u32,
        fov_deg: f64,
        black_hole_offset: Vec3,
        orbit_k: f64,
        phi_step: f64,
        max_steps: usize,
    ) -> Result<Self, SceneError> {
        if width == 0 || height == 0 {
            return Err(SceneError::BadResolution { width, height });
        }
        if !(fov_deg > 0.0 && fov_deg < 180.0) {
            return Err(SceneError::BadFov(fov_deg));
        }
        if !orbit_k.is_finite() {
            return Err(SceneError::BadOrbitK(orbit_k));
        }
        if !(phi_step > 0.0 && phi_step.is_finite()) {
            return Err(SceneError::BadPhiStep(phi_step));
        }
        if max_steps == 0 {
            return Err(SceneError::BadMaxSteps);
        }
        let camera_pos = -black_hole_offset;
        let r0 = camera_pos.norm();
        if !r0.is_finite() || r0 == 0.0 {
            return Err(SceneError::DegenerateOffset);
        }

        let fov = fov_deg.to_radians();
        Ok(Self {
            width,
            height,
            fov,
            camera_pos,
            n: camera_pos / r0,
            u0: 1.0 / r0,
            pp_distance: width as f64 / (2.0 * (fov / 2.0).tan()),
            orbit_k,
            phi_step,
            max_steps,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::physics::constants::{DEFAULT_ORBIT_K, DEFAULT_PHI_STEP, MAX_INTEGRATION_STEPS};

    fn reference_scene() -> Scene {
        Scene::new(
            200,
            200,
            60.0,
            Vec3::new(0.0, 0.0, -30.0),
            DEFAULT_ORBIT_K,
            DEFAULT_PHI_STEP,
            MAX_INTEGRATION_STEPS,
        )
        .unwrap()
    }

    #[test]
    fn derives_geometry_once() {
        let scene = reference_scene();
        assert!((scene.u0 - 1.0 / 30.0).abs() < 1e-15);
        assert!((scene.n - Vec3::new(0.0, 0.0, 1.0)).norm() < 1e-15);
        // pp = W / (2 tan(FOV/2)) with FOV = 60 degrees
        let expected = 200.0 / (2.0 * (30f64.to_radians()).tan());
        assert!((scene.pp_distance - expected).abs() < 1e-9);
    }

    #[test]
    fn rejects_zero_resolution() {
        let err = Scene::new(0, 100, 60.0, Vec3::new(0.0, 0.0, -30.0), 1.5, 0.01, 100);
        assert!(matches!(err, Err(SceneError::BadResolution { .. })));
    }

    #[test]
    fn rejects_degenerate_fov() {
        for fov in [0.0, -10.0, 180.0, 200.0] {
            let err = Scene::new(100, 100, fov, Vec3::new(0.0, 0.0, -30.0), 1.5, 0.01, 100);
            assert!(matches!(err, Err(SceneError::BadFov(_))), "fov {fov}");
        }
    }

    #[test]
    fn rejects_camera_on_top_of_hole() {
        let err = Scene::new(100, 100, 60.0, Vec3::zeros(), 1.5, 0.01, 100);
        assert!(matches!(err, Err(SceneError::DegenerateOffset)));
    }

    #[test]
    fn rejects_bad_step_parameters() {
        let offset = Vec3::new(0.0, 0.0, -30.0);
        assert!(Scene::new(100, 100, 60.0, offset, 1.5, 0.0, 100).is_err());
        assert!(Scene::new(100, 100, 60.0, offset, 1.5, f64::NAN, 100).is_err());
        assert!(Scene::new(100, 100, 60.0, offset, 1.5, 0.01, 0).is_err());
        assert!(Scene::new(100, 100, 60.0, offset, f64::INFINITY, 0.01, 100).is_err());
    }
}
