//! Pinhole camera and per-pixel orbital basis construction.

use crate::physics::constants::DEGENERATE_BASIS_EPS;
use crate::physics::{OrbitState, Vec3};
use crate::scene::Scene;

/// Local orbital-plane frame for one pixel ray.
///
/// The scene's radial vector `n` and the tangential vector `t` are unit
/// length and mutually orthogonal; together they span the plane the bent
/// ray stays in. `initial` is the `[u, u']` state at `phi = 0`.
#[derive(Debug, Clone)]
pub struct RayBasis {
    pub t: Vec3,
    pub initial: OrbitState,
}

/// Camera-space direction through pixel `(x, y)`: the pinhole projection,
/// looking down -Z with the image centered on the optical axis.
#[inline]
pub fn pixel_direction(scene: &Scene, x: u32, y: u32) -> Vec3 {
    let dx = x as f64 - scene.width as f64 / 2.0;
    let dy = scene.height as f64 / 2.0 - y as f64;
    Vec3::new(dx, dy, -scene.pp_distance).normalize()
}

/// Build the orbital-plane basis and initial state for a pixel ray.
///
/// Returns `None` for the degenerate radial ray (`d0` parallel to `n`): the
/// orbital plane is undefined there, and the caller classifies the ray from
/// the sign of `d0 . n` alone.
pub fn ray_basis(scene: &Scene, d0: &Vec3) -> Option<RayBasis> {
    // (n x d0) x n is the component of d0 orthogonal to n, so its norm
    // equals d0 . t before normalization.
    let perp = scene.n.cross(d0).cross(&scene.n);
    let tangential = perp.norm();
    if tangential <= DEGENERATE_BASIS_EPS {
        return None;
    }
    let t = perp / tangential;
    let du0 = -scene.u0 * d0.dot(&scene.n) / tangential;
    Some(RayBasis {
        t,
        initial: [scene.u0, du0],
    })
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
    fn pixel_directions_are_unit_length() {
        let scene = reference_scene();
        for &(x, y) in &[(0, 0), (199, 0), (0, 199), (37, 111), (100, 100)] {
            let d0 = pixel_direction(&scene, x, y);
            assert!((d0.norm() - 1.0).abs() < 1e-12, "pixel ({x}, {y})");
        }
    }

    #[test]
    fn horizontal_edge_pixel_sits_at_half_fov() {
        let scene = reference_scene();
        // Pixel (0, H/2) lies on the horizontal axis, half a field of view
        // off the optical axis.
        let d0 = pixel_direction(&scene, 0, 100);
        let axis = Vec3::new(0.0, 0.0, -1.0);
        assert!((d0.dot(&axis) - 30f64.to_radians().cos()).abs() < 1e-12);
    }

    #[test]
    fn basis_is_orthonormal_for_off_axis_pixels() {
        let scene = reference_scene();
        for &(x, y) in &[(0, 0), (199, 63), (40, 180), (101, 100), (99, 101)] {
            let d0 = pixel_direction(&scene, x, y);
            let basis = ray_basis(&scene, &d0).expect("off-axis pixel has a basis");
            assert!((scene.n.norm() - 1.0).abs() < 1e-12);
            assert!((basis.t.norm() - 1.0).abs() < 1e-12, "pixel ({x}, {y})");
            assert!(scene.n.dot(&basis.t).abs() < 1e-9, "pixel ({x}, {y})");
        }
    }

    #[test]
    fn tangent_spans_the_ray_plane() {
        let scene = reference_scene();
        let d0 = pixel_direction(&scene, 17, 150);
        let basis = ray_basis(&scene, &d0).unwrap();
        // d0 decomposes exactly into its n and t components.
        let rebuilt = d0.dot(&scene.n) * scene.n + d0.dot(&basis.t) * basis.t;
        assert!((rebuilt - d0).norm() < 1e-12);
        // The tangential component is the residual norm, hence nonnegative.
        assert!(d0.dot(&basis.t) > 0.0);
    }

    #[test]
    fn initial_state_starts_at_camera_and_approaches() {
        let scene = reference_scene();
        let d0 = pixel_direction(&scene, 0, 100);
        let basis = ray_basis(&scene, &d0).unwrap();
        assert!((basis.initial[0] - 1.0 / 30.0).abs() < 1e-15);
        // Every forward-looking ray initially closes in on the hole.
        assert!(basis.initial[1] > 0.0);
    }

    #[test]
    fn exact_center_ray_is_degenerate() {
        let scene = reference_scene();
        let d0 = pixel_direction(&scene, 100, 100);
        assert!(ray_basis(&scene, &d0).is_none());
    }
}
