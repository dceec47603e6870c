//! Equirectangular sky texture and direction sampling.
//!
//! Horizontal texture position encodes azimuth about the vertical axis
//! (zero toward -Z, signed by the X component), vertical position encodes
//! elevation. Sampling is total: every direction maps to a defined color,
//! degenerate and out-of-range cases included.

use std::f64::consts::PI;

use image::RgbImage;

use crate::physics::Vec3;

use super::RenderError;

/// Immutable RGB grid shared read-only across all pixel evaluations.
pub struct SkyTexture {
    pixels: Vec<[u8; 3]>,
    width: u32,
    height: u32,
}

impl SkyTexture {
    /// Wrap a decoded image. Empty images are a setup-time error.
    pub fn from_image(img: &RgbImage) -> Result<Self, RenderError> {
        if img.width() == 0 || img.height() == 0 {
            return Err(RenderError::EmptyTexture);
        }
        Ok(Self {
            pixels: img.pixels().map(|p| p.0).collect(),
            width: img.width(),
            height: img.height(),
        })
    }

    /// Wrap a flat row-major pixel grid.
    pub fn from_pixels(pixels: Vec<[u8; 3]>, width: u32, height: u32) -> Result<Self, RenderError> {
        if width == 0 || height == 0 {
            return Err(RenderError::EmptyTexture);
        }
        if pixels.len() != width as usize * height as usize {
            return Err(RenderError::TextureShape { width, height });
        }
        Ok(Self {
            pixels,
            width,
            height,
        })
    }

    #[inline]
    pub fn width(&self) -> u32 {
        self.width
    }

    #[inline]
    pub fn height(&self) -> u32 {
        self.height
    }

    /// Pixel lookup; `None` outside the grid.
    #[inline]
    pub fn pixel(&self, x: i64, y: i64) -> Option<[u8; 3]> {
        if x < 0 || y < 0 || x >= self.width as i64 || y >= self.height as i64 {
            return None;
        }
        Some(self.pixels[y as usize * self.width as usize + x as usize])
    }

    /// Map a unit direction to a bilinearly interpolated texture color.
    ///
    /// A purely vertical direction has no horizontal projection; its azimuth
    /// degrades to zero and the elevation row decides the result (possibly
    /// the out-of-range fallback).
    pub fn sample_direction(&self, dir: &Vec3) -> [u8; 3] {
        let horizontal = Vec3::new(dir.x, 0.0, dir.z);
        let len = horizontal.norm();
        let proj = if len > 0.0 {
            horizontal / len
        } else {
            Vec3::zeros()
        };
        let azimuth = (-proj.z).clamp(-1.0, 1.0).acos() * sign(proj.x);
        let elevation = dir.y.clamp(-1.0, 1.0).asin();

        let w = f64::from(self.width);
        let h = f64::from(self.height);
        let px = w / (2.0 * PI) * azimuth + w / 2.0;
        let py = -h / PI * elevation + h / 2.0;
        self.sample_bilinear(px, py)
    }

    /// Bilinear interpolation over the four texels around `(px, py)`.
    ///
    /// Any corner outside the grid replaces all four samples with the
    /// top-left texel; a zero-area cell (coordinate landing exactly on an
    /// integer) returns the floor corner directly.
    fn sample_bilinear(&self, px: f64, py: f64) -> [u8; 3] {
        let x0 = px.floor();
        let x1 = px.ceil();
        let y0 = py.floor();
        let y1 = py.ceil();

        let corners = (|| {
            Some([
                self.pixel(x0 as i64, y0 as i64)?,
                self.pixel(x1 as i64, y0 as i64)?,
                self.pixel(x0 as i64, y1 as i64)?,
                self.pixel(x1 as i64, y1 as i64)?,
            ])
        })();
        let [p00, p10, p01, p11] = corners.unwrap_or([self.pixels[0]; 4]);

        let area = (x1 - x0) * (y1 - y0);
        if area == 0.0 {
            return p00;
        }
        let wx1 = px - x0;
        let wx0 = x1 - px;
        let wy1 = py - y0;
        let wy0 = y1 - py;
        let mut out = [0u8; 3];
        for (c, slot) in out.iter_mut().enumerate() {
            let v = (wx0 * wy0 * f64::from(p00[c])
                + wx1 * wy0 * f64::from(p10[c])
                + wx0 * wy1 * f64::from(p01[c])
                + wx1 * wy1 * f64::from(p11[c]))
                / area;
            // truncate, not round
            *slot = v as u8;
        }
        out
    }
}

/// Sign with `sign(0) = 0`, so an exactly backward-facing or degenerate
/// projection lands on azimuth zero. `f64::signum` would return 1 there.
#[inline]
fn sign(v: f64) -> f64 {
    if v > 0.0 {
        1.0
    } else if v < 0.0 {
        -1.0
    } else {
        0.0
    }
}
