use glam::{Vec2, Vec3};
use ndarray::Zip;
use rand::Rng;

use crate::{
    boundary::{enforce, Boundary},
    field::{Field, Sample},
};

/// A localized injection of velocity and dye.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Splat {
    /// Center, in normalized coordinates.
    pub position: Vec2,
    /// Velocity added at the center, in velocity-grid cells per unit time.
    pub velocity: Vec2,
    /// Dye added at the center.
    pub color: Vec3,
}

impl Splat {
    #[inline]
    pub fn new(position: Vec2, velocity: Vec2, color: Vec3) -> Self {
        Self {
            position,
            velocity,
            color,
        }
    }

    /// A splat at a uniformly random position with a random color and velocity.
    pub fn random<R: Rng>(rng: &mut R) -> Self {
        let color = random_color(rng);
        let position = Vec2::new(rng.random(), rng.random());
        let velocity = 1000.0 * (Vec2::new(rng.random(), rng.random()) - 0.5);

        Self {
            position,
            velocity,
            color,
        }
    }

    #[inline]
    pub fn is_finite(&self) -> bool {
        self.position.is_finite() && self.velocity.is_finite() && self.color.is_finite()
    }
}

/// Gaussian weight of the splat centered at `center` at normalized position `uv`.
///
/// `aspect` is the viewport width over its height; distances are measured in viewport
/// proportions so splats stay circular on screen.
#[inline]
pub fn falloff(uv: Vec2, center: Vec2, radius: f32, aspect: f32) -> f32 {
    let mut p = uv - center;
    p.x *= aspect;
    let r2 = radius * radius * aspect.max(1.0);

    (-p.length_squared() / r2).exp()
}

/// Adds `value` weighted by [`falloff`] to every interior cell of `field`.
pub fn splat<T: Sample>(
    field: &mut Field<T>,
    center: Vec2,
    value: T,
    radius: f32,
    aspect: f32,
    boundary: Boundary,
) {
    let inv_size = field.size().as_vec2().recip();

    Zip::indexed(field.interior_mut()).par_for_each(|(i, j), x| {
        let uv = (Vec2::new(i as f32, j as f32) + 0.5) * inv_size;
        *x = *x + value * falloff(uv, center, radius, aspect);
    });

    enforce(field, boundary);
}

/// A random fully saturated hue, dimmed to keep accumulated dye in range.
pub fn random_color<R: Rng>(rng: &mut R) -> Vec3 {
    hsv_to_rgb(rng.random(), 1.0, 1.0) * 0.15
}

/// Converts a hue, saturation and value in `[0, 1]` to RGB.
pub fn hsv_to_rgb(h: f32, s: f32, v: f32) -> Vec3 {
    let h = h.rem_euclid(1.0) * 6.0;
    let sector = h.floor();
    let f = h - sector;

    let p = v * (1.0 - s);
    let q = v * (1.0 - f * s);
    let t = v * (1.0 - (1.0 - f) * s);

    match sector as u32 {
        0 => Vec3::new(v, t, p),
        1 => Vec3::new(q, v, p),
        2 => Vec3::new(p, v, t),
        3 => Vec3::new(p, q, v),
        4 => Vec3::new(t, p, v),
        _ => Vec3::new(v, p, q),
    }
}
