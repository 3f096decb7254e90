use glam::{Vec2, Vec3};
use rayon::prelude::*;
use swirl_fluids::Field;

use crate::ViewError;

/// How dye is turned into pixels.
#[derive(Debug, Clone, PartialEq)]
pub struct RenderOptions {
    /// Light the dye as a height field using its gradient.
    pub shading: bool,
    /// Color shown where there is no dye.
    pub background: Vec3,
}

impl Default for RenderOptions {
    fn default() -> Self {
        Self {
            shading: true,
            background: Vec3::ZERO,
        }
    }
}

/// Draws `dye` into a `0RGB` pixel buffer of `width × height`, row 0 at the top.
pub fn render(
    dye: &Field<Vec3>,
    buffer: &mut [u32],
    width: usize,
    height: usize,
    options: &RenderOptions,
) -> Result<(), ViewError> {
    let expected = width * height;
    if buffer.len() != expected {
        return Err(ViewError::BufferSize {
            expected,
            actual: buffer.len(),
        });
    }
    if expected == 0 {
        return Ok(());
    }

    let inv_size = Vec2::new(width as f32, height as f32).recip();
    let texel = dye.size().as_vec2().recip();

    buffer
        .par_chunks_mut(width)
        .enumerate()
        .for_each(|(row, pixels)| {
            let y = 1.0 - (row as f32 + 0.5) * inv_size.y;
            for (col, pixel) in pixels.iter_mut().enumerate() {
                let uv = Vec2::new((col as f32 + 0.5) * inv_size.x, y);

                let mut c = dye.sample_uv(uv);
                if options.shading {
                    c *= shade(dye, uv, texel);
                }

                let a = c.max_element().clamp(0.0, 1.0);
                *pixel = pack(c + options.background * (1.0 - a));
            }
        });

    Ok(())
}

/// Diffuse lighting of the dye surface seen from straight above.
fn shade(dye: &Field<Vec3>, uv: Vec2, texel: Vec2) -> f32 {
    let left = dye.sample_uv(uv - Vec2::new(texel.x, 0.0)).length();
    let right = dye.sample_uv(uv + Vec2::new(texel.x, 0.0)).length();
    let bottom = dye.sample_uv(uv - Vec2::new(0.0, texel.y)).length();
    let top = dye.sample_uv(uv + Vec2::new(0.0, texel.y)).length();

    let normal = Vec3::new(right - left, top - bottom, texel.length()).normalize_or_zero();
    (normal.z + 0.7).clamp(0.7, 1.0)
}

/// Packs a linear color into `0RGB`, clamping each channel.
#[inline]
pub fn pack(color: Vec3) -> u32 {
    let c = (color.clamp(Vec3::ZERO, Vec3::ONE) * 255.0).round();
    ((c.x as u32) << 16) | ((c.y as u32) << 8) | c.z as u32
}
