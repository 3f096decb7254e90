use glam::Vec2;
use ndarray::Zip;

use crate::{
    boundary::{enforce, Boundary},
    buffer::DoubleField,
    field::{Field, Sample},
};

/// Semi-Lagrangian advection of `source` into `target` by the velocity `(u, v)`.
///
/// Velocity is measured in velocity-grid cells per unit time. Each target cell traces back along
/// the velocity at its own position, bilinearly samples `source` there and keeps `dissipation` of
/// the result. `target` and `source` must share a shape; the velocity grid may differ.
#[allow(clippy::too_many_arguments)]
pub fn advect<T: Sample>(
    target: &mut Field<T>,
    source: &Field<T>,
    u: &Field<f32>,
    v: &Field<f32>,
    dt: f32,
    dissipation: f32,
    boundary: Boundary,
) {
    let size = target.size().as_vec2();
    let shared = target.size() == u.size();
    let scale = size / u.size().as_vec2();
    let inv_size = size.recip();
    let flush = dissipation < 1.0;

    Zip::indexed(target.interior_mut()).par_for_each(|(i, j), out| {
        let (i, j) = (i + 1, j + 1);
        let cell = Vec2::new(i as f32, j as f32);

        let velocity = if shared {
            Vec2::new(u[(i, j)], v[(i, j)])
        } else {
            let uv = (cell - 0.5) * inv_size;
            Vec2::new(u.sample_uv(uv), v.sample_uv(uv))
        };

        let p = cell - dt * velocity * scale;
        let value = source.sample(p.x, p.y) * dissipation;
        *out = if flush { value.flush_subnormal() } else { value };
    });

    enforce(target, boundary);
}

/// Advects both velocity components by the velocity as it was before this pass.
pub fn advect_velocity(
    u: &mut DoubleField<f32>,
    v: &mut DoubleField<f32>,
    dt: f32,
    dissipation: f32,
) {
    let (u0, u1) = u.split();
    let (v0, v1) = v.split();

    advect(u1, u0, u0, v0, dt, dissipation, Boundary::VelocityX);
    advect(v1, v0, u0, v0, dt, dissipation, Boundary::VelocityY);

    u.swap();
    v.swap();
}

#[cfg(test)]
mod tests {
    use glam::Vec3;

    use super::*;

    fn pattern(nx: usize, ny: usize) -> Field<Vec3> {
        let mut field = Field::new(nx, ny).unwrap();
        for i in 1..=nx {
            for j in 1..=ny {
                field[(i, j)] = Vec3::new(i as f32, j as f32, (i * j) as f32 * 0.1);
            }
        }
        enforce(&mut field, Boundary::Scalar);
        field
    }

    #[test]
    fn zero_velocity_is_identity() {
        let source = pattern(12, 9);
        let u = Field::new(6, 5).unwrap();
        let v = Field::new(6, 5).unwrap();
        let mut target = Field::new(12, 9).unwrap();

        advect(&mut target, &source, &u, &v, 0.1, 1.0, Boundary::Scalar);

        assert_eq!(target, source);
    }

    #[test]
    fn uniform_flow_shifts_content() {
        let (nx, ny) = (16, 8);
        let mut source = Field::<f32>::new(nx, ny).unwrap();
        source[(6, 4)] = 1.0;
        enforce(&mut source, Boundary::Scalar);

        let mut u = Field::new(nx, ny).unwrap();
        u.fill(2.0);
        let v = Field::new(nx, ny).unwrap();

        let mut target = Field::new(nx, ny).unwrap();
        advect(&mut target, &source, &u, &v, 1.0, 1.0, Boundary::Scalar);

        assert_eq!(target[(8, 4)], 1.0);
        assert_eq!(target[(6, 4)], 0.0);
    }

    #[test]
    fn scales_back_trace_to_the_target_grid() {
        // Velocity is in coarse cells, so the fine grid moves twice as many cells.
        let mut source = Field::<f32>::new(16, 4).unwrap();
        source[(5, 2)] = 1.0;

        let mut u = Field::new(8, 2).unwrap();
        u.fill(1.0);
        let v = Field::new(8, 2).unwrap();

        let mut target = Field::new(16, 4).unwrap();
        advect(&mut target, &source, &u, &v, 1.0, 1.0, Boundary::Scalar);

        assert_eq!(target[(7, 2)], 1.0);
    }

    #[test]
    fn applies_dissipation() {
        let source = pattern(5, 5);
        let u = Field::new(5, 5).unwrap();
        let v = Field::new(5, 5).unwrap();
        let mut target = Field::new(5, 5).unwrap();

        advect(&mut target, &source, &u, &v, 0.1, 0.5, Boundary::Scalar);

        assert_eq!(target[(3, 2)], source[(3, 2)] * 0.5);
    }

    #[test]
    fn velocity_uses_pre_advection_snapshot() {
        let mut u = DoubleField::<f32>::new(8, 8).unwrap();
        let mut v = DoubleField::<f32>::new(8, 8).unwrap();
        u.fill(1.0);
        enforce(u.read_mut(), Boundary::VelocityX);
        enforce(v.read_mut(), Boundary::VelocityY);

        advect_velocity(&mut u, &mut v, 0.5, 1.0);

        // A uniform flow advected by itself stays uniform away from the walls.
        assert_eq!(u.read()[(4, 4)], 1.0);
        assert_eq!(v.read()[(4, 4)], 0.0);
    }
}
