use ndarray::{s, Zip};

use crate::{
    boundary::{enforce, Boundary},
    buffer::DoubleField,
    field::Field,
};

/// Central-difference divergence of `(u, v)`, reading the enforced velocity halo.
pub fn compute_divergence(divergence: &mut Field<f32>, u: &Field<f32>, v: &Field<f32>) {
    let u = u.data();
    let v = v.data();

    Zip::from(divergence.interior_mut())
        .and(u.slice(s![..-2, 1..-1]))
        .and(u.slice(s![2.., 1..-1]))
        .and(v.slice(s![1..-1, ..-2]))
        .and(v.slice(s![1..-1, 2..]))
        .par_for_each(|d, &ul, &ur, &vb, &vt| {
            *d = 0.5 * (ur - ul + vt - vb);
        });

    enforce(divergence, Boundary::Scalar);
}

/// Scales the previous frame's pressure, which then seeds the next solve.
pub fn warm_start(pressure: &mut DoubleField<f32>, retention: f32) {
    pressure.read_mut().scale(retention);
}

/// Relaxes the pressure Poisson equation with `iterations` Jacobi sweeps.
pub fn solve_pressure(pressure: &mut DoubleField<f32>, divergence: &Field<f32>, iterations: usize) {
    for _ in 0..iterations {
        let (prev, next) = pressure.split();
        let p = prev.data();

        Zip::from(next.interior_mut())
            .and(divergence.interior())
            .and(p.slice(s![..-2, 1..-1]))
            .and(p.slice(s![2.., 1..-1]))
            .and(p.slice(s![1..-1, ..-2]))
            .and(p.slice(s![1..-1, 2..]))
            .par_for_each(|out, &div, &l, &r, &b, &t| {
                *out = (l + r + b + t - div) * 0.25;
            });

        enforce(next, Boundary::Scalar);
        pressure.swap();
    }
}

/// Subtracts the pressure gradient from the velocity in place.
pub fn subtract_gradient(u: &mut Field<f32>, v: &mut Field<f32>, pressure: &Field<f32>) {
    let p = pressure.data();

    Zip::from(u.interior_mut())
        .and(v.interior_mut())
        .and(p.slice(s![..-2, 1..-1]))
        .and(p.slice(s![2.., 1..-1]))
        .and(p.slice(s![1..-1, ..-2]))
        .and(p.slice(s![1..-1, 2..]))
        .par_for_each(|u, v, &l, &r, &b, &t| {
            *u -= 0.5 * (r - l);
            *v -= 0.5 * (t - b);
        });

    enforce(u, Boundary::VelocityX);
    enforce(v, Boundary::VelocityY);
}

/// Makes the velocity approximately divergence free.
///
/// The current pressure buffer is used as the initial guess, so callers that want a cold start
/// clear it (or [`warm_start`] it with a retention of zero) first.
pub fn project(
    u: &mut DoubleField<f32>,
    v: &mut DoubleField<f32>,
    pressure: &mut DoubleField<f32>,
    divergence: &mut Field<f32>,
    iterations: usize,
) {
    compute_divergence(divergence, u.read(), v.read());
    solve_pressure(pressure, divergence, iterations);
    subtract_gradient(u.read_mut(), v.read_mut(), pressure.read());
}

#[cfg(test)]
mod tests {
    use super::*;

    const N: usize = 32;

    /// A smooth radial outflow centered in the grid.
    fn source_flow() -> (DoubleField<f32>, DoubleField<f32>) {
        let mut u = DoubleField::new(N, N).unwrap();
        let mut v = DoubleField::new(N, N).unwrap();
        let c = (N as f32 + 1.0) * 0.5;
        for i in 1..=N {
            for j in 1..=N {
                let (dx, dy) = (i as f32 - c, j as f32 - c);
                let g = (-(dx * dx + dy * dy) / 20.0).exp();
                u.read_mut()[(i, j)] = dx * g;
                v.read_mut()[(i, j)] = dy * g;
            }
        }
        enforce(u.read_mut(), Boundary::VelocityX);
        enforce(v.read_mut(), Boundary::VelocityY);
        (u, v)
    }

    fn max_divergence(u: &DoubleField<f32>, v: &DoubleField<f32>) -> f32 {
        let mut divergence = Field::new(N, N).unwrap();
        compute_divergence(&mut divergence, u.read(), v.read());
        divergence.max_abs()
    }

    fn projected(iterations: usize) -> f32 {
        let (mut u, mut v) = source_flow();
        let mut pressure = DoubleField::new(N, N).unwrap();
        let mut divergence = Field::new(N, N).unwrap();

        project(&mut u, &mut v, &mut pressure, &mut divergence, iterations);
        max_divergence(&u, &v)
    }

    #[test]
    fn reduces_divergence() {
        let (u, v) = source_flow();
        let before = max_divergence(&u, &v);
        assert!(before > 1.0);

        let coarse = projected(10);
        let fine = projected(100);

        assert!(coarse < before, "{coarse} >= {before}");
        assert!(fine < coarse, "{fine} >= {coarse}");
    }

    #[test]
    fn divergence_reads_reflected_walls() {
        let mut u = Field::<f32>::new(4, 4).unwrap();
        let v = Field::<f32>::new(4, 4).unwrap();
        for j in 1..=4 {
            u[(1, j)] = 1.0;
        }
        enforce(&mut u, Boundary::VelocityX);

        let mut divergence = Field::new(4, 4).unwrap();
        compute_divergence(&mut divergence, &u, &v);

        // The left halo mirrors the wall column as -1.
        assert_eq!(divergence[(1, 2)], 0.5);
        assert_eq!(divergence[(2, 2)], -0.5);
    }

    #[test]
    fn divergence_free_flow_is_untouched() {
        let mut u = DoubleField::<f32>::new(8, 8).unwrap();
        let mut v = DoubleField::<f32>::new(8, 8).unwrap();
        let mut pressure = DoubleField::new(8, 8).unwrap();
        let mut divergence = Field::new(8, 8).unwrap();

        project(&mut u, &mut v, &mut pressure, &mut divergence, 20);

        assert_eq!(u.read().max_abs(), 0.0);
        assert_eq!(pressure.read().max_abs(), 0.0);
    }

    #[test]
    fn warm_start_scales_pressure() {
        let mut pressure = DoubleField::<f32>::new(3, 3).unwrap();
        pressure.read_mut().fill(2.0);

        warm_start(&mut pressure, 0.8);

        assert_eq!(pressure.read()[(2, 2)], 1.6);
    }
}
