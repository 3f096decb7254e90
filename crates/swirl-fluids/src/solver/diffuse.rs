use ndarray::{s, Zip};

use crate::{
    boundary::{enforce, Boundary},
    buffer::DoubleField,
    field::Sample,
};

/// Implicit diffusion `(I - a·L) x = x0` with `a = dt · rate · width²`, relaxed by `iterations`
/// Jacobi sweeps starting from `x = x0`.
///
/// The source is the current buffer of `field`; the result is left current. A zero rate or
/// iteration count leaves the field untouched.
pub fn diffuse<T: Sample>(
    field: &mut DoubleField<T>,
    boundary: Boundary,
    rate: f32,
    dt: f32,
    iterations: usize,
) {
    let width = field.width() as f32;
    let a = dt * rate * width * width;
    if iterations == 0 || a <= 0.0 {
        return;
    }

    let source = field.read().clone();
    let c = (1.0 + 4.0 * a).recip();

    for _ in 0..iterations {
        let (prev, next) = field.split();
        let x = prev.data();

        Zip::from(next.interior_mut())
            .and(source.interior())
            .and(x.slice(s![..-2, 1..-1]))
            .and(x.slice(s![2.., 1..-1]))
            .and(x.slice(s![1..-1, ..-2]))
            .and(x.slice(s![1..-1, 2..]))
            .par_for_each(|out, &x0, &l, &r, &b, &t| {
                *out = (x0 + (l + r + b + t) * a) * c;
            });

        enforce(next, boundary);
        field.swap();
    }
}
