use glam::Vec2;
use ndarray::{s, Zip};

use crate::{
    boundary::{enforce, Boundary},
    buffer::DoubleField,
    field::Field,
};

/// Computes the scalar curl of `(u, v)` into `curl` with central differences.
pub fn compute_curl(curl: &mut Field<f32>, u: &Field<f32>, v: &Field<f32>) {
    let u = u.data();
    let v = v.data();

    Zip::from(curl.interior_mut())
        .and(v.slice(s![..-2, 1..-1]))
        .and(v.slice(s![2.., 1..-1]))
        .and(u.slice(s![1..-1, ..-2]))
        .and(u.slice(s![1..-1, 2..]))
        .par_for_each(|c, &vl, &vr, &ub, &ut| {
            *c = 0.5 * ((vr - vl) - (ut - ub));
        });

    enforce(curl, Boundary::Scalar);
}

/// Vorticity confinement: pushes velocity along the gradient of the curl magnitude, feeding energy
/// back into small vortices that numerical dissipation would otherwise smear out.
pub fn confine(
    u: &mut DoubleField<f32>,
    v: &mut DoubleField<f32>,
    curl: &Field<f32>,
    strength: f32,
    dt: f32,
) {
    if strength == 0.0 {
        return;
    }

    let (u0, u1) = u.split();
    let (v0, v1) = v.split();

    Zip::indexed(u1.interior_mut())
        .and(v1.interior_mut())
        .and(u0.interior())
        .and(v0.interior())
        .par_for_each(|(i, j), un, vn, &uc, &vc| {
            let (i, j) = (i + 1, j + 1);

            let left = curl[(i - 1, j)].abs();
            let right = curl[(i + 1, j)].abs();
            let bottom = curl[(i, j - 1)].abs();
            let top = curl[(i, j + 1)].abs();

            let mut force = 0.5 * Vec2::new(top - bottom, right - left);
            force /= force.length() + 1e-4;
            force *= strength * curl[(i, j)];
            force.y = -force.y;

            *un = uc + force.x * dt;
            *vn = vc + force.y * dt;
        });

    enforce(u1, Boundary::VelocityX);
    enforce(v1, Boundary::VelocityY);

    u.swap();
    v.swap();
}

#[cfg(test)]
mod tests {
    use super::*;

    const N: usize = 12;
    const CENTER: f32 = 6.5;

    fn rotation() -> (DoubleField<f32>, DoubleField<f32>) {
        let mut u = DoubleField::new(N, N).unwrap();
        let mut v = DoubleField::new(N, N).unwrap();
        for i in 1..=N {
            for j in 1..=N {
                u.read_mut()[(i, j)] = -(j as f32 - CENTER);
                v.read_mut()[(i, j)] = i as f32 - CENTER;
            }
        }
        enforce(u.read_mut(), Boundary::VelocityX);
        enforce(v.read_mut(), Boundary::VelocityY);
        (u, v)
    }

    #[test]
    fn rigid_rotation_has_uniform_curl() {
        let (u, v) = rotation();
        let mut curl = Field::new(N, N).unwrap();

        compute_curl(&mut curl, u.read(), v.read());

        for i in 2..N {
            for j in 2..N {
                assert_eq!(curl[(i, j)], 2.0, "cell ({i}, {j})");
            }
        }
    }

    #[test]
    fn uniform_curl_exerts_no_force() {
        let (mut u, mut v) = rotation();
        let before = (u.read().clone(), v.read().clone());

        let mut curl = Field::new(N, N).unwrap();
        curl.fill(2.0);

        confine(&mut u, &mut v, &curl, 30.0, 0.1);

        assert_eq!(u.read(), &before.0);
        assert_eq!(v.read(), &before.1);
    }

    #[test]
    fn zero_strength_is_a_no_op() {
        let (mut u, mut v) = rotation();
        let before = u.read().clone();

        let mut curl = Field::new(N, N).unwrap();
        curl[(6, 6)] = 5.0;
        confine(&mut u, &mut v, &curl, 0.0, 0.1);

        assert_eq!(u.read(), &before);
    }

    #[test]
    fn reinforces_counter_clockwise_vortex() {
        let mut u = DoubleField::<f32>::new(N, N).unwrap();
        let mut v = DoubleField::<f32>::new(N, N).unwrap();

        let mut curl = Field::new(N, N).unwrap();
        for i in 1..=N {
            for j in 1..=N {
                let d = (i as f32 - 6.0).powi(2) + (j as f32 - 6.0).powi(2);
                curl[(i, j)] = (-d / 8.0).exp();
            }
        }
        enforce(&mut curl, Boundary::Scalar);

        confine(&mut u, &mut v, &curl, 10.0, 0.1);

        // Positive curl turns counter-clockwise: up on the right, down on the left.
        assert!(v.read()[(8, 6)] > 0.0);
        assert!(v.read()[(4, 6)] < 0.0);
        assert!(u.read()[(6, 8)] < 0.0);
        assert!(u.read()[(6, 4)] > 0.0);
    }
}
