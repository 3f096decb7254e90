use crate::field::{Field, Sample};

/// Halo rule applied by [`enforce`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Boundary {
    /// Zero gradient: every halo cell copies its interior neighbor.
    Scalar,
    /// Horizontal velocity: negated across the left/right walls, copied across the top/bottom.
    VelocityX,
    /// Vertical velocity: negated across the top/bottom walls, copied across the left/right.
    VelocityY,
}

/// Rewrites the halo of `field` from its interior according to `boundary`.
///
/// Corner cells become the average of their two orthogonal halo neighbors.
pub fn enforce<T: Sample>(field: &mut Field<T>, boundary: Boundary) {
    let nx = field.width();
    let ny = field.height();

    let reflect_x = boundary == Boundary::VelocityX;
    let reflect_y = boundary == Boundary::VelocityY;

    for j in 1..=ny {
        let left = field[(1, j)];
        let right = field[(nx, j)];
        field[(0, j)] = if reflect_x { -left } else { left };
        field[(nx + 1, j)] = if reflect_x { -right } else { right };
    }

    for i in 1..=nx {
        let bottom = field[(i, 1)];
        let top = field[(i, ny)];
        field[(i, 0)] = if reflect_y { -bottom } else { bottom };
        field[(i, ny + 1)] = if reflect_y { -top } else { top };
    }

    field[(0, 0)] = (field[(1, 0)] + field[(0, 1)]) * 0.5;
    field[(0, ny + 1)] = (field[(1, ny + 1)] + field[(0, ny)]) * 0.5;
    field[(nx + 1, 0)] = (field[(nx, 0)] + field[(nx + 1, 1)]) * 0.5;
    field[(nx + 1, ny + 1)] = (field[(nx, ny + 1)] + field[(nx + 1, ny)]) * 0.5;
}
