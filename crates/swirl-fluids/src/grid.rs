use glam::Vec3;

use crate::{
    boundary::{enforce, Boundary},
    buffer::DoubleField,
    error::GridError,
    field::Field,
    params::Resolution,
    splat::{splat, Splat},
};

/// Every field of the simulation.
#[derive(Debug, Clone)]
pub struct Grid {
    /// Velocities in the X direction.
    pub(crate) u: DoubleField<f32>,
    /// Velocities in the Y direction.
    pub(crate) v: DoubleField<f32>,
    /// RGB dye, possibly at a finer resolution than the velocity.
    pub(crate) dye: DoubleField<Vec3>,
    /// Pressure, carried between steps as the next initial guess.
    pub(crate) pressure: DoubleField<f32>,
    pub(crate) divergence: Field<f32>,
    pub(crate) curl: Field<f32>,
}

/// Velocity-resolution fields built by a resize before any is installed.
struct VelocityFields {
    u: DoubleField<f32>,
    v: DoubleField<f32>,
    pressure: DoubleField<f32>,
    divergence: Field<f32>,
    curl: Field<f32>,
}

impl Grid {
    pub fn new(sim: Resolution, dye: Resolution) -> Result<Self, GridError> {
        let (width, height) = (sim.width, sim.height);

        Ok(Self {
            u: DoubleField::new(width, height)?,
            v: DoubleField::new(width, height)?,
            dye: DoubleField::new(dye.width, dye.height)?,
            pressure: DoubleField::new(width, height)?,
            divergence: Field::new(width, height)?,
            curl: Field::new(width, height)?,
        })
    }

    pub fn sim_resolution(&self) -> Resolution {
        Resolution::new(self.u.width(), self.u.height())
    }

    pub fn dye_resolution(&self) -> Resolution {
        Resolution::new(self.dye.width(), self.dye.height())
    }

    /// The horizontal and vertical velocity components.
    pub fn velocity(&self) -> (&Field<f32>, &Field<f32>) {
        (self.u.read(), self.v.read())
    }

    /// Mutable velocity components. Call [`enforce_boundaries`](Self::enforce_boundaries) after
    /// writing interior cells.
    pub fn velocity_mut(&mut self) -> (&mut Field<f32>, &mut Field<f32>) {
        (self.u.read_mut(), self.v.read_mut())
    }

    pub fn dye(&self) -> &Field<Vec3> {
        self.dye.read()
    }

    /// Mutable dye. Call [`enforce_boundaries`](Self::enforce_boundaries) after writing interior
    /// cells.
    pub fn dye_mut(&mut self) -> &mut Field<Vec3> {
        self.dye.read_mut()
    }

    pub fn pressure(&self) -> &Field<f32> {
        self.pressure.read()
    }

    pub fn divergence(&self) -> &Field<f32> {
        &self.divergence
    }

    pub fn curl(&self) -> &Field<f32> {
        &self.curl
    }

    /// Recomputes the halo of every current field from its interior.
    pub fn enforce_boundaries(&mut self) {
        enforce(self.u.read_mut(), Boundary::VelocityX);
        enforce(self.v.read_mut(), Boundary::VelocityY);
        enforce(self.dye.read_mut(), Boundary::Scalar);
        enforce(self.pressure.read_mut(), Boundary::Scalar);
        enforce(&mut self.divergence, Boundary::Scalar);
        enforce(&mut self.curl, Boundary::Scalar);
    }

    /// Adds the splat's velocity and dye, with `radius` in normalized units and `aspect` the
    /// viewport width over its height.
    pub fn apply_splat(&mut self, s: &Splat, radius: f32, aspect: f32) {
        splat(
            self.u.read_mut(),
            s.position,
            s.velocity.x,
            radius,
            aspect,
            Boundary::VelocityX,
        );
        splat(
            self.v.read_mut(),
            s.position,
            s.velocity.y,
            radius,
            aspect,
            Boundary::VelocityY,
        );
        splat(
            self.dye.read_mut(),
            s.position,
            s.color,
            radius,
            aspect,
            Boundary::Scalar,
        );
    }

    /// Changes the grid shapes, resampling velocity and dye into the new shapes. Pressure,
    /// divergence and curl restart at zero.
    ///
    /// Every new buffer is allocated before any is installed, so on error the grid is unchanged.
    pub fn resize(&mut self, sim: Resolution, dye: Resolution) -> Result<(), GridError> {
        let velocity = if sim != self.sim_resolution() {
            Some(self.resampled_velocity(sim)?)
        } else {
            None
        };

        let dye = if dye != self.dye_resolution() {
            let mut field = self.dye.read().resampled(dye.width, dye.height)?;
            enforce(&mut field, Boundary::Scalar);
            Some(DoubleField::from_field(field)?)
        } else {
            None
        };

        if let Some(fields) = velocity {
            log::debug!(
                "resized velocity grid to {}x{}",
                fields.u.width(),
                fields.u.height(),
            );
            self.u = fields.u;
            self.v = fields.v;
            self.pressure = fields.pressure;
            self.divergence = fields.divergence;
            self.curl = fields.curl;
        }

        if let Some(dye) = dye {
            log::debug!("resized dye grid to {}x{}", dye.width(), dye.height());
            self.dye = dye;
        }

        Ok(())
    }

    fn resampled_velocity(&self, sim: Resolution) -> Result<VelocityFields, GridError> {
        let (width, height) = (sim.width, sim.height);

        let mut u = self.u.read().resampled(width, height)?;
        let mut v = self.v.read().resampled(width, height)?;
        enforce(&mut u, Boundary::VelocityX);
        enforce(&mut v, Boundary::VelocityY);

        Ok(VelocityFields {
            u: DoubleField::from_field(u)?,
            v: DoubleField::from_field(v)?,
            pressure: DoubleField::new(width, height)?,
            divergence: Field::new(width, height)?,
            curl: Field::new(width, height)?,
        })
    }

    /// Zeroes every field.
    pub fn reset(&mut self) {
        self.u.fill(0.0);
        self.v.fill(0.0);
        self.dye.fill(Vec3::ZERO);
        self.pressure.fill(0.0);
        self.divergence.fill(0.0);
        self.curl.fill(0.0);
    }

    /// Whether every current field holds only finite values.
    pub fn is_finite(&self) -> bool {
        self.u.read().is_finite()
            && self.v.read().is_finite()
            && self.dye.read().is_finite()
            && self.pressure.read().is_finite()
            && self.divergence.is_finite()
            && self.curl.is_finite()
    }
}
