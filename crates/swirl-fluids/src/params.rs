use glam::UVec2;

use crate::error::ConfigError;

/// Tunable simulation parameters.
#[derive(Debug, Clone, PartialEq)]
pub struct FluidParams {
    /// Cells along the short axis of the velocity grid.
    pub sim_resolution: u32,
    /// Cells along the short axis of the dye grid.
    pub dye_resolution: u32,
    /// Velocity diffusion rate. Zero disables velocity diffusion.
    pub viscosity: f32,
    /// Dye diffusion rate. Zero disables dye diffusion.
    pub diffusion: f32,
    /// Relaxation sweeps per diffusion solve.
    pub diffusion_iterations: usize,
    /// Fraction of dye retained per step.
    pub density_dissipation: f32,
    /// Fraction of velocity retained per step.
    pub velocity_dissipation: f32,
    /// Fraction of the previous pressure kept as the next initial guess.
    pub pressure_retention: f32,
    /// Relaxation sweeps per pressure solve.
    pub pressure_iterations: usize,
    /// Vorticity confinement strength. Zero disables confinement.
    pub curl: f32,
    /// Splat radius in normalized units.
    pub splat_radius: f32,
    /// Multiplier turning pointer movement into splat velocity.
    pub splat_force: f32,
    /// Upper bound on the velocity magnitude of a single splat.
    pub max_splat_velocity: f32,
    /// Periodically recolor pointers without an explicit color.
    pub colorful: bool,
    /// Rate of the pointer recoloring timer.
    pub color_update_speed: f32,
    pub paused: bool,
    /// Largest timestep a single step will integrate.
    pub max_dt: f32,
    /// Capacity of the input queue; older events are dropped beyond it.
    pub event_capacity: usize,
    /// Most splats a single random burst may inject. Larger requests are clamped.
    pub max_random_splats: usize,
    /// Reset all fields when a step produces a non-finite value.
    pub reset_on_non_finite: bool,
    /// Seed for random splats and colors. `None` seeds from the OS.
    pub seed: Option<u64>,
}

impl Default for FluidParams {
    fn default() -> Self {
        Self {
            sim_resolution: 128,
            dye_resolution: 512,
            viscosity: 0.0,
            diffusion: 0.0,
            diffusion_iterations: 20,
            density_dissipation: 1.0,
            velocity_dissipation: 0.2,
            pressure_retention: 0.8,
            pressure_iterations: 20,
            curl: 30.0,
            splat_radius: 0.05,
            splat_force: 6000.0,
            max_splat_velocity: 10000.0,
            colorful: true,
            color_update_speed: 10.0,
            paused: false,
            max_dt: 1.0 / 60.0,
            event_capacity: 256,
            max_random_splats: 25,
            reset_on_non_finite: true,
            seed: None,
        }
    }
}

impl FluidParams {
    /// Checks every parameter against its valid range.
    pub fn validate(&self) -> Result<(), ConfigError> {
        nonzero("sim_resolution", self.sim_resolution as usize)?;
        nonzero("dye_resolution", self.dye_resolution as usize)?;
        nonzero("event_capacity", self.event_capacity)?;
        nonzero("max_random_splats", self.max_random_splats)?;

        non_negative("viscosity", self.viscosity)?;
        non_negative("diffusion", self.diffusion)?;
        non_negative("curl", self.curl)?;
        non_negative("splat_force", self.splat_force)?;
        non_negative("color_update_speed", self.color_update_speed)?;

        unit_interval("density_dissipation", self.density_dissipation)?;
        unit_interval("velocity_dissipation", self.velocity_dissipation)?;
        unit_interval("pressure_retention", self.pressure_retention)?;

        positive("splat_radius", self.splat_radius)?;
        positive("max_splat_velocity", self.max_splat_velocity)?;
        positive("max_dt", self.max_dt)?;

        Ok(())
    }
}

fn nonzero(name: &'static str, value: usize) -> Result<(), ConfigError> {
    if value == 0 {
        return Err(ConfigError::Zero { name });
    }
    Ok(())
}

fn non_negative(name: &'static str, value: f32) -> Result<(), ConfigError> {
    if !value.is_finite() || value < 0.0 {
        return Err(ConfigError::Negative { name, value });
    }
    Ok(())
}

fn positive(name: &'static str, value: f32) -> Result<(), ConfigError> {
    non_negative(name, value)?;
    if value == 0.0 {
        return Err(ConfigError::Zero { name });
    }
    Ok(())
}

fn unit_interval(name: &'static str, value: f32) -> Result<(), ConfigError> {
    if !(0.0..=1.0).contains(&value) {
        return Err(ConfigError::OutOfRange {
            name,
            value,
            min: 0.0,
            max: 1.0,
        });
    }
    Ok(())
}

/// Interior cell counts of a grid.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Resolution {
    pub width: usize,
    pub height: usize,
}

impl Resolution {
    #[inline]
    pub fn new(width: usize, height: usize) -> Self {
        Self { width, height }
    }

    /// Derives a grid shape matching the proportions of `viewport`, with `base` cells along the
    /// short axis. `viewport` must be non-zero.
    pub fn from_viewport(base: u32, viewport: UVec2) -> Self {
        let w = viewport.x as f32;
        let h = viewport.y as f32;
        let aspect = f32::max(w / h, h / w);

        let short = (base as f32).round() as usize;
        let long = (base as f32 * aspect).round() as usize;

        if viewport.x > viewport.y {
            Self::new(long, short)
        } else {
            Self::new(short, long)
        }
    }
}
