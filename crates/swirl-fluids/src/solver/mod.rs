//! Grid passes making up one simulation step.

pub mod advect;
pub mod diffuse;
pub mod project;
pub mod vorticity;

pub use advect::{advect, advect_velocity};
pub use diffuse::diffuse;
pub use project::{compute_divergence, project, solve_pressure, subtract_gradient, warm_start};
pub use vorticity::{compute_curl, confine};
