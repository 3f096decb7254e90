//! A real-time 2D fluid solver: stable-fluids style advection, vorticity confinement and pressure
//! projection on halo-padded grids, driven by pointer input and random splats.

pub mod boundary;
pub mod buffer;
pub mod error;
pub mod field;
pub mod grid;
pub mod input;
pub mod params;
pub mod simulation;
pub mod solver;
pub mod splat;

pub use boundary::Boundary;
pub use error::{ConfigError, GridError, SimulationError};
pub use field::Field;
pub use grid::Grid;
pub use input::{InputEvent, PointerEvent, PointerKind};
pub use params::{FluidParams, Resolution};
pub use simulation::Simulation;
pub use splat::Splat;
