use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq)]
pub enum ConfigError {
    #[error("{name} must be greater than zero")]
    Zero { name: &'static str },
    #[error("{name} must be finite and non-negative, got {value}")]
    Negative { name: &'static str, value: f32 },
    #[error("{name} must lie in [{min}, {max}], got {value}")]
    OutOfRange {
        name: &'static str,
        value: f32,
        min: f32,
        max: f32,
    },
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum GridError {
    #[error("field size must be non-zero, got {width}x{height}")]
    ZeroSize { width: usize, height: usize },
    #[error("field size {width}x{height} overflows the address space")]
    Overflow { width: usize, height: usize },
    #[error("failed to allocate {cells} cells")]
    Allocation { cells: usize },
}

#[derive(Debug, Error, Clone, PartialEq)]
pub enum SimulationError {
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error(transparent)]
    Grid(#[from] GridError),
    #[error("viewport must be non-zero, got {width}x{height}")]
    ZeroViewport { width: u32, height: u32 },
}
