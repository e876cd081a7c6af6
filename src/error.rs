use thiserror::Error;

/// A configuration value that cannot drive a simulation.
#[derive(Debug, Error, PartialEq)]
pub enum ConfigError {
    #[error("world bounds must be positive and finite (got {width} x {height})")]
    InvalidBounds { width: f32, height: f32 },
    #[error("num_patches must be non-zero")]
    ZeroPatches,
    #[error("patch sides must satisfy 3 <= min <= max (got {min}..{max})")]
    InvalidPatchSides { min: usize, max: usize },
    #[error("creature vertices must satisfy 1 <= min <= max (got {min}..{max})")]
    InvalidVertices { min: u32, max: u32 },
    #[error("{field} must be a probability in [0, 1] (got {value})")]
    InvalidProbability { field: &'static str, value: f32 },
    #[error("{field} range is inverted ({min} > {max})")]
    InvertedRange {
        field: &'static str,
        min: f32,
        max: f32,
    },
    #[error("{field} must be non-negative and finite (got {value})")]
    NegativeValue { field: &'static str, value: f32 },
    #[error("creature vertex ceiling {requested} exceeds the limit of {limit}")]
    TooManyVertices { requested: f32, limit: u32 },
    #[error("max_population must be non-zero")]
    ZeroPopulationCap,
    #[error("species roster sizes must be non-zero under the species roster policy")]
    EmptyRoster,
}

/// Errors surfaced when building or loading a simulation.
#[derive(Debug, Error)]
pub enum SimError {
    #[error("invalid configuration: {0}")]
    Config(#[from] ConfigError),
    #[error("failed to read configuration: {0}")]
    Io(#[from] std::io::Error),
    #[error("failed to parse configuration: {0}")]
    Parse(#[from] serde_json::Error),
    #[error("terrain generation produced no usable patches")]
    EmptyTerrain,
}
