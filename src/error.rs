use thiserror::Error;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("lattice needs at least one pin row (got {0})")]
    NoPins(usize),

    #[error("lattice half-width {pins} is above the maximum of {max}")]
    TooManyPins { pins: usize, max: usize },

    #[error("lattice half-width must be odd so the top pin sits over the launch column (got {0})")]
    EvenPins(usize),

    #[error("key frame steps must be at least 1")]
    NoKeyFrames,

    #[error("{name} must be positive (got {value})")]
    NonPositive { name: &'static str, value: f32 },

    #[error("bias must be within 1..=10 (got {0})")]
    BiasOutOfRange(u8),

    #[error("speed must be within 1..=10 (got {0})")]
    SpeedOutOfRange(u8),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("config parse error: {0}")]
    Json(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, ConfigError>;
