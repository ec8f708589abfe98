/// Rejected [`SimulationConfig`](crate::types::SimulationConfig) field.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ConfigError {
    #[error("{name} must be a positive integer")]
    NonPositive { name: &'static str },
    #[error("{name} = {value} lies outside [0, 1]")]
    OutOfUnitRange { name: &'static str, value: f32 },
    #[error("{name} = {value} must be non-negative")]
    Negative { name: &'static str, value: f32 },
}

/// Error type for mounting the fluid simulator on a host surface.
///
/// Every variant is non-fatal for the host: it logs the error and keeps
/// running without the effect.
#[derive(Debug, thiserror::Error)]
pub enum MountError {
    #[error("graphics context unavailable")]
    GraphicsUnavailable,
    #[error("max texture side {available}px is below the required {required}px")]
    TextureTooSmall { required: usize, available: usize },
    #[error("invalid simulation config: {0}")]
    Config(#[from] ConfigError),
}
