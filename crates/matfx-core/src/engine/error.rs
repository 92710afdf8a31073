use super::config::ConfigError;
use crate::core::physics::error::PhysicsError;
use thiserror::Error;

/// Fatal outcome of a material-effects call.
///
/// Every variant aborts the current propagation; the enclosing fit is expected to
/// discard the candidate it was extrapolating.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum EngineError {
    #[error("Physics validity violated: {source}")]
    Physics {
        #[from]
        source: PhysicsError,
    },

    #[error("Configuration error: {source}")]
    Config {
        #[from]
        source: ConfigError,
    },

    #[error("Boundary search gave up after {iterations} iterations at distance {distance} cm")]
    BoundarySearchExhausted { iterations: usize, distance: f64 },
}

impl EngineError {
    pub fn is_configuration(&self) -> bool {
        matches!(self, EngineError::Config { .. })
    }

    pub fn is_physics(&self) -> bool {
        matches!(self, EngineError::Physics { .. })
    }
}
