//! Error types for shortsim
//!
//! The physics core itself never fails; these cover configuration and the
//! caller-level retry loop.

use thiserror::Error;

use crate::scenario::ScenarioKind;

/// Result type alias for shortsim operations
pub type Result<T> = std::result::Result<T, SimError>;

/// Main error type
#[derive(Error, Debug)]
pub enum SimError {
    /// Settings failed validation
    #[error("invalid settings: {0}")]
    InvalidSettings(String),

    /// Scenario name did not match any known animation type
    #[error("unknown scenario: {0}")]
    UnknownScenario(String),

    /// Every attempt produced an unusable animation
    #[error("{kind} produced no usable run after {attempts} attempts")]
    Exhausted { kind: ScenarioKind, attempts: u32 },

    /// Generic IO error
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    /// Serialization/deserialization error
    #[error("serialization error: {0}")]
    Json(#[from] serde_json::Error),
}
