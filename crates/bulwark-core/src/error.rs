//! Error types.
//!
//! None of these are fatal to a running simulation: asset errors are
//! recovered by the spawn system, config errors stop an engine from being
//! built in the first place.

use thiserror::Error;

use crate::types::ModelId;

/// Failure of a single asset acquisition.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum AssetError {
    /// The source has no model under this identifier.
    #[error("Model not found: {0}")]
    NotFound(ModelId),

    /// The load started but could not complete.
    #[error("Failed to load model '{model}': {reason}")]
    Failed {
        /// Model that failed.
        model: ModelId,
        /// Source-provided reason.
        reason: String,
    },
}

impl AssetError {
    pub fn model(&self) -> &ModelId {
        match self {
            AssetError::NotFound(model) | AssetError::Failed { model, .. } => model,
        }
    }
}

/// Configuration loading and validation errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// The config file could not be read.
    #[error("Failed to read config: {0}")]
    Io(#[from] std::io::Error),

    /// The config file is not valid JSON for [`crate::config::CombatConfig`].
    #[error("Failed to parse config: {0}")]
    Parse(#[from] serde_json::Error),

    /// Values parsed but violate an invariant.
    #[error("Invalid config: {0}")]
    Invalid(String),
}
