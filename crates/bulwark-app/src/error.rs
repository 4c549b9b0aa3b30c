//! Runner errors.

use thiserror::Error;

use bulwark_core::error::ConfigError;

#[derive(Debug, Error)]
pub enum AppError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error("Failed to spawn game loop thread: {0}")]
    Thread(#[from] std::io::Error),

    #[error("Game loop thread panicked")]
    LoopPanicked,

    #[error("Failed to encode summary: {0}")]
    Encode(#[from] serde_json::Error),
}
