//! Top-level error type aggregating the per-concern errors.

use thiserror::Error;

use crate::api::ApiError;
use crate::config::ConfigError;
use crate::persist::StorageError;
use crate::services::auth::AuthError;
use crate::services::loyalty::LoyaltyError;
use crate::services::orders::OrderError;

/// Any error the engine can surface to an embedding shell.
#[derive(Debug, Error)]
pub enum AppError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("API error: {0}")]
    Api(#[from] ApiError),

    #[error("Authentication error: {0}")]
    Auth(#[from] AuthError),

    #[error("Order error: {0}")]
    Order(#[from] OrderError),

    #[error("Loyalty error: {0}")]
    Loyalty(#[from] LoyaltyError),

    #[error("Storage error: {0}")]
    Storage(#[from] StorageError),
}

/// Convenience alias for engine results.
pub type Result<T> = std::result::Result<T, AppError>;
