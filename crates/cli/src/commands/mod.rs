//! Command implementations.

pub mod catalog;
pub mod migrate;

use nalan_storefront::backend::BackendError;
use nalan_storefront::config::ConfigError;
use thiserror::Error;

/// Errors surfaced by any command.
#[derive(Debug, Error)]
pub enum CommandError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Backend error: {0}")]
    Backend(#[from] BackendError),

    #[error("HTTP client error: {0}")]
    Http(#[from] reqwest::Error),
}
