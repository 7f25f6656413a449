//! Common error types for Kaktus

use thiserror::Error;

/// Common result type for Kaktus operations
pub type Result<T> = std::result::Result<T, Error>;

/// Common error types across Kaktus services
#[derive(Error, Debug)]
pub enum Error {
    /// Configuration loading or validation error
    #[error("Configuration error: {0}")]
    Config(String),
}
