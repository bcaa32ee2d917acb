//! Error types for the library console client.
//!
//! These cover the plumbing around a call (building the request, reaching
//! the server, loading configuration, persisting the remembered email).
//! Callers of the API operations never see them directly: `ApiClient` folds
//! every failure into the `ApiResponse` envelope.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum ApiError {
    /// No response was obtained: connection refused, DNS failure, reset.
    #[error("transport failed: {0}")]
    Transport(String),

    /// A request payload or stored document could not be (de)serialized.
    #[error("serialization failed: {0}")]
    Serialization(String),

    #[error("configuration error: {0}")]
    Config(#[from] config::ConfigError),

    #[error("storage error: {0}")]
    Storage(#[from] std::io::Error),
}
