//! Unified error type for the client crate.
//!
//! Each module defines its own error enum; `ClientError` gathers them for
//! callers (like the CLI) that drive several modules in one flow.

use thiserror::Error;

use crate::api::ApiError;
use crate::config::ConfigError;
use crate::session::SessionError;
use crate::store::StoreError;

/// Top-level error for operations that cross module boundaries.
#[derive(Debug, Error)]
pub enum ClientError {
    /// Configuration loading failed.
    #[error("config error: {0}")]
    Config(#[from] ConfigError),

    /// A collaborator call failed.
    #[error("api error: {0}")]
    Api(#[from] ApiError),

    /// A session authority operation failed.
    #[error("session error: {0}")]
    Session(#[from] SessionError),

    /// Cart persistence failed.
    #[error("store error: {0}")]
    Store(#[from] StoreError),
}

/// Result type alias for `ClientError`.
pub type Result<T> = std::result::Result<T, ClientError>;
