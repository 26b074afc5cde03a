//! Error types for remote world operations.

use std::time::Duration;

use thiserror::Error;

/// Transport failures raised by the remote store.
///
/// These propagate unchanged through the cache to whichever operation
/// triggered the remote call — there is no retry at this layer.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RemoteError {
    /// The remote server could not be reached.
    #[error("remote unreachable: {0}")]
    Unreachable(String),

    /// A request did not complete in time.
    #[error("request timed out after {0:?}")]
    Timeout(Duration),

    /// The remote answered with something the protocol does not allow.
    #[error("protocol error: {0}")]
    Protocol(String),
}

/// Result type for remote world operations.
pub type Result<T> = std::result::Result<T, RemoteError>;
