//! Canonical error and result types for the crate.
//!
//! State-machine callbacks never fail: malformed or incomplete input and
//! stale lifecycle updates are handled in-band. Errors surface only at the
//! edges, when configuring an adaptor or talking to a running connection
//! actor.

use thiserror::Error;

use crate::config::ConfigError;

/// Top-level error type exposed by `linkwire`.
#[derive(Debug, Error)]
pub enum AdaptorError {
    /// The connection actor has stopped and no longer accepts events.
    #[error("connection actor has stopped")]
    ConnectionClosed,
    /// The connection actor stopped before answering a request.
    #[error("connection actor dropped the reply")]
    ReplyDropped,
    /// The adaptor configuration failed validation.
    #[error("invalid configuration: {0}")]
    Config(#[from] ConfigError),
}

/// Canonical result alias used by `linkwire` public APIs.
pub type Result<T> = std::result::Result<T, AdaptorError>;
