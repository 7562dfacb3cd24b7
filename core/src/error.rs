//! Error types for the Brickset API client.
//!
//! # Design
//! The upstream service fails in two ways that callers care about: the HTTP
//! exchange itself reports a non-2xx status (`Http`), or the exchange succeeds
//! but the JSON envelope is tagged `error` (`Api`). Neither is retried. The
//! remaining variants cover local failures around the exchange.

use thiserror::Error;

/// Errors returned by `BricksetClient` operations.
#[derive(Debug, Error)]
pub enum ApiError {
    /// The server answered with a non-2xx HTTP status. The body is not read.
    #[error("Response status: {status}")]
    Http { status: u16 },

    /// The envelope's status tag was `error`. Displays the upstream message
    /// verbatim.
    #[error("{message}")]
    Api { message: String },

    /// The request could not be sent or the response body could not be read.
    #[error("transport failed: {0}")]
    Transport(String),

    /// The response body was not a valid envelope, or an expected payload
    /// field was missing or mistyped.
    #[error("deserialization failed: {0}")]
    Deserialization(String),

    /// The `params` object could not be serialized to JSON.
    #[error("serialization failed: {0}")]
    Serialization(String),

    /// Client configuration could not be loaded.
    #[error("invalid configuration: {0}")]
    Config(String),
}

pub type Result<T> = std::result::Result<T, ApiError>;
