// SPDX-FileCopyrightText: 2026 Kitfn Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Error types for the kitfn workspace.

use thiserror::Error;

/// The error type returned by fallible kitfn plumbing.
///
/// Session operations themselves never fail with this type; they report
/// rejected input through `bool`/`Option` returns. `KitError` surfaces from
/// the API collaborator, client construction and configuration.
#[derive(Debug, Error)]
pub enum KitError {
    /// Configuration errors (invalid header values, bad client settings).
    #[error("configuration error: {0}")]
    Config(String),

    /// The request never produced an HTTP response (connect, timeout, TLS).
    #[error("transport error: {message}")]
    Transport {
        message: String,
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// The platform API answered with a non-success status.
    #[error("api returned {status}: {message}")]
    Api { status: u16, message: String },

    /// A response or stored blob could not be decoded.
    #[error("decode error: {message}")]
    Decode {
        message: String,
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// Internal or unexpected errors.
    #[error("internal error: {0}")]
    Internal(String),
}

impl KitError {
    /// Shorthand for a [`KitError::Decode`] wrapping a `serde_json` error.
    pub fn decode(message: impl Into<String>, source: serde_json::Error) -> Self {
        KitError::Decode {
            message: message.into(),
            source: Some(Box::new(source)),
        }
    }
}
