// Copyright (C) 2025 SyncMyOrders Sp. z o.o.
// SPDX-License-Identifier: AGPL-3.0-or-later
//! Error types for maya-orchprovider.

use thiserror::Error;

/// Errors returned while compiling claims or projecting job state.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[non_exhaustive]
pub enum Error {
    /// A required input value was not provided at all.
    #[error("nil {0} provided")]
    NilInput(&'static str),

    /// A required field or label is absent or empty.
    #[error("missing {0}")]
    MissingField(&'static str),

    /// The claim's volume type names no registered engine.
    #[error("unsupported volume engine: {0}")]
    UnsupportedEngine(String),

    /// Configuration loading failed.
    #[error("configuration error: {0}")]
    Config(#[from] crate::config::ConfigError),

    /// Serialization/deserialization error.
    #[error("serialization error: {0}")]
    Serialization(String),
}

impl From<serde_json::Error> for Error {
    fn from(err: serde_json::Error) -> Self {
        Error::Serialization(err.to_string())
    }
}

impl Error {
    /// Name of the missing field, if this is a `MissingField` error.
    pub fn missing_field(&self) -> Option<&'static str> {
        match self {
            Error::MissingField(field) => Some(*field),
            _ => None,
        }
    }
}

/// Result type using the crate Error.
pub type Result<T> = std::result::Result<T, Error>;
