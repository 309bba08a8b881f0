// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.
//
// Copyright (c) 2025 Pegasus Heavy Industries, LLC

//! Error types for context resolution, traversal and loading

use std::path::PathBuf;
use thiserror::Error;

/// Result type for context operations
pub type Result<T> = std::result::Result<T, ContextError>;

/// Errors that can occur while making or querying a context
#[derive(Debug, Error)]
pub enum ContextError {
    /// The request could not be resolved to a directory
    #[error("Cannot resolve '{request}' from '{}': {reason}", base.display())]
    Resolution {
        /// Directory the request was resolved against
        base: PathBuf,
        /// Request string, as supplied
        request: String,
        /// Reason for failure
        reason: String,
    },

    /// A directory could not be listed during traversal
    #[error("Cannot list directory '{}': {source}", path.display())]
    Listing {
        /// Directory being listed
        path: PathBuf,
        /// Underlying I/O failure
        #[source]
        source: std::io::Error,
    },

    /// Lookup key is not part of the context
    #[error("Missing key '{0}'")]
    MissingKey(String),

    /// The loader failed for a known key
    #[error(transparent)]
    Load(#[from] LoadError),

    /// Timing mode not recognized under the strict policy
    #[error("Unknown timing mode '{0}'")]
    UnknownMode(String),

    /// Filter pattern failed to compile
    #[error("Invalid filter pattern: {0}")]
    InvalidPattern(#[from] regex::Error),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),
}

impl ContextError {
    /// Create a resolution error
    pub fn resolution(
        base: impl Into<PathBuf>,
        request: impl Into<String>,
        reason: impl Into<String>,
    ) -> Self {
        Self::Resolution {
            base: base.into(),
            request: request.into(),
            reason: reason.into(),
        }
    }

    /// Create a missing key error
    pub fn missing_key(key: impl Into<String>) -> Self {
        Self::MissingKey(key.into())
    }
}

/// Errors produced by a [`Loader`](crate::Loader)
#[derive(Debug, Error)]
pub enum LoadError {
    /// The file could not be read
    #[error("Cannot read '{}': {source}", path.display())]
    Io {
        /// File being loaded
        path: PathBuf,
        /// Underlying I/O failure
        #[source]
        source: std::io::Error,
    },

    /// The file content is malformed
    #[error("Cannot parse '{}': {source}", path.display())]
    Parse {
        /// File being loaded
        path: PathBuf,
        /// JSON parse failure
        #[source]
        source: serde_json::Error,
    },

    /// The file kind cannot be loaded
    #[error("Unsupported module '{}'", .0.display())]
    Unsupported(PathBuf),
}
