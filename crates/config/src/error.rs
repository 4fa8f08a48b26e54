// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Error type shared by all config loaders.

use std::path::PathBuf;
use thiserror::Error;

/// Errors from reading or writing configuration files.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// File missing. `hint` tells the caller how to create it; the
    /// control plane forwards it verbatim.
    #[error("{path} not found. {hint}")]
    NotFound { path: PathBuf, hint: String },

    /// Malformed JSON or schema violation. Each message is
    /// path-qualified (`repositories[2].path: …`).
    #[error("invalid config: {}", .0.join("; "))]
    Parse(Vec<String>),

    #[error("permission denied: {0}")]
    Permission(PathBuf),

    /// Another writer holds the advisory lock.
    #[error("config file is locked: {0}")]
    Busy(PathBuf),

    #[error("timed out waiting for {0}")]
    Timeout(PathBuf),

    #[error("invariant violation: {0}")]
    Invariant(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl ConfigError {
    pub fn not_found(path: impl Into<PathBuf>, hint: impl Into<String>) -> Self {
        Self::NotFound { path: path.into(), hint: hint.into() }
    }

    pub fn parse_one(message: impl Into<String>) -> Self {
        Self::Parse(vec![message.into()])
    }

    /// Map an I/O error, distinguishing permission problems.
    pub fn from_io(err: std::io::Error, path: &std::path::Path) -> Self {
        if err.kind() == std::io::ErrorKind::PermissionDenied {
            Self::Permission(path.to_path_buf())
        } else {
            Self::Io(err)
        }
    }
}
