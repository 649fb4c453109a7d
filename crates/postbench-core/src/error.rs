// SPDX-FileCopyrightText: 2026 Postbench Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Error types for the postbench workspace.
//!
//! Two layers exist. [`PostbenchError`] covers process-level failures
//! (configuration, opening or closing the store, binding the listener) that
//! abort startup or are reported loudly at shutdown. [`WriteError`] is the
//! per-request failure carried back to a single caller; it never stops the
//! writer.

use thiserror::Error;

/// The primary error type for startup, shutdown and wiring failures.
#[derive(Debug, Error)]
pub enum PostbenchError {
    /// Configuration errors (invalid TOML, failed validation).
    #[error("configuration error: {0}")]
    Config(String),

    /// Fatal storage errors: the connection could not be opened, migrated,
    /// prepared, or closed.
    #[error("storage error: {source}")]
    Storage {
        source: Box<dyn std::error::Error + Send + Sync>,
    },

    /// HTTP front-end errors (bind failure, server crash).
    #[error("gateway error: {message}")]
    Gateway {
        message: String,
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// Internal or unexpected errors.
    #[error("internal error: {0}")]
    Internal(String),
}

/// Outcome of a single failed mutation.
#[derive(Debug, Error)]
pub enum WriteError {
    /// The write structurally could not succeed: a constraint was violated or
    /// the dependent insert matched no parent row.
    #[error("constraint failure: {0}")]
    Constraint(String),

    /// The underlying driver failed while preparing, executing or scanning.
    #[error("store failure: {source}")]
    Store {
        source: Box<dyn std::error::Error + Send + Sync>,
    },

    /// The request queue is closed; the writer is terminating.
    #[error("writer is shutting down")]
    ShuttingDown,
}

impl WriteError {
    /// Wraps a driver error as a [`WriteError::Store`].
    pub fn store(err: impl std::error::Error + Send + Sync + 'static) -> Self {
        WriteError::Store {
            source: Box::new(err),
        }
    }

    /// Returns true for the shutdown condition, which callers surface as
    /// "service unavailable" rather than a server error.
    pub fn is_shutting_down(&self) -> bool {
        matches!(self, WriteError::ShuttingDown)
    }
}
