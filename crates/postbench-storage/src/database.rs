// SPDX-FileCopyrightText: 2026 Postbench Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Database connection setup: PRAGMAs, WAL mode, and migrations.
//!
//! A [`Database`] is opened once and then handed to
//! [`crate::writer::spawn`], which moves the connection onto the writer
//! thread. Do NOT open additional connections for writes.

use std::path::{Path, PathBuf};

use postbench_config::model::StorageConfig;
use postbench_core::{PostbenchError, WriteError};
use rusqlite::Connection;
use tracing::debug;

use crate::migrations;

/// An opened, migrated SQLite connection that has not been handed to a writer yet.
pub struct Database {
    conn: Connection,
    path: PathBuf,
}

impl Database {
    /// Open the database at the configured path, creating parent
    /// directories, applying PRAGMAs, and running pending migrations.
    ///
    /// Any failure here is fatal to startup.
    pub fn open(config: &StorageConfig) -> Result<Self, PostbenchError> {
        let path = PathBuf::from(&config.database_path);
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent).map_err(|e| PostbenchError::Storage {
                source: Box::new(e),
            })?;
        }

        let mut conn = Connection::open(&path).map_err(map_open_err)?;
        conn.execute_batch(&open_pragmas(config.busy_timeout_ms))
            .map_err(map_open_err)?;
        migrations::run_migrations(&mut conn)?;
        conn.execute_batch("PRAGMA optimize = 0x10002;")
            .map_err(map_open_err)?;

        debug!(path = %path.display(), "database opened");
        Ok(Self { conn, path })
    }

    /// Path of the underlying database file.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Borrow the connection for setup work before it is handed to the writer.
    pub fn connection(&self) -> &Connection {
        &self.conn
    }

    /// Give up ownership of the connection (to the writer thread).
    pub fn into_connection(self) -> Connection {
        self.conn
    }
}

fn open_pragmas(busy_timeout_ms: u32) -> String {
    format!(
        "PRAGMA journal_mode = WAL;
         PRAGMA synchronous = NORMAL;
         PRAGMA foreign_keys = ON;
         PRAGMA busy_timeout = {busy_timeout_ms};"
    )
}

fn map_open_err(e: rusqlite::Error) -> PostbenchError {
    PostbenchError::Storage {
        source: Box::new(e),
    }
}

/// Classify a driver error raised while executing a mutation.
///
/// SQLite constraint violations (UNIQUE, CHECK, FOREIGN KEY, NOT NULL) mean
/// the write cannot succeed as requested; everything else is a store failure.
pub(crate) fn map_write_err(e: rusqlite::Error) -> WriteError {
    match e.sqlite_error_code() {
        Some(rusqlite::ErrorCode::ConstraintViolation) => WriteError::Constraint(e.to_string()),
        _ => WriteError::store(e),
    }
}
