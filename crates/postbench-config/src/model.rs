// SPDX-FileCopyrightText: 2026 Postbench Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Configuration model structs.
//!
//! All structs use `#[serde(deny_unknown_fields)]` to reject unrecognized
//! config keys at startup, providing actionable error messages.

use serde::{Deserialize, Serialize};

/// Top-level postbench configuration.
///
/// All sections are optional and default to the values the benchmark
/// harness expects (Unix socket at `/tmp/benchmark.sock`, database under
/// `db/db.sqlite`).
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct PostbenchConfig {
    /// HTTP listener settings.
    #[serde(default)]
    pub server: ServerConfig,

    /// SQLite store settings.
    #[serde(default)]
    pub storage: StorageConfig,

    /// Single-writer queue settings.
    #[serde(default)]
    pub writer: WriterConfig,

    /// Logging settings.
    #[serde(default)]
    pub log: LogConfig,
}

/// How the HTTP server is exposed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Transport {
    /// Unix domain socket at `server.socket_path`.
    Unix,
    /// TCP listener at `server.host:server.port`.
    Tcp,
}

/// HTTP listener configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct ServerConfig {
    #[serde(default = "default_transport")]
    pub transport: Transport,

    /// Path of the Unix domain socket. Any stale file is removed before bind.
    #[serde(default = "default_socket_path")]
    pub socket_path: String,

    #[serde(default = "default_host")]
    pub host: String,

    #[serde(default = "default_port")]
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            transport: default_transport(),
            socket_path: default_socket_path(),
            host: default_host(),
            port: default_port(),
        }
    }
}

fn default_transport() -> Transport {
    Transport::Unix
}

fn default_socket_path() -> String {
    "/tmp/benchmark.sock".to_string()
}

fn default_host() -> String {
    "127.0.0.1".to_string()
}

fn default_port() -> u16 {
    3000
}

/// SQLite store configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct StorageConfig {
    /// Path to the SQLite database file. Parent directories are created on open.
    #[serde(default = "default_database_path")]
    pub database_path: String,

    /// `PRAGMA busy_timeout` in milliseconds.
    #[serde(default = "default_busy_timeout_ms")]
    pub busy_timeout_ms: u32,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            database_path: default_database_path(),
            busy_timeout_ms: default_busy_timeout_ms(),
        }
    }
}

fn default_database_path() -> String {
    "db/db.sqlite".to_string()
}

fn default_busy_timeout_ms() -> u32 {
    10_000
}

/// Single-writer queue configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct WriterConfig {
    /// Capacity of the request queue. Submitters suspend when it is full.
    #[serde(default = "default_queue_capacity")]
    pub queue_capacity: usize,
}

impl Default for WriterConfig {
    fn default() -> Self {
        Self {
            queue_capacity: default_queue_capacity(),
        }
    }
}

fn default_queue_capacity() -> usize {
    1024
}

/// Logging configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct LogConfig {
    /// Log level for postbench crates (trace, debug, info, warn, error).
    /// `RUST_LOG` overrides it entirely when set.
    #[serde(default = "default_log_level")]
    pub level: String,
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
        }
    }
}

fn default_log_level() -> String {
    "info".to_string()
}
