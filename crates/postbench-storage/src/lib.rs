// SPDX-FileCopyrightText: 2026 Postbench Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! SQLite persistence layer for postbench.
//!
//! Provides WAL-mode SQLite storage with embedded migrations and a
//! single-writer concurrency model: one dedicated thread owns the only
//! write connection, and every mutation reaches it through a
//! [`Dispatcher`].

pub mod database;
pub mod migrations;
pub mod queries;
pub mod writer;

pub use database::Database;
pub use writer::{spawn, Dispatcher, WriterHandle, WriterReport};
