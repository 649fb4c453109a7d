// SPDX-FileCopyrightText: 2026 Postbench Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Core library for the postbench workspace.
//!
//! Holds the error taxonomy, the request/result types, and the
//! [`PostWriter`] trait that transport front-ends submit through.

pub mod error;
pub mod traits;
pub mod types;

pub use error::{PostbenchError, WriteError};
pub use traits::PostWriter;
pub use types::{HealthStatus, NewPost, Post};
