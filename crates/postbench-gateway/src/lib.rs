// SPDX-FileCopyrightText: 2026 Postbench Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! HTTP front-end for the postbench writer.
//!
//! The gateway is one transport adapter over [`postbench_core::PostWriter`]:
//! it validates JSON requests, submits them, and maps the writer's result to
//! an HTTP status. It holds no database state of its own.

pub mod handlers;
pub mod server;
pub mod validation;

pub use server::{router, serve, GatewayState};
pub use validation::validate;
