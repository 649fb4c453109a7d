// SPDX-FileCopyrightText: 2026 Postbench Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! The submit capability every transport front-end is written against.

use async_trait::async_trait;

use crate::error::WriteError;
use crate::types::{HealthStatus, NewPost, Post};

/// Serialized write access to the post store.
///
/// Implementations funnel every call through a single writer; callers only
/// see the typed outcome. A front-end (HTTP, CLI, tests) holds an
/// `Arc<dyn PostWriter>` and never touches the store directly.
#[async_trait]
pub trait PostWriter: Send + Sync + 'static {
    /// Submits one mutation and waits for its result.
    ///
    /// Returns [`WriteError::ShuttingDown`] immediately once the writer has
    /// stopped accepting work.
    async fn submit(&self, request: NewPost) -> Result<Post, WriteError>;

    /// Reports whether new submissions are currently accepted.
    fn health(&self) -> HealthStatus {
        HealthStatus::Healthy
    }
}
