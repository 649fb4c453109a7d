// SPDX-FileCopyrightText: 2026 Postbench Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! `postbench migrate`: prepare the database file and prove the write path.

use postbench_config::PostbenchConfig;
use postbench_core::{NewPost, PostbenchError};
use postbench_storage::Database;
use tracing::info;

use crate::serve::init_tracing;

const SMOKE_EMAIL: &str = "setup@postbench.local";

/// Open the database (pragmas and migrations), submit one post through a
/// writer, print it as JSON, and shut the writer down.
pub async fn run_migrate(config: PostbenchConfig) -> Result<(), PostbenchError> {
    init_tracing(&config.log.level);

    let db = Database::open(&config.storage)?;
    info!(path = %db.path().display(), "migrations applied");
    let (dispatcher, writer) = postbench_storage::spawn(db, &config.writer)?;

    let written = dispatcher
        .submit(NewPost::new(SMOKE_EMAIL, "database initialized"))
        .await;
    drop(dispatcher);
    writer.shutdown().await?;

    let post = written.map_err(|e| PostbenchError::Storage {
        source: Box::new(e),
    })?;
    let rendered = serde_json::to_string_pretty(&post)
        .map_err(|e| PostbenchError::Internal(format!("failed to render post: {e}")))?;
    println!("{rendered}");
    Ok(())
}
