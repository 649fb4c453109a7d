// SPDX-FileCopyrightText: 2026 Postbench Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! `postbench serve` command implementation.
//!
//! Opens the database, starts the writer, and serves the HTTP gateway until
//! a shutdown signal arrives. The gateway is stopped first so no new
//! requests are accepted; then the writer drains its queue, optimizes, and
//! closes the connection before the process exits.

use std::sync::Arc;

use postbench_config::PostbenchConfig;
use postbench_core::PostbenchError;
use postbench_gateway::GatewayState;
use postbench_storage::Database;
use tracing::{error, info};

use crate::shutdown;

/// Runs the `postbench serve` command.
pub async fn run_serve(config: PostbenchConfig) -> Result<(), PostbenchError> {
    init_tracing(&config.log.level);
    info!("starting postbench serve");

    let db = Database::open(&config.storage)?;
    info!(path = %db.path().display(), "database ready");
    let (dispatcher, writer) = postbench_storage::spawn(db, &config.writer)?;

    let cancel = shutdown::install_signal_handler();
    let state = GatewayState::new(Arc::new(dispatcher));
    let served = postbench_gateway::serve(&config.server, state, cancel.clone()).await;
    if let Err(e) = &served {
        error!(error = %e, "gateway stopped with an error");
    }
    cancel.cancel();

    info!("gateway stopped, shutting down writer");
    let report = writer.shutdown().await.inspect_err(|e| {
        error!(error = %e, "writer shutdown failed");
    })?;
    served?;

    info!(
        committed = report.committed,
        failed = report.failed,
        "postbench serve shutdown complete"
    );
    Ok(())
}

/// Install the global fmt subscriber on stderr, keeping stdout for command
/// output. `RUST_LOG` overrides the configured level.
pub(crate) fn init_tracing(log_level: &str) {
    use tracing_subscriber::EnvFilter;

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(format!("postbench={log_level},warn")));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_thread_names(true)
        .with_writer(std::io::stderr)
        .init();
}
