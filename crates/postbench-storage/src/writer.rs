// SPDX-FileCopyrightText: 2026 Postbench Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! The single writer.
//!
//! SQLite serializes writers on a file lock, so concurrent write connections
//! only add `SQLITE_BUSY` retries. Instead, one dedicated thread owns the
//! only write [`Connection`] and executes mutations strictly one at a time.
//! Callers reach it through a [`Dispatcher`], which enqueues the request
//! together with a one-shot response slot and waits for the reply.
//!
//! ```text
//! caller ─submit─▶ Dispatcher ─Command::Write─▶ queue ─▶ writer thread
//!    ▲                                                    │ BEGIN IMMEDIATE
//!    └──────────── oneshot slot ◀── Result<Post, _> ──────┘ ... COMMIT
//! ```
//!
//! Shutdown goes through [`WriterHandle::shutdown`]: it enqueues
//! `Command::Close`; the writer then closes the queue to new submissions,
//! drains what is already buffered, runs `PRAGMA optimize`, closes the
//! connection, and the thread is joined.

use std::thread::JoinHandle;

use async_trait::async_trait;
use postbench_config::model::WriterConfig;
use postbench_core::{HealthStatus, NewPost, Post, PostWriter, PostbenchError, WriteError};
use rusqlite::Connection;
use tokio::sync::{mpsc, oneshot};
use tracing::{debug, error, info, trace, warn};

use crate::database::Database;
use crate::queries::posts;

const THREAD_NAME: &str = "postbench-writer";

/// Single-use delivery point for one result to one caller.
type ResponseSlot = oneshot::Sender<Result<Post, WriteError>>;

/// Messages consumed by the writer thread.
enum Command {
    Write { request: NewPost, slot: ResponseSlot },
    Close,
}

/// Counters reported when the writer exits.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct WriterReport {
    /// Transactions that committed.
    pub committed: u64,
    /// Requests that were answered with an error.
    pub failed: u64,
    /// Results whose caller had stopped waiting.
    pub abandoned: u64,
}

/// Cloneable submission handle. Many per process, one per caller if needed.
#[derive(Clone)]
pub struct Dispatcher {
    tx: mpsc::Sender<Command>,
}

impl Dispatcher {
    /// Enqueue `request` and wait for the writer's answer.
    ///
    /// Fails with [`WriteError::ShuttingDown`] if the queue is closed, or if
    /// the writer exits before answering.
    pub async fn submit(&self, request: NewPost) -> Result<Post, WriteError> {
        let (slot, reply) = oneshot::channel();
        self.tx
            .send(Command::Write { request, slot })
            .await
            .map_err(|_| WriteError::ShuttingDown)?;
        reply.await.map_err(|_| WriteError::ShuttingDown)?
    }

    /// True once the writer has stopped accepting submissions.
    pub fn is_closed(&self) -> bool {
        self.tx.is_closed()
    }
}

#[async_trait]
impl PostWriter for Dispatcher {
    async fn submit(&self, request: NewPost) -> Result<Post, WriteError> {
        Dispatcher::submit(self, request).await
    }

    fn health(&self) -> HealthStatus {
        if self.is_closed() {
            HealthStatus::Unhealthy("writer queue is closed".to_string())
        } else {
            HealthStatus::Healthy
        }
    }
}

/// Owner-side handle used exactly once, to stop the writer.
pub struct WriterHandle {
    tx: mpsc::Sender<Command>,
    thread: JoinHandle<Result<WriterReport, PostbenchError>>,
}

impl WriterHandle {
    /// Close the queue, let the writer drain and release the connection,
    /// and wait for the thread to finish.
    ///
    /// Requests enqueued before the close are still executed; later
    /// submissions fail with [`WriteError::ShuttingDown`].
    pub async fn shutdown(self) -> Result<WriterReport, PostbenchError> {
        let WriterHandle { tx, thread } = self;
        // A failed send means the writer already exited; the join reports why.
        if tx.send(Command::Close).await.is_err() {
            debug!("writer queue already closed");
        }
        drop(tx);

        tokio::task::spawn_blocking(move || thread.join())
            .await
            .map_err(|e| PostbenchError::Internal(format!("writer join task failed: {e}")))?
            .map_err(|_| PostbenchError::Internal("writer thread panicked".to_string()))?
    }
}

/// Start the writer thread on `db`'s connection.
///
/// Both mutation statements are prepared before the thread starts; a
/// failure there is returned as a fatal startup error.
pub fn spawn(
    db: Database,
    config: &WriterConfig,
) -> Result<(Dispatcher, WriterHandle), PostbenchError> {
    let conn = db.into_connection();
    posts::prepare(&conn).map_err(|e| PostbenchError::Storage {
        source: Box::new(e),
    })?;

    let (tx, rx) = mpsc::channel(config.queue_capacity.max(1));
    let writer = Writer {
        conn,
        report: WriterReport::default(),
    };

    let thread = std::thread::Builder::new()
        .name(THREAD_NAME.to_string())
        .spawn(move || writer.run(rx))
        .map_err(|e| PostbenchError::Internal(format!("failed to spawn writer thread: {e}")))?;

    info!(queue_capacity = config.queue_capacity, "writer started");
    Ok((Dispatcher { tx: tx.clone() }, WriterHandle { tx, thread }))
}

struct Writer {
    conn: Connection,
    report: WriterReport,
}

impl Writer {
    fn run(mut self, mut rx: mpsc::Receiver<Command>) -> Result<WriterReport, PostbenchError> {
        while let Some(command) = rx.blocking_recv() {
            match command {
                Command::Write { request, slot } => self.handle(request, slot),
                Command::Close => {
                    // Buffered commands are still yielded after close().
                    info!("writer closing, draining queued requests");
                    rx.close();
                }
            }
        }
        self.finish()
    }

    fn handle(&mut self, request: NewPost, slot: ResponseSlot) {
        let result = posts::create_post(&mut self.conn, &request);
        match &result {
            Ok(post) => {
                self.report.committed += 1;
                trace!(post_id = post.id, user_id = post.user_id, "post committed");
            }
            Err(e) => {
                self.report.failed += 1;
                warn!(error = %e, "write failed, transaction rolled back");
            }
        }

        if slot.send(result).is_err() {
            self.report.abandoned += 1;
            debug!("caller stopped waiting; result discarded");
        }
    }

    fn finish(self) -> Result<WriterReport, PostbenchError> {
        let Writer { conn, report } = self;

        if let Err(e) = conn.execute_batch("PRAGMA optimize;") {
            warn!(error = %e, "PRAGMA optimize failed at shutdown");
        }

        if let Err((_, e)) = conn.close() {
            error!(error = %e, "failed to close writer connection");
            return Err(PostbenchError::Storage {
                source: Box::new(e),
            });
        }

        info!(
            committed = report.committed,
            failed = report.failed,
            abandoned = report.abandoned,
            "writer stopped, connection closed"
        );
        Ok(report)
    }
}
