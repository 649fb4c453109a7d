// SPDX-FileCopyrightText: 2026 Postbench Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Gateway HTTP server built on axum.
//!
//! Sets up routes, middleware, and shared state, and binds either a Unix
//! domain socket or a TCP port.

use std::future::Future;
use std::io;
use std::sync::Arc;

use axum::{
    routing::{get, post},
    Router,
};
use postbench_config::model::{ServerConfig, Transport};
use postbench_core::{PostWriter, PostbenchError};
use tokio_util::sync::CancellationToken;
use tower_http::trace::TraceLayer;

use crate::handlers;

/// Shared state for axum request handlers.
#[derive(Clone)]
pub struct GatewayState {
    /// Where validated posts are submitted.
    pub writer: Arc<dyn PostWriter>,
    /// Process start time for uptime calculation.
    pub start_time: std::time::Instant,
}

impl GatewayState {
    pub fn new(writer: Arc<dyn PostWriter>) -> Self {
        Self {
            writer,
            start_time: std::time::Instant::now(),
        }
    }
}

/// Build the gateway router:
/// - POST /posts
/// - POST /echo
/// - GET /health
pub fn router(state: GatewayState) -> Router {
    Router::new()
        .route("/posts", post(handlers::post_posts))
        .route("/echo", post(handlers::post_echo))
        .route("/health", get(handlers::get_health))
        .with_state(state)
        .layer(TraceLayer::new_for_http())
}

/// Serve the gateway until `shutdown` is cancelled.
///
/// In-flight requests finish before this returns. For the Unix transport a
/// stale socket file is removed before binding and the file is removed again
/// on exit.
pub async fn serve(
    config: &ServerConfig,
    state: GatewayState,
    shutdown: CancellationToken,
) -> Result<(), PostbenchError> {
    let app = router(state);
    let signal = shutdown.cancelled_owned();

    match config.transport {
        Transport::Tcp => {
            let addr = format!("{}:{}", config.host, config.port);
            let listener = tokio::net::TcpListener::bind(&addr)
                .await
                .map_err(|e| bind_error(&addr, e))?;
            tracing::info!("Gateway server listening on {addr}");

            axum::serve(listener, app)
                .with_graceful_shutdown(signal)
                .await
                .map_err(serve_error)
        }
        Transport::Unix => serve_unix(&config.socket_path, app, signal).await,
    }
}

#[cfg(unix)]
async fn serve_unix(
    socket_path: &str,
    app: Router,
    signal: impl Future<Output = ()> + Send + 'static,
) -> Result<(), PostbenchError> {
    remove_stale_socket(socket_path).await.map_err(|e| bind_error(socket_path, e))?;
    let listener =
        tokio::net::UnixListener::bind(socket_path).map_err(|e| bind_error(socket_path, e))?;
    tracing::info!("Gateway server listening on unix:{socket_path}");

    let result = axum::serve(listener, app)
        .with_graceful_shutdown(signal)
        .await
        .map_err(serve_error);

    if let Err(e) = remove_stale_socket(socket_path).await {
        tracing::warn!(path = socket_path, error = %e, "failed to remove socket file");
    }
    result
}

#[cfg(not(unix))]
async fn serve_unix(
    socket_path: &str,
    _app: Router,
    _signal: impl Future<Output = ()> + Send + 'static,
) -> Result<(), PostbenchError> {
    Err(PostbenchError::Gateway {
        message: format!("unix sockets are not supported on this platform: {socket_path}"),
        source: None,
    })
}

#[cfg(unix)]
async fn remove_stale_socket(path: &str) -> io::Result<()> {
    match tokio::fs::remove_file(path).await {
        Err(e) if e.kind() != io::ErrorKind::NotFound => Err(e),
        _ => Ok(()),
    }
}

fn bind_error(addr: &str, e: io::Error) -> PostbenchError {
    PostbenchError::Gateway {
        message: format!("failed to bind gateway to {addr}: {e}"),
        source: Some(Box::new(e)),
    }
}

fn serve_error(e: io::Error) -> PostbenchError {
    PostbenchError::Gateway {
        message: format!("gateway server error: {e}"),
        source: Some(Box::new(e)),
    }
}
