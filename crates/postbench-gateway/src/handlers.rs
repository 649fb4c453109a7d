// SPDX-FileCopyrightText: 2026 Postbench Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! HTTP request handlers.
//!
//! Handles POST /posts, POST /echo, GET /health.

use axum::{
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;

use postbench_core::{HealthStatus, NewPost, WriteError};

use crate::server::GatewayState;
use crate::validation::validate;

/// Response body for GET /health.
#[derive(Debug, Serialize)]
pub struct HealthResponse {
    /// Health status string.
    pub status: String,
    /// Binary version.
    pub version: String,
    /// Seconds since the gateway started.
    pub uptime_secs: u64,
}

/// Body returned when validation rejects a request.
#[derive(Debug, Serialize)]
pub struct ValidationResponse {
    pub errors: Vec<String>,
}

/// Error response body.
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    /// Error description.
    pub error: String,
}

/// POST /posts
///
/// Validates the request, submits it to the writer, and returns the stored
/// post with 201.
pub async fn post_posts(State(state): State<GatewayState>, Json(body): Json<NewPost>) -> Response {
    let errors = validate(&body);
    if !errors.is_empty() {
        return (
            StatusCode::BAD_REQUEST,
            Json(ValidationResponse { errors }),
        )
            .into_response();
    }

    match state.writer.submit(body).await {
        Ok(post) => (StatusCode::CREATED, Json(post)).into_response(),
        Err(e) => write_error_response(e),
    }
}

/// POST /echo
///
/// Returns the parsed body unchanged. Measures framework overhead without
/// touching the writer.
pub async fn post_echo(Json(body): Json<NewPost>) -> Json<NewPost> {
    Json(body)
}

/// GET /health
pub async fn get_health(State(state): State<GatewayState>) -> Response {
    let uptime_secs = state.start_time.elapsed().as_secs();
    let (code, status) = match state.writer.health() {
        HealthStatus::Healthy => (StatusCode::OK, "ok".to_string()),
        HealthStatus::Unhealthy(reason) => {
            tracing::debug!(%reason, "health check reports unavailable writer");
            (StatusCode::SERVICE_UNAVAILABLE, "unavailable".to_string())
        }
    };
    (
        code,
        Json(HealthResponse {
            status,
            version: env!("CARGO_PKG_VERSION").to_string(),
            uptime_secs,
        }),
    )
        .into_response()
}

fn write_error_response(err: WriteError) -> Response {
    let code = match &err {
        WriteError::ShuttingDown => StatusCode::SERVICE_UNAVAILABLE,
        WriteError::Constraint(_) | WriteError::Store { .. } => {
            tracing::warn!(error = %err, "post submission failed");
            StatusCode::INTERNAL_SERVER_ERROR
        }
    };
    (
        code,
        Json(ErrorResponse {
            error: err.to_string(),
        }),
    )
        .into_response()
}
