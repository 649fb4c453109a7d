// SPDX-FileCopyrightText: 2026 Postbench Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Router tests against an in-memory writer.

use std::sync::atomic::{AtomicBool, AtomicI64, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use axum::body::{to_bytes, Body};
use axum::http::{header, Request, StatusCode};
use postbench_core::{HealthStatus, NewPost, Post, PostWriter, WriteError};
use postbench_gateway::{router, GatewayState};
use serde_json::{json, Value};
use tower::ServiceExt;

#[derive(Default)]
struct MemoryWriter {
    next_id: AtomicI64,
    users: Mutex<Vec<String>>,
    closed: AtomicBool,
    fail_with_constraint: AtomicBool,
}

#[async_trait]
impl PostWriter for MemoryWriter {
    async fn submit(&self, request: NewPost) -> Result<Post, WriteError> {
        if self.closed.load(Ordering::SeqCst) {
            return Err(WriteError::ShuttingDown);
        }
        if self.fail_with_constraint.load(Ordering::SeqCst) {
            return Err(WriteError::Constraint("CHECK constraint failed".into()));
        }
        let user_id = {
            let mut users = self.users.lock().unwrap();
            match users.iter().position(|e| *e == request.email) {
                Some(i) => i as i64 + 1,
                None => {
                    users.push(request.email.clone());
                    users.len() as i64
                }
            }
        };
        Ok(Post {
            id: self.next_id.fetch_add(1, Ordering::SeqCst) + 1,
            user_id,
            content: request.content,
            created_at: 1_700_000_000_000,
            updated_at: 1_700_000_000_000,
        })
    }

    fn health(&self) -> HealthStatus {
        if self.closed.load(Ordering::SeqCst) {
            HealthStatus::Unhealthy("closed".into())
        } else {
            HealthStatus::Healthy
        }
    }
}

fn app(writer: Arc<MemoryWriter>) -> axum::Router {
    router(GatewayState::new(writer))
}

fn post_json(uri: &str, body: Value) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

async fn body_json(resp: axum::response::Response) -> Value {
    let bytes = to_bytes(resp.into_body(), usize::MAX).await.unwrap();
    serde_json::from_slice(&bytes).unwrap()
}

#[tokio::test]
async fn create_post_returns_201_with_post() {
    let writer = Arc::new(MemoryWriter::default());
    let resp = app(writer)
        .oneshot(post_json("/posts", json!({"email": "a@b.com", "content": "hi"})))
        .await
        .unwrap();

    assert_eq!(resp.status(), StatusCode::CREATED);
    let body = body_json(resp).await;
    assert_eq!(body["id"], 1);
    assert_eq!(body["user_id"], 1);
    assert_eq!(body["content"], "hi");
    assert!(body["created_at"].is_i64());
    assert!(body["updated_at"].is_i64());
}

#[tokio::test]
async fn same_email_reuses_user() {
    let writer = Arc::new(MemoryWriter::default());
    let first = app(writer.clone())
        .oneshot(post_json("/posts", json!({"email": "a@b.com", "content": "hi"})))
        .await
        .unwrap();
    let second = app(writer)
        .oneshot(post_json("/posts", json!({"email": "a@b.com", "content": "bye"})))
        .await
        .unwrap();

    let (first, second) = (body_json(first).await, body_json(second).await);
    assert_eq!(first["user_id"], second["user_id"]);
    assert_ne!(first["id"], second["id"]);
}

#[tokio::test]
async fn invalid_request_returns_400_with_all_errors() {
    let writer = Arc::new(MemoryWriter::default());
    let resp = app(writer.clone())
        .oneshot(post_json("/posts", json!({"email": "nope", "content": ""})))
        .await
        .unwrap();

    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    assert_eq!(
        body_json(resp).await,
        json!({"errors": ["content: must not be empty", "email: invalid: nope"]})
    );
    assert_eq!(writer.next_id.load(Ordering::SeqCst), 0, "writer untouched");
}

#[tokio::test]
async fn malformed_json_is_rejected_before_the_writer() {
    let writer = Arc::new(MemoryWriter::default());
    let req = Request::builder()
        .method("POST")
        .uri("/posts")
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from("{not json"))
        .unwrap();
    let resp = app(writer.clone()).oneshot(req).await.unwrap();

    assert!(resp.status().is_client_error());
    assert_eq!(writer.next_id.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn constraint_failure_returns_500() {
    let writer = Arc::new(MemoryWriter::default());
    writer.fail_with_constraint.store(true, Ordering::SeqCst);
    let resp = app(writer)
        .oneshot(post_json("/posts", json!({"email": "a@b.com", "content": "hi"})))
        .await
        .unwrap();

    assert_eq!(resp.status(), StatusCode::INTERNAL_SERVER_ERROR);
    let body = body_json(resp).await;
    assert!(body["error"].as_str().unwrap().contains("CHECK"));
}

#[tokio::test]
async fn shutting_down_returns_503() {
    let writer = Arc::new(MemoryWriter::default());
    writer.closed.store(true, Ordering::SeqCst);

    let resp = app(writer.clone())
        .oneshot(post_json("/posts", json!({"email": "a@b.com", "content": "hi"})))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::SERVICE_UNAVAILABLE);

    let health = app(writer)
        .oneshot(Request::get("/health").body(Body::empty()).unwrap())
        .await
        .unwrap();
    assert_eq!(health.status(), StatusCode::SERVICE_UNAVAILABLE);
    assert_eq!(body_json(health).await["status"], "unavailable");
}

#[tokio::test]
async fn echo_returns_body_unchanged() {
    let writer = Arc::new(MemoryWriter::default());
    let body = json!({"email": "not-validated", "content": ""});
    let resp = app(writer.clone())
        .oneshot(post_json("/echo", body.clone()))
        .await
        .unwrap();

    assert_eq!(resp.status(), StatusCode::OK);
    assert_eq!(body_json(resp).await, body);
    assert_eq!(writer.next_id.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn health_reports_ok_and_version() {
    let writer = Arc::new(MemoryWriter::default());
    let resp = app(writer)
        .oneshot(Request::get("/health").body(Body::empty()).unwrap())
        .await
        .unwrap();

    assert_eq!(resp.status(), StatusCode::OK);
    let body = body_json(resp).await;
    assert_eq!(body["status"], "ok");
    assert_eq!(body["version"], env!("CARGO_PKG_VERSION"));
    assert!(body["uptime_secs"].is_u64());
}

#[cfg(unix)]
#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn serves_over_unix_socket_and_stops_on_cancel() {
    use std::time::Duration;

    use postbench_config::model::{ServerConfig, Transport};
    use tokio::io::{AsyncReadExt, AsyncWriteExt};
    use tokio_util::sync::CancellationToken;

    let dir = tempfile::tempdir().unwrap();
    let socket = dir.path().join("gw.sock");
    // A leftover file from a previous run must not block the bind.
    std::fs::write(&socket, b"stale").unwrap();

    let config = ServerConfig {
        transport: Transport::Unix,
        socket_path: socket.to_str().unwrap().to_string(),
        ..ServerConfig::default()
    };
    let token = CancellationToken::new();
    let state = GatewayState::new(Arc::new(MemoryWriter::default()));
    let server = tokio::spawn({
        let token = token.clone();
        async move { postbench_gateway::serve(&config, state, token).await }
    });

    let mut stream = None;
    for _ in 0..100 {
        match tokio::net::UnixStream::connect(&socket).await {
            Ok(s) => {
                stream = Some(s);
                break;
            }
            Err(_) => tokio::time::sleep(Duration::from_millis(20)).await,
        }
    }
    let mut stream = stream.expect("gateway should accept connections");

    let body = r#"{"email":"a@b.com","content":"hi"}"#;
    let request = format!(
        "POST /posts HTTP/1.1\r\nHost: localhost\r\nContent-Type: application/json\r\n\
         Content-Length: {}\r\nConnection: close\r\n\r\n{body}",
        body.len()
    );
    stream.write_all(request.as_bytes()).await.unwrap();
    let mut response = String::new();
    stream.read_to_string(&mut response).await.unwrap();
    assert!(response.starts_with("HTTP/1.1 201"), "{response}");

    token.cancel();
    tokio::time::timeout(Duration::from_secs(5), server)
        .await
        .expect("server stops after cancel")
        .unwrap()
        .unwrap();
    assert!(!socket.exists(), "socket file removed on exit");
}
