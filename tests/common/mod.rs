//! Shared utilities for integration tests.

#![allow(dead_code)]

use std::net::SocketAddr;
use std::sync::Arc;

use axum::body::{Body, Bytes};
use axum::http::{header, HeaderMap, Request, StatusCode};
use axum::Router;
use chrono::{Duration, Utc};
use tokio::net::TcpListener;
use tower::ServiceExt;

use timeoff_server::config::ServerConfig;
use timeoff_server::http::{AppState, HttpServer};
use timeoff_server::lifecycle::Shutdown;
use timeoff_server::observability::RecordingSink;

/// A response collected in full.
pub struct Collected {
    pub status: StatusCode,
    pub headers: HeaderMap,
    pub body: Bytes,
}

impl Collected {
    pub fn json(&self) -> serde_json::Value {
        serde_json::from_slice(&self.body).expect("response body is not JSON")
    }

    pub fn text(&self) -> String {
        String::from_utf8_lossy(&self.body).into_owned()
    }
}

/// State backed by the repository's assets and a recording sink.
pub fn state_with(config: ServerConfig) -> (AppState, Arc<RecordingSink>) {
    let sink = Arc::new(RecordingSink::new());
    let state = AppState::from_config(config)
        .expect("templates load")
        .with_sink(sink.clone());
    (state, sink)
}

pub fn app_with(config: ServerConfig) -> (Router, Arc<RecordingSink>) {
    let (state, sink) = state_with(config);
    let server = HttpServer::with_state(state).expect("route table builds");
    (server.router(), sink)
}

pub fn app() -> (Router, Arc<RecordingSink>) {
    app_with(ServerConfig::default())
}

pub async fn send(router: &Router, request: Request<Body>) -> Collected {
    let response = router.clone().oneshot(request).await.expect("router is infallible");
    let status = response.status();
    let headers = response.headers().clone();
    let body = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .expect("body collects");
    Collected { status, headers, body }
}

pub fn get(uri: &str) -> Request<Body> {
    Request::get(uri).body(Body::empty()).unwrap()
}

pub fn form_post(uri: &str, body: &str) -> Request<Body> {
    Request::post(uri)
        .header(header::CONTENT_TYPE, "application/x-www-form-urlencoded")
        .body(Body::from(body.to_string()))
        .unwrap()
}

pub fn json_post(uri: &str, body: &str) -> Request<Body> {
    Request::post(uri)
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

/// `YYYY-MM-DD` for today plus `days`.
pub fn days_from_today(days: i64) -> String {
    (Utc::now() + Duration::days(days))
        .date_naive()
        .format("%Y-%m-%d")
        .to_string()
}

/// Serve on an ephemeral port. Trigger the returned `Shutdown` to stop.
pub async fn start_server(config: ServerConfig) -> (SocketAddr, Shutdown) {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let server = HttpServer::new(config).expect("server builds");
    let shutdown = Shutdown::new();
    let server_shutdown = shutdown.clone();

    tokio::spawn(async move {
        let _ = server.run(listener, server_shutdown).await;
    });

    (addr, shutdown)
}
