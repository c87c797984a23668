use axum::{
    body::{to_bytes, Body},
    http::{Method, Request, StatusCode},
    Router,
};
use ledger_core::{LedgerConfig, LedgerService};
use ledger_node::{router, AppState, HttpChainFetcher};
use serde_json::Value;
use std::{net::SocketAddr, sync::Arc, time::Duration};
use tower::ServiceExt;

pub const DIFFICULTY: usize = 2;

pub fn new_service() -> Arc<LedgerService> {
    let fetcher = HttpChainFetcher::new(Duration::from_secs(2)).expect("http client");
    Arc::new(LedgerService::new(
        LedgerConfig::with_difficulty(DIFFICULTY),
        Arc::new(fetcher),
    ))
}

pub fn new_app(service: Arc<LedgerService>) -> Router {
    router(AppState { service })
}

/// Sends one request through the router and decodes the JSON reply.
pub async fn send(app: &Router, method: Method, uri: &str, body: Option<Value>) -> (StatusCode, Value) {
    match body {
        Some(json) => send_raw(app, method, uri, &json.to_string()).await,
        None => dispatch(app, Request::builder().method(method).uri(uri), Body::empty()).await,
    }
}

/// Like [`send`], for JSON bodies `serde_json::Value` cannot hold.
pub async fn send_raw(app: &Router, method: Method, uri: &str, json: &str) -> (StatusCode, Value) {
    let request = Request::builder()
        .method(method)
        .uri(uri)
        .header("content-type", "application/json");
    dispatch(app, request, Body::from(json.to_owned())).await
}

async fn dispatch(
    app: &Router,
    request: axum::http::request::Builder,
    body: Body,
) -> (StatusCode, Value) {
    let response = app
        .clone()
        .oneshot(request.body(body).unwrap())
        .await
        .unwrap();
    let status = response.status();
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let json = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
    (status, json)
}

/// Serves `service` on an ephemeral local port.
pub async fn spawn_peer(service: Arc<LedgerService>) -> SocketAddr {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, new_app(service)).await.unwrap();
    });
    addr
}
