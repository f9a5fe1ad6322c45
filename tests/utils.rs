#![allow(dead_code)]

use async_trait::async_trait;
use axum::body::{Body, Bytes};
use axum::http::{Request, StatusCode};
use axum::Router;
use serde_json::Value;
use std::sync::Arc;
use tower::ServiceExt;
use withdrawal_gateway_mock::api::create_router;
use withdrawal_gateway_mock::api::models::{Amount, WithdrawalId};
use withdrawal_gateway_mock::api::routes::DEFAULT_BASE_PATH;
use withdrawal_gateway_mock::db::{InMemoryWithdrawalStore, StoreError, WithdrawalStore};

pub const BASE_URL: &str = DEFAULT_BASE_PATH;

pub fn create_test_app() -> (Router, Arc<InMemoryWithdrawalStore>) {
    let store = Arc::new(InMemoryWithdrawalStore::new());
    let app = create_router(store.clone(), DEFAULT_BASE_PATH);
    (app, store)
}

pub async fn body_to_bytes(body: Body) -> Bytes {
    use futures_util::stream::StreamExt;
    let mut data = Vec::new();
    let mut stream = body.into_data_stream();
    while let Some(chunk) = stream.next().await {
        data.extend_from_slice(&chunk.unwrap());
    }
    Bytes::from(data)
}

/// Sends a JSON POST and returns the status with the decoded body.
pub async fn post_json(app: &Router, path: &str, body: Value) -> (StatusCode, Value) {
    post_raw(app, path, body.to_string()).await
}

pub async fn post_raw(app: &Router, path: &str, body: impl Into<Body>) -> (StatusCode, Value) {
    let request = Request::post(format!("{BASE_URL}{path}"))
        .header("content-type", "application/json")
        .body(body.into())
        .unwrap();

    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = body_to_bytes(response.into_body()).await;
    let parsed = serde_json::from_slice(&bytes).unwrap();
    (status, parsed)
}

/// Reserves `amount` and returns the issued id.
pub async fn reserve(app: &Router, amount: Value) -> i64 {
    let (status, body) = post_json(
        app,
        "/reserve",
        serde_json::json!({"wallet_id": "12345", "amount": amount}),
    )
    .await;
    assert_eq!(status, StatusCode::OK, "reserve failed: {body}");
    body["withdrawal_id"].as_i64().unwrap()
}

/// A store whose every operation fails, for exercising the 500 path.
pub struct FailingStore;

#[async_trait]
impl WithdrawalStore for FailingStore {
    async fn put(&self, _id: WithdrawalId, _reserved_amount: Amount) -> Result<(), StoreError> {
        Err(StoreError::Io(std::io::Error::other("disk full")))
    }

    async fn exists(&self, _id: WithdrawalId) -> Result<bool, StoreError> {
        Err(StoreError::Io(std::io::Error::other("disk unreadable")))
    }

    async fn get_reserved_amount(&self, _id: WithdrawalId) -> Result<Option<Amount>, StoreError> {
        Err(StoreError::Io(std::io::Error::other("disk unreadable")))
    }
}
