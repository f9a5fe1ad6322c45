use axum::body::Body;
use axum::http::{HeaderName, Request, Response};
use axum::routing::{get, post};
use axum::Router;
use std::time::Duration;
use tower::ServiceBuilder;
use tower_http::request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer};
use tower_http::trace::TraceLayer;
use tracing::{error, info, warn, Span};

use crate::api::handlers::{handle_finalize, handle_health, handle_process, handle_reserve};
use crate::db::SharedStore;

pub const DEFAULT_BASE_PATH: &str = "/api/withdrawals";

const REQUEST_ID_HEADER: &str = "x-request-id";

#[derive(Clone)]
pub struct AppState {
    pub store: SharedStore,
}

impl AppState {
    pub fn new(store: SharedStore) -> Self {
        Self { store }
    }
}

/// Withdrawal endpoints, relative to the base path.
pub fn withdrawal_routes() -> Router<AppState> {
    Router::new()
        .route("/reserve", post(handle_reserve))
        .route("/process", post(handle_process))
        .route("/finalize", post(handle_finalize))
}

/// Full application router: withdrawal endpoints under `base_path`, the
/// health probe at `/health`, and request-id plus tracing middleware.
pub fn create_router(store: SharedStore, base_path: &str) -> Router {
    let base_path = normalize_base_path(base_path);

    let router = if base_path.is_empty() {
        Router::new().merge(withdrawal_routes())
    } else {
        Router::new().nest(&base_path, withdrawal_routes())
    };

    let request_id_header = HeaderName::from_static(REQUEST_ID_HEADER);

    router
        .route("/health", get(handle_health))
        .layer(
            ServiceBuilder::new()
                .layer(SetRequestIdLayer::new(
                    request_id_header.clone(),
                    MakeRequestUuid,
                ))
                .layer(
                    TraceLayer::new_for_http()
                        .make_span_with(|request: &Request<Body>| {
                            let request_id = request
                                .headers()
                                .get(REQUEST_ID_HEADER)
                                .and_then(|value| value.to_str().ok())
                                .unwrap_or("-");
                            tracing::info_span!(
                                "request",
                                method = %request.method(),
                                uri = %request.uri(),
                                request_id = %request_id,
                            )
                        })
                        .on_response(log_response),
                )
                .layer(PropagateRequestIdLayer::new(request_id_header)),
        )
        .with_state(AppState::new(store))
}

/// Returns `base_path` with exactly one leading `/` and no trailing `/`.
/// The root path normalizes to the empty string.
pub fn normalize_base_path(base_path: &str) -> String {
    let trimmed = base_path.trim().trim_matches('/');
    if trimmed.is_empty() {
        String::new()
    } else {
        format!("/{trimmed}")
    }
}

/// Client errors are logged at `warn` and server errors at `error`, so that
/// rejected requests stand out under the default `info` filter.
fn log_response(response: &Response<Body>, latency: Duration, _span: &Span) {
    let status = response.status();
    let latency_ms = latency.as_millis() as u64;

    if status.is_server_error() {
        error!(status = status.as_u16(), latency_ms, "Request failed");
    } else if status.is_client_error() {
        warn!(status = status.as_u16(), latency_ms, "Request rejected");
    } else {
        info!(status = status.as_u16(), latency_ms, "Request completed");
    }
}
