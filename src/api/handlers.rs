use axum::body::Bytes;
use axum::extract::State;
use axum::Json;
use serde_json::Value;
use tracing::{debug, info, warn};

use crate::api::error::ApiError;
use crate::api::models::{Amount, ReserveResponse, StatusResponse, WithdrawalId};
use crate::api::routes::AppState;
use crate::api::validation::{
    check_finalize_amount, validate_finalize, validate_process, validate_reserve, JsonObject,
};
use crate::db::{StoreError, WithdrawalStore};
use crate::utils::generate_withdrawal_id;

/// Attempts at finding an unused id before a reservation gives up.
pub const MAX_ID_ATTEMPTS: u32 = 5;

/// Parses a request body into a JSON object. An empty body counts as `{}`.
pub fn parse_json_object(body: &[u8]) -> Result<JsonObject, ApiError> {
    if body.iter().all(u8::is_ascii_whitespace) {
        return Ok(JsonObject::new());
    }

    match serde_json::from_slice::<Value>(body) {
        Ok(Value::Object(object)) => Ok(object),
        Ok(_) => {
            warn!("Non-object JSON body received");
            Err(ApiError::MalformedJson)
        }
        Err(e) => {
            warn!(error = %e, "Malformed JSON received");
            Err(ApiError::MalformedJson)
        }
    }
}

/// Stores `amount` under a freshly generated id, drawing a new id whenever
/// the store reports a collision.
pub async fn reserve_withdrawal<S, F>(
    store: &S,
    amount: Amount,
    mut next_id: F,
) -> Result<WithdrawalId, ApiError>
where
    S: WithdrawalStore + ?Sized,
    F: FnMut() -> WithdrawalId,
{
    for attempt in 1..=MAX_ID_ATTEMPTS {
        let id = next_id();
        match store.put(id, amount).await {
            Ok(()) => return Ok(id),
            Err(StoreError::DuplicateId(_)) => {
                warn!(%id, attempt, "Withdrawal id collision, regenerating");
            }
            Err(e) => return Err(e.into()),
        }
    }

    Err(ApiError::IdExhausted(MAX_ID_ATTEMPTS))
}

pub async fn handle_reserve(
    State(state): State<AppState>,
    body: Bytes,
) -> Result<Json<ReserveResponse>, ApiError> {
    let payload = parse_json_object(&body)?;
    let request = validate_reserve(&payload)?;

    let withdrawal_id =
        reserve_withdrawal(state.store.as_ref(), request.amount, generate_withdrawal_id).await?;
    info!(%withdrawal_id, amount = %request.amount, "Withdrawal reserved");
    debug!(wallet_id = %request.wallet_id, %withdrawal_id, "Reservation wallet");

    Ok(Json(ReserveResponse::reserved(withdrawal_id, request.amount)))
}

pub async fn handle_process(
    State(state): State<AppState>,
    body: Bytes,
) -> Result<Json<StatusResponse>, ApiError> {
    let payload = parse_json_object(&body)?;
    let request = validate_process(&payload)?;

    let withdrawal_id = request
        .withdrawal_id
        .ok_or(ApiError::InvalidWithdrawalId)?;
    if !state.store.exists(withdrawal_id).await? {
        return Err(ApiError::InvalidWithdrawalId);
    }

    info!(%withdrawal_id, amount = %request.amount, "Withdrawal processing");
    Ok(Json(StatusResponse::new("pending")))
}

pub async fn handle_finalize(
    State(state): State<AppState>,
    body: Bytes,
) -> Result<Json<StatusResponse>, ApiError> {
    let payload = parse_json_object(&body)?;
    let request = validate_finalize(&payload)?;

    let withdrawal_id = request
        .withdrawal_id
        .ok_or(ApiError::InvalidWithdrawalId)?;
    let reserved_amount = state
        .store
        .get_reserved_amount(withdrawal_id)
        .await?
        .ok_or(ApiError::InvalidWithdrawalId)?;

    check_finalize_amount(request.withdrawal_status, request.amount, reserved_amount)?;

    info!(
        %withdrawal_id,
        status = request.withdrawal_status.as_str(),
        amount = %request.amount,
        "Withdrawal finalized"
    );
    Ok(Json(StatusResponse::new("completed")))
}

pub async fn handle_health() -> Json<StatusResponse> {
    Json(StatusResponse::new("ok"))
}
