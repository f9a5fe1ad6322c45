//! Field validation for the withdrawal endpoints.
//!
//! Every validator applies its rules in a fixed order and stops at the first
//! failure. Clients match on the resulting messages, so both the order and
//! the wording are part of the protocol.

use serde_json::{Map, Value};
use thiserror::Error;

use crate::api::models::{
    Amount, FinalizeRequest, FinalizeStatus, ProcessRequest, ReserveRequest, WithdrawalId,
};

pub type JsonObject = Map<String, Value>;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("wallet_id and amount are required.")]
    ReserveFieldsRequired,

    #[error("withdrawal_id and amount are required.")]
    ProcessFieldsRequired,

    #[error("withdrawal_id, withdrawal_status, and amount are required.")]
    FinalizeFieldsRequired,

    #[error("withdrawal_id must be a number.")]
    WithdrawalIdNotNumber,

    #[error("withdrawal_status must be a string.")]
    StatusNotString,

    #[error("withdrawal_status must be one of: {}", FinalizeStatus::ALLOWED.join(", "))]
    StatusNotAllowed,

    #[error("amount must be a positive number.")]
    AmountNotPositive,

    #[error("amount must be a non-negative number.")]
    AmountNegative,

    #[error("For status full, amount must equal reserved amount.")]
    FullAmountMismatch,

    #[error("For status partial, amount must be greater than 0 and less than reserved amount.")]
    PartialAmountOutOfRange,

    #[error("For status released, amount must be 0.")]
    ReleasedAmountNotZero,
}

/// Validates a reserve body.
pub fn validate_reserve(body: &JsonObject) -> Result<ReserveRequest, ValidationError> {
    let wallet_id = match body.get("wallet_id") {
        None | Some(Value::Null) => return Err(ValidationError::ReserveFieldsRequired),
        Some(Value::String(s)) if s.is_empty() => {
            return Err(ValidationError::ReserveFieldsRequired)
        }
        Some(value) => value.clone(),
    };
    let amount = body
        .get("amount")
        .ok_or(ValidationError::ReserveFieldsRequired)?;

    let amount = positive_amount(amount)?;

    Ok(ReserveRequest { wallet_id, amount })
}

/// Validates the shape of a process body. Existence of the id is checked by
/// the caller afterwards.
pub fn validate_process(body: &JsonObject) -> Result<ProcessRequest, ValidationError> {
    let (Some(withdrawal_id), Some(amount)) = (body.get("withdrawal_id"), body.get("amount"))
    else {
        return Err(ValidationError::ProcessFieldsRequired);
    };

    let withdrawal_id = numeric_withdrawal_id(withdrawal_id)?;
    let amount = positive_amount(amount)?;

    Ok(ProcessRequest {
        withdrawal_id,
        amount,
    })
}

/// Validates the shape of a finalize body. The status/amount rules that
/// depend on the reserved amount live in [`check_finalize_amount`].
pub fn validate_finalize(body: &JsonObject) -> Result<FinalizeRequest, ValidationError> {
    let (Some(withdrawal_id), Some(status), Some(amount)) = (
        body.get("withdrawal_id"),
        body.get("withdrawal_status"),
        body.get("amount"),
    ) else {
        return Err(ValidationError::FinalizeFieldsRequired);
    };

    let withdrawal_id = numeric_withdrawal_id(withdrawal_id)?;

    let status = status.as_str().ok_or(ValidationError::StatusNotString)?;
    let withdrawal_status =
        FinalizeStatus::parse(status).ok_or(ValidationError::StatusNotAllowed)?;

    let amount = match amount.as_f64() {
        Some(value) if value >= 0.0 => Amount(value),
        _ => return Err(ValidationError::AmountNegative),
    };

    Ok(FinalizeRequest {
        withdrawal_id,
        withdrawal_status,
        amount,
    })
}

/// Cross-checks a finalize amount against the amount fixed at reservation.
pub fn check_finalize_amount(
    status: FinalizeStatus,
    amount: Amount,
    reserved: Amount,
) -> Result<(), ValidationError> {
    match status {
        FinalizeStatus::Full if amount != reserved => Err(ValidationError::FullAmountMismatch),
        FinalizeStatus::Partial if amount <= Amount::ZERO || amount >= reserved => {
            Err(ValidationError::PartialAmountOutOfRange)
        }
        FinalizeStatus::Released if amount != Amount::ZERO => {
            Err(ValidationError::ReleasedAmountNotZero)
        }
        _ => Ok(()),
    }
}

fn positive_amount(value: &Value) -> Result<Amount, ValidationError> {
    match value.as_f64() {
        Some(amount) if amount > 0.0 => Ok(Amount(amount)),
        _ => Err(ValidationError::AmountNotPositive),
    }
}

/// Any JSON number passes; only integral values that fit an `i64` map to an id.
fn numeric_withdrawal_id(value: &Value) -> Result<Option<WithdrawalId>, ValidationError> {
    let Value::Number(number) = value else {
        return Err(ValidationError::WithdrawalIdNotNumber);
    };

    if let Some(id) = number.as_i64() {
        return Ok(Some(WithdrawalId(id)));
    }

    Ok(number
        .as_f64()
        .filter(|id| id.fract() == 0.0 && *id >= i64::MIN as f64 && *id < i64::MAX as f64)
        .map(|id| WithdrawalId(id as i64)))
}
