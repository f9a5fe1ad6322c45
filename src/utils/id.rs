use chrono::Utc;
use rand::Rng;

use crate::api::models::WithdrawalId;

/// Width of the random offset added to the scaled timestamp.
pub const RANDOM_SPREAD: i64 = 1000;

/// Generates a withdrawal id from the current time in milliseconds, scaled
/// by [`RANDOM_SPREAD`], plus a random offset below it.
///
/// Uniqueness is best-effort: two calls in the same millisecond collide with
/// probability 1/1000. Callers that need to be sure check the store.
pub fn generate_withdrawal_id() -> WithdrawalId {
    let offset = rand::thread_rng().gen_range(0..RANDOM_SPREAD);
    withdrawal_id_at(Utc::now().timestamp_millis(), offset)
}

pub fn withdrawal_id_at(timestamp_millis: i64, offset: i64) -> WithdrawalId {
    WithdrawalId(timestamp_millis * RANDOM_SPREAD + offset)
}
