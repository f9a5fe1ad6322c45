use serde::{Deserialize, Serialize, Serializer};
use std::fmt;

/// Fixed one-time password returned by every reservation.
pub const MOCK_OTP: &str = "56565";

/// Largest integer an `f64` represents exactly (2^53 - 1).
const MAX_EXACT_INTEGER: f64 = 9_007_199_254_740_991.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct WithdrawalId(pub i64);

impl fmt::Display for WithdrawalId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A monetary amount as carried on the wire.
///
/// Whole values serialize without a fractional part so that a reserved
/// amount of `500` is echoed back as `500`, not `500.0`.
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Deserialize)]
#[serde(transparent)]
pub struct Amount(pub f64);

impl Amount {
    pub const ZERO: Amount = Amount(0.0);

    pub fn value(self) -> f64 {
        self.0
    }
}

impl fmt::Display for Amount {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl Serialize for Amount {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let value = self.0;
        if value.fract() == 0.0 && value.abs() <= MAX_EXACT_INTEGER {
            serializer.serialize_i64(value as i64)
        } else {
            serializer.serialize_f64(value)
        }
    }
}

/// Outcome requested by the client when finalizing a reservation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FinalizeStatus {
    /// The entire reserved amount is withdrawn.
    Full,
    /// Strictly less than the reserved amount is withdrawn.
    Partial,
    /// The reservation is cancelled and nothing is withdrawn.
    Released,
}

impl FinalizeStatus {
    pub const ALLOWED: [&'static str; 3] = ["full", "partial", "released"];

    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "full" => Some(Self::Full),
            "partial" => Some(Self::Partial),
            "released" => Some(Self::Released),
            _ => None,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Full => "full",
            Self::Partial => "partial",
            Self::Released => "released",
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ReserveRequest {
    pub wallet_id: serde_json::Value,
    pub amount: Amount,
}

/// A process request that passed shape validation.
///
/// `withdrawal_id` is `None` when the client sent a number that cannot name
/// any record (fractional or out of range); it then fails the existence check.
#[derive(Debug, Clone, PartialEq)]
pub struct ProcessRequest {
    pub withdrawal_id: Option<WithdrawalId>,
    pub amount: Amount,
}

#[derive(Debug, Clone, PartialEq)]
pub struct FinalizeRequest {
    pub withdrawal_id: Option<WithdrawalId>,
    pub withdrawal_status: FinalizeStatus,
    pub amount: Amount,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ReserveResponse {
    pub withdrawal_id: WithdrawalId,
    pub status: String,
    pub reserved_amount: Amount,
    #[serde(rename = "sentOTP")]
    pub sent_otp: String,
}

impl ReserveResponse {
    pub fn reserved(withdrawal_id: WithdrawalId, reserved_amount: Amount) -> Self {
        Self {
            withdrawal_id,
            status: "reserved".to_string(),
            reserved_amount,
            sent_otp: MOCK_OTP.to_string(),
        }
    }
}

#[derive(Debug, Serialize, Deserialize)]
pub struct StatusResponse {
    pub status: String,
}

impl StatusResponse {
    pub fn new(status: &str) -> Self {
        Self {
            status: status.to_string(),
        }
    }
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: String,
}
