use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use thiserror::Error;
use tracing::{debug, error};

use crate::api::models::ErrorResponse;
use crate::api::validation::ValidationError;
use crate::db::StoreError;

#[derive(Debug, Error)]
pub enum ApiError {
    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error("Invalid withdrawal_id.")]
    InvalidWithdrawalId,

    #[error("Malformed JSON")]
    MalformedJson,

    #[error("Internal server error")]
    Internal(#[from] StoreError),

    #[error("Could not allocate a unique withdrawal id after {0} attempts")]
    IdExhausted(u32),
}

impl ApiError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            Self::Validation(_) | Self::InvalidWithdrawalId | Self::MalformedJson => {
                StatusCode::BAD_REQUEST
            }
            Self::Internal(_) | Self::IdExhausted(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        let message = match &self {
            Self::Internal(source) => {
                error!(error = %source, "Store failure");
                "Internal server error".to_string()
            }
            Self::IdExhausted(_) => {
                error!(error = %self, "Id generation failure");
                "Internal server error".to_string()
            }
            other => {
                debug!(error = %other, "Validation failed");
                other.to_string()
            }
        };

        (status, Json(ErrorResponse { error: message })).into_response()
    }
}
