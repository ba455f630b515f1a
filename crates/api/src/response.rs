//! Response envelope shared by every endpoint.
//!
//! Every body has the shape `{status, resp_code, data?, error?}`.

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use medstore_db::repositories::{CatalogError, PatientError, StockLedgerError};
use medstore_shared::AppError;
use serde::Serialize;
use serde_json::{Value, json};
use tracing::{error, warn};

/// Response code of every successful call.
pub const SUCCESS: &str = "SUCCESS";

/// Wire form of the envelope.
#[derive(Debug, Serialize)]
pub struct Envelope<T> {
    /// True on success.
    pub status: bool,
    /// Machine-readable outcome.
    pub resp_code: &'static str,
    /// Payload.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
    /// Error message on failure.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

/// A successful response.
#[derive(Debug)]
pub struct ApiResponse<T> {
    status: StatusCode,
    data: Option<T>,
}

impl<T: Serialize> ApiResponse<T> {
    /// 200 with a payload.
    pub const fn ok(data: T) -> Self {
        Self {
            status: StatusCode::OK,
            data: Some(data),
        }
    }

    /// 201 with a payload.
    pub const fn created(data: T) -> Self {
        Self {
            status: StatusCode::CREATED,
            data: Some(data),
        }
    }
}

impl ApiResponse<()> {
    /// 200 without a payload.
    pub const fn empty() -> Self {
        Self {
            status: StatusCode::OK,
            data: None,
        }
    }
}

impl<T: Serialize> IntoResponse for ApiResponse<T> {
    fn into_response(self) -> Response {
        let body = Envelope {
            status: true,
            resp_code: SUCCESS,
            data: self.data,
            error: None,
        };
        (self.status, Json(body)).into_response()
    }
}

/// A failed response carrying an [`AppError`] and optional details.
#[derive(Debug)]
pub struct ApiError {
    error: AppError,
    data: Option<Value>,
}

impl ApiError {
    /// Validation failure with per-field details.
    pub fn validation(errors: &validator::ValidationErrors) -> Self {
        Self {
            error: AppError::Validation(errors.to_string()),
            data: serde_json::to_value(errors).ok(),
        }
    }

    /// The underlying application error.
    pub const fn error(&self) -> &AppError {
        &self.error
    }
}

impl From<AppError> for ApiError {
    fn from(error: AppError) -> Self {
        let data = match &error {
            AppError::InsufficientStock {
                medicine_id,
                available,
                requested,
            } => Some(json!({
                "medicine_id": medicine_id,
                "available": available,
                "requested": requested,
            })),
            _ => None,
        };
        Self { error, data }
    }
}

impl From<StockLedgerError> for ApiError {
    fn from(error: StockLedgerError) -> Self {
        AppError::from(error).into()
    }
}

impl From<CatalogError> for ApiError {
    fn from(error: CatalogError) -> Self {
        AppError::from(error).into()
    }
}

impl From<PatientError> for ApiError {
    fn from(error: PatientError) -> Self {
        AppError::from(error).into()
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = StatusCode::from_u16(self.error.status_code())
            .unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);

        if status.is_server_error() {
            error!(error = %self.error, "Request failed");
        } else {
            warn!(resp_code = self.error.resp_code(), error = %self.error, "Request rejected");
        }

        let body = Envelope {
            status: false,
            resp_code: self.error.resp_code(),
            data: self.data,
            error: Some(self.error.to_string()),
        };
        (status, Json(body)).into_response()
    }
}

/// Result type for handlers.
pub type ApiResult<T> = Result<ApiResponse<T>, ApiError>;
