use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde_json::json;
use thiserror::Error;

use crate::models::booking::{Booking, BookingStatus};

#[derive(Debug, Error)]
pub enum AppError {
    #[error("validation failed: {0}")]
    Validation(String),

    #[error("driver is offline")]
    DriverOffline,

    /// Carries the active booking so the driver client can resume it
    /// instead of polling for new work.
    #[error("finish current booking first")]
    DriverBusy(Box<Booking>),

    #[error("booking is not claimable")]
    NotClaimable,

    #[error("invalid transition: booking is {actual}")]
    InvalidTransition { actual: BookingStatus },

    #[error("booking belongs to another driver")]
    NotOwner,

    #[error("not found: {0}")]
    NotFound(String),

    #[error("unauthorized: {0}")]
    Unauthorized(String),

    #[error("forbidden: {0}")]
    Forbidden(String),

    #[error("internal error: {0}")]
    Internal(String),
}

impl AppError {
    /// Stable machine-readable kind, independent of the human message.
    pub fn kind(&self) -> &'static str {
        match self {
            AppError::Validation(_) => "validation_error",
            AppError::DriverOffline => "driver_offline",
            AppError::DriverBusy(_) => "driver_busy",
            AppError::NotClaimable => "not_claimable",
            AppError::InvalidTransition { .. } => "invalid_transition",
            AppError::NotOwner => "not_owner",
            AppError::NotFound(_) => "not_found",
            AppError::Unauthorized(_) => "unauthorized",
            AppError::Forbidden(_) => "forbidden",
            AppError::Internal(_) => "internal",
        }
    }

    fn status_code(&self) -> StatusCode {
        match self {
            AppError::Validation(_) => StatusCode::BAD_REQUEST,
            AppError::DriverOffline => StatusCode::FORBIDDEN,
            AppError::DriverBusy(_) => StatusCode::CONFLICT,
            AppError::NotClaimable => StatusCode::CONFLICT,
            AppError::InvalidTransition { .. } => StatusCode::CONFLICT,
            AppError::NotOwner => StatusCode::FORBIDDEN,
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
            AppError::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            AppError::Forbidden(_) => StatusCode::FORBIDDEN,
            AppError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status_code();

        if status == StatusCode::INTERNAL_SERVER_ERROR {
            tracing::error!(error = %self, "request failed");
        }

        let mut error = json!({
            "kind": self.kind(),
            "message": self.to_string(),
        });

        if let AppError::DriverBusy(booking) = &self {
            error["booking"] = json!(booking);
        }

        (status, Json(json!({ "error": error }))).into_response()
    }
}
