//! Error bodies for the payroll HTTP API.
//!
//! Calculation outcomes travel as protocol messages; an [`ApiError`] is only
//! returned when a request never reaches the pipeline.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};

use crate::error::EngineError;

/// Error body returned for requests the dispatcher did not answer.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiError {
    /// Stable code, e.g. `MALFORMED_JSON`.
    pub code: String,
    /// What went wrong.
    pub message: String,
    /// How the caller can recover, when there is something to say.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<String>,
}

impl ApiError {
    /// Creates an error without details.
    pub fn new(code: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            code: code.into(),
            message: message.into(),
            details: None,
        }
    }

    /// Attaches a recovery hint.
    pub fn hint(mut self, details: impl Into<String>) -> Self {
        self.details = Some(details.into());
        self
    }

    /// A body that is not a valid `CALCULATE_PAYROLL` message.
    pub fn malformed_json(message: impl Into<String>) -> Self {
        Self::new("MALFORMED_JSON", message)
            .hint("expected {\"type\":\"CALCULATE_PAYROLL\",\"payload\":{...}}")
    }
}

/// An [`ApiError`] paired with its HTTP status.
#[derive(Debug)]
pub struct ApiErrorResponse {
    /// HTTP status.
    pub status: StatusCode,
    /// Body.
    pub error: ApiError,
}

impl IntoResponse for ApiErrorResponse {
    fn into_response(self) -> Response {
        (self.status, Json(self.error)).into_response()
    }
}

impl From<EngineError> for ApiErrorResponse {
    fn from(error: EngineError) -> Self {
        let message = error.to_string();
        let (status, error) = match error {
            EngineError::ConfigNotFound { .. } | EngineError::ConfigParseError { .. } => (
                StatusCode::INTERNAL_SERVER_ERROR,
                ApiError::new("CONFIG_ERROR", message),
            ),
            EngineError::InvalidRecord { .. } | EngineError::AmbiguousTime { .. } => (
                StatusCode::BAD_REQUEST,
                ApiError::new("INVALID_INPUT", message),
            ),
            EngineError::RateResolution { .. } => (
                StatusCode::INTERNAL_SERVER_ERROR,
                ApiError::new("RATE_RESOLUTION", message),
            ),
            EngineError::InvalidPeriod { .. } => (
                StatusCode::UNPROCESSABLE_ENTITY,
                ApiError::new("INVALID_PERIOD", message)
                    .hint("startDate and endDate are inclusive YYYY-MM-DD dates, start first"),
            ),
            EngineError::MalformedMessage { message } => {
                (StatusCode::BAD_REQUEST, ApiError::malformed_json(message))
            }
            EngineError::CalculationInProgress => (
                StatusCode::CONFLICT,
                ApiError::new("CALCULATION_IN_PROGRESS", message)
                    .hint("wait for the running calculation or cancel it"),
            ),
            EngineError::Cancelled => (
                StatusCode::SERVICE_UNAVAILABLE,
                ApiError::new("CANCELLED", message).hint("retry the request"),
            ),
            EngineError::Execution { .. } => (
                StatusCode::INTERNAL_SERVER_ERROR,
                ApiError::new("EXECUTION_ERROR", message),
            ),
        };
        ApiErrorResponse { status, error }
    }
}
