//! HTTP request handlers for the payroll API.
//!
//! The body of `POST /payroll/calculate` is a `CALCULATE_PAYROLL` protocol
//! message; the reply is the `PAYROLL_RESULT` or `PAYROLL_ERROR` message the
//! dispatcher produced.

use std::time::Instant;

use axum::{
    extract::{rejection::JsonRejection, State},
    http::{header, StatusCode},
    response::{IntoResponse, Response},
    routing::post,
    Json, Router,
};
use tracing::{info, warn};
use uuid::Uuid;

use crate::dispatcher::{WorkerDispatcher, WorkerRequest, WorkerResponse};

use super::response::{ApiError, ApiErrorResponse};
use super::state::AppState;

/// Creates the API router with all endpoints.
pub fn create_router(state: AppState) -> Router {
    Router::new()
        .route("/payroll/calculate", post(calculate_handler))
        .with_state(state)
}

/// Handler for POST /payroll/calculate.
///
/// Every request gets its own dispatcher, so concurrent requests never see
/// `CalculationInProgress`.
async fn calculate_handler(
    State(state): State<AppState>,
    payload: Result<Json<WorkerRequest>, JsonRejection>,
) -> Response {
    let correlation_id = Uuid::new_v4();
    info!(correlation_id = %correlation_id, "Processing payroll request");

    let request = match payload {
        Ok(Json(request)) => request,
        Err(rejection) => {
            let error = match rejection {
                JsonRejection::JsonDataError(err) => {
                    let body_text = err.body_text();
                    warn!(
                        correlation_id = %correlation_id,
                        error = %body_text,
                        "JSON data error"
                    );
                    ApiError::malformed_json(body_text)
                }
                JsonRejection::JsonSyntaxError(err) => {
                    warn!(
                        correlation_id = %correlation_id,
                        error = %err,
                        "JSON syntax error"
                    );
                    ApiError::malformed_json(format!("Invalid JSON syntax: {}", err))
                }
                JsonRejection::MissingJsonContentType(_) => {
                    ApiError::new("MISSING_CONTENT_TYPE", "Content-Type must be application/json")
                }
                _ => ApiError::malformed_json("Failed to parse request body"),
            };
            return (
                StatusCode::BAD_REQUEST,
                [(header::CONTENT_TYPE, "application/json")],
                Json(error),
            )
                .into_response();
        }
    };

    let start_time = Instant::now();
    let dispatcher = WorkerDispatcher::new(state.settings().clone());
    match dispatcher.run(request).await {
        Ok(response) => {
            let status = match &response {
                WorkerResponse::PayrollResult(result) => {
                    info!(
                        correlation_id = %correlation_id,
                        lines = result.payroll_lines.len(),
                        total_amount = %result.summary.total_amount,
                        duration_us = start_time.elapsed().as_micros(),
                        "Payroll calculated"
                    );
                    StatusCode::OK
                }
                WorkerResponse::PayrollError(error) => {
                    warn!(
                        correlation_id = %correlation_id,
                        error = %error.error,
                        "Payroll calculation failed"
                    );
                    StatusCode::UNPROCESSABLE_ENTITY
                }
            };
            (
                status,
                [(header::CONTENT_TYPE, "application/json")],
                Json(response),
            )
                .into_response()
        }
        Err(err) => {
            warn!(
                correlation_id = %correlation_id,
                error = %err,
                "Dispatcher rejected request"
            );
            let api_error: ApiErrorResponse = err.into();
            (
                api_error.status,
                [(header::CONTENT_TYPE, "application/json")],
                Json(api_error.error),
            )
                .into_response()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ConfigLoader;
    use axum::body::Body;
    use axum::http::Request;
    use serde_json::{json, Value};
    use tower::ServiceExt;

    fn create_test_state() -> AppState {
        let config = ConfigLoader::load("./config/default").expect("Failed to load config");
        AppState::new(config)
    }

    async fn post(body: String) -> (StatusCode, Value) {
        let response = create_router(create_test_state())
            .oneshot(
                Request::builder()
                    .method("POST")
                    .uri("/payroll/calculate")
                    .header("Content-Type", "application/json")
                    .body(Body::from(body))
                    .unwrap(),
            )
            .await
            .unwrap();

        let status = response.status();
        let body = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        (status, serde_json::from_slice(&body).unwrap())
    }

    #[tokio::test]
    async fn test_valid_request_returns_200() {
        let body = json!({
            "type": "CALCULATE_PAYROLL",
            "payload": {
                "workRecords": [{
                    "id": "r1",
                    "workerId": "A",
                    "eventId": "E1",
                    "date": "2025-01-01",
                    "role": "dealer",
                    "scheduledStartTime": "2025-01-01T10:00:00",
                    "scheduledEndTime": "2025-01-01T18:00:00"
                }],
                "roster": [],
                "startDate": "2025-01-01",
                "endDate": "2025-01-31"
            }
        });

        let (status, value) = post(body.to_string()).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(value["type"], "PAYROLL_RESULT");
        assert_eq!(value["payload"]["payrollLines"].as_array().unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_reversed_period_returns_422() {
        let body = json!({
            "type": "CALCULATE_PAYROLL",
            "payload": { "startDate": "2025-02-01", "endDate": "2025-01-01" }
        });

        let (status, value) = post(body.to_string()).await;
        assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
        assert_eq!(value["type"], "PAYROLL_ERROR");
    }

    #[tokio::test]
    async fn test_malformed_json_returns_400() {
        let (status, value) = post("{invalid json".to_string()).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(value["code"], "MALFORMED_JSON");
    }

    #[tokio::test]
    async fn test_unknown_message_type_returns_400() {
        let (status, value) = post(json!({ "type": "SHUTDOWN", "payload": {} }).to_string()).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(value["code"], "MALFORMED_JSON");
    }
}
