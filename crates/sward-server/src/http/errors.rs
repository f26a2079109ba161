// SPDX-License-Identifier: Apache-2.0

use crate::service::ServiceError;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Serialize;
use serde_json::{json, Value};
use sward_engine::EngineError;
use sward_store::StoreError;
use tracing::error;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
#[non_exhaustive]
pub enum ApiErrorCode {
    ValidationFailed,
    ModelNotFound,
    ResetNotFound,
    RunNotFound,
    InvalidResetDate,
    DuplicateResetDate,
    DataGap,
    RecomputeConflict,
    UpstreamUnavailable,
    Internal,
}

#[derive(Debug, Clone, Serialize)]
pub struct ApiError {
    pub code: ApiErrorCode,
    pub message: String,
    pub details: Value,
}

impl ApiError {
    #[must_use]
    pub fn new(code: ApiErrorCode, message: impl Into<String>, details: Value) -> Self {
        Self {
            code,
            message: message.into(),
            details,
        }
    }
}

pub(crate) fn api_error_response(status: StatusCode, err: ApiError) -> Response {
    (status, Json(json!({ "error": err }))).into_response()
}

/// Maps the service taxonomy onto HTTP. Recompute failures reach here only
/// after nothing was persisted, so a 4xx/5xx always leaves the previously
/// stored history intact and visible.
pub(crate) fn service_error_response(err: ServiceError) -> Response {
    match err {
        ServiceError::Validation(msg) => api_error_response(
            StatusCode::BAD_REQUEST,
            ApiError::new(ApiErrorCode::ValidationFailed, msg, json!({})),
        ),
        ServiceError::Conflict(model_id) => api_error_response(
            StatusCode::CONFLICT,
            ApiError::new(
                ApiErrorCode::RecomputeConflict,
                "another recompute holds this model, retry shortly",
                json!({ "model_id": model_id }),
            ),
        ),
        ServiceError::Store(err) => store_error_response(err),
        ServiceError::Engine(err) => engine_error_response(err),
        ServiceError::Weather(err) => api_error_response(
            StatusCode::BAD_GATEWAY,
            ApiError::new(
                ApiErrorCode::UpstreamUnavailable,
                err.to_string(),
                json!({}),
            ),
        ),
    }
}

fn store_error_response(err: StoreError) -> Response {
    match err {
        StoreError::ModelNotFound(id) => api_error_response(
            StatusCode::NOT_FOUND,
            ApiError::new(
                ApiErrorCode::ModelNotFound,
                format!("gdd model {id} not found"),
                json!({ "model_id": id }),
            ),
        ),
        StoreError::ResetNotFound(id) => api_error_response(
            StatusCode::NOT_FOUND,
            ApiError::new(
                ApiErrorCode::ResetNotFound,
                format!("reset {id} not found"),
                json!({ "reset_id": id }),
            ),
        ),
        StoreError::RunNotFound {
            model_id,
            run_number,
        } => api_error_response(
            StatusCode::NOT_FOUND,
            ApiError::new(
                ApiErrorCode::RunNotFound,
                format!("model {model_id} has no run {run_number}"),
                json!({ "model_id": model_id, "run_number": run_number }),
            ),
        ),
        StoreError::DuplicateModelName { location_id, name } => api_error_response(
            StatusCode::BAD_REQUEST,
            ApiError::new(
                ApiErrorCode::ValidationFailed,
                "model name must be unique per location",
                json!({ "location_id": location_id, "name": name }),
            ),
        ),
        StoreError::Sqlite(msg) => {
            error!(error = %msg, "store failure");
            api_error_response(
                StatusCode::INTERNAL_SERVER_ERROR,
                ApiError::new(ApiErrorCode::Internal, "storage failure", json!({})),
            )
        }
    }
}

fn engine_error_response(err: EngineError) -> Response {
    match err {
        EngineError::DataGap { from, to } => api_error_response(
            StatusCode::UNPROCESSABLE_ENTITY,
            ApiError::new(
                ApiErrorCode::DataGap,
                format!("missing weather data from {from} to {to}"),
                json!({ "from": from, "to": to }),
            ),
        ),
        EngineError::InvalidResetDate { date, reason } => api_error_response(
            StatusCode::BAD_REQUEST,
            ApiError::new(
                ApiErrorCode::InvalidResetDate,
                format!("invalid reset date {date}: {reason}"),
                json!({ "reset_date": date }),
            ),
        ),
        EngineError::DuplicateResetDate { date } => api_error_response(
            StatusCode::CONFLICT,
            ApiError::new(
                ApiErrorCode::DuplicateResetDate,
                format!("a reset already exists on {date}"),
                json!({ "reset_date": date }),
            ),
        ),
        // Unreachable while the first-version invariant holds; do not
        // swallow it if it ever surfaces.
        other => {
            error!(error = %other, "recompute integrity failure");
            api_error_response(
                StatusCode::INTERNAL_SERVER_ERROR,
                ApiError::new(ApiErrorCode::Internal, other.to_string(), json!({})),
            )
        }
    }
}
