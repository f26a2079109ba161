// SPDX-License-Identifier: Apache-2.0

use crate::http::dto::{
    CreateModelRequest, DashboardModelDto, ModelDto, ParameterVersionDto, ResetDto, ResetQuery,
    UpdateParametersRequest, ValueDto,
};
use crate::http::errors::service_error_response;
use crate::service;
use crate::state::AppState;
use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde_json::json;

pub async fn healthz_handler() -> Response {
    Json(json!({ "status": "ok" })).into_response()
}

pub async fn readyz_handler(State(state): State<AppState>) -> Response {
    // Ready once the store answers queries.
    match state.store.list_models().await {
        Ok(_) => Json(json!({ "ready": true })).into_response(),
        Err(_) => (
            StatusCode::SERVICE_UNAVAILABLE,
            Json(json!({ "ready": false })),
        )
            .into_response(),
    }
}

pub async fn create_model_handler(
    State(state): State<AppState>,
    Json(req): Json<CreateModelRequest>,
) -> Response {
    match service::create_model(&state, req.into()).await {
        Ok(model) => (StatusCode::CREATED, Json(ModelDto::from(model))).into_response(),
        Err(err) => service_error_response(err),
    }
}

pub async fn list_models_handler(State(state): State<AppState>) -> Response {
    match state.store.list_models().await {
        Ok(models) => {
            let dto: Vec<ModelDto> = models.into_iter().map(Into::into).collect();
            Json(dto).into_response()
        }
        Err(err) => service_error_response(err.into()),
    }
}

pub async fn get_model_handler(
    State(state): State<AppState>,
    Path(model_id): Path<i64>,
) -> Response {
    match state.store.get_model(model_id).await {
        Ok(model) => Json(ModelDto::from(model)).into_response(),
        Err(err) => service_error_response(err.into()),
    }
}

pub async fn delete_model_handler(
    State(state): State<AppState>,
    Path(model_id): Path<i64>,
) -> Response {
    match state.store.delete_model(model_id).await {
        Ok(()) => StatusCode::NO_CONTENT.into_response(),
        Err(err) => service_error_response(err.into()),
    }
}

pub async fn list_by_location_handler(
    State(state): State<AppState>,
    Path(location_id): Path<i64>,
) -> Response {
    match state.store.list_models_by_location(location_id).await {
        Ok(models) => {
            let dto: Vec<ModelDto> = models.into_iter().map(Into::into).collect();
            Json(dto).into_response()
        }
        Err(err) => service_error_response(err.into()),
    }
}

pub async fn dashboard_handler(
    State(state): State<AppState>,
    Path(location_id): Path<i64>,
) -> Response {
    match service::dashboard(&state, location_id).await {
        Ok(rows) => {
            let dto: Vec<DashboardModelDto> = rows.into_iter().map(Into::into).collect();
            Json(dto).into_response()
        }
        Err(err) => service_error_response(err),
    }
}

/// Parameter history, newest first, the order the frontend renders it.
pub async fn history_handler(
    State(state): State<AppState>,
    Path(model_id): Path<i64>,
) -> Response {
    match state.store.list_parameter_versions(model_id).await {
        Ok(versions) => {
            let dto: Vec<ParameterVersionDto> =
                versions.into_iter().rev().map(Into::into).collect();
            Json(dto).into_response()
        }
        Err(err) => service_error_response(err.into()),
    }
}

pub async fn update_parameters_handler(
    State(state): State<AppState>,
    Path(model_id): Path<i64>,
    Json(req): Json<UpdateParametersRequest>,
) -> Response {
    match service::edit_parameters(&state, model_id, req.into()).await {
        Ok(model) => Json(ModelDto::from(model)).into_response(),
        Err(err) => service_error_response(err),
    }
}

pub async fn reset_handler(
    State(state): State<AppState>,
    Path(model_id): Path<i64>,
    Query(query): Query<ResetQuery>,
) -> Response {
    match service::manual_reset(&state, model_id, query.reset_date).await {
        Ok(out) => Json(json!({
            "message": "reset applied and history recalculated",
            "runs": out.runs.len(),
        }))
        .into_response(),
        Err(err) => service_error_response(err),
    }
}

pub async fn list_resets_handler(
    State(state): State<AppState>,
    Path(model_id): Path<i64>,
) -> Response {
    match service::list_resets(&state, model_id).await {
        Ok(resets) => {
            let dto: Vec<ResetDto> = resets.into_iter().map(Into::into).collect();
            Json(dto).into_response()
        }
        Err(err) => service_error_response(err),
    }
}

pub async fn delete_reset_handler(
    State(state): State<AppState>,
    Path((model_id, reset_id)): Path<(i64, i64)>,
) -> Response {
    match service::delete_reset(&state, model_id, reset_id).await {
        Ok(_) => StatusCode::NO_CONTENT.into_response(),
        Err(err) => service_error_response(err),
    }
}

pub async fn run_values_handler(
    State(state): State<AppState>,
    Path((model_id, run_number)): Path<(i64, u32)>,
) -> Response {
    match state.store.list_values_for_run(model_id, run_number).await {
        Ok(values) => {
            let dto: Vec<ValueDto> = values.into_iter().map(Into::into).collect();
            Json(dto).into_response()
        }
        Err(err) => service_error_response(err.into()),
    }
}
