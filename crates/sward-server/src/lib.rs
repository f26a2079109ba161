#![forbid(unsafe_code)]

//! REST surface over the GDD accumulation core. Mutations funnel through
//! the service layer, which serializes each model's load→compute→persist
//! behind a keyed lock; readers go straight to the store.

pub mod config;
pub mod http;
pub mod service;
pub mod state;

pub use config::ApiConfig;
pub use state::{AppState, ModelLocks};

use axum::body::Body;
use axum::extract::{DefaultBodyLimit, State};
use axum::http::Request;
use axum::middleware::{from_fn_with_state, Next};
use axum::response::Response;
use axum::routing::{delete, get, post, put};
use axum::Router;
use std::time::Instant;
use tracing::info;

async fn request_audit_middleware(
    State(state): State<AppState>,
    req: Request<Body>,
    next: Next,
) -> Response {
    let started = Instant::now();
    let method = req.method().clone();
    let path = req.uri().path().to_string();
    let resp = next.run(req).await;
    if state.api.enable_audit_log {
        info!(
            target: "sward_audit",
            method = %method,
            path = %path,
            status = resp.status().as_u16(),
            latency_ms = started.elapsed().as_millis() as u64,
            "audit"
        );
    }
    resp
}

pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/healthz", get(http::handlers::healthz_handler))
        .route("/readyz", get(http::handlers::readyz_handler))
        .route(
            "/gdd_models/",
            post(http::handlers::create_model_handler).get(http::handlers::list_models_handler),
        )
        .route(
            "/gdd_models/location/:location_id",
            get(http::handlers::list_by_location_handler),
        )
        .route(
            "/gdd_models/location/:location_id/dashboard",
            get(http::handlers::dashboard_handler),
        )
        .route(
            "/gdd_models/:model_id",
            get(http::handlers::get_model_handler).delete(http::handlers::delete_model_handler),
        )
        .route(
            "/gdd_models/:model_id/history",
            get(http::handlers::history_handler),
        )
        .route(
            "/gdd_models/:model_id/parameters",
            put(http::handlers::update_parameters_handler),
        )
        .route(
            "/gdd_models/:model_id/reset",
            post(http::handlers::reset_handler),
        )
        .route(
            "/gdd_models/:model_id/resets",
            get(http::handlers::list_resets_handler),
        )
        .route(
            "/gdd_models/:model_id/resets/:reset_id",
            delete(http::handlers::delete_reset_handler),
        )
        .route(
            "/gdd_models/:model_id/runs/:run_number/values",
            get(http::handlers::run_values_handler),
        )
        .layer(from_fn_with_state(state.clone(), request_audit_middleware))
        .layer(DefaultBodyLimit::max(state.api.max_body_bytes))
        .with_state(state)
}
