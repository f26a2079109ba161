// SPDX-License-Identifier: Apache-2.0

use crate::state::AppState;
use chrono::{NaiveDate, Utc};
use std::fmt::{Display, Formatter};
use sward_engine::{recompute, validate_manual_reset, EngineError, RecalcInput, RecalcOutput};
use sward_model::{
    validate_parameters, GddModel, ModelName, NewModel, Reset, ResetEvent, ResetType, TempUnit,
    ValidationError,
};
use sward_store::{StoreError, WeatherError};
use tracing::info;

#[derive(Debug)]
#[non_exhaustive]
pub enum ServiceError {
    Validation(String),
    /// The model's recompute lock could not be acquired within the bounded
    /// wait; the caller should retry.
    Conflict(i64),
    Store(StoreError),
    Engine(EngineError),
    Weather(WeatherError),
}

impl Display for ServiceError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Validation(msg) => write!(f, "validation failed: {msg}"),
            Self::Conflict(model_id) => {
                write!(f, "model {model_id} is being recomputed, retry shortly")
            }
            Self::Store(err) => write!(f, "{err}"),
            Self::Engine(err) => write!(f, "{err}"),
            Self::Weather(err) => write!(f, "{err}"),
        }
    }
}

impl std::error::Error for ServiceError {}

impl From<StoreError> for ServiceError {
    fn from(value: StoreError) -> Self {
        Self::Store(value)
    }
}

impl From<EngineError> for ServiceError {
    fn from(value: EngineError) -> Self {
        Self::Engine(value)
    }
}

impl From<WeatherError> for ServiceError {
    fn from(value: WeatherError) -> Self {
        Self::Weather(value)
    }
}

impl From<ValidationError> for ServiceError {
    fn from(value: ValidationError) -> Self {
        Self::Validation(value.0)
    }
}

/// Validated create-model input, already past DTO parsing.
#[derive(Debug, Clone)]
pub struct CreateModel {
    pub location_id: i64,
    pub name: String,
    pub unit: TempUnit,
    pub start_date: NaiveDate,
    pub base_temp: f64,
    pub threshold: f64,
    pub reset_on_threshold: bool,
}

#[derive(Debug, Clone, Default)]
pub struct ParameterEdit {
    pub base_temp: Option<f64>,
    pub threshold: Option<f64>,
    pub reset_on_threshold: Option<bool>,
    pub effective_from: Option<NaiveDate>,
    pub recalculate_history: bool,
}

/// One dashboard row per model at a location.
#[derive(Debug, Clone)]
pub struct DashboardRow {
    pub model: GddModel,
    pub current_gdd: f64,
    pub last_reset: Option<NaiveDate>,
    pub run_number: u32,
}

fn today() -> NaiveDate {
    Utc::now().date_naive()
}

/// Loads everything a replay needs, runs it, and persists the replacement
/// set. Callers must hold the model's lock.
async fn run_recompute(
    state: &AppState,
    model: &GddModel,
    manual_resets: &[ResetEvent],
) -> Result<RecalcOutput, ServiceError> {
    let versions = state.store.list_parameter_versions(model.id).await?;
    let weather = state
        .weather
        .daily_series(model.location_id, model.start_date)
        .await?;
    let out = recompute(&RecalcInput {
        model,
        versions: &versions,
        manual_resets,
        weather: &weather,
    })?;
    state
        .store
        .replace_computed(model.id, &out.daily_values, &out.runs, &out.resets)
        .await?;
    info!(
        model_id = model.id,
        days = out.daily_values.len(),
        runs = out.runs.len(),
        resets = out.resets.len(),
        "recomputed model history"
    );
    Ok(out)
}

async fn load_manual_resets(state: &AppState, model_id: i64) -> Result<Vec<ResetEvent>, ServiceError> {
    Ok(state
        .store
        .list_resets(model_id)
        .await?
        .into_iter()
        .filter(|r| r.reset_type == ResetType::Manual)
        .map(|r| r.event())
        .collect())
}

async fn load_reset_events(state: &AppState, model_id: i64) -> Result<Vec<ResetEvent>, ServiceError> {
    Ok(state
        .store
        .list_resets(model_id)
        .await?
        .into_iter()
        .map(|r| r.event())
        .collect())
}

pub async fn create_model(state: &AppState, input: CreateModel) -> Result<GddModel, ServiceError> {
    validate_parameters(input.base_temp, input.threshold)?;
    let new = NewModel {
        location_id: input.location_id,
        name: ModelName::parse(&input.name)?,
        unit: input.unit,
        start_date: input.start_date,
        base_temp: input.base_temp,
        threshold: input.threshold,
        reset_on_threshold: input.reset_on_threshold,
    };
    let model = state.store.create_model(&new).await?;

    let _guard = state
        .locks
        .acquire(model.id, state.api.lock_wait)
        .await
        .map_err(|_| ServiceError::Conflict(model.id))?;
    run_recompute(state, &model, &[]).await?;
    Ok(model)
}

/// Applies a parameter edit as a version upsert followed by a full
/// recompute. A backdated `effective_from` that would rewrite
/// already-computed days requires `recalculate_history`; without it the
/// edit is rejected rather than left silently inert.
pub async fn edit_parameters(
    state: &AppState,
    model_id: i64,
    edit: ParameterEdit,
) -> Result<GddModel, ServiceError> {
    let model = state.store.get_model(model_id).await?;
    let base_temp = edit.base_temp.unwrap_or(model.base_temp);
    let threshold = edit.threshold.unwrap_or(model.threshold);
    let reset_on_threshold = edit.reset_on_threshold.unwrap_or(model.reset_on_threshold);
    validate_parameters(base_temp, threshold)?;
    let effective_from = edit.effective_from.unwrap_or_else(today);

    let _guard = state
        .locks
        .acquire(model_id, state.api.lock_wait)
        .await
        .map_err(|_| ServiceError::Conflict(model_id))?;

    if !edit.recalculate_history {
        if let Some(latest) = state.store.latest_computed_date(model_id).await? {
            if effective_from <= latest {
                return Err(ServiceError::Validation(format!(
                    "effective_from {effective_from} would rewrite computed history \
                     through {latest}; set recalculate_history to confirm"
                )));
            }
        }
    }

    state
        .store
        .upsert_parameter_version(model_id, base_temp, threshold, reset_on_threshold, effective_from)
        .await?;
    let model = state.store.get_model(model_id).await?;
    let manual = load_manual_resets(state, model_id).await?;
    run_recompute(state, &model, &manual).await?;
    Ok(model)
}

pub async fn manual_reset(
    state: &AppState,
    model_id: i64,
    reset_date: NaiveDate,
) -> Result<RecalcOutput, ServiceError> {
    let model = state.store.get_model(model_id).await?;

    let _guard = state
        .locks
        .acquire(model_id, state.api.lock_wait)
        .await
        .map_err(|_| ServiceError::Conflict(model_id))?;

    let latest = state.store.latest_computed_date(model_id).await?;
    let existing = load_reset_events(state, model_id).await?;
    validate_manual_reset(model.start_date, latest, &existing, reset_date)?;

    let mut manual = load_manual_resets(state, model_id).await?;
    manual.push(ResetEvent {
        reset_date,
        run_number: 0, // assigned by the replay
        reset_type: ResetType::Manual,
    });
    run_recompute(state, &model, &manual).await
}

/// Deletes a manual reset, merging its run into the previous one. The
/// replay renumbers everything downstream; threshold resets are never
/// user-deletable since they are regenerated from data and parameters.
pub async fn delete_reset(
    state: &AppState,
    model_id: i64,
    reset_id: i64,
) -> Result<RecalcOutput, ServiceError> {
    let model = state.store.get_model(model_id).await?;
    let reset = state.store.get_reset(model_id, reset_id).await?;
    if reset.reset_type != ResetType::Manual {
        return Err(ServiceError::Validation(
            "only manual resets can be deleted".to_string(),
        ));
    }

    let _guard = state
        .locks
        .acquire(model_id, state.api.lock_wait)
        .await
        .map_err(|_| ServiceError::Conflict(model_id))?;

    let manual: Vec<ResetEvent> = load_manual_resets(state, model_id)
        .await?
        .into_iter()
        .filter(|r| r.reset_date != reset.reset_date)
        .collect();
    run_recompute(state, &model, &manual).await
}

/// Full recompute on demand: the entry point for external triggers such as
/// new weather days landing for the model's location.
pub async fn recompute_model(
    state: &AppState,
    model_id: i64,
) -> Result<RecalcOutput, ServiceError> {
    let model = state.store.get_model(model_id).await?;

    let _guard = state
        .locks
        .acquire(model_id, state.api.lock_wait)
        .await
        .map_err(|_| ServiceError::Conflict(model_id))?;
    let manual = load_manual_resets(state, model_id).await?;
    run_recompute(state, &model, &manual).await
}

pub async fn dashboard(
    state: &AppState,
    location_id: i64,
) -> Result<Vec<DashboardRow>, ServiceError> {
    let today = today();
    let models = state.store.list_models_by_location(location_id).await?;
    let mut rows = Vec::with_capacity(models.len());
    for model in models {
        let latest_reset = state.store.latest_reset_on_or_before(model.id, today).await?;
        let (run_number, last_reset) = match &latest_reset {
            Some(reset) => (reset.run_number, Some(reset.reset_date)),
            None => (1, None),
        };
        let current_gdd = state
            .store
            .latest_value_on_or_before(model.id, run_number, today)
            .await?
            .map_or(0.0, |v| v.cumulative_gdd);
        rows.push(DashboardRow {
            model,
            current_gdd,
            last_reset,
            run_number,
        });
    }
    Ok(rows)
}

pub async fn list_resets(state: &AppState, model_id: i64) -> Result<Vec<Reset>, ServiceError> {
    state.store.list_resets(model_id).await.map_err(Into::into)
}
