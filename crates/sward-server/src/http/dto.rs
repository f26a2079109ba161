// SPDX-License-Identifier: Apache-2.0

use crate::service::{CreateModel, DashboardRow, ParameterEdit};
use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use sward_model::{DailyValue, GddModel, ParameterVersion, Reset, ResetType, TempUnit};

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct CreateModelRequest {
    pub name: String,
    pub location_id: i64,
    pub unit: TempUnit,
    pub start_date: NaiveDate,
    pub base_temp: f64,
    pub threshold: f64,
    pub reset_on_threshold: bool,
}

impl From<CreateModelRequest> for CreateModel {
    fn from(value: CreateModelRequest) -> Self {
        Self {
            location_id: value.location_id,
            name: value.name,
            unit: value.unit,
            start_date: value.start_date,
            base_temp: value.base_temp,
            threshold: value.threshold,
            reset_on_threshold: value.reset_on_threshold,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct UpdateParametersRequest {
    pub base_temp: Option<f64>,
    pub threshold: Option<f64>,
    pub reset_on_threshold: Option<bool>,
    pub effective_from: Option<NaiveDate>,
    #[serde(default)]
    pub recalculate_history: bool,
}

impl From<UpdateParametersRequest> for ParameterEdit {
    fn from(value: UpdateParametersRequest) -> Self {
        Self {
            base_temp: value.base_temp,
            threshold: value.threshold,
            reset_on_threshold: value.reset_on_threshold,
            effective_from: value.effective_from,
            recalculate_history: value.recalculate_history,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct ResetQuery {
    pub reset_date: NaiveDate,
}

#[derive(Debug, Clone, Serialize)]
pub struct ModelDto {
    pub id: i64,
    pub location_id: i64,
    pub name: String,
    pub unit: TempUnit,
    pub start_date: NaiveDate,
    pub base_temp: f64,
    pub threshold: f64,
    pub reset_on_threshold: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<GddModel> for ModelDto {
    fn from(value: GddModel) -> Self {
        Self {
            id: value.id,
            location_id: value.location_id,
            name: value.name.into_inner(),
            unit: value.unit,
            start_date: value.start_date,
            base_temp: value.base_temp,
            threshold: value.threshold,
            reset_on_threshold: value.reset_on_threshold,
            created_at: value.created_at,
            updated_at: value.updated_at,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct DashboardModelDto {
    #[serde(flatten)]
    pub model: ModelDto,
    pub current_gdd: f64,
    pub last_reset: Option<NaiveDate>,
    pub run_number: u32,
}

impl From<DashboardRow> for DashboardModelDto {
    fn from(value: DashboardRow) -> Self {
        Self {
            model: ModelDto::from(value.model),
            current_gdd: value.current_gdd,
            last_reset: value.last_reset,
            run_number: value.run_number,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct ParameterVersionDto {
    pub id: i64,
    pub base_temp: f64,
    pub threshold: f64,
    pub reset_on_threshold: bool,
    pub effective_from: NaiveDate,
    pub created_at: DateTime<Utc>,
}

impl From<ParameterVersion> for ParameterVersionDto {
    fn from(value: ParameterVersion) -> Self {
        Self {
            id: value.id,
            base_temp: value.base_temp,
            threshold: value.threshold,
            reset_on_threshold: value.reset_on_threshold,
            effective_from: value.effective_from,
            created_at: value.created_at,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct ResetDto {
    pub id: i64,
    pub model_id: i64,
    pub reset_date: NaiveDate,
    pub run_number: u32,
    pub reset_type: ResetType,
    pub created_at: DateTime<Utc>,
}

impl From<Reset> for ResetDto {
    fn from(value: Reset) -> Self {
        Self {
            id: value.id,
            model_id: value.model_id,
            reset_date: value.reset_date,
            run_number: value.run_number,
            reset_type: value.reset_type,
            created_at: value.created_at,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct ValueDto {
    pub date: NaiveDate,
    pub daily_gdd: f64,
    pub cumulative_gdd: f64,
    pub run_number: u32,
}

impl From<DailyValue> for ValueDto {
    fn from(value: DailyValue) -> Self {
        Self {
            date: value.date,
            daily_gdd: value.daily_gdd,
            cumulative_gdd: value.cumulative_gdd,
            run_number: value.run_number,
        }
    }
}
