use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use std::fmt::{Display, Formatter};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationError(pub String);

impl Display for ValidationError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl std::error::Error for ValidationError {}

pub const MODEL_NAME_MAX_LEN: usize = 100;

/// Temperature unit a model was created in. Display-only: all arithmetic
/// happens in the model's native unit, never converted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TempUnit {
    C,
    F,
}

impl TempUnit {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::C => "C",
            Self::F => "F",
        }
    }

    pub fn parse(input: &str) -> Result<Self, ValidationError> {
        match input {
            "C" => Ok(Self::C),
            "F" => Ok(Self::F),
            other => Err(ValidationError(format!(
                "unit must be C or F, got {other:?}"
            ))),
        }
    }
}

impl Display for TempUnit {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize, PartialOrd, Ord)]
#[serde(transparent)]
pub struct ModelName(String);

impl ModelName {
    pub fn parse(input: &str) -> Result<Self, ValidationError> {
        let s = input.trim();
        if s.is_empty() {
            return Err(ValidationError("model name must not be empty".to_string()));
        }
        if s.len() > MODEL_NAME_MAX_LEN {
            return Err(ValidationError(format!(
                "model name exceeds max length {MODEL_NAME_MAX_LEN}"
            )));
        }
        Ok(Self(s.to_string()))
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    #[must_use]
    pub fn into_inner(self) -> String {
        self.0
    }
}

impl Display for ModelName {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A growing-degree-day model. `base_temp`, `threshold`, and
/// `reset_on_threshold` mirror the latest parameter version; the version
/// timeline remains authoritative for computation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GddModel {
    pub id: i64,
    pub location_id: i64,
    pub name: ModelName,
    pub unit: TempUnit,
    pub start_date: NaiveDate,
    pub base_temp: f64,
    pub threshold: f64,
    pub reset_on_threshold: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Validated input for model creation. The creating request's parameters
/// become both the model's current snapshot and its first parameter
/// version, effective from the start date.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewModel {
    pub location_id: i64,
    pub name: ModelName,
    pub unit: TempUnit,
    pub start_date: NaiveDate,
    pub base_temp: f64,
    pub threshold: f64,
    pub reset_on_threshold: bool,
}
