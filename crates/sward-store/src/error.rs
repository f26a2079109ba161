use std::fmt::{Display, Formatter};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StoreError {
    ModelNotFound(i64),
    ResetNotFound(i64),
    RunNotFound { model_id: i64, run_number: u32 },
    DuplicateModelName { location_id: i64, name: String },
    Sqlite(String),
}

impl Display for StoreError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::ModelNotFound(id) => write!(f, "gdd model {id} not found"),
            Self::ResetNotFound(id) => write!(f, "reset {id} not found"),
            Self::RunNotFound {
                model_id,
                run_number,
            } => write!(f, "model {model_id} has no run {run_number}"),
            Self::DuplicateModelName { location_id, name } => {
                write!(f, "model name {name:?} already exists for location {location_id}")
            }
            Self::Sqlite(msg) => write!(f, "sqlite: {msg}"),
        }
    }
}

impl std::error::Error for StoreError {}

impl From<rusqlite::Error> for StoreError {
    fn from(value: rusqlite::Error) -> Self {
        Self::Sqlite(value.to_string())
    }
}

/// Weather reads are a bounded external dependency; any failure surfaces
/// here rather than as a silently empty series.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WeatherError(pub String);

impl Display for WeatherError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "weather source: {}", self.0)
    }
}

impl std::error::Error for WeatherError {}
