use crate::model::TempUnit;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// One day of observed weather for a location, as supplied by the external
/// weather provider. Mean temperature is carried in both units; the engine
/// reads the column matching the model's native unit.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct WeatherDay {
    pub date: NaiveDate,
    pub temperature_mean_c: f64,
    pub temperature_mean_f: f64,
}

impl WeatherDay {
    #[must_use]
    pub fn mean_for(&self, unit: TempUnit) -> f64 {
        match unit {
            TempUnit::C => self.temperature_mean_c,
            TempUnit::F => self.temperature_mean_f,
        }
    }
}
