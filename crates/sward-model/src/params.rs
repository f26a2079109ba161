use crate::model::ValidationError;
use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

/// A dated snapshot of model parameters. For a given model the
/// `effective_from` dates are unique; the version with the greatest
/// `effective_from` not after a date is authoritative for that date.
/// Versions are never deleted, only superseded.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ParameterVersion {
    pub id: i64,
    pub model_id: i64,
    pub base_temp: f64,
    pub threshold: f64,
    pub reset_on_threshold: bool,
    pub effective_from: NaiveDate,
    pub created_at: DateTime<Utc>,
}

pub fn validate_parameters(base_temp: f64, threshold: f64) -> Result<(), ValidationError> {
    if !base_temp.is_finite() {
        return Err(ValidationError(format!(
            "base_temp must be finite, got {base_temp}"
        )));
    }
    if !threshold.is_finite() || threshold <= 0.0 {
        return Err(ValidationError(format!(
            "threshold must be a positive number, got {threshold}"
        )));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn accepts_ordinary_parameters() {
        assert!(validate_parameters(10.0, 250.0).is_ok());
        assert!(validate_parameters(-5.0, 0.1).is_ok());
    }

    #[test]
    fn rejects_non_positive_threshold() {
        assert!(validate_parameters(10.0, 0.0).is_err());
        assert!(validate_parameters(10.0, -30.0).is_err());
    }

    #[test]
    fn rejects_non_finite_inputs() {
        assert!(validate_parameters(f64::NAN, 100.0).is_err());
        assert!(validate_parameters(10.0, f64::INFINITY).is_err());
    }
}
