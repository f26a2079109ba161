use crate::model::ValidationError;
use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use std::fmt::{Display, Formatter};

/// Origin of a reset. Manual resets are authoritative user input; threshold
/// resets are regenerated on every recompute and never read back as input.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ResetType {
    Manual,
    Threshold,
}

impl ResetType {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Manual => "manual",
            Self::Threshold => "threshold",
        }
    }

    pub fn parse(input: &str) -> Result<Self, ValidationError> {
        match input {
            "manual" => Ok(Self::Manual),
            "threshold" => Ok(Self::Threshold),
            other => Err(ValidationError(format!("unknown reset type {other:?}"))),
        }
    }
}

impl Display for ResetType {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// A reset as produced by recomputation, before it has a storage identity.
/// `run_number` is the run the reset begins.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResetEvent {
    pub reset_date: NaiveDate,
    pub run_number: u32,
    pub reset_type: ResetType,
}

/// A persisted reset row.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Reset {
    pub id: i64,
    pub model_id: i64,
    pub reset_date: NaiveDate,
    pub run_number: u32,
    pub reset_type: ResetType,
    pub created_at: DateTime<Utc>,
}

impl Reset {
    #[must_use]
    pub fn event(&self) -> ResetEvent {
        ResetEvent {
            reset_date: self.reset_date,
            run_number: self.run_number,
            reset_type: self.reset_type,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reset_type_round_trips() {
        for ty in [ResetType::Manual, ResetType::Threshold] {
            assert_eq!(ResetType::parse(ty.as_str()).expect("parse"), ty);
        }
        assert!(ResetType::parse("initial").is_err());
    }
}
