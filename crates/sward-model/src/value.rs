use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// One computed day. Entirely derived: every recompute replaces the full
/// set for a model, so rows carry no storage identity of their own.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DailyValue {
    pub date: NaiveDate,
    pub daily_gdd: f64,
    pub cumulative_gdd: f64,
    pub run_number: u32,
}

/// A contiguous accumulation period. `end_date` is `None` while the run is
/// open (the latest computed date belongs to it).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Run {
    pub run_number: u32,
    pub start_date: NaiveDate,
    pub end_date: Option<NaiveDate>,
}
