use crate::error::EngineError;
use chrono::NaiveDate;
use sward_model::{ParameterVersion, ResetEvent, ResetType, Run};

/// Replay-time run state. Opens run 1 at the model's start date, closes a
/// run the day before each reset, and numbers runs contiguously from 1.
#[derive(Debug)]
pub struct RunManager {
    current_run: u32,
    run_start: NaiveDate,
    cumulative: f64,
    crossed: bool,
    last_date: Option<NaiveDate>,
    runs: Vec<Run>,
    resets: Vec<ResetEvent>,
}

impl RunManager {
    #[must_use]
    pub fn start(start_date: NaiveDate) -> Self {
        Self {
            current_run: 1,
            run_start: start_date,
            cumulative: 0.0,
            crossed: false,
            last_date: None,
            runs: Vec::new(),
            resets: Vec::new(),
        }
    }

    /// Closes the open run at the previously observed date and opens the
    /// next one at `date`, zeroing accumulation. A reset before any
    /// observed date cannot close anything and is ignored.
    pub fn apply_reset(&mut self, date: NaiveDate, reset_type: ResetType) {
        let Some(end) = self.last_date else {
            return;
        };
        self.runs.push(Run {
            run_number: self.current_run,
            start_date: self.run_start,
            end_date: Some(end),
        });
        self.current_run += 1;
        self.run_start = date;
        self.cumulative = 0.0;
        self.crossed = false;
        self.resets.push(ResetEvent {
            reset_date: date,
            run_number: self.current_run,
            reset_type,
        });
    }

    /// Adds one day's contribution and returns the run's cumulative value
    /// including it.
    pub fn observe(&mut self, date: NaiveDate, daily: f64) -> f64 {
        self.cumulative += daily;
        self.last_date = Some(date);
        self.cumulative
    }

    /// True on the first observed date within the run where the cumulative
    /// value reaches the threshold while `reset_on_threshold` is in force.
    pub fn threshold_crossed(&mut self, params: &ParameterVersion) -> bool {
        if params.reset_on_threshold && !self.crossed && self.cumulative >= params.threshold {
            self.crossed = true;
            return true;
        }
        false
    }

    #[must_use]
    pub fn current_run(&self) -> u32 {
        self.current_run
    }

    /// Ends the replay, leaving the final run open.
    #[must_use]
    pub fn finish(mut self) -> (Vec<Run>, Vec<ResetEvent>) {
        self.runs.push(Run {
            run_number: self.current_run,
            start_date: self.run_start,
            end_date: None,
        });
        (self.runs, self.resets)
    }
}

/// Validates a requested manual reset against the model's current state.
/// The date must fall after the open run's first day and not after the
/// latest computed date, and no reset of either origin may already sit on
/// it.
pub fn validate_manual_reset(
    start_date: NaiveDate,
    latest_date: Option<NaiveDate>,
    existing_resets: &[ResetEvent],
    reset_date: NaiveDate,
) -> Result<(), EngineError> {
    let Some(latest) = latest_date else {
        return Err(EngineError::InvalidResetDate {
            date: reset_date,
            reason: "model has no computed values yet".to_string(),
        });
    };
    if existing_resets.iter().any(|r| r.reset_date == reset_date) {
        return Err(EngineError::DuplicateResetDate { date: reset_date });
    }
    let open_run_start = existing_resets
        .iter()
        .map(|r| r.reset_date)
        .max()
        .unwrap_or(start_date);
    if reset_date <= open_run_start {
        return Err(EngineError::InvalidResetDate {
            date: reset_date,
            reason: format!("current run already starts on or after {reset_date}"),
        });
    }
    if reset_date > latest {
        return Err(EngineError::InvalidResetDate {
            date: reset_date,
            reason: format!("no weather data on or after {reset_date}"),
        });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn d(s: &str) -> NaiveDate {
        s.parse().expect("date")
    }

    fn manual(date: &str, run_number: u32) -> ResetEvent {
        ResetEvent {
            reset_date: d(date),
            run_number,
            reset_type: ResetType::Manual,
        }
    }

    #[test]
    fn reset_closes_previous_run_the_day_before() {
        let mut rm = RunManager::start(d("2025-05-01"));
        rm.observe(d("2025-05-01"), 4.0);
        rm.observe(d("2025-05-02"), 4.0);
        rm.apply_reset(d("2025-05-03"), ResetType::Manual);
        rm.observe(d("2025-05-03"), 4.0);
        let (runs, resets) = rm.finish();

        assert_eq!(runs.len(), 2);
        assert_eq!(runs[0].end_date, Some(d("2025-05-02")));
        assert_eq!(runs[1].start_date, d("2025-05-03"));
        assert_eq!(runs[1].end_date, None);
        assert_eq!(resets.len(), 1);
        assert_eq!(resets[0].run_number, 2);
    }

    #[test]
    fn reset_before_any_observation_is_ignored() {
        let mut rm = RunManager::start(d("2025-05-01"));
        rm.apply_reset(d("2025-05-01"), ResetType::Manual);
        rm.observe(d("2025-05-01"), 4.0);
        let (runs, resets) = rm.finish();
        assert_eq!(runs.len(), 1);
        assert!(resets.is_empty());
    }

    #[test]
    fn threshold_fires_once_per_run() {
        let params = ParameterVersion {
            id: 1,
            model_id: 1,
            base_temp: 50.0,
            threshold: 10.0,
            reset_on_threshold: true,
            effective_from: d("2025-05-01"),
            created_at: chrono::Utc::now(),
        };
        let mut rm = RunManager::start(d("2025-05-01"));
        rm.observe(d("2025-05-01"), 6.0);
        assert!(!rm.threshold_crossed(&params));
        rm.observe(d("2025-05-02"), 6.0);
        assert!(rm.threshold_crossed(&params));
        rm.observe(d("2025-05-03"), 6.0);
        assert!(!rm.threshold_crossed(&params), "fires once per run");
        rm.apply_reset(d("2025-05-04"), ResetType::Threshold);
        rm.observe(d("2025-05-04"), 12.0);
        assert!(rm.threshold_crossed(&params), "new run re-arms the check");
    }

    #[test]
    fn threshold_respects_disabled_flag() {
        let params = ParameterVersion {
            id: 1,
            model_id: 1,
            base_temp: 50.0,
            threshold: 10.0,
            reset_on_threshold: false,
            effective_from: d("2025-05-01"),
            created_at: chrono::Utc::now(),
        };
        let mut rm = RunManager::start(d("2025-05-01"));
        rm.observe(d("2025-05-01"), 25.0);
        assert!(!rm.threshold_crossed(&params));
    }

    #[test]
    fn manual_reset_must_fall_inside_computed_range() {
        let start = d("2025-05-01");
        let latest = Some(d("2025-05-10"));

        assert!(validate_manual_reset(start, latest, &[], d("2025-05-06")).is_ok());
        assert!(matches!(
            validate_manual_reset(start, latest, &[], d("2025-04-30")),
            Err(EngineError::InvalidResetDate { .. })
        ));
        assert!(matches!(
            validate_manual_reset(start, latest, &[], d("2025-05-01")),
            Err(EngineError::InvalidResetDate { .. }),
        ));
        assert!(matches!(
            validate_manual_reset(start, latest, &[], d("2025-05-11")),
            Err(EngineError::InvalidResetDate { .. })
        ));
        assert!(matches!(
            validate_manual_reset(start, None, &[], d("2025-05-06")),
            Err(EngineError::InvalidResetDate { .. })
        ));
    }

    #[test]
    fn manual_reset_rejects_occupied_dates_and_earlier_runs() {
        let start = d("2025-05-01");
        let latest = Some(d("2025-05-10"));
        let existing = [manual("2025-05-04", 2)];

        assert!(matches!(
            validate_manual_reset(start, latest, &existing, d("2025-05-04")),
            Err(EngineError::DuplicateResetDate { .. })
        ));
        // inside a closed run
        assert!(matches!(
            validate_manual_reset(start, latest, &existing, d("2025-05-02")),
            Err(EngineError::InvalidResetDate { .. })
        ));
        assert!(validate_manual_reset(start, latest, &existing, d("2025-05-07")).is_ok());
    }
}
