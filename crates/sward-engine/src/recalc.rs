use crate::accumulator::daily_gdd;
use crate::error::EngineError;
use crate::runs::RunManager;
use crate::timeline::ParameterTimeline;
use chrono::NaiveDate;
use sward_model::{DailyValue, GddModel, ParameterVersion, ResetEvent, ResetType, Run, WeatherDay};
use std::collections::BTreeSet;

/// Everything a replay needs, loaded up front by the caller. Manual resets
/// are the only resets read as input; threshold resets are a pure function
/// of the rest and are regenerated on every replay.
#[derive(Debug)]
pub struct RecalcInput<'a> {
    pub model: &'a GddModel,
    pub versions: &'a [ParameterVersion],
    pub manual_resets: &'a [ResetEvent],
    pub weather: &'a [WeatherDay],
}

/// Complete replacement set for a model's derived state.
#[derive(Debug, Clone, PartialEq)]
pub struct RecalcOutput {
    pub daily_values: Vec<DailyValue>,
    pub runs: Vec<Run>,
    pub resets: Vec<ResetEvent>,
}

impl RecalcOutput {
    #[must_use]
    pub fn latest_date(&self) -> Option<NaiveDate> {
        self.daily_values.last().map(|v| v.date)
    }
}

/// Deterministic full-history replay: walks every date from the model's
/// start date through the latest available weather day, resolving
/// parameters per day, applying manual resets on their date, and detecting
/// threshold crossings. Running it twice over identical inputs yields
/// identical output.
pub fn recompute(input: &RecalcInput<'_>) -> Result<RecalcOutput, EngineError> {
    let model = input.model;
    let timeline = ParameterTimeline::new(input.versions.to_vec());

    let series: Vec<&WeatherDay> = input
        .weather
        .iter()
        .filter(|w| w.date >= model.start_date)
        .collect();
    let Some(last) = series.last() else {
        // Nothing observable yet: run 1 sits open at the start date.
        return Ok(RecalcOutput {
            daily_values: Vec::new(),
            runs: vec![Run {
                run_number: 1,
                start_date: model.start_date,
                end_date: None,
            }],
            resets: Vec::new(),
        });
    };
    let latest = last.date;
    verify_contiguous(model.start_date, &series)?;

    let manual_dates: BTreeSet<NaiveDate> = input
        .manual_resets
        .iter()
        .filter(|r| r.reset_type == ResetType::Manual)
        .map(|r| r.reset_date)
        .collect();

    let mut rm = RunManager::start(model.start_date);
    let mut pending_threshold: Option<NaiveDate> = None;
    let mut daily_values = Vec::with_capacity(series.len());

    for w in series {
        let date = w.date;
        if manual_dates.contains(&date) {
            // Manual resets win the date; a colliding synthetic reset would
            // be regenerated identically anyway.
            rm.apply_reset(date, ResetType::Manual);
            pending_threshold = None;
        } else if pending_threshold == Some(date) {
            rm.apply_reset(date, ResetType::Threshold);
            pending_threshold = None;
        }

        let params = timeline.resolve(date)?;
        let daily = daily_gdd(w.mean_for(model.unit), params.base_temp);
        let cumulative = rm.observe(date, daily);
        daily_values.push(DailyValue {
            date,
            daily_gdd: daily,
            cumulative_gdd: cumulative,
            run_number: rm.current_run(),
        });

        // The crossing day stays in the closing run; the new run starts the
        // next day. A crossing on the latest day has no next day yet and is
        // picked up when more weather arrives.
        if rm.threshold_crossed(params) && date < latest {
            pending_threshold = date.succ_opt();
        }
    }

    let (runs, resets) = rm.finish();
    Ok(RecalcOutput {
        daily_values,
        runs,
        resets,
    })
}

fn verify_contiguous(start: NaiveDate, series: &[&WeatherDay]) -> Result<(), EngineError> {
    let mut expected = start;
    for w in series {
        if w.date != expected {
            let to = w.date.pred_opt().unwrap_or(w.date);
            return Err(EngineError::DataGap { from: expected, to });
        }
        match w.date.succ_opt() {
            Some(next) => expected = next,
            None => break,
        }
    }
    Ok(())
}
