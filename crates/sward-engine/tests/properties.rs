use chrono::{Duration, NaiveDate, TimeZone, Utc};
use proptest::prelude::*;
use sward_engine::{recompute, RecalcInput};
use sward_model::{
    GddModel, ModelName, ParameterVersion, ResetEvent, ResetType, TempUnit, WeatherDay,
};

const START: &str = "2025-04-01";

fn d(s: &str) -> NaiveDate {
    s.parse().expect("date")
}

fn model(threshold: f64, reset_on_threshold: bool) -> GddModel {
    let created = Utc.timestamp_opt(0, 0).single().expect("epoch");
    GddModel {
        id: 1,
        location_id: 1,
        name: ModelName::parse("prop model").expect("name"),
        unit: TempUnit::F,
        start_date: d(START),
        base_temp: 50.0,
        threshold,
        reset_on_threshold,
        created_at: created,
        updated_at: created,
    }
}

fn versions(threshold: f64, reset_on_threshold: bool) -> Vec<ParameterVersion> {
    vec![ParameterVersion {
        id: 1,
        model_id: 1,
        base_temp: 50.0,
        threshold,
        reset_on_threshold,
        effective_from: d(START),
        created_at: Utc.timestamp_opt(0, 0).single().expect("epoch"),
    }]
}

fn weather_from(means_f: &[f64]) -> Vec<WeatherDay> {
    means_f
        .iter()
        .enumerate()
        .map(|(i, f)| WeatherDay {
            date: d(START) + Duration::days(i as i64),
            temperature_mean_c: (f - 32.0) * 5.0 / 9.0,
            temperature_mean_f: *f,
        })
        .collect()
}

fn manual_resets_from(offsets: &[usize], len: usize) -> Vec<ResetEvent> {
    let mut dates: Vec<usize> = offsets
        .iter()
        .copied()
        .filter(|&o| o >= 1 && o < len)
        .collect();
    dates.sort_unstable();
    dates.dedup();
    dates
        .into_iter()
        .map(|o| ResetEvent {
            reset_date: d(START) + Duration::days(o as i64),
            run_number: 0,
            reset_type: ResetType::Manual,
        })
        .collect()
}

proptest! {
    #[test]
    fn replay_is_deterministic_and_structurally_sound(
        means in proptest::collection::vec(30.0_f64..90.0, 1..48),
        threshold in 5.0_f64..120.0,
        reset_on_threshold in any::<bool>(),
        reset_offsets in proptest::collection::vec(1_usize..48, 0..4),
    ) {
        let model = model(threshold, reset_on_threshold);
        let versions = versions(threshold, reset_on_threshold);
        let weather = weather_from(&means);
        let manual = manual_resets_from(&reset_offsets, means.len());

        let input = RecalcInput {
            model: &model,
            versions: &versions,
            manual_resets: &manual,
            weather: &weather,
        };
        let out = recompute(&input).expect("recompute");
        let again = recompute(&input).expect("recompute twice");

        // Idempotence.
        prop_assert_eq!(&out, &again);

        // Every in-range date is present exactly once, in order.
        prop_assert_eq!(out.daily_values.len(), means.len());
        for (i, v) in out.daily_values.iter().enumerate() {
            prop_assert_eq!(v.date, d(START) + Duration::days(i as i64));
        }

        // Run numbers are contiguous from 1 and never decrease.
        let mut previous_run = 1_u32;
        for v in &out.daily_values {
            prop_assert!(v.run_number == previous_run || v.run_number == previous_run + 1);
            previous_run = v.run_number;
        }
        let run_numbers: Vec<u32> = out.runs.iter().map(|r| r.run_number).collect();
        let expected: Vec<u32> = (1..=out.runs.len() as u32).collect();
        prop_assert_eq!(run_numbers, expected);
        prop_assert_eq!(out.runs.last().map(|r| r.end_date), Some(None));

        // Within a run the cumulative value is the running sum of dailies
        // and never decreases.
        let mut run = 0_u32;
        let mut sum = 0.0_f64;
        let mut last_cumulative = 0.0_f64;
        for v in &out.daily_values {
            if v.run_number != run {
                run = v.run_number;
                sum = 0.0;
                last_cumulative = 0.0;
            }
            sum += v.daily_gdd;
            prop_assert!((v.cumulative_gdd - sum).abs() < 1e-9);
            prop_assert!(v.cumulative_gdd >= last_cumulative);
            last_cumulative = v.cumulative_gdd;
        }

        // Each reset begins the run it is numbered for.
        for reset in &out.resets {
            let run = out
                .runs
                .iter()
                .find(|r| r.run_number == reset.run_number)
                .expect("reset names an existing run");
            prop_assert_eq!(run.start_date, reset.reset_date);
        }
    }
}
