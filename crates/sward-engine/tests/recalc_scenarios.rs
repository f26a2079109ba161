use chrono::{Duration, NaiveDate, TimeZone, Utc};
use sward_engine::{recompute, EngineError, RecalcInput};
use sward_model::{
    GddModel, ModelName, ParameterVersion, ResetEvent, ResetType, TempUnit, WeatherDay,
};

fn d(s: &str) -> NaiveDate {
    s.parse().expect("date")
}

fn model(start: &str) -> GddModel {
    let created = Utc.timestamp_opt(0, 0).single().expect("epoch");
    GddModel {
        id: 1,
        location_id: 7,
        name: ModelName::parse("Poa annua seedhead").expect("name"),
        unit: TempUnit::F,
        start_date: d(start),
        base_temp: 50.0,
        threshold: 30.0,
        reset_on_threshold: false,
        created_at: created,
        updated_at: created,
    }
}

fn version(
    id: i64,
    base_temp: f64,
    threshold: f64,
    reset_on_threshold: bool,
    effective_from: &str,
) -> ParameterVersion {
    ParameterVersion {
        id,
        model_id: 1,
        base_temp,
        threshold,
        reset_on_threshold,
        effective_from: d(effective_from),
        created_at: Utc.timestamp_opt(0, 0).single().expect("epoch"),
    }
}

fn weather(start: &str, means_f: &[f64]) -> Vec<WeatherDay> {
    means_f
        .iter()
        .enumerate()
        .map(|(i, f)| WeatherDay {
            date: d(start) + Duration::days(i as i64),
            temperature_mean_c: (f - 32.0) * 5.0 / 9.0,
            temperature_mean_f: *f,
        })
        .collect()
}

fn manual_reset(date: &str) -> ResetEvent {
    ResetEvent {
        reset_date: d(date),
        run_number: 0,
        reset_type: ResetType::Manual,
    }
}

#[test]
fn threshold_crossing_resets_the_next_day() {
    let model = model("2025-05-01");
    let versions = [version(1, 50.0, 30.0, true, "2025-05-01")];
    let weather = weather("2025-05-01", &[60.0, 60.0, 60.0, 60.0]);

    let out = recompute(&RecalcInput {
        model: &model,
        versions: &versions,
        manual_resets: &[],
        weather: &weather,
    })
    .expect("recompute");

    let cumulative: Vec<f64> = out.daily_values.iter().map(|v| v.cumulative_gdd).collect();
    let runs: Vec<u32> = out.daily_values.iter().map(|v| v.run_number).collect();
    assert_eq!(cumulative, vec![10.0, 20.0, 30.0, 10.0]);
    assert_eq!(runs, vec![1, 1, 1, 2]);

    // The crossing day ends run 1 carrying the full threshold value.
    assert_eq!(out.runs.len(), 2);
    assert_eq!(out.runs[0].end_date, Some(d("2025-05-03")));
    assert_eq!(out.runs[1].start_date, d("2025-05-04"));
    assert_eq!(out.runs[1].end_date, None);

    assert_eq!(out.resets.len(), 1);
    assert_eq!(out.resets[0].reset_date, d("2025-05-04"));
    assert_eq!(out.resets[0].reset_type, ResetType::Threshold);
    assert_eq!(out.resets[0].run_number, 2);
}

#[test]
fn threshold_crossing_on_the_latest_day_waits_for_more_weather() {
    let model = model("2025-05-01");
    let versions = [version(1, 50.0, 30.0, true, "2025-05-01")];
    let weather = weather("2025-05-01", &[60.0, 60.0, 60.0]);

    let out = recompute(&RecalcInput {
        model: &model,
        versions: &versions,
        manual_resets: &[],
        weather: &weather,
    })
    .expect("recompute");

    assert!(out.resets.is_empty());
    assert_eq!(out.runs.len(), 1);
    assert_eq!(out.daily_values.last().expect("day 3").cumulative_gdd, 30.0);
}

#[test]
fn manual_reset_splits_accumulation() {
    let model = model("2025-05-01");
    let versions = [version(1, 50.0, 1000.0, false, "2025-05-01")];
    let weather = weather("2025-05-01", &[55.0; 10]);
    let resets = [manual_reset("2025-05-06")];

    let out = recompute(&RecalcInput {
        model: &model,
        versions: &versions,
        manual_resets: &resets,
        weather: &weather,
    })
    .expect("recompute");

    let cumulative: Vec<f64> = out.daily_values.iter().map(|v| v.cumulative_gdd).collect();
    assert_eq!(
        cumulative,
        vec![5.0, 10.0, 15.0, 20.0, 25.0, 5.0, 10.0, 15.0, 20.0, 25.0]
    );
    assert_eq!(out.runs.len(), 2);
    assert_eq!(out.runs[0].start_date, d("2025-05-01"));
    assert_eq!(out.runs[0].end_date, Some(d("2025-05-05")));
    assert_eq!(out.runs[1].start_date, d("2025-05-06"));
    assert_eq!(out.resets.len(), 1);
    assert_eq!(out.resets[0].reset_type, ResetType::Manual);
    assert_eq!(out.resets[0].run_number, 2);
}

#[test]
fn deleting_the_reset_merges_back_into_one_run() {
    let model = model("2025-05-01");
    let versions = [version(1, 50.0, 1000.0, false, "2025-05-01")];
    let weather = weather("2025-05-01", &[55.0; 10]);

    // Same inputs minus the manual reset: the replay regenerates a single
    // run as if the reset had never existed.
    let out = recompute(&RecalcInput {
        model: &model,
        versions: &versions,
        manual_resets: &[],
        weather: &weather,
    })
    .expect("recompute");

    let cumulative: Vec<f64> = out.daily_values.iter().map(|v| v.cumulative_gdd).collect();
    assert_eq!(
        cumulative,
        vec![5.0, 10.0, 15.0, 20.0, 25.0, 30.0, 35.0, 40.0, 45.0, 50.0]
    );
    assert_eq!(out.runs.len(), 1);
    assert!(out.daily_values.iter().all(|v| v.run_number == 1));
    assert!(out.resets.is_empty());
}

#[test]
fn retroactive_version_changes_every_day_it_covers() {
    let model = model("2025-05-01");
    let weather = weather("2025-05-01", &[60.0, 60.0, 60.0, 60.0]);

    let before = [version(1, 50.0, 1000.0, false, "2025-05-01")];
    let out = recompute(&RecalcInput {
        model: &model,
        versions: &before,
        manual_resets: &[],
        weather: &weather,
    })
    .expect("recompute");
    assert!(out.daily_values.iter().all(|v| v.daily_gdd == 10.0));

    // A later version takes over from its effective date; the earlier one
    // still governs the days before it.
    let after = [
        version(1, 50.0, 1000.0, false, "2025-05-01"),
        version(2, 55.0, 1000.0, false, "2025-05-03"),
    ];
    let out = recompute(&RecalcInput {
        model: &model,
        versions: &after,
        manual_resets: &[],
        weather: &weather,
    })
    .expect("recompute");
    let dailies: Vec<f64> = out.daily_values.iter().map(|v| v.daily_gdd).collect();
    assert_eq!(dailies, vec![10.0, 10.0, 5.0, 5.0]);
}

#[test]
fn weather_gap_aborts_with_the_missing_range() {
    let model = model("2025-05-01");
    let versions = [version(1, 50.0, 1000.0, false, "2025-05-01")];
    let mut weather = weather("2025-05-01", &[55.0; 6]);
    weather.remove(2); // 2025-05-03 missing

    let err = recompute(&RecalcInput {
        model: &model,
        versions: &versions,
        manual_resets: &[],
        weather: &weather,
    })
    .expect_err("gap must abort");
    assert_eq!(
        err,
        EngineError::DataGap {
            from: d("2025-05-03"),
            to: d("2025-05-03"),
        }
    );
}

#[test]
fn weather_starting_after_the_model_is_a_gap_too() {
    let model = model("2025-05-01");
    let versions = [version(1, 50.0, 1000.0, false, "2025-05-01")];
    let weather = weather("2025-05-03", &[55.0; 4]);

    let err = recompute(&RecalcInput {
        model: &model,
        versions: &versions,
        manual_resets: &[],
        weather: &weather,
    })
    .expect_err("gap must abort");
    assert_eq!(
        err,
        EngineError::DataGap {
            from: d("2025-05-01"),
            to: d("2025-05-02"),
        }
    );
}

#[test]
fn no_weather_yet_yields_an_open_empty_run() {
    let model = model("2025-05-01");
    let versions = [version(1, 50.0, 1000.0, false, "2025-05-01")];

    let out = recompute(&RecalcInput {
        model: &model,
        versions: &versions,
        manual_resets: &[],
        weather: &[],
    })
    .expect("recompute");
    assert!(out.daily_values.is_empty());
    assert_eq!(out.runs.len(), 1);
    assert_eq!(out.runs[0].run_number, 1);
    assert_eq!(out.runs[0].end_date, None);
    assert!(out.resets.is_empty());
}

#[test]
fn manual_reset_wins_a_colliding_threshold_date() {
    let model = model("2025-05-01");
    let versions = [version(1, 50.0, 30.0, true, "2025-05-01")];
    let weather = weather("2025-05-01", &[60.0, 60.0, 60.0, 60.0, 60.0]);
    // Threshold would fire a reset on day 4; a manual reset already sits
    // there.
    let resets = [manual_reset("2025-05-04")];

    let out = recompute(&RecalcInput {
        model: &model,
        versions: &versions,
        manual_resets: &resets,
        weather: &weather,
    })
    .expect("recompute");

    assert_eq!(out.resets.len(), 1);
    assert_eq!(out.resets[0].reset_type, ResetType::Manual);
    assert_eq!(out.resets[0].reset_date, d("2025-05-04"));
    assert_eq!(out.runs.len(), 2);
}

#[test]
fn disabling_reset_on_threshold_midway_stops_new_crossings() {
    let model = model("2025-05-01");
    let versions = [
        version(1, 50.0, 30.0, true, "2025-05-01"),
        version(2, 50.0, 30.0, false, "2025-05-03"),
    ];
    // Cumulative reaches 30 on day 3, but day 3's parameters no longer
    // request a reset.
    let weather = weather("2025-05-01", &[60.0, 60.0, 60.0, 60.0, 60.0]);

    let out = recompute(&RecalcInput {
        model: &model,
        versions: &versions,
        manual_resets: &[],
        weather: &weather,
    })
    .expect("recompute");

    assert!(out.resets.is_empty());
    assert_eq!(out.runs.len(), 1);
    assert_eq!(out.daily_values.last().expect("day 5").cumulative_gdd, 50.0);
}

#[test]
fn recompute_is_idempotent() {
    let model = model("2025-05-01");
    let versions = [
        version(1, 50.0, 30.0, true, "2025-05-01"),
        version(2, 52.0, 40.0, true, "2025-05-10"),
    ];
    let weather = weather(
        "2025-05-01",
        &[
            58.0, 61.0, 49.0, 63.0, 66.0, 55.0, 57.0, 70.0, 64.0, 52.0, 59.0, 68.0, 71.0, 54.0,
        ],
    );
    let resets = [manual_reset("2025-05-08")];

    let input = RecalcInput {
        model: &model,
        versions: &versions,
        manual_resets: &resets,
        weather: &weather,
    };
    let first = recompute(&input).expect("first");
    let second = recompute(&input).expect("second");
    assert_eq!(first, second);
}
