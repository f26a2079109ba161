// SPDX-License-Identifier: Apache-2.0

use crate::error::StoreError;
use crate::schema::init_schema;
use crate::weather::SqliteWeatherSource;
use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, Utc};
use rusqlite::{params, Connection, OptionalExtension};
use std::path::Path;
use std::sync::Arc;
use sward_model::{
    DailyValue, GddModel, ModelName, NewModel, ParameterVersion, Reset, ResetEvent, Run, TempUnit,
    WeatherDay,
};
use tokio::sync::Mutex;

/// Persistence boundary for models, parameter versions, daily values,
/// runs, and resets. Derived state is only ever written through
/// [`ModelStore::replace_computed`], as one atomic replacement set.
#[async_trait]
pub trait ModelStore: Send + Sync {
    async fn create_model(&self, new: &NewModel) -> Result<GddModel, StoreError>;
    async fn get_model(&self, model_id: i64) -> Result<GddModel, StoreError>;
    async fn list_models(&self) -> Result<Vec<GddModel>, StoreError>;
    async fn list_models_by_location(&self, location_id: i64)
        -> Result<Vec<GddModel>, StoreError>;
    async fn delete_model(&self, model_id: i64) -> Result<(), StoreError>;

    /// Inserts a version at `effective_from`, or overwrites the parameters
    /// of the version already sitting at that exact date. Also refreshes
    /// the model row's current-parameter snapshot.
    async fn upsert_parameter_version(
        &self,
        model_id: i64,
        base_temp: f64,
        threshold: f64,
        reset_on_threshold: bool,
        effective_from: NaiveDate,
    ) -> Result<ParameterVersion, StoreError>;
    async fn list_parameter_versions(
        &self,
        model_id: i64,
    ) -> Result<Vec<ParameterVersion>, StoreError>;

    async fn list_resets(&self, model_id: i64) -> Result<Vec<Reset>, StoreError>;
    async fn get_reset(&self, model_id: i64, reset_id: i64) -> Result<Reset, StoreError>;

    /// Replaces the model's entire derived state in one transaction.
    async fn replace_computed(
        &self,
        model_id: i64,
        values: &[DailyValue],
        runs: &[Run],
        resets: &[ResetEvent],
    ) -> Result<(), StoreError>;

    async fn list_values_for_run(
        &self,
        model_id: i64,
        run_number: u32,
    ) -> Result<Vec<DailyValue>, StoreError>;
    async fn latest_computed_date(&self, model_id: i64) -> Result<Option<NaiveDate>, StoreError>;
    async fn latest_reset_on_or_before(
        &self,
        model_id: i64,
        date: NaiveDate,
    ) -> Result<Option<Reset>, StoreError>;
    async fn latest_value_on_or_before(
        &self,
        model_id: i64,
        run_number: u32,
        date: NaiveDate,
    ) -> Result<Option<DailyValue>, StoreError>;
}

pub struct SqliteStore {
    conn: Arc<Mutex<Connection>>,
}

impl SqliteStore {
    pub fn open(path: &Path) -> Result<Self, StoreError> {
        let conn = Connection::open(path)?;
        init_schema(&conn)?;
        Ok(Self {
            conn: Arc::new(Mutex::new(conn)),
        })
    }

    pub fn open_in_memory() -> Result<Self, StoreError> {
        let conn = Connection::open_in_memory()?;
        init_schema(&conn)?;
        Ok(Self {
            conn: Arc::new(Mutex::new(conn)),
        })
    }

    /// A weather reader over the same database. Weather rows are written
    /// by the external provider integration, not by this core; tests seed
    /// them through [`SqliteStore::put_weather_day`].
    #[must_use]
    pub fn weather_source(&self) -> SqliteWeatherSource {
        SqliteWeatherSource::new(Arc::clone(&self.conn))
    }

    pub async fn put_weather_day(
        &self,
        location_id: i64,
        day: &WeatherDay,
    ) -> Result<(), StoreError> {
        let conn = self.conn.lock().await;
        conn.execute(
            "INSERT OR REPLACE INTO daily_weather
               (location_id, date, temperature_mean_c, temperature_mean_f)
             VALUES (?1, ?2, ?3, ?4)",
            params![
                location_id,
                day.date.to_string(),
                day.temperature_mean_c,
                day.temperature_mean_f
            ],
        )?;
        Ok(())
    }
}

fn is_constraint_violation(err: &rusqlite::Error) -> bool {
    matches!(
        err,
        rusqlite::Error::SqliteFailure(e, _) if e.code == rusqlite::ErrorCode::ConstraintViolation
    )
}

fn parse_date(raw: &str) -> Result<NaiveDate, StoreError> {
    raw.parse()
        .map_err(|e| StoreError::Sqlite(format!("bad stored date {raw:?}: {e}")))
}

fn parse_timestamp(raw: &str) -> Result<DateTime<Utc>, StoreError> {
    DateTime::parse_from_rfc3339(raw)
        .map(|t| t.with_timezone(&Utc))
        .map_err(|e| StoreError::Sqlite(format!("bad stored timestamp {raw:?}: {e}")))
}

type ModelRow = (
    i64,
    i64,
    String,
    String,
    String,
    f64,
    f64,
    bool,
    String,
    String,
);

fn model_from_row(row: ModelRow) -> Result<GddModel, StoreError> {
    let (id, location_id, name, unit, start_date, base_temp, threshold, reset_on_threshold, created_at, updated_at) =
        row;
    Ok(GddModel {
        id,
        location_id,
        name: ModelName::parse(&name).map_err(|e| StoreError::Sqlite(e.to_string()))?,
        unit: TempUnit::parse(&unit).map_err(|e| StoreError::Sqlite(e.to_string()))?,
        start_date: parse_date(&start_date)?,
        base_temp,
        threshold,
        reset_on_threshold,
        created_at: parse_timestamp(&created_at)?,
        updated_at: parse_timestamp(&updated_at)?,
    })
}

const MODEL_COLUMNS: &str = "id, location_id, name, unit, start_date, base_temp, threshold, \
                             reset_on_threshold, created_at, updated_at";

fn read_model_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<ModelRow> {
    Ok((
        row.get(0)?,
        row.get(1)?,
        row.get(2)?,
        row.get(3)?,
        row.get(4)?,
        row.get(5)?,
        row.get(6)?,
        row.get(7)?,
        row.get(8)?,
        row.get(9)?,
    ))
}

type VersionRow = (i64, i64, f64, f64, bool, String, String);

fn version_from_row(row: VersionRow) -> Result<ParameterVersion, StoreError> {
    let (id, model_id, base_temp, threshold, reset_on_threshold, effective_from, created_at) = row;
    Ok(ParameterVersion {
        id,
        model_id,
        base_temp,
        threshold,
        reset_on_threshold,
        effective_from: parse_date(&effective_from)?,
        created_at: parse_timestamp(&created_at)?,
    })
}

type ResetRow = (i64, i64, String, u32, String, String);

fn reset_from_row(row: ResetRow) -> Result<Reset, StoreError> {
    let (id, model_id, reset_date, run_number, reset_type, created_at) = row;
    Ok(Reset {
        id,
        model_id,
        reset_date: parse_date(&reset_date)?,
        run_number,
        reset_type: sward_model::ResetType::parse(&reset_type)
            .map_err(|e| StoreError::Sqlite(e.to_string()))?,
        created_at: parse_timestamp(&created_at)?,
    })
}

fn ensure_model_exists(conn: &Connection, model_id: i64) -> Result<(), StoreError> {
    let found: Option<i64> = conn
        .query_row(
            "SELECT id FROM gdd_models WHERE id = ?1",
            params![model_id],
            |row| row.get(0),
        )
        .optional()?;
    if found.is_none() {
        return Err(StoreError::ModelNotFound(model_id));
    }
    Ok(())
}

#[async_trait]
impl ModelStore for SqliteStore {
    async fn create_model(&self, new: &NewModel) -> Result<GddModel, StoreError> {
        let now = Utc::now();
        let mut conn = self.conn.lock().await;
        let tx = conn.transaction()?;
        let inserted = tx.execute(
            "INSERT INTO gdd_models
               (location_id, name, unit, start_date, base_temp, threshold,
                reset_on_threshold, created_at, updated_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)",
            params![
                new.location_id,
                new.name.as_str(),
                new.unit.as_str(),
                new.start_date.to_string(),
                new.base_temp,
                new.threshold,
                new.reset_on_threshold,
                now.to_rfc3339(),
                now.to_rfc3339()
            ],
        );
        if let Err(err) = inserted {
            if is_constraint_violation(&err) {
                return Err(StoreError::DuplicateModelName {
                    location_id: new.location_id,
                    name: new.name.as_str().to_string(),
                });
            }
            return Err(err.into());
        }
        let model_id = tx.last_insert_rowid();
        tx.execute(
            "INSERT INTO gdd_model_parameters
               (model_id, base_temp, threshold, reset_on_threshold, effective_from, created_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
            params![
                model_id,
                new.base_temp,
                new.threshold,
                new.reset_on_threshold,
                new.start_date.to_string(),
                now.to_rfc3339()
            ],
        )?;
        tx.commit()?;
        Ok(GddModel {
            id: model_id,
            location_id: new.location_id,
            name: new.name.clone(),
            unit: new.unit,
            start_date: new.start_date,
            base_temp: new.base_temp,
            threshold: new.threshold,
            reset_on_threshold: new.reset_on_threshold,
            created_at: now,
            updated_at: now,
        })
    }

    async fn get_model(&self, model_id: i64) -> Result<GddModel, StoreError> {
        let conn = self.conn.lock().await;
        let row = conn
            .query_row(
                &format!("SELECT {MODEL_COLUMNS} FROM gdd_models WHERE id = ?1"),
                params![model_id],
                read_model_row,
            )
            .optional()?
            .ok_or(StoreError::ModelNotFound(model_id))?;
        model_from_row(row)
    }

    async fn list_models(&self) -> Result<Vec<GddModel>, StoreError> {
        let conn = self.conn.lock().await;
        let mut stmt =
            conn.prepare(&format!("SELECT {MODEL_COLUMNS} FROM gdd_models ORDER BY id"))?;
        let rows = stmt.query_map([], read_model_row)?;
        let mut models = Vec::new();
        for row in rows {
            models.push(model_from_row(row?)?);
        }
        Ok(models)
    }

    async fn list_models_by_location(
        &self,
        location_id: i64,
    ) -> Result<Vec<GddModel>, StoreError> {
        let conn = self.conn.lock().await;
        let mut stmt = conn.prepare(&format!(
            "SELECT {MODEL_COLUMNS} FROM gdd_models WHERE location_id = ?1 ORDER BY id"
        ))?;
        let rows = stmt.query_map(params![location_id], read_model_row)?;
        let mut models = Vec::new();
        for row in rows {
            models.push(model_from_row(row?)?);
        }
        Ok(models)
    }

    async fn delete_model(&self, model_id: i64) -> Result<(), StoreError> {
        let conn = self.conn.lock().await;
        let deleted = conn.execute("DELETE FROM gdd_models WHERE id = ?1", params![model_id])?;
        if deleted == 0 {
            return Err(StoreError::ModelNotFound(model_id));
        }
        Ok(())
    }

    async fn upsert_parameter_version(
        &self,
        model_id: i64,
        base_temp: f64,
        threshold: f64,
        reset_on_threshold: bool,
        effective_from: NaiveDate,
    ) -> Result<ParameterVersion, StoreError> {
        let now = Utc::now();
        let mut conn = self.conn.lock().await;
        let tx = conn.transaction()?;
        ensure_model_exists(&tx, model_id)?;

        let updated = tx.execute(
            "UPDATE gdd_model_parameters
               SET base_temp = ?1, threshold = ?2, reset_on_threshold = ?3
             WHERE model_id = ?4 AND effective_from = ?5",
            params![
                base_temp,
                threshold,
                reset_on_threshold,
                model_id,
                effective_from.to_string()
            ],
        )?;
        if updated == 0 {
            tx.execute(
                "INSERT INTO gdd_model_parameters
                   (model_id, base_temp, threshold, reset_on_threshold, effective_from, created_at)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
                params![
                    model_id,
                    base_temp,
                    threshold,
                    reset_on_threshold,
                    effective_from.to_string(),
                    now.to_rfc3339()
                ],
            )?;
        }
        let version_row: VersionRow = tx.query_row(
            "SELECT id, model_id, base_temp, threshold, reset_on_threshold, effective_from, created_at
               FROM gdd_model_parameters
              WHERE model_id = ?1 AND effective_from = ?2",
            params![model_id, effective_from.to_string()],
            |row| {
                Ok((
                    row.get(0)?,
                    row.get(1)?,
                    row.get(2)?,
                    row.get(3)?,
                    row.get(4)?,
                    row.get(5)?,
                    row.get(6)?,
                ))
            },
        )?;

        tx.execute(
            "UPDATE gdd_models
               SET base_temp = ?1, threshold = ?2, reset_on_threshold = ?3, updated_at = ?4
             WHERE id = ?5",
            params![
                base_temp,
                threshold,
                reset_on_threshold,
                now.to_rfc3339(),
                model_id
            ],
        )?;
        tx.commit()?;
        version_from_row(version_row)
    }

    async fn list_parameter_versions(
        &self,
        model_id: i64,
    ) -> Result<Vec<ParameterVersion>, StoreError> {
        let conn = self.conn.lock().await;
        ensure_model_exists(&conn, model_id)?;
        let mut stmt = conn.prepare(
            "SELECT id, model_id, base_temp, threshold, reset_on_threshold, effective_from, created_at
               FROM gdd_model_parameters
              WHERE model_id = ?1
              ORDER BY effective_from ASC",
        )?;
        let rows = stmt.query_map(params![model_id], |row| {
            Ok((
                row.get(0)?,
                row.get(1)?,
                row.get(2)?,
                row.get(3)?,
                row.get(4)?,
                row.get(5)?,
                row.get(6)?,
            ))
        })?;
        let mut versions = Vec::new();
        for row in rows {
            versions.push(version_from_row(row?)?);
        }
        Ok(versions)
    }

    async fn list_resets(&self, model_id: i64) -> Result<Vec<Reset>, StoreError> {
        let conn = self.conn.lock().await;
        ensure_model_exists(&conn, model_id)?;
        let mut stmt = conn.prepare(
            "SELECT id, model_id, reset_date, run_number, reset_type, created_at
               FROM gdd_resets
              WHERE model_id = ?1
              ORDER BY run_number ASC",
        )?;
        let rows = stmt.query_map(params![model_id], |row| {
            Ok((
                row.get(0)?,
                row.get(1)?,
                row.get(2)?,
                row.get(3)?,
                row.get(4)?,
                row.get(5)?,
            ))
        })?;
        let mut resets = Vec::new();
        for row in rows {
            resets.push(reset_from_row(row?)?);
        }
        Ok(resets)
    }

    async fn get_reset(&self, model_id: i64, reset_id: i64) -> Result<Reset, StoreError> {
        let conn = self.conn.lock().await;
        let row: Option<ResetRow> = conn
            .query_row(
                "SELECT id, model_id, reset_date, run_number, reset_type, created_at
                   FROM gdd_resets
                  WHERE id = ?1 AND model_id = ?2",
                params![reset_id, model_id],
                |row| {
                    Ok((
                        row.get(0)?,
                        row.get(1)?,
                        row.get(2)?,
                        row.get(3)?,
                        row.get(4)?,
                        row.get(5)?,
                    ))
                },
            )
            .optional()?;
        reset_from_row(row.ok_or(StoreError::ResetNotFound(reset_id))?)
    }

    async fn replace_computed(
        &self,
        model_id: i64,
        values: &[DailyValue],
        runs: &[Run],
        resets: &[ResetEvent],
    ) -> Result<(), StoreError> {
        let now = Utc::now();
        let mut conn = self.conn.lock().await;
        let tx = conn.transaction()?;
        ensure_model_exists(&tx, model_id)?;

        tx.execute("DELETE FROM gdd_values WHERE model_id = ?1", params![model_id])?;
        tx.execute("DELETE FROM gdd_runs WHERE model_id = ?1", params![model_id])?;
        tx.execute("DELETE FROM gdd_resets WHERE model_id = ?1", params![model_id])?;

        {
            let mut value_stmt = tx.prepare(
                "INSERT INTO gdd_values (model_id, date, daily_gdd, cumulative_gdd, run_number)
                 VALUES (?1, ?2, ?3, ?4, ?5)",
            )?;
            for v in values {
                value_stmt.execute(params![
                    model_id,
                    v.date.to_string(),
                    v.daily_gdd,
                    v.cumulative_gdd,
                    v.run_number
                ])?;
            }
            let mut run_stmt = tx.prepare(
                "INSERT INTO gdd_runs (model_id, run_number, start_date, end_date)
                 VALUES (?1, ?2, ?3, ?4)",
            )?;
            for r in runs {
                run_stmt.execute(params![
                    model_id,
                    r.run_number,
                    r.start_date.to_string(),
                    r.end_date.map(|d| d.to_string())
                ])?;
            }
            let mut reset_stmt = tx.prepare(
                "INSERT INTO gdd_resets (model_id, reset_date, run_number, reset_type, created_at)
                 VALUES (?1, ?2, ?3, ?4, ?5)",
            )?;
            for r in resets {
                reset_stmt.execute(params![
                    model_id,
                    r.reset_date.to_string(),
                    r.run_number,
                    r.reset_type.as_str(),
                    now.to_rfc3339()
                ])?;
            }
        }
        tx.commit()?;
        tracing::debug!(
            model_id,
            values = values.len(),
            runs = runs.len(),
            resets = resets.len(),
            "replaced computed state"
        );
        Ok(())
    }

    async fn list_values_for_run(
        &self,
        model_id: i64,
        run_number: u32,
    ) -> Result<Vec<DailyValue>, StoreError> {
        let conn = self.conn.lock().await;
        ensure_model_exists(&conn, model_id)?;
        let run_exists: Option<i64> = conn
            .query_row(
                "SELECT run_number FROM gdd_runs WHERE model_id = ?1 AND run_number = ?2",
                params![model_id, run_number],
                |row| row.get(0),
            )
            .optional()?;
        if run_exists.is_none() {
            return Err(StoreError::RunNotFound {
                model_id,
                run_number,
            });
        }

        let mut stmt = conn.prepare(
            "SELECT date, daily_gdd, cumulative_gdd, run_number
               FROM gdd_values
              WHERE model_id = ?1 AND run_number = ?2
              ORDER BY date ASC",
        )?;
        let rows = stmt.query_map(params![model_id, run_number], |row| {
            Ok((
                row.get::<_, String>(0)?,
                row.get::<_, f64>(1)?,
                row.get::<_, f64>(2)?,
                row.get::<_, u32>(3)?,
            ))
        })?;
        let mut values = Vec::new();
        for row in rows {
            let (date, daily_gdd, cumulative_gdd, run_number) = row?;
            values.push(DailyValue {
                date: parse_date(&date)?,
                daily_gdd,
                cumulative_gdd,
                run_number,
            });
        }
        Ok(values)
    }

    async fn latest_computed_date(&self, model_id: i64) -> Result<Option<NaiveDate>, StoreError> {
        let conn = self.conn.lock().await;
        let latest: Option<String> = conn.query_row(
            "SELECT MAX(date) FROM gdd_values WHERE model_id = ?1",
            params![model_id],
            |row| row.get(0),
        )?;
        latest.as_deref().map(parse_date).transpose()
    }

    async fn latest_reset_on_or_before(
        &self,
        model_id: i64,
        date: NaiveDate,
    ) -> Result<Option<Reset>, StoreError> {
        let conn = self.conn.lock().await;
        let row: Option<ResetRow> = conn
            .query_row(
                "SELECT id, model_id, reset_date, run_number, reset_type, created_at
                   FROM gdd_resets
                  WHERE model_id = ?1 AND reset_date <= ?2
                  ORDER BY reset_date DESC
                  LIMIT 1",
                params![model_id, date.to_string()],
                |row| {
                    Ok((
                        row.get(0)?,
                        row.get(1)?,
                        row.get(2)?,
                        row.get(3)?,
                        row.get(4)?,
                        row.get(5)?,
                    ))
                },
            )
            .optional()?;
        row.map(reset_from_row).transpose()
    }

    async fn latest_value_on_or_before(
        &self,
        model_id: i64,
        run_number: u32,
        date: NaiveDate,
    ) -> Result<Option<DailyValue>, StoreError> {
        let conn = self.conn.lock().await;
        let row = conn
            .query_row(
                "SELECT date, daily_gdd, cumulative_gdd, run_number
                   FROM gdd_values
                  WHERE model_id = ?1 AND run_number = ?2 AND date <= ?3
                  ORDER BY date DESC
                  LIMIT 1",
                params![model_id, run_number, date.to_string()],
                |row| {
                    Ok((
                        row.get::<_, String>(0)?,
                        row.get::<_, f64>(1)?,
                        row.get::<_, f64>(2)?,
                        row.get::<_, u32>(3)?,
                    ))
                },
            )
            .optional()?;
        row.map(|(date, daily_gdd, cumulative_gdd, run_number)| {
            Ok(DailyValue {
                date: parse_date(&date)?,
                daily_gdd,
                cumulative_gdd,
                run_number,
            })
        })
        .transpose()
    }
}
