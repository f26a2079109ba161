use crate::error::StoreError;
use rusqlite::Connection;

pub const SCHEMA_VERSION: i64 = 1;

/// Creates the full schema. Dates are stored as ISO-8601 TEXT, timestamps
/// as RFC 3339 TEXT. Derived tables (`gdd_values`, `gdd_runs`,
/// `gdd_resets`) are replaced wholesale on every recompute.
pub fn init_schema(conn: &Connection) -> Result<(), StoreError> {
    conn.execute_batch(
        "
        PRAGMA journal_mode=WAL;
        PRAGMA synchronous=NORMAL;
        PRAGMA foreign_keys=ON;
        CREATE TABLE IF NOT EXISTS gdd_models (
          id INTEGER PRIMARY KEY AUTOINCREMENT,
          location_id INTEGER NOT NULL,
          name TEXT NOT NULL,
          unit TEXT NOT NULL,
          start_date TEXT NOT NULL,
          base_temp REAL NOT NULL,
          threshold REAL NOT NULL,
          reset_on_threshold INTEGER NOT NULL,
          created_at TEXT NOT NULL,
          updated_at TEXT NOT NULL,
          UNIQUE (location_id, name)
        );
        CREATE TABLE IF NOT EXISTS gdd_model_parameters (
          id INTEGER PRIMARY KEY AUTOINCREMENT,
          model_id INTEGER NOT NULL REFERENCES gdd_models(id) ON DELETE CASCADE,
          base_temp REAL NOT NULL,
          threshold REAL NOT NULL,
          reset_on_threshold INTEGER NOT NULL,
          effective_from TEXT NOT NULL,
          created_at TEXT NOT NULL,
          UNIQUE (model_id, effective_from)
        );
        CREATE TABLE IF NOT EXISTS gdd_values (
          model_id INTEGER NOT NULL REFERENCES gdd_models(id) ON DELETE CASCADE,
          date TEXT NOT NULL,
          daily_gdd REAL NOT NULL,
          cumulative_gdd REAL NOT NULL,
          run_number INTEGER NOT NULL,
          PRIMARY KEY (model_id, date)
        ) WITHOUT ROWID;
        CREATE TABLE IF NOT EXISTS gdd_runs (
          model_id INTEGER NOT NULL REFERENCES gdd_models(id) ON DELETE CASCADE,
          run_number INTEGER NOT NULL,
          start_date TEXT NOT NULL,
          end_date TEXT,
          PRIMARY KEY (model_id, run_number)
        ) WITHOUT ROWID;
        CREATE TABLE IF NOT EXISTS gdd_resets (
          id INTEGER PRIMARY KEY AUTOINCREMENT,
          model_id INTEGER NOT NULL REFERENCES gdd_models(id) ON DELETE CASCADE,
          reset_date TEXT NOT NULL,
          run_number INTEGER NOT NULL,
          reset_type TEXT NOT NULL,
          created_at TEXT NOT NULL,
          UNIQUE (model_id, reset_date)
        );
        CREATE TABLE IF NOT EXISTS daily_weather (
          location_id INTEGER NOT NULL,
          date TEXT NOT NULL,
          temperature_mean_c REAL NOT NULL,
          temperature_mean_f REAL NOT NULL,
          PRIMARY KEY (location_id, date)
        ) WITHOUT ROWID;
        CREATE INDEX IF NOT EXISTS idx_gdd_values_run
          ON gdd_values (model_id, run_number, date);
        CREATE INDEX IF NOT EXISTS idx_gdd_resets_date
          ON gdd_resets (model_id, reset_date);
        ",
    )?;
    conn.execute_batch(&format!("PRAGMA user_version={SCHEMA_VERSION};"))?;
    Ok(())
}
