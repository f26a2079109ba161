// SPDX-License-Identifier: Apache-2.0

use crate::error::WeatherError;
use async_trait::async_trait;
use chrono::NaiveDate;
use rusqlite::{params, Connection};
use std::sync::Arc;
use sward_model::WeatherDay;
use tokio::sync::Mutex;

/// Read side of the external weather provider. Implementations must fail
/// loudly: an unreachable or erroring source is an error, never an empty
/// series.
#[async_trait]
pub trait WeatherSource: Send + Sync {
    /// Returns every stored day for the location from `from` onward,
    /// ascending by date. Gaps show up as absent dates.
    async fn daily_series(
        &self,
        location_id: i64,
        from: NaiveDate,
    ) -> Result<Vec<WeatherDay>, WeatherError>;
}

/// Weather reader over the `daily_weather` table, populated out-of-band by
/// the provider integration.
pub struct SqliteWeatherSource {
    conn: Arc<Mutex<Connection>>,
}

impl SqliteWeatherSource {
    #[must_use]
    pub fn new(conn: Arc<Mutex<Connection>>) -> Self {
        Self { conn }
    }
}

#[async_trait]
impl WeatherSource for SqliteWeatherSource {
    async fn daily_series(
        &self,
        location_id: i64,
        from: NaiveDate,
    ) -> Result<Vec<WeatherDay>, WeatherError> {
        let conn = self.conn.lock().await;
        let mut stmt = conn
            .prepare(
                "SELECT date, temperature_mean_c, temperature_mean_f
                   FROM daily_weather
                  WHERE location_id = ?1 AND date >= ?2
                  ORDER BY date ASC",
            )
            .map_err(|e| WeatherError(e.to_string()))?;
        let rows = stmt
            .query_map(params![location_id, from.to_string()], |row| {
                Ok((
                    row.get::<_, String>(0)?,
                    row.get::<_, f64>(1)?,
                    row.get::<_, f64>(2)?,
                ))
            })
            .map_err(|e| WeatherError(e.to_string()))?;

        let mut days = Vec::new();
        for row in rows {
            let (date, temperature_mean_c, temperature_mean_f) =
                row.map_err(|e| WeatherError(e.to_string()))?;
            days.push(WeatherDay {
                date: date
                    .parse()
                    .map_err(|e| WeatherError(format!("bad stored date {date:?}: {e}")))?,
                temperature_mean_c,
                temperature_mean_f,
            });
        }
        Ok(days)
    }
}
