#![forbid(unsafe_code)]

//! SQLite persistence for the GDD core. All derived state goes through
//! [`ModelStore::replace_computed`] so a failed recompute can never leave a
//! partially updated history behind.

mod error;
mod schema;
mod sqlite;
mod weather;

pub use error::{StoreError, WeatherError};
pub use schema::{init_schema, SCHEMA_VERSION};
pub use sqlite::{ModelStore, SqliteStore};
pub use weather::{SqliteWeatherSource, WeatherSource};
