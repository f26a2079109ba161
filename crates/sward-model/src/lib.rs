#![forbid(unsafe_code)]

//! Domain types shared by the sward engine, store, and server crates.

mod model;
mod params;
mod reset;
mod value;
mod weather;

pub use model::{GddModel, ModelName, NewModel, TempUnit, ValidationError, MODEL_NAME_MAX_LEN};
pub use params::{validate_parameters, ParameterVersion};
pub use reset::{Reset, ResetEvent, ResetType};
pub use value::{DailyValue, Run};
pub use weather::WeatherDay;
