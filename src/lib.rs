pub mod adapters;
pub mod config;
pub mod core;
pub mod domain;
pub mod utils;

#[cfg(feature = "cli")]
pub use config::CliArgs;
pub use config::{PlannerConfig, StoreConfig};

pub use adapters::{InMemoryStore, LocalStorage, RestStore};
pub use crate::core::{aggregation::build_forecast, engine::ForecastEngine, export::ReportWriter};
pub use domain::model::{ForecastResult, OwnerId};
pub use utils::error::{PlannerError, Result};
