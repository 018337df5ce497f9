pub mod aggregation;
pub mod calendar;
pub mod engine;
pub mod export;

pub use crate::domain::model::{
    AllocationRecord, BenchConsultant, Consultant, ConsultantForecast, ForecastResult, OwnerId,
    WeeklyForecast,
};
pub use crate::domain::ports::{RecordStore, Storage};
pub use crate::utils::error::Result;
