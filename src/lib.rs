pub mod cache;
pub mod config;
pub mod engine;
pub mod error;
pub mod features;
pub mod impact;
pub mod models;
pub mod predict;
pub mod service;
pub mod visualization;

#[cfg(feature = "web")]
pub mod web;

pub use config::ForecastConfig;
pub use error::ForecastError;
pub use models::{
    CellId, ProjectionResult, ProjectionSummary, ScenarioInput, TreeCohortState, YearlyProjection,
};
pub use service::ForecastService;
