//! Planting comparison example: the same cell with and without new trees.
//!
//! Run from the project root:
//!   cargo run --example planting_comparison

use std::sync::Arc;

use canopy_forecaster::config::ForecastConfig;
use canopy_forecaster::features::{FeatureProvider, InMemoryFeatureStore};
use canopy_forecaster::models::TreeCohortState;
use canopy_forecaster::predict::PredictorSet;
use canopy_forecaster::service::ForecastService;
use canopy_forecaster::visualization::print_temperature_trend;

fn main() {
    let mut store = InMemoryFeatureStore::new();
    store.insert("882a100d65fffff", TreeCohortState::new(100, 15.0));

    let service = ForecastService::new(
        Arc::new(store) as Arc<dyn FeatureProvider>,
        Arc::new(PredictorSet::rule_based()),
        &ForecastConfig::default(),
    );

    println!("\n=== No action ===");
    match service.project("882a100d65fffff", 15, 0) {
        Ok(result) => print_temperature_trend(&result.yearly_projections),
        Err(e) => eprintln!("Baseline projection failed: {e}"),
    }

    println!("\n=== Plant 300 trees ===");
    match service.project("882a100d65fffff", 15, 300) {
        Ok(result) => print_temperature_trend(&result.yearly_projections),
        Err(e) => eprintln!("Planting projection failed: {e}"),
    }
}
