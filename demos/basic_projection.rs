//! Basic projection example: run a 10-year forecast for a single cell.
//!
//! Run from the project root:
//!   cargo run --example basic_projection

use std::sync::Arc;

use canopy_forecaster::config::ForecastConfig;
use canopy_forecaster::features::{FeatureProvider, InMemoryFeatureStore};
use canopy_forecaster::models::{HealthMix, SpeciesShare, TreeCohortState};
use canopy_forecaster::predict::PredictorSet;
use canopy_forecaster::service::ForecastService;
use canopy_forecaster::visualization::{print_projection_table, print_summary_table};

fn main() {
    let mut store = InMemoryFeatureStore::new();
    store.insert(
        "882a100d65fffff",
        TreeCohortState {
            tree_count: 120,
            avg_diameter_cm: 18.0,
            species_mix: vec![SpeciesShare {
                code: "PLAC".to_string(),
                fraction: 1.0,
            }],
            health_mix: Some(HealthMix {
                good: 0.5,
                fair: 0.4,
                poor: 0.1,
            }),
        },
    );

    let service = ForecastService::new(
        Arc::new(store) as Arc<dyn FeatureProvider>,
        Arc::new(PredictorSet::rule_based()),
        &ForecastConfig::default(),
    );

    match service.project("882a100d65fffff", 10, 0) {
        Ok(result) => {
            print_projection_table(&result.yearly_projections);
            print_summary_table(&result.summary);
        }
        Err(e) => eprintln!("Projection failed: {e}"),
    }
}
