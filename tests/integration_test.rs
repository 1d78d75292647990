use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Barrier};

use assert_approx_eq::assert_approx_eq;
use proptest::prelude::*;

use canopy_forecaster::{
    config::ForecastConfig,
    engine::{EngineParams, ProjectionEngine},
    error::ForecastError,
    features::{FeatureProvider, InMemoryFeatureStore},
    impact::ImpactModel,
    models::{CellId, HealthMix, ScenarioInput, SpeciesShare, TreeCohortState},
    predict::{compound_survival, PredictorSet, SurvivalPredictor},
    service::ForecastService,
};

fn test_state() -> TreeCohortState {
    TreeCohortState {
        tree_count: 100,
        avg_diameter_cm: 15.0,
        species_mix: vec![
            SpeciesShare {
                code: "ACRU".to_string(),
                fraction: 0.4,
            },
            SpeciesShare {
                code: "QURU".to_string(),
                fraction: 0.6,
            },
        ],
        health_mix: Some(HealthMix {
            good: 0.2,
            fair: 0.7,
            poor: 0.1,
        }),
    }
}

fn test_service() -> ForecastService {
    let mut store = InMemoryFeatureStore::new();
    store.insert("cell-x", test_state());
    store.insert("cell-empty", TreeCohortState::new(0, 0.0));
    ForecastService::new(
        Arc::new(store) as Arc<dyn FeatureProvider>,
        Arc::new(PredictorSet::rule_based()),
        &ForecastConfig::default(),
    )
}

// --- Scenario examples ---

#[test]
fn test_no_action_temperature_declines_over_decade() {
    let service = test_service();
    let result = service.project("cell-x", 10, 0).unwrap();
    let yearly = &result.yearly_projections;
    assert_eq!(yearly.len(), 10);
    assert!(
        yearly[9].temperature_reduction_f < yearly[0].temperature_reduction_f,
        "fewer surviving trees plus ambient warming should drag year 10 below year 1"
    );
}

#[test]
fn test_planting_beats_no_action_at_year_ten() {
    let service = test_service();
    let baseline = service.project("cell-x", 10, 0).unwrap();
    let planted = service.project("cell-x", 10, 200).unwrap();
    assert!(
        planted.yearly_projections[9].temperature_reduction_f
            > baseline.yearly_projections[9].temperature_reduction_f
    );
}

#[test]
fn test_empty_cell_single_year_is_baseline_warming_only() {
    let service = test_service();
    let result = service.project("cell-empty", 1, 0).unwrap();
    let y1 = &result.yearly_projections[0];
    assert_eq!(y1.tree_count, 0.0);
    assert_eq!(y1.co2_sequestration_kg_per_year, 0.0);
    assert_eq!(y1.pm25_reduction_lbs_per_year, 0.0);
    assert_approx_eq!(
        y1.temperature_reduction_f,
        -ImpactModel::default().baseline_warming(1)
    );
}

#[test]
fn test_out_of_range_scenarios_rejected() {
    let service = test_service();
    assert!(matches!(
        service.project("cell-x", 31, 0),
        Err(ForecastError::InvalidScenario(_))
    ));
    assert!(matches!(
        service.project("cell-x", 10, -1),
        Err(ForecastError::InvalidScenario(_))
    ));
    assert!(matches!(
        service.project("cell-x", 0, 0),
        Err(ForecastError::InvalidScenario(_))
    ));
}

#[test]
fn test_unknown_cell_surfaces_not_found() {
    let service = test_service();
    let err = service.project("nowhere", 10, 0).unwrap_err();
    assert!(matches!(err, ForecastError::CellNotFound(_)));
}

// --- Testable properties ---

#[test]
fn test_diameter_monotone_and_bounded() {
    let service = test_service();
    for new_trees in [0, 250] {
        let result = service.project("cell-x", 30, new_trees).unwrap();
        let yearly = &result.yearly_projections;
        // The year-1 merge with a seedling cohort may pull the combined
        // average down; from then on both cohorts only grow.
        for w in yearly.windows(2) {
            assert!(
                w[1].avg_diameter_cm >= w[0].avg_diameter_cm,
                "diameter shrank between years {} and {}",
                w[0].year,
                w[1].year
            );
            assert!(w[1].avg_diameter_cm <= 100.0);
        }
    }
}

#[test]
fn test_survival_compounding_matches_power_rule() {
    let predictor = SurvivalPredictor::rule_based();
    let annual = predictor.predict_annual_survival(15.0, None, canopy_forecaster::models::HealthRating::Fair);
    for k in [1u32, 5, 10, 30] {
        assert_approx_eq!(compound_survival(annual, k), annual.powi(k as i32), 1e-12);
    }
}

#[test]
fn test_cache_idempotence_bit_identical_without_recompute() {
    struct CountingProvider {
        inner: InMemoryFeatureStore,
        lookups: AtomicUsize,
    }

    impl FeatureProvider for CountingProvider {
        fn cell_features(&self, cell: &CellId) -> Result<TreeCohortState, ForecastError> {
            self.lookups.fetch_add(1, Ordering::SeqCst);
            self.inner.cell_features(cell)
        }

        fn cell_ids(&self) -> Vec<CellId> {
            self.inner.cell_ids()
        }
    }

    let mut store = InMemoryFeatureStore::new();
    store.insert("cell-x", test_state());
    let provider = Arc::new(CountingProvider {
        inner: store,
        lookups: AtomicUsize::new(0),
    });
    let service = ForecastService::new(
        Arc::clone(&provider) as Arc<dyn FeatureProvider>,
        Arc::new(PredictorSet::rule_based()),
        &ForecastConfig::default(),
    );

    let first = service.project("cell-x", 10, 50).unwrap();
    let second = service.project("cell-x", 10, 50).unwrap();
    assert_eq!(*first, *second);
    assert!(Arc::ptr_eq(&first, &second));
    assert_eq!(provider.lookups.load(Ordering::SeqCst), 1);
    assert_eq!(service.cache_stats().computations, 1);
}

#[test]
fn test_concurrent_requests_for_one_key_compute_once() {
    let service = Arc::new(test_service());
    let barrier = Arc::new(Barrier::new(8));

    let handles: Vec<_> = (0..8)
        .map(|_| {
            let service = Arc::clone(&service);
            let barrier = Arc::clone(&barrier);
            std::thread::spawn(move || {
                barrier.wait();
                service.project("cell-x", 20, 100)
            })
        })
        .collect();

    let results: Vec<_> = handles
        .into_iter()
        .map(|h| h.join().unwrap().unwrap())
        .collect();

    assert_eq!(service.cache_stats().computations, 1);
    for r in &results[1..] {
        assert_eq!(**r, *results[0]);
    }
}

#[test]
fn test_superseded_scenarios_all_land_in_cache() {
    // A user dragging the slider issues a burst of distinct scenarios; each
    // completed computation stays valid for its own key.
    let service = test_service();
    for years in 1..=10 {
        service.project("cell-x", years, 0).unwrap();
    }
    for years in 1..=10 {
        service.project("cell-x", years, 0).unwrap();
    }
    assert_eq!(service.cache_stats().computations, 10);
    assert_eq!(service.cache_stats().hits, 10);
}

#[test]
fn test_summary_consistent_with_yearly_sequence() {
    let service = test_service();
    let result = service.project("cell-x", 10, 0).unwrap();
    let co2_sum: f64 = result
        .yearly_projections
        .iter()
        .map(|y| y.co2_sequestration_kg_per_year)
        .sum();
    assert_approx_eq!(result.summary.cumulative_co2_kg, co2_sum);
    assert_approx_eq!(
        result.summary.final_tree_count,
        result.yearly_projections.last().unwrap().tree_count
    );
}

#[test]
fn test_rule_based_and_learned_engines_share_contract() {
    // Whatever predictor variant is live, the projection obeys the same
    // shape and invariants.
    let engine = ProjectionEngine::new(
        Arc::new(PredictorSet::rule_based()),
        ImpactModel::default(),
        EngineParams::default(),
    );
    let scenario = ScenarioInput::new("cell-x", 30, 10).unwrap();
    let result = engine.project(&test_state(), &scenario).unwrap();
    assert_eq!(result.yearly_projections.len(), 30);
    for y in &result.yearly_projections {
        assert!(y.tree_count >= 0.0);
        assert!((0.0..=1.0).contains(&y.survival_rate));
        assert!(y.co2_sequestration_kg_per_year >= 0.0);
        assert!(y.pm25_reduction_lbs_per_year >= 0.0);
    }
}

// --- Property tests over the impact kernels ---

proptest! {
    #[test]
    fn prop_impacts_non_negative_and_finite(
        dbh in 0.0f64..150.0,
        survival in 0.0f64..=1.0,
        count in 0.0f64..1e6,
    ) {
        let m = ImpactModel::default();
        let temp = m.temperature_reduction(dbh, survival);
        let co2 = m.co2_sequestration(dbh, survival);
        let pm25 = m.pm25_reduction(count);
        prop_assert!(temp.is_finite());
        prop_assert!(co2.is_finite() && co2 >= 0.0);
        prop_assert!(pm25.is_finite() && pm25 >= 0.0);
        prop_assert!(temp >= 0.0);
    }

    #[test]
    fn prop_impacts_monotone_in_diameter(
        a in 0.0f64..100.0,
        b in 0.0f64..100.0,
        survival in 0.01f64..=1.0,
    ) {
        let m = ImpactModel::default();
        let (lo, hi) = if a <= b { (a, b) } else { (b, a) };
        prop_assert!(m.temperature_reduction(lo, survival) <= m.temperature_reduction(hi, survival));
        prop_assert!(m.co2_sequestration(lo, survival) <= m.co2_sequestration(hi, survival));
    }

    #[test]
    fn prop_compound_survival_in_unit_interval(
        annual in 0.5f64..0.999,
        years in 1u32..=30,
    ) {
        let c = compound_survival(annual, years);
        prop_assert!(c > 0.0 && c <= annual);
    }
}
