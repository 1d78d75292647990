use std::sync::Arc;

use crate::cache::{CacheStats, ResultCache};
use crate::config::ForecastConfig;
use crate::engine::ProjectionEngine;
use crate::error::ForecastError;
use crate::features::FeatureProvider;
use crate::models::{CellId, ProjectionResult, ScenarioInput, YearlyProjection};
use crate::predict::PredictorSet;

/// Constructed-once context wiring the feature provider, the predictor
/// pair, the simulation engine, and the result cache together.
///
/// Everything inside is read-mostly after construction; the cache is the
/// only mutable shared structure, and it manages its own locking. The
/// service is `Send + Sync` and is shared across request handlers.
pub struct ForecastService {
    provider: Arc<dyn FeatureProvider>,
    engine: ProjectionEngine,
    cache: ResultCache,
}

impl ForecastService {
    pub fn new(
        provider: Arc<dyn FeatureProvider>,
        predictors: Arc<PredictorSet>,
        config: &ForecastConfig,
    ) -> Self {
        tracing::info!(predictors = %predictors.describe(), "forecast service ready");
        Self {
            provider,
            engine: ProjectionEngine::new(predictors, config.impact.clone(), config.engine.clone()),
            cache: ResultCache::new(config.cache.ttl()),
        }
    }

    /// Validate and run one scenario. Signed inputs because the request
    /// boundary is signed; rejection happens before any lookup or
    /// computation starts.
    pub fn project(
        &self,
        cell_id: &str,
        years: i64,
        new_trees: i64,
    ) -> Result<Arc<ProjectionResult>, ForecastError> {
        let scenario = ScenarioInput::new(cell_id, years, new_trees)?;
        self.project_scenario(&scenario)
    }

    /// Run a validated scenario through the cache; on a miss the feature
    /// provider is queried once and the engine runs.
    pub fn project_scenario(
        &self,
        scenario: &ScenarioInput,
    ) -> Result<Arc<ProjectionResult>, ForecastError> {
        self.cache.get_or_compute(scenario, || {
            let state = self.provider.cell_features(&scenario.cell_id)?;
            tracing::debug!(
                cell = %scenario.cell_id,
                years = scenario.years,
                new_trees = scenario.new_trees_to_plant,
                "running projection"
            );
            self.engine.project(&state, scenario)
        })
    }

    /// Year-0 view of a cell without running a simulation.
    pub fn cell_snapshot(&self, cell_id: &str) -> Result<YearlyProjection, ForecastError> {
        let state = self.provider.cell_features(&CellId::new(cell_id))?;
        Ok(self.engine.snapshot(&state))
    }

    pub fn cells(&self) -> Vec<CellId> {
        self.provider.cell_ids()
    }

    /// All known cells with their current state, sorted by cell id.
    pub fn cell_states(&self) -> Vec<(CellId, crate::models::TreeCohortState)> {
        self.provider
            .cell_ids()
            .into_iter()
            .filter_map(|id| {
                let state = self.provider.cell_features(&id).ok()?;
                Some((id, state))
            })
            .collect()
    }

    pub fn cache_stats(&self) -> CacheStats {
        self.cache.stats()
    }
}
