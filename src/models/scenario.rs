use serde::{Deserialize, Serialize};

use crate::error::ForecastError;
use crate::models::CellId;

/// Minimum projection horizon in years.
pub const MIN_YEARS: u32 = 1;
/// Maximum projection horizon in years.
pub const MAX_YEARS: u32 = 30;
/// Upper bound on plantings per scenario; anything beyond this is a typo,
/// not a plan.
pub const MAX_NEW_TREES: u32 = 1_000_000;

/// Immutable descriptor of one projection request.
///
/// Constructed only through [`ScenarioInput::new`], which rejects
/// out-of-range values instead of clamping them, so a `ScenarioInput`
/// in hand is always valid.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ScenarioInput {
    pub cell_id: CellId,
    /// Projection horizon, 1..=30
    pub years: u32,
    /// Trees planted once at year 0, as a distinct cohort
    pub new_trees_to_plant: u32,
}

impl ScenarioInput {
    /// Validate and build a scenario. Inputs are signed because the
    /// request boundary (CLI flags, query parameters) is signed; negative
    /// values are rejected with `InvalidScenario`.
    pub fn new(
        cell_id: impl Into<CellId>,
        years: i64,
        new_trees_to_plant: i64,
    ) -> Result<Self, ForecastError> {
        if years < MIN_YEARS as i64 || years > MAX_YEARS as i64 {
            return Err(ForecastError::InvalidScenario(format!(
                "years must be in {MIN_YEARS}..={MAX_YEARS}, got {years}"
            )));
        }
        if new_trees_to_plant < 0 {
            return Err(ForecastError::InvalidScenario(format!(
                "new_trees_to_plant must be non-negative, got {new_trees_to_plant}"
            )));
        }
        if new_trees_to_plant > MAX_NEW_TREES as i64 {
            return Err(ForecastError::InvalidScenario(format!(
                "new_trees_to_plant must be at most {MAX_NEW_TREES}, got {new_trees_to_plant}"
            )));
        }
        Ok(Self {
            cell_id: cell_id.into(),
            years: years as u32,
            new_trees_to_plant: new_trees_to_plant as u32,
        })
    }

    pub fn plants_new_trees(&self) -> bool {
        self.new_trees_to_plant > 0
    }
}
