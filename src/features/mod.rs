mod store;

pub use store::InMemoryFeatureStore;

use crate::error::ForecastError;
use crate::models::{CellId, TreeCohortState};

/// External supplier of a cell's current tree inventory and static
/// environmental attributes.
///
/// The forecasting core consumes this interface only; the concrete spatial
/// pipeline that populates it lives outside this crate.
pub trait FeatureProvider: Send + Sync {
    /// Current aggregate state for a cell, or `CellNotFound`.
    fn cell_features(&self, cell: &CellId) -> Result<TreeCohortState, ForecastError>;

    /// All cells this provider knows about, sorted for stable output.
    fn cell_ids(&self) -> Vec<CellId>;
}
