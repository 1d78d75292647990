mod cohort;
mod projection;
mod scenario;

pub use cohort::{CellId, HealthMix, HealthRating, SpeciesShare, TreeCohortState, MAX_DBH_CM};
pub use projection::{ProjectionResult, ProjectionSummary, YearlyProjection};
pub use scenario::{ScenarioInput, MAX_NEW_TREES, MAX_YEARS, MIN_YEARS};
