mod artifact;
mod growth;
mod survival;

use std::path::Path;

pub use artifact::LinearArtifact;
pub use growth::{
    GrowthPredictor, GrowthTiers, GROWTH_FEATURES, MAX_GROWTH_CM_PER_YEAR,
    MEDIUM_MAX_DBH_CM, MIN_GROWTH_CM_PER_YEAR, YOUNG_MAX_DBH_CM,
};
pub use survival::{
    compound_survival, HealthSurvivalRates, SurvivalPredictor, MAX_ANNUAL_SURVIVAL,
    MIN_ANNUAL_SURVIVAL, SURVIVAL_FEATURES,
};

/// Artifact file names looked up inside a model directory.
pub const GROWTH_ARTIFACT: &str = "growth_model.json";
pub const SURVIVAL_ARTIFACT: &str = "survival_model.json";

/// The growth/survival predictor pair, selected once at startup and treated
/// as an immutable shared-read resource for the process lifetime.
#[derive(Debug, Clone)]
pub struct PredictorSet {
    pub growth: GrowthPredictor,
    pub survival: SurvivalPredictor,
}

impl PredictorSet {
    /// The pure-fallback set used when no artifact directory is configured.
    pub fn rule_based() -> Self {
        Self {
            growth: GrowthPredictor::rule_based(),
            survival: SurvivalPredictor::rule_based(),
        }
    }

    /// Load learned artifacts from a directory, falling back per-predictor
    /// to the rule tiers when an artifact is missing or malformed.
    ///
    /// The fallback is recovery, not failure: the request path keeps
    /// working, and the downgrade is logged rather than swallowed.
    pub fn load(dir: impl AsRef<Path>) -> Self {
        let dir = dir.as_ref();
        let growth = match LinearArtifact::from_path(dir.join(GROWTH_ARTIFACT), GROWTH_FEATURES) {
            Ok(artifact) => GrowthPredictor::Learned(artifact),
            Err(e) => {
                tracing::warn!(error = %e, "growth model unavailable, using rule-based tiers");
                GrowthPredictor::rule_based()
            }
        };
        let survival =
            match LinearArtifact::from_path(dir.join(SURVIVAL_ARTIFACT), SURVIVAL_FEATURES) {
                Ok(artifact) => SurvivalPredictor::Learned(artifact),
                Err(e) => {
                    tracing::warn!(error = %e, "survival model unavailable, using health-keyed constants");
                    SurvivalPredictor::rule_based()
                }
            };
        Self { growth, survival }
    }

    /// Short description for startup logging.
    pub fn describe(&self) -> String {
        let name = |learned: bool| if learned { "learned" } else { "rule-based" };
        format!(
            "growth={}, survival={}",
            name(self.growth.is_learned()),
            name(self.survival.is_learned())
        )
    }
}
