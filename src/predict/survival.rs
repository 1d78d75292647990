use serde::{Deserialize, Serialize};

use crate::models::HealthRating;
use crate::predict::LinearArtifact;

/// Feature layout for the learned survival model:
/// `[dbh, ln(1+dbh), species_idx, health_idx]`.
pub const SURVIVAL_FEATURES: usize = 4;

/// Clamp bounds on an annual survival probability. Kept strictly inside
/// (0, 1): a population never vanishes in one step and never stops dying.
pub const MIN_ANNUAL_SURVIVAL: f64 = 0.70;
pub const MAX_ANNUAL_SURVIVAL: f64 = 0.99;

/// Health-keyed annual survival constants for the rule-based fallback.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HealthSurvivalRates {
    pub good: f64,
    pub fair: f64,
    pub poor: f64,
}

impl Default for HealthSurvivalRates {
    fn default() -> Self {
        Self {
            good: 0.99,
            fair: 0.95,
            poor: 0.70,
        }
    }
}

impl HealthSurvivalRates {
    pub fn rate_for(&self, health: HealthRating) -> f64 {
        match health {
            HealthRating::Good => self.good,
            HealthRating::Fair => self.fair,
            HealthRating::Poor => self.poor,
        }
    }
}

/// Annual survival-probability predictor, selected once at startup.
#[derive(Debug, Clone)]
pub enum SurvivalPredictor {
    Learned(LinearArtifact),
    RuleBased(HealthSurvivalRates),
}

impl SurvivalPredictor {
    pub fn rule_based() -> Self {
        SurvivalPredictor::RuleBased(HealthSurvivalRates::default())
    }

    pub fn is_learned(&self) -> bool {
        matches!(self, SurvivalPredictor::Learned(_))
    }

    /// Probability of surviving the coming year, strictly in (0, 1].
    ///
    /// Valid even for a zero diameter; a population of size zero is handled
    /// upstream, not by survival semantics.
    pub fn predict_annual_survival(
        &self,
        dbh_cm: f64,
        species_code: Option<&str>,
        health: HealthRating,
    ) -> f64 {
        let dbh = dbh_cm.max(0.0);
        match self {
            SurvivalPredictor::RuleBased(rates) => rates.rate_for(health),
            SurvivalPredictor::Learned(artifact) => {
                let features = [
                    dbh,
                    dbh.ln_1p(),
                    artifact.encode_species(species_code),
                    artifact.encode_health(health),
                ];
                artifact
                    .predict(&features)
                    .clamp(MIN_ANNUAL_SURVIVAL, MAX_ANNUAL_SURVIVAL)
            }
        }
    }
}

/// Probability of surviving `k` consecutive years given a per-year
/// probability: `p^k`, assuming independence across years for a fixed
/// attribute state.
pub fn compound_survival(annual: f64, years: u32) -> f64 {
    annual.powi(years as i32)
}
