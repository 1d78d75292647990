use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::error::ForecastError;
use crate::impact::ImpactModel;
use crate::models::{
    HealthRating, ProjectionResult, ProjectionSummary, ScenarioInput, TreeCohortState,
    YearlyProjection, MAX_DBH_CM,
};
use crate::predict::PredictorSet;

/// Starting diameter for a newly planted street tree (cm DBH).
pub const SEEDLING_DBH_CM: f64 = 10.0;
/// Annual survival for the newly planted cohort. Nursery stock under a
/// maintenance contract outlives the established population's average.
pub const NEW_TREE_ANNUAL_SURVIVAL: f64 = 0.98;

/// Tunable engine parameters, overridable from the config file.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineParams {
    pub seedling_dbh_cm: f64,
    pub new_tree_annual_survival: f64,
}

impl Default for EngineParams {
    fn default() -> Self {
        Self {
            seedling_dbh_cm: SEEDLING_DBH_CM,
            new_tree_annual_survival: NEW_TREE_ANNUAL_SURVIVAL,
        }
    }
}

/// How a cohort's annual survival is obtained.
#[derive(Debug, Clone, Copy)]
enum CohortSurvival {
    /// Run the survival predictor against the cohort's attributes.
    Predicted,
    /// Fixed per-year rate (the newly planted cohort).
    Fixed(f64),
}

/// A group of trees sharing one diameter/survival trajectory.
#[derive(Debug, Clone)]
struct Cohort {
    initial_count: f64,
    dbh_cm: f64,
    /// Compound survival since year 0, so `count = initial * fraction`.
    surviving_fraction: f64,
    species: Option<String>,
    health: HealthRating,
    survival: CohortSurvival,
}

impl Cohort {
    fn count(&self) -> f64 {
        self.initial_count * self.surviving_fraction
    }

    /// Advance one year: grow the trunk (saturating at the maximum
    /// plausible size) and compound this year's survival.
    ///
    /// An empty cohort does not evolve; its diameter stays where it is so
    /// an empty cell contributes nothing to the impact formulas.
    fn step(&mut self, predictors: &PredictorSet) {
        if self.initial_count <= 0.0 {
            return;
        }
        let annual = match self.survival {
            CohortSurvival::Fixed(p) => p,
            CohortSurvival::Predicted => predictors.survival.predict_annual_survival(
                self.dbh_cm,
                self.species.as_deref(),
                self.health,
            ),
        };
        let growth = predictors.growth.predict_growth(
            self.dbh_cm,
            self.species.as_deref(),
            self.health,
            annual,
        );
        self.dbh_cm = (self.dbh_cm + growth).min(MAX_DBH_CM);
        self.surviving_fraction *= annual;
    }
}

/// Year-by-year simulation composing the predictors and the impact
/// formulas into a projection sequence.
///
/// Yearly steps are strictly sequential — each year's state derives from
/// the previous year's — and a failure at any year aborts the whole
/// projection with no partial result.
#[derive(Debug, Clone)]
pub struct ProjectionEngine {
    predictors: Arc<PredictorSet>,
    impact: ImpactModel,
    params: EngineParams,
}

impl ProjectionEngine {
    pub fn new(predictors: Arc<PredictorSet>, impact: ImpactModel, params: EngineParams) -> Self {
        Self {
            predictors,
            impact,
            params,
        }
    }

    /// Year-0 view of a cell: current inventory with full survival and
    /// today's impact figures.
    pub fn snapshot(&self, state: &TreeCohortState) -> YearlyProjection {
        let count = state.tree_count as f64;
        let survival = if state.tree_count > 0 { 1.0 } else { 0.0 };
        YearlyProjection {
            year: 0,
            tree_count: count,
            avg_diameter_cm: state.avg_diameter_cm,
            survival_rate: survival,
            temperature_reduction_f: self
                .impact
                .temperature_reduction(state.avg_diameter_cm, survival),
            co2_sequestration_kg_per_year: self
                .impact
                .co2_sequestration(state.avg_diameter_cm, survival),
            pm25_reduction_lbs_per_year: self.impact.pm25_reduction(count),
        }
    }

    /// Run the full simulation for a validated scenario against a cell's
    /// current state.
    pub fn project(
        &self,
        state: &TreeCohortState,
        scenario: &ScenarioInput,
    ) -> Result<ProjectionResult, ForecastError> {
        state.validate()?;

        let mut existing = Cohort {
            initial_count: state.tree_count as f64,
            dbh_cm: state.avg_diameter_cm,
            surviving_fraction: 1.0,
            species: state.dominant_species().map(String::from),
            health: state.dominant_health(),
            survival: CohortSurvival::Predicted,
        };
        let mut planted: Option<Cohort> = None;

        let mut yearly = Vec::with_capacity(scenario.years as usize);

        for year in 1..=scenario.years {
            existing.step(&self.predictors);

            // Plantings happen once, at year 0; the cohort appears at the
            // start of year 1 and evolves independently from then on.
            if year == 1 && scenario.plants_new_trees() {
                planted = Some(Cohort {
                    initial_count: scenario.new_trees_to_plant as f64,
                    dbh_cm: self.params.seedling_dbh_cm,
                    surviving_fraction: 1.0,
                    species: existing.species.clone(),
                    health: HealthRating::Good,
                    survival: CohortSurvival::Fixed(self.params.new_tree_annual_survival),
                });
            }
            if let Some(cohort) = planted.as_mut() {
                cohort.step(&self.predictors);
            }

            let projection = self.combine(year, &existing, planted.as_ref(), scenario)?;
            yearly.push(projection);
        }

        let summary = ProjectionSummary::from_yearly(&yearly);
        Ok(ProjectionResult {
            current_state: self.snapshot(state),
            yearly_projections: yearly,
            summary,
        })
    }

    /// Merge the cohorts and evaluate this year's impact figures.
    fn combine(
        &self,
        year: u32,
        existing: &Cohort,
        planted: Option<&Cohort>,
        scenario: &ScenarioInput,
    ) -> Result<YearlyProjection, ForecastError> {
        let cohorts = std::iter::once(existing).chain(planted);
        let mut total_count = 0.0;
        let mut total_initial = 0.0;
        let mut weighted_dbh = 0.0;
        for cohort in cohorts {
            total_count += cohort.count();
            total_initial += cohort.initial_count;
            weighted_dbh += cohort.count() * cohort.dbh_cm;
        }

        // Tree-count-weighted effective diameter across cohorts.
        let avg_diameter_cm = if total_count > 0.0 {
            weighted_dbh / total_count
        } else {
            0.0
        };
        let survival_rate = if total_initial > 0.0 {
            total_count / total_initial
        } else {
            0.0
        };

        let mut temperature_reduction_f = self
            .impact
            .temperature_reduction(avg_diameter_cm, survival_rate);
        // Ambient warming applies to the no-action scenario; a planting
        // program is assumed to counteract it locally.
        if !scenario.plants_new_trees() {
            temperature_reduction_f -= self.impact.baseline_warming(year);
        }
        let co2_sequestration_kg_per_year =
            self.impact.co2_sequestration(avg_diameter_cm, survival_rate);
        let pm25_reduction_lbs_per_year = self.impact.pm25_reduction(total_count);

        let projection = YearlyProjection {
            year,
            tree_count: total_count,
            avg_diameter_cm,
            survival_rate,
            temperature_reduction_f,
            co2_sequestration_kg_per_year,
            pm25_reduction_lbs_per_year,
        };
        check_finite(&projection)?;
        Ok(projection)
    }
}

/// Fail fast on any non-finite figure so a bad value can never reach the
/// cache or the caller.
fn check_finite(p: &YearlyProjection) -> Result<(), ForecastError> {
    let fields = [
        ("tree_count", p.tree_count),
        ("avg_diameter_cm", p.avg_diameter_cm),
        ("survival_rate", p.survival_rate),
        ("temperature_reduction_f", p.temperature_reduction_f),
        ("co2_sequestration_kg_per_year", p.co2_sequestration_kg_per_year),
        ("pm25_reduction_lbs_per_year", p.pm25_reduction_lbs_per_year),
    ];
    for (name, value) in fields {
        if !value.is_finite() {
            return Err(ForecastError::Computation(format!(
                "non-finite {name} at year {}",
                p.year
            )));
        }
    }
    Ok(())
}
