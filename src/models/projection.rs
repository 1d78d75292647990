use serde::{Deserialize, Serialize};

/// One simulated year's outcome for a cell.
///
/// `year` is 1-indexed; `year == 0` is used for the current-state snapshot
/// returned alongside a projection.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct YearlyProjection {
    pub year: u32,
    /// Expected surviving tree count (fractional, continuous decay)
    pub tree_count: f64,
    /// Count-weighted average DBH across cohorts, cm
    pub avg_diameter_cm: f64,
    /// Fraction of the initially present population still alive, [0, 1]
    pub survival_rate: f64,
    /// Net cooling in °F; negative means net warming
    pub temperature_reduction_f: f64,
    pub co2_sequestration_kg_per_year: f64,
    pub pm25_reduction_lbs_per_year: f64,
}

/// Aggregate over a full projection sequence. Derived from the yearly
/// records, never independently mutated.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProjectionSummary {
    pub years: u32,
    pub final_tree_count: f64,
    pub cumulative_co2_kg: f64,
    pub avg_temperature_reduction_f: f64,
    pub total_pm25_lbs: f64,
}

impl ProjectionSummary {
    /// Reduce a yearly sequence to its summary. Each year's CO₂ and PM2.5
    /// rates are annual quantities, so summing over years yields totals.
    pub fn from_yearly(yearly: &[YearlyProjection]) -> Self {
        let years = yearly.len() as u32;
        let final_tree_count = yearly.last().map(|y| y.tree_count).unwrap_or(0.0);
        let cumulative_co2_kg = yearly.iter().map(|y| y.co2_sequestration_kg_per_year).sum();
        let total_pm25_lbs = yearly.iter().map(|y| y.pm25_reduction_lbs_per_year).sum();
        let avg_temperature_reduction_f = if yearly.is_empty() {
            0.0
        } else {
            yearly
                .iter()
                .map(|y| y.temperature_reduction_f)
                .sum::<f64>()
                / yearly.len() as f64
        };
        Self {
            years,
            final_tree_count,
            cumulative_co2_kg,
            avg_temperature_reduction_f,
            total_pm25_lbs,
        }
    }
}

/// Full response for one scenario: the current state, the year-by-year
/// sequence, and the summary.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProjectionResult {
    /// Year-0 snapshot of the cell as it stands today
    pub current_state: YearlyProjection,
    pub yearly_projections: Vec<YearlyProjection>,
    pub summary: ProjectionSummary,
}
