use serde::{Deserialize, Serialize};

/// Cooling at the reference diameter (°F).
pub const TEMP_BASE_F: f64 = 0.06;
/// Reference trunk diameter the literature constants are calibrated to (cm).
pub const REF_DBH_CM: f64 = 20.0;
/// Canopy area scales quadratically with trunk diameter.
pub const TEMP_EXPONENT: f64 = 2.0;
/// Sequestration at the reference diameter (kg CO₂/year).
pub const CO2_BASE_KG_PER_YEAR: f64 = 21.77;
/// Biomass scales sub-quadratically with trunk diameter.
pub const CO2_EXPONENT: f64 = 1.5;
/// Particulate capture per tree (lbs/year).
pub const PM25_LBS_PER_TREE: f64 = 0.18;
/// Regional warming trend from the long-run local temperature record
/// (°F/year).
pub const BASELINE_WARMING_F_PER_YEAR: f64 = 0.054;

/// Deterministic allometric impact formulas.
///
/// No learned parameters: two literature-derived base rates and exponents,
/// plus the regional baseline warming trend. All functions tolerate a zero
/// diameter and never return NaN or infinity for finite inputs.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ImpactModel {
    pub temperature_base_f: f64,
    pub reference_dbh_cm: f64,
    pub temperature_exponent: f64,
    pub co2_base_kg_per_year: f64,
    pub co2_exponent: f64,
    pub pm25_lbs_per_tree: f64,
    pub baseline_warming_f_per_year: f64,
}

impl Default for ImpactModel {
    fn default() -> Self {
        Self {
            temperature_base_f: TEMP_BASE_F,
            reference_dbh_cm: REF_DBH_CM,
            temperature_exponent: TEMP_EXPONENT,
            co2_base_kg_per_year: CO2_BASE_KG_PER_YEAR,
            co2_exponent: CO2_EXPONENT,
            pm25_lbs_per_tree: PM25_LBS_PER_TREE,
            baseline_warming_f_per_year: BASELINE_WARMING_F_PER_YEAR,
        }
    }
}

impl ImpactModel {
    /// Size scaling factor `(dbh / ref)^exp`, 0 for a zero diameter.
    fn size_factor(&self, dbh_cm: f64, exponent: f64) -> f64 {
        if dbh_cm <= 0.0 {
            return 0.0;
        }
        (dbh_cm / self.reference_dbh_cm).powf(exponent)
    }

    /// Cooling delivered by the cohort at the given effective diameter,
    /// scaled by its surviving fraction (°F).
    pub fn temperature_reduction(&self, dbh_cm: f64, survival: f64) -> f64 {
        self.temperature_base_f * self.size_factor(dbh_cm, self.temperature_exponent) * survival
    }

    /// Annual CO₂ sequestration at the given effective diameter, scaled by
    /// the surviving fraction (kg/year).
    pub fn co2_sequestration(&self, dbh_cm: f64, survival: f64) -> f64 {
        self.co2_base_kg_per_year * self.size_factor(dbh_cm, self.co2_exponent) * survival
    }

    /// Annual PM2.5 capture for the surviving count (lbs/year).
    pub fn pm25_reduction(&self, tree_count: f64) -> f64 {
        tree_count.max(0.0) * self.pm25_lbs_per_tree
    }

    /// Cumulative ambient warming over the elapsed years (°F), applied when
    /// a scenario plants nothing.
    pub fn baseline_warming(&self, elapsed_years: u32) -> f64 {
        self.baseline_warming_f_per_year * elapsed_years as f64
    }
}
