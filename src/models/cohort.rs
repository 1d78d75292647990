use serde::{Deserialize, Serialize};

/// Diameter at which trunk growth saturates (cm DBH).
pub const MAX_DBH_CM: f64 = 100.0;

/// Opaque spatial identifier for a hexagonal grid cell.
///
/// The feature provider buckets geography into H3 cells; this core treats
/// the index purely as a lookup key.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CellId(pub String);

impl CellId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for CellId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<&str> for CellId {
    fn from(s: &str) -> Self {
        CellId(s.to_string())
    }
}

/// Health rating of a tree population, as recorded by street-tree censuses.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum HealthRating {
    Good,
    Fair,
    Poor,
}

impl std::fmt::Display for HealthRating {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            HealthRating::Good => write!(f, "Good"),
            HealthRating::Fair => write!(f, "Fair"),
            HealthRating::Poor => write!(f, "Poor"),
        }
    }
}

impl std::str::FromStr for HealthRating {
    type Err = crate::error::ForecastError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "good" | "g" => Ok(HealthRating::Good),
            "fair" | "f" => Ok(HealthRating::Fair),
            "poor" | "p" => Ok(HealthRating::Poor),
            _ => Err(crate::error::ForecastError::Parse(format!(
                "Unknown health rating: '{s}'"
            ))),
        }
    }
}

/// One species' share of a cell's tree population.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SpeciesShare {
    /// Species code (e.g. "ACRU" for Acer rubrum)
    pub code: String,
    /// Fraction of the population (0.0 - 1.0)
    pub fraction: f64,
}

/// Health distribution of a cell's tree population.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct HealthMix {
    pub good: f64,
    pub fair: f64,
    pub poor: f64,
}

impl HealthMix {
    /// The most common rating, used as the predictor input for the cohort.
    pub fn dominant(&self) -> HealthRating {
        if self.good >= self.fair && self.good >= self.poor {
            HealthRating::Good
        } else if self.fair >= self.poor {
            HealthRating::Fair
        } else {
            HealthRating::Poor
        }
    }
}

/// Aggregate state of a cell's street-tree population at a point in time.
///
/// This is what the external feature provider supplies per cell: a count,
/// an average trunk diameter, and optional species/health distributions
/// used as predictor inputs.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TreeCohortState {
    /// Number of living trees in the cell
    pub tree_count: u32,
    /// Average diameter at breast height in centimeters, in [0, 100]
    pub avg_diameter_cm: f64,
    /// Species distribution (optional)
    #[serde(default)]
    pub species_mix: Vec<SpeciesShare>,
    /// Health distribution (optional)
    #[serde(default)]
    pub health_mix: Option<HealthMix>,
}

impl TreeCohortState {
    /// Create a state with no distribution information.
    pub fn new(tree_count: u32, avg_diameter_cm: f64) -> Self {
        Self {
            tree_count,
            avg_diameter_cm,
            species_mix: Vec::new(),
            health_mix: None,
        }
    }

    /// The species code carrying the largest share, if any mix was recorded.
    pub fn dominant_species(&self) -> Option<&str> {
        self.species_mix
            .iter()
            .max_by(|a, b| a.fraction.total_cmp(&b.fraction))
            .map(|s| s.code.as_str())
    }

    /// The most common health rating, defaulting to `Fair` when unrecorded.
    pub fn dominant_health(&self) -> HealthRating {
        self.health_mix
            .map(|m| m.dominant())
            .unwrap_or(HealthRating::Fair)
    }

    /// Validate the §3 invariants. Returns `ForecastError::Parse` on failure.
    pub fn validate(&self) -> Result<(), crate::error::ForecastError> {
        if !self.avg_diameter_cm.is_finite() || self.avg_diameter_cm < 0.0 {
            return Err(crate::error::ForecastError::Parse(format!(
                "avg_diameter_cm must be a non-negative number, got {}",
                self.avg_diameter_cm
            )));
        }
        if self.avg_diameter_cm > MAX_DBH_CM {
            return Err(crate::error::ForecastError::Parse(format!(
                "avg_diameter_cm must be at most {MAX_DBH_CM}, got {}",
                self.avg_diameter_cm
            )));
        }
        for share in &self.species_mix {
            if !(0.0..=1.0).contains(&share.fraction) {
                return Err(crate::error::ForecastError::Parse(format!(
                    "species '{}' fraction must be in 0.0..=1.0, got {}",
                    share.code, share.fraction
                )));
            }
        }
        if let Some(mix) = &self.health_mix {
            for (name, v) in [("good", mix.good), ("fair", mix.fair), ("poor", mix.poor)] {
                if !(0.0..=1.0).contains(&v) {
                    return Err(crate::error::ForecastError::Parse(format!(
                        "health fraction '{name}' must be in 0.0..=1.0, got {v}"
                    )));
                }
            }
        }
        Ok(())
    }
}
