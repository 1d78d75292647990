use std::collections::HashMap;
use std::io::Read;
use std::path::Path;

use crate::error::ForecastError;
use crate::features::FeatureProvider;
use crate::models::{CellId, HealthMix, SpeciesShare, TreeCohortState};

/// CSV row structure for per-cell feature extracts.
///
/// `species_mix` is a compact `CODE:frac;CODE:frac` list; the health
/// columns are fractions of the population per rating.
#[derive(Debug, serde::Deserialize, serde::Serialize)]
struct CellRow {
    cell_id: String,
    tree_count: u32,
    avg_diameter_cm: f64,
    #[serde(default)]
    species_mix: Option<String>,
    #[serde(default)]
    pct_good: Option<f64>,
    #[serde(default)]
    pct_fair: Option<f64>,
    #[serde(default)]
    pct_poor: Option<f64>,
}

/// Process-local feature store backed by a hash map, loaded once at
/// startup and read-only afterwards.
#[derive(Debug, Default, Clone)]
pub struct InMemoryFeatureStore {
    cells: HashMap<CellId, TreeCohortState>,
}

impl InMemoryFeatureStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert or replace a cell's state (test and demo setup).
    pub fn insert(&mut self, cell: impl Into<CellId>, state: TreeCohortState) {
        self.cells.insert(cell.into(), state);
    }

    pub fn len(&self) -> usize {
        self.cells.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }

    /// Load a feature table from a CSV file.
    pub fn from_csv_path(path: impl AsRef<Path>) -> Result<Self, ForecastError> {
        let mut rdr = csv::ReaderBuilder::new()
            .has_headers(true)
            .flexible(true)
            .trim(csv::Trim::All)
            .from_path(path.as_ref())?;
        Self::from_csv_reader(&mut rdr)
    }

    /// Load a feature table from in-memory CSV bytes.
    pub fn from_csv_bytes(bytes: &[u8]) -> Result<Self, ForecastError> {
        let mut rdr = csv::ReaderBuilder::new()
            .has_headers(true)
            .flexible(true)
            .trim(csv::Trim::All)
            .from_reader(bytes);
        Self::from_csv_reader(&mut rdr)
    }

    fn from_csv_reader<R: Read>(rdr: &mut csv::Reader<R>) -> Result<Self, ForecastError> {
        let mut cells = HashMap::new();
        for result in rdr.deserialize() {
            let row: CellRow = result?;
            let state = row_to_state(&row)?;
            state
                .validate()
                .map_err(|e| ForecastError::Parse(format!("cell '{}': {e}", row.cell_id)))?;
            cells.insert(CellId::new(row.cell_id), state);
        }
        tracing::debug!(cells = cells.len(), "feature store loaded");
        Ok(Self { cells })
    }
}

fn row_to_state(row: &CellRow) -> Result<TreeCohortState, ForecastError> {
    let species_mix = match row.species_mix.as_deref() {
        Some(s) if !s.is_empty() => parse_species_mix(s)
            .map_err(|e| ForecastError::Parse(format!("cell '{}': {e}", row.cell_id)))?,
        _ => Vec::new(),
    };
    let health_mix = match (row.pct_good, row.pct_fair, row.pct_poor) {
        (None, None, None) => None,
        (good, fair, poor) => Some(HealthMix {
            good: good.unwrap_or(0.0),
            fair: fair.unwrap_or(0.0),
            poor: poor.unwrap_or(0.0),
        }),
    };
    Ok(TreeCohortState {
        tree_count: row.tree_count,
        avg_diameter_cm: row.avg_diameter_cm,
        species_mix,
        health_mix,
    })
}

/// Parse `CODE:frac;CODE:frac` into species shares.
fn parse_species_mix(s: &str) -> Result<Vec<SpeciesShare>, String> {
    let mut shares = Vec::new();
    for part in s.split(';').filter(|p| !p.is_empty()) {
        let (code, fraction) = part
            .split_once(':')
            .ok_or_else(|| format!("malformed species share '{part}'"))?;
        let fraction: f64 = fraction
            .trim()
            .parse()
            .map_err(|_| format!("malformed species fraction '{part}'"))?;
        shares.push(SpeciesShare {
            code: code.trim().to_string(),
            fraction,
        });
    }
    Ok(shares)
}

impl FeatureProvider for InMemoryFeatureStore {
    fn cell_features(&self, cell: &CellId) -> Result<TreeCohortState, ForecastError> {
        self.cells
            .get(cell)
            .cloned()
            .ok_or_else(|| ForecastError::CellNotFound(cell.to_string()))
    }

    fn cell_ids(&self) -> Vec<CellId> {
        let mut ids: Vec<CellId> = self.cells.keys().cloned().collect();
        ids.sort();
        ids
    }
}
