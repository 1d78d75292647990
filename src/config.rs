use std::path::Path;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::cache::DEFAULT_TTL_SECS;
use crate::engine::EngineParams;
use crate::error::ForecastError;
use crate::impact::ImpactModel;

/// Cache tuning.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CacheConfig {
    /// Freshness window in seconds; 0 disables reuse.
    pub ttl_secs: u64,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            ttl_secs: DEFAULT_TTL_SECS,
        }
    }
}

impl CacheConfig {
    pub fn ttl(&self) -> Duration {
        Duration::from_secs(self.ttl_secs)
    }
}

/// Runtime configuration, read from a TOML file. Every field has a
/// default, so a missing file or a partial file both work.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ForecastConfig {
    pub impact: ImpactModel,
    pub engine: EngineParams,
    pub cache: CacheConfig,
}

impl ForecastConfig {
    /// Read and parse a config file.
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self, ForecastError> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path)?;
        toml::from_str(&text)
            .map_err(|e| ForecastError::Config(format!("{}: {e}", path.display())))
    }

    /// Load the given file, or fall back to defaults when none is given.
    pub fn load_or_default(path: Option<&Path>) -> Result<Self, ForecastError> {
        match path {
            Some(p) => Self::from_path(p),
            None => Ok(Self::default()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_approx_eq::assert_approx_eq;

    #[test]
    fn test_default_config() {
        let cfg = ForecastConfig::default();
        assert_approx_eq!(cfg.impact.temperature_base_f, 0.06);
        assert_approx_eq!(cfg.engine.seedling_dbh_cm, 10.0);
        assert_eq!(cfg.cache.ttl_secs, DEFAULT_TTL_SECS);
        assert_eq!(cfg.cache.ttl(), Duration::from_secs(120));
    }

    #[test]
    fn test_empty_toml_is_default() {
        let cfg: ForecastConfig = toml::from_str("").unwrap();
        assert_eq!(cfg, ForecastConfig::default());
    }

    #[test]
    fn test_partial_override() {
        let cfg: ForecastConfig = toml::from_str(
            r#"
            [impact]
            baseline_warming_f_per_year = 0.08

            [cache]
            ttl_secs = 0
            "#,
        )
        .unwrap();
        assert_approx_eq!(cfg.impact.baseline_warming_f_per_year, 0.08);
        // Untouched sections keep their defaults.
        assert_approx_eq!(cfg.impact.co2_base_kg_per_year, 21.77);
        assert_approx_eq!(cfg.engine.new_tree_annual_survival, 0.98);
        assert_eq!(cfg.cache.ttl(), Duration::ZERO);
    }

    #[test]
    fn test_from_path_roundtrip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("forecast.toml");
        let mut cfg = ForecastConfig::default();
        cfg.engine.seedling_dbh_cm = 8.0;
        std::fs::write(&path, toml::to_string(&cfg).unwrap()).unwrap();
        let loaded = ForecastConfig::from_path(&path).unwrap();
        assert_eq!(loaded, cfg);
    }

    #[test]
    fn test_missing_file_is_io_error() {
        let err = ForecastConfig::from_path("/nonexistent/forecast.toml").unwrap_err();
        assert!(matches!(err, ForecastError::Io(_)));
    }

    #[test]
    fn test_malformed_toml_is_config_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("forecast.toml");
        std::fs::write(&path, "[impact\nbroken").unwrap();
        let err = ForecastConfig::from_path(&path).unwrap_err();
        assert!(matches!(err, ForecastError::Config(_)));
    }

    #[test]
    fn test_load_or_default_none() {
        let cfg = ForecastConfig::load_or_default(None).unwrap();
        assert_eq!(cfg, ForecastConfig::default());
    }
}
