use thiserror::Error;

/// Errors that can occur while producing a canopy forecast.
#[derive(Error, Debug)]
pub enum ForecastError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Config error: {0}")]
    Config(String),

    #[error("Parse error: {0}")]
    Parse(String),

    #[error("Cell not found: {0}")]
    CellNotFound(String),

    #[error("Invalid scenario: {0}")]
    InvalidScenario(String),

    #[error("Model unavailable: {0}")]
    ModelUnavailable(String),

    #[error("Computation error: {0}")]
    Computation(String),
}

impl ForecastError {
    /// Whether retrying the same request later could succeed.
    ///
    /// Validation failures and unknown cells are permanent for a given
    /// request; a computation failure is not cached and may be retried.
    pub fn is_retryable(&self) -> bool {
        matches!(self, ForecastError::Computation(_))
    }
}
