use actix_web::{web, HttpResponse};
use serde::{Deserialize, Serialize};

use crate::error::ForecastError;
use crate::models::TreeCohortState;
use crate::service::ForecastService;

// ---------------------------------------------------------------------------
// Error wrapper
// ---------------------------------------------------------------------------

#[derive(Debug, Serialize)]
struct ErrorBody {
    error: String,
    details: String,
}

#[derive(Debug)]
pub(crate) struct WebError(ForecastError);

impl From<ForecastError> for WebError {
    fn from(e: ForecastError) -> Self {
        WebError(e)
    }
}

impl std::fmt::Display for WebError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl actix_web::ResponseError for WebError {
    fn error_response(&self) -> HttpResponse {
        let (status, error_type) = match &self.0 {
            ForecastError::InvalidScenario(_) | ForecastError::Parse(_) => {
                (actix_web::http::StatusCode::BAD_REQUEST, "Bad Request")
            }
            ForecastError::CellNotFound(_) => {
                (actix_web::http::StatusCode::NOT_FOUND, "Not Found")
            }
            ForecastError::ModelUnavailable(_) => (
                actix_web::http::StatusCode::SERVICE_UNAVAILABLE,
                "Service Unavailable",
            ),
            _ => (
                actix_web::http::StatusCode::INTERNAL_SERVER_ERROR,
                "Internal Server Error",
            ),
        };
        HttpResponse::build(status).json(ErrorBody {
            error: error_type.to_string(),
            details: self.0.to_string(),
        })
    }
}

// ---------------------------------------------------------------------------
// Handlers
// ---------------------------------------------------------------------------

#[derive(Serialize, Deserialize)]
struct HealthResponse {
    status: String,
}

pub async fn health() -> HttpResponse {
    HttpResponse::Ok().json(HealthResponse {
        status: "ok".to_string(),
    })
}

#[derive(Serialize, Deserialize)]
struct CellEntry {
    cell_id: String,
    #[serde(flatten)]
    state: TreeCohortState,
}

pub async fn cells(service: web::Data<ForecastService>) -> HttpResponse {
    let entries: Vec<CellEntry> = service
        .cell_states()
        .into_iter()
        .map(|(id, state)| CellEntry {
            cell_id: id.to_string(),
            state,
        })
        .collect();
    HttpResponse::Ok().json(entries)
}

/// Query parameters are signed so out-of-range values reach scenario
/// validation instead of failing deserialization with an opaque 400.
#[derive(Debug, Deserialize)]
pub struct ProjectionQuery {
    years: i64,
    #[serde(default)]
    new_trees: i64,
}

pub async fn projection(
    service: web::Data<ForecastService>,
    path: web::Path<String>,
    query: web::Query<ProjectionQuery>,
) -> Result<HttpResponse, WebError> {
    let cell_id = path.into_inner();
    let result = service.project(&cell_id, query.years, query.new_trees)?;
    Ok(HttpResponse::Ok().json(&*result))
}
