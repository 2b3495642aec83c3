use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;

use crate::models::TitleId;

/// Application-level errors
///
/// Each upstream collaborator maps onto its own variant so the aggregation
/// engine can tell an isolated catalog branch failure apart from a
/// recommender or store outage.
#[derive(thiserror::Error, Debug)]
pub enum AppError {
    #[error("Preference store unavailable: {0}")]
    StoreUnavailable(String),

    #[error("Recommendation service unavailable: {0}")]
    RecommenderUnavailable(String),

    #[error("Catalog error: {0}")]
    CatalogUnavailable(String),

    #[error("Title {0} not found")]
    NotFound(TitleId),

    #[error("Fallback feed unavailable: {0}")]
    FallbackExhausted(String),

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Cache error: {0}")]
    Cache(#[from] redis::RedisError),

    #[error("HTTP client error: {0}")]
    HttpClient(#[from] reqwest::Error),

    #[error("Internal server error: {0}")]
    Internal(String),
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, message) = match self {
            AppError::NotFound(_) => (StatusCode::NOT_FOUND, self.to_string()),
            AppError::InvalidInput(msg) => (StatusCode::BAD_REQUEST, msg),
            // Nothing left to degrade to; the caller should show a retry prompt
            AppError::FallbackExhausted(_) => (StatusCode::SERVICE_UNAVAILABLE, self.to_string()),
            AppError::StoreUnavailable(_)
            | AppError::RecommenderUnavailable(_)
            | AppError::CatalogUnavailable(_)
            | AppError::HttpClient(_) => (StatusCode::BAD_GATEWAY, self.to_string()),
            AppError::Cache(_) | AppError::Internal(_) => {
                (StatusCode::INTERNAL_SERVER_ERROR, self.to_string())
            }
        };

        let body = Json(json!({
            "error": message
        }));

        (status, body).into_response()
    }
}

pub type AppResult<T> = Result<T, AppError>;
