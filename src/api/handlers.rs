use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use serde::{Deserialize, Serialize};

use crate::error::{AppError, AppResult};
use crate::models::{AggregatedFeed, Category, FeedOutcome};

use super::AppState;

// Request/Response types

#[derive(Debug, Deserialize)]
pub struct FeedQuery {
    /// Requested feed size; absent, zero or negative falls back to the
    /// engine default
    pub limit: Option<i64>,
}

/// Feed payload with a `status` discriminant so clients can branch without
/// probing the shape
#[derive(Debug, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum FeedResponse {
    Ready {
        #[serde(flatten)]
        feed: AggregatedFeed,
    },
    /// The user has no onboarding data; the client should route to
    /// onboarding
    EmptyProfile,
}

// Handlers

/// Health check endpoint
pub async fn health_check() -> StatusCode {
    StatusCode::OK
}

/// Personalized feed for one user
pub async fn get_feed(
    State(state): State<AppState>,
    Path(user_id): Path<String>,
    Query(query): Query<FeedQuery>,
) -> AppResult<Json<FeedResponse>> {
    if user_id.trim().is_empty() {
        return Err(AppError::InvalidInput(
            "user id cannot be empty".to_string(),
        ));
    }

    let limit = query.limit.and_then(|n| usize::try_from(n).ok());
    let outcome = state.engine.aggregate(&user_id, limit).await?;

    let response = match outcome {
        FeedOutcome::Feed(feed) => FeedResponse::Ready { feed },
        FeedOutcome::EmptyProfile => FeedResponse::EmptyProfile,
    };

    Ok(Json(response))
}

/// Fixed genre-tagged browse catalog
pub async fn get_categories(State(state): State<AppState>) -> Json<Vec<Category>> {
    Json(state.categories.load_categories().await)
}
