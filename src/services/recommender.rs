use async_trait::async_trait;
use reqwest::Client as HttpClient;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::Duration;

use crate::{
    cache::{Cache, CacheKey},
    cached,
    error::{AppError, AppResult},
    models::{RecommendedMovie, TasteProfile, Title, TitleId},
};

const RECOMMENDATION_CACHE_TTL: u64 = 300; // 5 minutes

/// External recommendation model abstraction
///
/// Returns a flat ranked list; section building stays in the aggregation
/// engine so the service remains stateless and reusable.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait RecommendationService: Send + Sync {
    async fn recommend(&self, profile: &TasteProfile, limit: usize) -> AppResult<Vec<Title>>;
}

#[derive(Debug, Serialize)]
struct RatedMovie {
    movie_id: TitleId,
    rating: f32,
}

#[derive(Debug, Serialize)]
struct RecommendRequest {
    selected_movies: Vec<TitleId>,
    liked_movies: Vec<TitleId>,
    watched_movies: Vec<TitleId>,
    rated_movies: Vec<RatedMovie>,
    limit: usize,
}

impl RecommendRequest {
    fn from_profile(profile: &TasteProfile, limit: usize) -> Self {
        Self {
            selected_movies: profile.selected.clone(),
            liked_movies: profile.liked.clone(),
            watched_movies: profile.watched.clone(),
            rated_movies: profile
                .ratings
                .iter()
                .map(|r| RatedMovie {
                    movie_id: r.title_id,
                    rating: r.rating,
                })
                .collect(),
            limit,
        }
    }
}

#[derive(Debug, Deserialize)]
struct RecommendationsDocument {
    #[serde(default)]
    recommendations: Vec<RecommendedMovie>,
}

/// HTTP client for the recommendation service
#[derive(Clone)]
pub struct HttpRecommender {
    http_client: HttpClient,
    base_url: String,
}

impl HttpRecommender {
    pub fn new(base_url: String, timeout: Duration) -> AppResult<Self> {
        let http_client = HttpClient::builder().timeout(timeout).build()?;
        Ok(Self {
            http_client,
            base_url,
        })
    }
}

#[async_trait]
impl RecommendationService for HttpRecommender {
    async fn recommend(&self, profile: &TasteProfile, limit: usize) -> AppResult<Vec<Title>> {
        let url = format!("{}/recommendations", self.base_url);
        let request = RecommendRequest::from_profile(profile, limit);

        let response = self
            .http_client
            .post(&url)
            .json(&request)
            .send()
            .await
            .map_err(|e| AppError::RecommenderUnavailable(e.to_string()))?;

        if !response.status().is_success() {
            return Err(AppError::RecommenderUnavailable(format!(
                "recommender returned status {}",
                response.status()
            )));
        }

        let document: RecommendationsDocument = response
            .json()
            .await
            .map_err(|e| AppError::RecommenderUnavailable(e.to_string()))?;

        let titles: Vec<Title> = document
            .recommendations
            .into_iter()
            .map(Title::from)
            .collect();

        tracing::debug!(results = titles.len(), limit, "Recommendation call completed");

        Ok(titles)
    }
}

/// Caching decorator over any [`RecommendationService`]
///
/// Kept out of the aggregation engine so the engine stays a pure function of
/// its collaborators; swapping this layer in or out changes no feed
/// semantics, only latency.
pub struct CachedRecommender {
    inner: Arc<dyn RecommendationService>,
    cache: Cache,
}

impl CachedRecommender {
    pub fn new(inner: Arc<dyn RecommendationService>, cache: Cache) -> Self {
        Self { inner, cache }
    }
}

/// Deterministic key for one (profile, limit) request shape
fn profile_cache_key(profile: &TasteProfile, limit: usize) -> CacheKey {
    let join = |ids: &[TitleId]| {
        ids.iter()
            .map(|id| id.to_string())
            .collect::<Vec<_>>()
            .join(",")
    };
    let ratings = profile
        .ratings
        .iter()
        .map(|r| format!("{}:{}", r.title_id, r.rating))
        .collect::<Vec<_>>()
        .join(",");

    CacheKey::Recommendations(format!(
        "s{}|l{}|w{}|r{}|n{}",
        join(&profile.selected),
        join(&profile.liked),
        join(&profile.watched),
        ratings,
        limit
    ))
}

#[async_trait]
impl RecommendationService for CachedRecommender {
    async fn recommend(&self, profile: &TasteProfile, limit: usize) -> AppResult<Vec<Title>> {
        cached!(
            self.cache,
            profile_cache_key(profile, limit),
            RECOMMENDATION_CACHE_TTL,
            self.inner.recommend(profile, limit)
        )
    }
}
