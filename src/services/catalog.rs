use async_trait::async_trait;
use reqwest::Client as HttpClient;
use std::time::Duration;

use crate::{
    error::{AppError, AppResult},
    models::{GenreId, Title, TitleId, TmdbMovie, TmdbPage},
};

/// Movie catalog abstraction
///
/// Stateless request/response lookups against the external catalog; list
/// results keep the upstream ranking order, the engine never resorts them.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait CatalogService: Send + Sync {
    /// Fetch metadata for a single title
    async fn get_title(&self, id: TitleId) -> AppResult<Title>;

    /// Titles similar to `id`, upstream ranking order
    async fn get_similar(&self, id: TitleId, page: u32) -> AppResult<Vec<Title>>;

    /// Currently popular titles
    async fn get_popular(&self, page: u32) -> AppResult<Vec<Title>>;

    /// Popular titles within one genre
    async fn get_by_genre(&self, genre_id: GenreId, page: u32) -> AppResult<Vec<Title>>;
}

/// TMDB-shaped catalog client
#[derive(Clone)]
pub struct TmdbCatalog {
    http_client: HttpClient,
    api_key: String,
    api_url: String,
}

impl TmdbCatalog {
    pub fn new(api_url: String, api_key: String, timeout: Duration) -> AppResult<Self> {
        let http_client = HttpClient::builder().timeout(timeout).build()?;
        Ok(Self {
            http_client,
            api_key,
            api_url,
        })
    }

    async fn get_page(&self, path: &str, query: &[(&str, String)]) -> AppResult<Vec<Title>> {
        let url = format!("{}{}", self.api_url, path);

        let response = self
            .http_client
            .get(&url)
            .bearer_auth(&self.api_key)
            .query(query)
            .send()
            .await
            .map_err(|e| AppError::CatalogUnavailable(e.to_string()))?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(AppError::CatalogUnavailable(format!(
                "catalog returned status {}: {}",
                status, body
            )));
        }

        let page: TmdbPage = response
            .json()
            .await
            .map_err(|e| AppError::CatalogUnavailable(e.to_string()))?;

        Ok(page.results.into_iter().map(Title::from).collect())
    }
}

#[async_trait]
impl CatalogService for TmdbCatalog {
    async fn get_title(&self, id: TitleId) -> AppResult<Title> {
        let url = format!("{}/movie/{}", self.api_url, id);

        let response = self
            .http_client
            .get(&url)
            .bearer_auth(&self.api_key)
            .send()
            .await
            .map_err(|e| AppError::CatalogUnavailable(e.to_string()))?;

        if response.status() == reqwest::StatusCode::NOT_FOUND {
            return Err(AppError::NotFound(id));
        }

        if !response.status().is_success() {
            return Err(AppError::CatalogUnavailable(format!(
                "catalog returned status {} for title {}",
                response.status(),
                id
            )));
        }

        let movie: TmdbMovie = response
            .json()
            .await
            .map_err(|e| AppError::CatalogUnavailable(e.to_string()))?;

        Ok(Title::from(movie))
    }

    async fn get_similar(&self, id: TitleId, page: u32) -> AppResult<Vec<Title>> {
        self.get_page(
            &format!("/movie/{}/similar", id),
            &[("page", page.to_string())],
        )
        .await
    }

    async fn get_popular(&self, page: u32) -> AppResult<Vec<Title>> {
        self.get_page("/movie/popular", &[("page", page.to_string())])
            .await
    }

    async fn get_by_genre(&self, genre_id: GenreId, page: u32) -> AppResult<Vec<Title>> {
        self.get_page(
            "/discover/movie",
            &[
                ("include_adult", "false".to_string()),
                ("sort_by", "popularity.desc".to_string()),
                ("with_genres", genre_id.to_string()),
                ("page", page.to_string()),
            ],
        )
        .await
    }
}
