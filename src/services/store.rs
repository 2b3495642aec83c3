use async_trait::async_trait;
use reqwest::Client as HttpClient;
use serde::Deserialize;
use std::time::Duration;

use crate::{
    error::{AppError, AppResult},
    models::{TitleId, TitleRating},
};

/// Read-only view of a user's persisted interaction state
///
/// A user with no documents is an empty profile, not an error; implementors
/// fail only when the store itself cannot be reached.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait PreferenceStore: Send + Sync {
    /// Titles picked during onboarding, in selection order
    async fn get_selected(&self, user_id: &str) -> AppResult<Vec<TitleId>>;

    /// Liked titles, oldest first
    async fn get_liked(&self, user_id: &str) -> AppResult<Vec<TitleId>>;

    /// Watched titles, oldest first
    async fn get_watched(&self, user_id: &str) -> AppResult<Vec<TitleId>>;

    /// Per-title ratings in the order they were written
    async fn get_ratings(&self, user_id: &str) -> AppResult<Vec<TitleRating>>;
}

#[derive(Debug, Default, Deserialize)]
struct IdsDocument {
    #[serde(default)]
    title_ids: Vec<TitleId>,
}

#[derive(Debug, Default, Deserialize)]
struct RatingsDocument {
    #[serde(default)]
    ratings: Vec<TitleRating>,
}

/// REST façade over the user-state document store
#[derive(Clone)]
pub struct RestPreferenceStore {
    http_client: HttpClient,
    base_url: String,
}

impl RestPreferenceStore {
    pub fn new(base_url: String, timeout: Duration) -> AppResult<Self> {
        let http_client = HttpClient::builder().timeout(timeout).build()?;
        Ok(Self {
            http_client,
            base_url,
        })
    }

    async fn get_document<T: serde::de::DeserializeOwned + Default>(
        &self,
        user_id: &str,
        collection: &str,
    ) -> AppResult<T> {
        let url = format!("{}/users/{}/{}", self.base_url, user_id, collection);

        let response = self
            .http_client
            .get(&url)
            .send()
            .await
            .map_err(|e| AppError::StoreUnavailable(e.to_string()))?;

        // A user who never touched this collection has no document yet
        if response.status() == reqwest::StatusCode::NOT_FOUND {
            return Ok(T::default());
        }

        if !response.status().is_success() {
            return Err(AppError::StoreUnavailable(format!(
                "store returned status {} for {}",
                response.status(),
                collection
            )));
        }

        response
            .json()
            .await
            .map_err(|e| AppError::StoreUnavailable(e.to_string()))
    }
}

#[async_trait]
impl PreferenceStore for RestPreferenceStore {
    async fn get_selected(&self, user_id: &str) -> AppResult<Vec<TitleId>> {
        let doc: IdsDocument = self.get_document(user_id, "selected").await?;
        Ok(doc.title_ids)
    }

    async fn get_liked(&self, user_id: &str) -> AppResult<Vec<TitleId>> {
        let doc: IdsDocument = self.get_document(user_id, "liked").await?;
        Ok(doc.title_ids)
    }

    async fn get_watched(&self, user_id: &str) -> AppResult<Vec<TitleId>> {
        let doc: IdsDocument = self.get_document(user_id, "watched").await?;
        Ok(doc.title_ids)
    }

    async fn get_ratings(&self, user_id: &str) -> AppResult<Vec<TitleRating>> {
        let doc: RatingsDocument = self.get_document(user_id, "ratings").await?;
        Ok(doc.ratings)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ids_document_deserialization() {
        let json = r#"{"title_ids": [603, 550, 27205]}"#;
        let doc: IdsDocument = serde_json::from_str(json).unwrap();
        assert_eq!(doc.title_ids, vec![603, 550, 27205]);
    }

    #[test]
    fn test_ids_document_missing_field_reads_empty() {
        let doc: IdsDocument = serde_json::from_str("{}").unwrap();
        assert!(doc.title_ids.is_empty());
    }

    #[test]
    fn test_ratings_document_preserves_write_order() {
        let json = r#"{"ratings": [
            {"title_id": 10, "rating": 4.5},
            {"title_id": 20, "rating": 3.0}
        ]}"#;
        let doc: RatingsDocument = serde_json::from_str(json).unwrap();
        assert_eq!(doc.ratings.len(), 2);
        assert_eq!(doc.ratings[0].title_id, 10);
        assert_eq!(doc.ratings[1].title_id, 20);
    }
}
