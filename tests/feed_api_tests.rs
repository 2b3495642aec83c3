use std::collections::HashSet;
use std::sync::Arc;

use async_trait::async_trait;
use axum_test::TestServer;
use serde_json::Value;

use reelfeed_api::api::{create_router, AppState};
use reelfeed_api::error::{AppError, AppResult};
use reelfeed_api::models::{GenreId, TasteProfile, Title, TitleId, TitleRating};
use reelfeed_api::services::{CatalogService, PreferenceStore, RecommendationService};

fn title(id: TitleId) -> Title {
    Title {
        id,
        name: format!("Movie {id}"),
        poster_path: None,
        backdrop_path: None,
        vote_average: 7.0,
        overview: None,
        release_date: None,
        genre_ids: vec![],
        popularity: None,
    }
}

#[derive(Clone, Default)]
struct StubStore {
    fail: bool,
    selected: Vec<TitleId>,
    liked: Vec<TitleId>,
    watched: Vec<TitleId>,
    ratings: Vec<TitleRating>,
}

impl StubStore {
    fn guard<T>(&self, value: T) -> AppResult<T> {
        if self.fail {
            Err(AppError::StoreUnavailable("stub store down".to_string()))
        } else {
            Ok(value)
        }
    }
}

#[async_trait]
impl PreferenceStore for StubStore {
    async fn get_selected(&self, _user_id: &str) -> AppResult<Vec<TitleId>> {
        self.guard(self.selected.clone())
    }

    async fn get_liked(&self, _user_id: &str) -> AppResult<Vec<TitleId>> {
        self.guard(self.liked.clone())
    }

    async fn get_watched(&self, _user_id: &str) -> AppResult<Vec<TitleId>> {
        self.guard(self.watched.clone())
    }

    async fn get_ratings(&self, _user_id: &str) -> AppResult<Vec<TitleRating>> {
        self.guard(self.ratings.clone())
    }
}

/// Deterministic catalog: similar-to-N returns ids derived from N
#[derive(Clone, Default)]
struct StubCatalog {
    fail_popular: bool,
}

#[async_trait]
impl CatalogService for StubCatalog {
    async fn get_title(&self, id: TitleId) -> AppResult<Title> {
        Ok(title(id))
    }

    async fn get_similar(&self, id: TitleId, _page: u32) -> AppResult<Vec<Title>> {
        Ok(vec![title(id * 10 + 1), title(id * 10 + 2)])
    }

    async fn get_popular(&self, _page: u32) -> AppResult<Vec<Title>> {
        if self.fail_popular {
            return Err(AppError::CatalogUnavailable("stub catalog down".to_string()));
        }
        Ok((900..906).map(title).collect())
    }

    async fn get_by_genre(&self, genre_id: GenreId, _page: u32) -> AppResult<Vec<Title>> {
        Ok(vec![title(genre_id as TitleId + 1000)])
    }
}

#[derive(Clone, Default)]
struct StubRecommender {
    fail: bool,
}

#[async_trait]
impl RecommendationService for StubRecommender {
    async fn recommend(&self, _profile: &TasteProfile, limit: usize) -> AppResult<Vec<Title>> {
        if self.fail {
            return Err(AppError::RecommenderUnavailable(
                "stub recommender down".to_string(),
            ));
        }
        let mut titles = vec![title(800), title(801)];
        titles.truncate(limit);
        Ok(titles)
    }
}

fn create_test_server(
    store: StubStore,
    catalog: StubCatalog,
    recommender: StubRecommender,
) -> TestServer {
    let state = AppState::new(Arc::new(store), Arc::new(catalog), Arc::new(recommender));
    let app = create_router(state);
    TestServer::new(app).unwrap()
}

fn primary_ids(body: &Value) -> Vec<u64> {
    body["primary"]
        .as_array()
        .unwrap()
        .iter()
        .map(|t| t["id"].as_u64().unwrap())
        .collect()
}

#[tokio::test]
async fn test_health_check() {
    let server = create_test_server(
        StubStore::default(),
        StubCatalog::default(),
        StubRecommender::default(),
    );
    let response = server.get("/health").await;
    response.assert_status_ok();
}

#[tokio::test]
async fn test_personalized_feed_for_returning_user() {
    let store = StubStore {
        selected: vec![1],
        liked: vec![2],
        watched: vec![3],
        ratings: vec![TitleRating {
            title_id: 4,
            rating: 5.0,
        }],
        ..Default::default()
    };
    let server = create_test_server(store, StubCatalog::default(), StubRecommender::default());

    let response = server.get("/feed/user-1").await;
    response.assert_status_ok();

    let body: Value = response.json();
    assert_eq!(body["status"], "ready");
    assert_eq!(body["used_fallback"], false);
    assert_eq!(body["algorithm_version"], "aggregation-v1");

    // Seed expansion of selection 1 leads the primary list
    let ids = primary_ids(&body);
    assert_eq!(&ids[..2], &[11, 12]);

    let unique: HashSet<_> = ids.iter().collect();
    assert_eq!(unique.len(), ids.len(), "primary must not contain duplicates");

    let sections = body["sections"].as_object().unwrap();
    assert!(sections.contains_key("based_on_initial_taste"));
    assert!(sections.contains_key("based_on_last_liked"));
    assert!(sections.contains_key("based_on_last_watched"));
    assert!(sections.contains_key("based_on_high_rated"));
    assert_eq!(
        sections["based_on_last_liked"]["title"],
        "Because you liked Movie 2"
    );
}

#[tokio::test]
async fn test_new_user_gets_no_reference_sections() {
    let store = StubStore {
        selected: vec![1],
        ..Default::default()
    };
    let server = create_test_server(store, StubCatalog::default(), StubRecommender::default());

    let response = server.get("/feed/user-1").await;
    response.assert_status_ok();

    let body: Value = response.json();
    let sections = body["sections"].as_object().unwrap();
    assert!(sections.contains_key("based_on_initial_taste"));
    assert!(!sections.contains_key("based_on_last_liked"));
    assert!(!sections.contains_key("based_on_last_watched"));
    assert!(!sections.contains_key("based_on_high_rated"));
}

#[tokio::test]
async fn test_recommender_outage_serves_fallback_feed() {
    let store = StubStore {
        liked: vec![2],
        ..Default::default()
    };
    let recommender = StubRecommender { fail: true };
    let server = create_test_server(store, StubCatalog::default(), recommender);

    let response = server.get("/feed/user-1").await;
    response.assert_status_ok();

    let body: Value = response.json();
    assert_eq!(body["status"], "ready");
    assert_eq!(body["used_fallback"], true);
    assert!(body["sections"].as_object().unwrap().is_empty());
    assert_eq!(primary_ids(&body), vec![900, 901, 902, 903, 904, 905]);
}

#[tokio::test]
async fn test_store_outage_serves_fallback_feed() {
    let store = StubStore {
        fail: true,
        ..Default::default()
    };
    let server = create_test_server(store, StubCatalog::default(), StubRecommender::default());

    let response = server.get("/feed/user-1").await;
    response.assert_status_ok();

    let body: Value = response.json();
    assert_eq!(body["used_fallback"], true);
    assert!(body["sections"].as_object().unwrap().is_empty());
}

#[tokio::test]
async fn test_fallback_limit_is_respected() {
    let store = StubStore {
        fail: true,
        ..Default::default()
    };
    let server = create_test_server(store, StubCatalog::default(), StubRecommender::default());

    let response = server.get("/feed/user-1").add_query_param("limit", 2).await;
    response.assert_status_ok();

    let body: Value = response.json();
    assert_eq!(primary_ids(&body), vec![900, 901]);
}

#[tokio::test]
async fn test_exhausted_fallback_is_a_reportable_error() {
    let store = StubStore {
        fail: true,
        ..Default::default()
    };
    let catalog = StubCatalog { fail_popular: true };
    let server = create_test_server(store, catalog, StubRecommender::default());

    let response = server.get("/feed/user-1").await;
    response.assert_status(axum::http::StatusCode::SERVICE_UNAVAILABLE);

    let body: Value = response.json();
    assert!(body["error"]
        .as_str()
        .unwrap()
        .contains("Fallback feed unavailable"));
}

#[tokio::test]
async fn test_user_without_any_data_is_routed_to_onboarding() {
    // Empty store and a recommender with nothing to say for an empty profile
    #[derive(Clone)]
    struct EmptyRecommender;

    #[async_trait]
    impl RecommendationService for EmptyRecommender {
        async fn recommend(&self, _profile: &TasteProfile, _limit: usize) -> AppResult<Vec<Title>> {
            Ok(vec![])
        }
    }

    let state = AppState::new(
        Arc::new(StubStore::default()),
        Arc::new(StubCatalog::default()),
        Arc::new(EmptyRecommender),
    );
    let server = TestServer::new(create_router(state)).unwrap();

    let response = server.get("/feed/user-1").await;
    response.assert_status_ok();

    let body: Value = response.json();
    assert_eq!(body["status"], "empty_profile");
    assert!(body.get("primary").is_none());
}

#[tokio::test]
async fn test_categories_returns_every_genre_row() {
    let server = create_test_server(
        StubStore::default(),
        StubCatalog::default(),
        StubRecommender::default(),
    );

    let response = server.get("/categories").await;
    response.assert_status_ok();

    let body: Vec<Value> = response.json();
    assert_eq!(body.len(), 8);
    assert!(body.iter().any(|c| c["name"] == "Action"));
    assert!(body
        .iter()
        .all(|c| c["titles"].as_array().unwrap().len() <= 10));
}

#[tokio::test]
async fn test_response_carries_request_id_header() {
    let server = create_test_server(
        StubStore::default(),
        StubCatalog::default(),
        StubRecommender::default(),
    );

    let response = server.get("/health").await;
    assert!(response.maybe_header("x-request-id").is_some());
}
