use std::sync::Arc;

use crate::services::{
    AggregationEngine, CatalogService, CategoryLoader, PreferenceStore, RecommendationService,
};

/// Shared application state
///
/// The engine and loader are wired once at startup from the injected
/// collaborators; nothing here mutates after construction.
#[derive(Clone)]
pub struct AppState {
    pub engine: Arc<AggregationEngine>,
    pub categories: Arc<CategoryLoader>,
}

impl AppState {
    pub fn new(
        store: Arc<dyn PreferenceStore>,
        catalog: Arc<dyn CatalogService>,
        recommender: Arc<dyn RecommendationService>,
    ) -> Self {
        Self {
            engine: Arc::new(AggregationEngine::new(
                store,
                Arc::clone(&catalog),
                recommender,
            )),
            categories: Arc::new(CategoryLoader::new(catalog)),
        }
    }
}
