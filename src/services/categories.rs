use std::sync::Arc;

use crate::{
    models::{Category, GenreId},
    services::CatalogService,
};

/// Titles kept per genre row
const CATEGORY_CAP: usize = 10;

/// Genres the browse catalog always offers
const KNOWN_GENRES: &[(GenreId, &str)] = &[
    (28, "Action"),
    (16, "Animation"),
    (35, "Comedy"),
    (18, "Drama"),
    (27, "Horror"),
    (10749, "Romance"),
    (878, "Science Fiction"),
    (53, "Thriller"),
];

/// Loads the fixed catalog of genre-tagged title rows
///
/// Independent of personalization and of the aggregation engine's failure
/// handling: a genre whose fetch fails is dropped from the result, never
/// escalated.
pub struct CategoryLoader {
    catalog: Arc<dyn CatalogService>,
}

impl CategoryLoader {
    pub fn new(catalog: Arc<dyn CatalogService>) -> Self {
        Self { catalog }
    }

    pub async fn load_categories(&self) -> Vec<Category> {
        let mut tasks = Vec::with_capacity(KNOWN_GENRES.len());
        for &(genre_id, name) in KNOWN_GENRES {
            let catalog = Arc::clone(&self.catalog);
            tasks.push(tokio::spawn(async move {
                match catalog.get_by_genre(genre_id, 1).await {
                    Ok(mut titles) => {
                        titles.truncate(CATEGORY_CAP);
                        Some(Category {
                            genre_id,
                            name: name.to_string(),
                            titles,
                        })
                    }
                    Err(e) => {
                        tracing::warn!(
                            genre_id,
                            genre = name,
                            error = %e,
                            "Genre fetch failed, dropping category"
                        );
                        None
                    }
                }
            }));
        }

        let mut categories = Vec::new();
        for task in tasks {
            match task.await {
                Ok(Some(category)) => categories.push(category),
                Ok(None) => {}
                Err(e) => tracing::warn!(error = %e, "Category task panicked"),
            }
        }

        tracing::info!(categories = categories.len(), "Loaded browse categories");

        categories
    }
}
