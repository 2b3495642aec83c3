use std::sync::Arc;

use crate::{error::AppResult, models::TasteProfile, services::PreferenceStore};

/// Builds a normalized taste profile from the preference store
///
/// Pure read + normalization; no merging or personalization logic lives
/// here.
pub struct ProfileBuilder {
    store: Arc<dyn PreferenceStore>,
}

impl ProfileBuilder {
    pub fn new(store: Arc<dyn PreferenceStore>) -> Self {
        Self { store }
    }

    /// Issues the four store reads concurrently and joins all-or-none: any
    /// single failed read makes the whole profile unavailable. A user with
    /// no data at all is a valid, empty profile.
    pub async fn build(&self, user_id: &str) -> AppResult<TasteProfile> {
        let (selected, liked, watched, ratings) = tokio::try_join!(
            self.store.get_selected(user_id),
            self.store.get_liked(user_id),
            self.store.get_watched(user_id),
            self.store.get_ratings(user_id),
        )?;

        let profile = TasteProfile::new(selected, liked, watched, ratings);

        tracing::debug!(
            user_id = %user_id,
            selected = profile.selected.len(),
            liked = profile.liked.len(),
            watched = profile.watched.len(),
            rated = profile.ratings.len(),
            new_user = profile.is_new_user(),
            "Built taste profile"
        );

        Ok(profile)
    }
}
