use serde::{Deserialize, Serialize};
use std::collections::HashSet;

use super::TitleId;

/// A single per-title rating on the store's 0-5 scale
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TitleRating {
    pub title_id: TitleId,
    pub rating: f32,
}

/// Normalized summary of a user's explicit and implicit preferences
///
/// Rebuilt from the preference store on every aggregation run and never
/// persisted by this service. Id sequences keep the store's order (oldest
/// first) with duplicates removed, first occurrence wins.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct TasteProfile {
    /// Titles picked during onboarding, in selection order
    pub selected: Vec<TitleId>,
    pub liked: Vec<TitleId>,
    pub watched: Vec<TitleId>,
    pub ratings: Vec<TitleRating>,
}

impl TasteProfile {
    pub fn new(
        selected: Vec<TitleId>,
        liked: Vec<TitleId>,
        watched: Vec<TitleId>,
        ratings: Vec<TitleRating>,
    ) -> Self {
        let mut seen = HashSet::new();
        let ratings = ratings
            .into_iter()
            .filter(|r| seen.insert(r.title_id))
            .collect();

        Self {
            selected: dedup_ids(selected),
            liked: dedup_ids(liked),
            watched: dedup_ids(watched),
            ratings,
        }
    }

    /// A user counts as new until they have liked, watched, or rated
    /// something. Onboarding selections are a cold-start signal, not an
    /// interaction signal, so they do not disqualify new status.
    pub fn is_new_user(&self) -> bool {
        self.liked.is_empty() && self.watched.is_empty() && self.ratings.is_empty()
    }

    /// Most recently liked title, if any
    pub fn last_liked(&self) -> Option<TitleId> {
        self.liked.last().copied()
    }

    /// Most recently watched title, if any
    pub fn last_watched(&self) -> Option<TitleId> {
        self.watched.last().copied()
    }

    /// Highest-rated title; ties resolve to the first maximum in rating
    /// insertion order so the result is deterministic.
    pub fn highest_rated(&self) -> Option<TitleId> {
        let mut best: Option<&TitleRating> = None;
        for rating in &self.ratings {
            if best.map_or(true, |b| rating.rating > b.rating) {
                best = Some(rating);
            }
        }
        best.map(|r| r.title_id)
    }
}

fn dedup_ids(ids: Vec<TitleId>) -> Vec<TitleId> {
    let mut seen = HashSet::new();
    ids.into_iter().filter(|id| seen.insert(*id)).collect()
}
