use chrono::{DateTime, Utc};
use serde::Serialize;
use std::collections::HashMap;

use super::{GenreId, Title, TitleId};

/// Version tag carried on every feed for observability and client debugging
pub const ALGORITHM_VERSION: &str = "aggregation-v1";

/// Stable identifiers for the personalized feed's named sections
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SectionKey {
    BasedOnInitialTaste,
    BasedOnLastLiked,
    BasedOnLastWatched,
    BasedOnHighRated,
}

impl SectionKey {
    /// Label embedding the reference title's display name
    pub fn label_for(self, name: &str) -> String {
        match self {
            SectionKey::BasedOnInitialTaste => format!("Because you picked {name}"),
            SectionKey::BasedOnLastLiked => format!("Because you liked {name}"),
            SectionKey::BasedOnLastWatched => format!("Because you watched {name}"),
            SectionKey::BasedOnHighRated => format!("Because you rated {name} highly"),
        }
    }

    /// Fallback label used when the reference title lookup fails; a labeling
    /// failure never discards the section's titles.
    pub fn generic_label(self) -> &'static str {
        match self {
            SectionKey::BasedOnInitialTaste => "Based on your first picks",
            SectionKey::BasedOnLastLiked => "More like what you liked",
            SectionKey::BasedOnLastWatched => "More like what you watched",
            SectionKey::BasedOnHighRated => "More like your top-rated picks",
        }
    }
}

/// A labeled, ordered sub-list of titles justified by one taste signal
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct RecommendationSection {
    pub title: String,
    /// Upstream response order, deduplicated within the section
    pub titles: Vec<Title>,
    /// The title that justifies this section, when there is one
    pub reference_title_id: Option<TitleId>,
}

/// Output of one aggregation run
#[derive(Debug, Clone, Serialize)]
pub struct AggregatedFeed {
    /// Flat "recommended for you" list, deduplicated, first occurrence wins
    pub primary: Vec<Title>,
    pub sections: HashMap<SectionKey, RecommendationSection>,
    pub used_fallback: bool,
    pub generated_at: DateTime<Utc>,
    pub algorithm_version: &'static str,
}

/// What an aggregation run produced for the caller
#[derive(Debug)]
pub enum FeedOutcome {
    Feed(AggregatedFeed),
    /// The user has no onboarding data at all; callers should route to
    /// onboarding instead of rendering a feed. Not a failure.
    EmptyProfile,
}

/// One genre-tagged row of the browse catalog
#[derive(Debug, Clone, Serialize)]
pub struct Category {
    pub genre_id: GenreId,
    pub name: String,
    pub titles: Vec<Title>,
}
