use std::collections::{HashMap, HashSet};
use std::sync::Arc;

use chrono::Utc;
use tokio::sync::Semaphore;

use crate::{
    error::{AppError, AppResult},
    models::{
        AggregatedFeed, FeedOutcome, RecommendationSection, SectionKey, TasteProfile, Title,
        TitleId, ALGORITHM_VERSION,
    },
    services::{CatalogService, PreferenceStore, ProfileBuilder, RecommendationService},
};

/// Feed size requested from the recommender when the caller does not say
pub const DEFAULT_LIMIT: usize = 20;

/// Similar-title results kept per onboarding seed
const SIMILAR_PER_SEED: usize = 5;

/// Titles kept per named section
const SECTION_CAP: usize = 10;

/// Bound on concurrent similar-title lookups during seed expansion
const SEED_FANOUT_LIMIT: usize = 4;

/// Orchestrates profile building, recommendation and catalog expansion into
/// one personalized feed
///
/// Holds no per-request state: every [`aggregate`](Self::aggregate) call is
/// a pure function of its inputs and the collaborators' contents at call
/// time, so concurrent calls never interfere.
pub struct AggregationEngine {
    profiles: ProfileBuilder,
    catalog: Arc<dyn CatalogService>,
    recommender: Arc<dyn RecommendationService>,
    seed_permits: Arc<Semaphore>,
}

impl AggregationEngine {
    pub fn new(
        store: Arc<dyn PreferenceStore>,
        catalog: Arc<dyn CatalogService>,
        recommender: Arc<dyn RecommendationService>,
    ) -> Self {
        Self {
            profiles: ProfileBuilder::new(store),
            catalog,
            recommender,
            seed_permits: Arc::new(Semaphore::new(SEED_FANOUT_LIMIT)),
        }
    }

    /// Assembles the personalized feed for one user
    ///
    /// Failure policy: a profile or recommender outage trips the generic
    /// popular fallback; any individual catalog branch failure only costs
    /// that branch's contribution. The fallback itself failing is the one
    /// error surfaced to the caller.
    pub async fn aggregate(&self, user_id: &str, limit: Option<usize>) -> AppResult<FeedOutcome> {
        let limit = effective_limit(limit);

        let profile = match self.profiles.build(user_id).await {
            Ok(profile) => profile,
            Err(e) => {
                tracing::warn!(
                    user_id = %user_id,
                    error = %e,
                    "Profile unavailable, serving fallback feed"
                );
                return self.fallback_feed(limit).await.map(FeedOutcome::Feed);
            }
        };

        let (seed, recommended, reference_sections) = tokio::join!(
            self.expand_seeds(&profile),
            self.recommender.recommend(&profile, limit),
            self.build_reference_sections(&profile),
        );

        let recommended = match recommended {
            Ok(titles) => titles,
            Err(e) => {
                tracing::warn!(
                    user_id = %user_id,
                    error = %e,
                    "Recommender failed, serving fallback feed"
                );
                return self.fallback_feed(limit).await.map(FeedOutcome::Feed);
            }
        };

        // Fixed merge order: what the user explicitly chose leads, then the
        // ranked recommendations, then the section strays.
        let mut sections = HashMap::new();
        let mut primary = Vec::new();
        let mut seen = HashSet::new();

        if let Some((seed_titles, seed_section)) = seed {
            push_unique(&mut primary, &mut seen, seed_titles);
            sections.insert(SectionKey::BasedOnInitialTaste, seed_section);
        }
        push_unique(&mut primary, &mut seen, recommended);
        for (key, section) in reference_sections {
            push_unique(&mut primary, &mut seen, section.titles.clone());
            sections.insert(key, section);
        }

        if primary.is_empty() && profile.selected.is_empty() {
            tracing::info!(user_id = %user_id, "No onboarding data and no results, onboarding required");
            return Ok(FeedOutcome::EmptyProfile);
        }

        tracing::info!(
            user_id = %user_id,
            primary = primary.len(),
            sections = sections.len(),
            "Aggregated personalized feed"
        );

        Ok(FeedOutcome::Feed(AggregatedFeed {
            primary,
            sections,
            used_fallback: false,
            generated_at: Utc::now(),
            algorithm_version: ALGORITHM_VERSION,
        }))
    }

    /// Similar-title expansion of the onboarding selections
    ///
    /// One catalog lookup per selected id under a concurrency bound; a
    /// failed lookup contributes nothing rather than failing the run.
    async fn expand_seeds(
        &self,
        profile: &TasteProfile,
    ) -> Option<(Vec<Title>, RecommendationSection)> {
        if profile.selected.is_empty() {
            return None;
        }

        let mut tasks = Vec::with_capacity(profile.selected.len());
        for &seed_id in &profile.selected {
            let catalog = Arc::clone(&self.catalog);
            let permits = Arc::clone(&self.seed_permits);
            tasks.push(tokio::spawn(async move {
                let _permit = permits.acquire_owned().await.ok();
                match catalog.get_similar(seed_id, 1).await {
                    Ok(mut titles) => {
                        titles.truncate(SIMILAR_PER_SEED);
                        titles
                    }
                    Err(e) => {
                        tracing::warn!(seed_id, error = %e, "Similar-title lookup failed, skipping seed");
                        Vec::new()
                    }
                }
            }));
        }

        // Join in selection order so the flattened list is deterministic
        let mut flat = Vec::new();
        for task in tasks {
            match task.await {
                Ok(titles) => flat.extend(titles),
                Err(e) => tracing::warn!(error = %e, "Seed expansion task panicked"),
            }
        }

        if flat.is_empty() {
            return None;
        }

        let mut section_titles = dedup_titles(flat.clone());
        section_titles.truncate(SECTION_CAP);

        let first_pick = profile.selected[0];
        let label = match self.catalog.get_title(first_pick).await {
            Ok(reference) => SectionKey::BasedOnInitialTaste.label_for(&reference.name),
            Err(e) => {
                tracing::debug!(
                    title_id = first_pick,
                    error = %e,
                    "Seed label lookup failed, using generic label"
                );
                SectionKey::BasedOnInitialTaste.generic_label().to_string()
            }
        };

        Some((
            flat,
            RecommendationSection {
                title: label,
                titles: section_titles,
                reference_title_id: Some(first_pick),
            },
        ))
    }

    /// The up-to-three reference-based sections for a returning user
    async fn build_reference_sections(
        &self,
        profile: &TasteProfile,
    ) -> Vec<(SectionKey, RecommendationSection)> {
        if profile.is_new_user() {
            return Vec::new();
        }

        let mut references = Vec::new();
        if let Some(id) = profile.last_liked() {
            references.push((SectionKey::BasedOnLastLiked, id));
        }
        if let Some(id) = profile.last_watched() {
            // The same title justifying both sections would be redundant
            if profile.last_liked() != Some(id) {
                references.push((SectionKey::BasedOnLastWatched, id));
            }
        }
        if let Some(id) = profile.highest_rated() {
            references.push((SectionKey::BasedOnHighRated, id));
        }

        let mut tasks = Vec::with_capacity(references.len());
        for (key, reference) in references {
            let catalog = Arc::clone(&self.catalog);
            tasks.push(tokio::spawn(reference_section(catalog, key, reference)));
        }

        let mut sections = Vec::new();
        for task in tasks {
            match task.await {
                Ok(Some(section)) => sections.push(section),
                Ok(None) => {}
                Err(e) => tracing::warn!(error = %e, "Reference section task panicked"),
            }
        }
        sections
    }

    /// Generic popular feed served when personalization cannot be computed
    async fn fallback_feed(&self, limit: usize) -> AppResult<AggregatedFeed> {
        let titles = self.catalog.get_popular(1).await.map_err(|e| {
            tracing::error!(error = %e, "Fallback popular fetch failed, nothing left to serve");
            AppError::FallbackExhausted(e.to_string())
        })?;

        let mut primary = dedup_titles(titles);
        primary.truncate(limit);

        tracing::info!(titles = primary.len(), "Serving generic fallback feed");

        Ok(AggregatedFeed {
            primary,
            sections: HashMap::new(),
            used_fallback: true,
            generated_at: Utc::now(),
            algorithm_version: ALGORITHM_VERSION,
        })
    }
}

/// Builds one reference-based section; any failure degrades to absence
async fn reference_section(
    catalog: Arc<dyn CatalogService>,
    key: SectionKey,
    reference: TitleId,
) -> Option<(SectionKey, RecommendationSection)> {
    let titles = match catalog.get_similar(reference, 1).await {
        Ok(titles) => titles,
        Err(e) => {
            tracing::warn!(reference, error = %e, "Reference section lookup failed, dropping section");
            return None;
        }
    };

    let mut titles = dedup_titles(titles);
    titles.truncate(SECTION_CAP);
    if titles.is_empty() {
        return None;
    }

    let label = match catalog.get_title(reference).await {
        Ok(title) => key.label_for(&title.name),
        Err(e) => {
            tracing::debug!(reference, error = %e, "Reference label lookup failed, using generic label");
            key.generic_label().to_string()
        }
    };

    Some((
        key,
        RecommendationSection {
            title: label,
            titles,
            reference_title_id: Some(reference),
        },
    ))
}

fn effective_limit(limit: Option<usize>) -> usize {
    match limit {
        Some(n) if n > 0 => n,
        _ => DEFAULT_LIMIT,
    }
}

fn push_unique(primary: &mut Vec<Title>, seen: &mut HashSet<TitleId>, titles: Vec<Title>) {
    for title in titles {
        if seen.insert(title.id) {
            primary.push(title);
        }
    }
}

fn dedup_titles(titles: Vec<Title>) -> Vec<Title> {
    let mut seen = HashSet::new();
    titles.into_iter().filter(|t| seen.insert(t.id)).collect()
}
