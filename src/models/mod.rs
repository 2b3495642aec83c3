mod feed;
mod profile;
mod title;

pub use feed::{
    AggregatedFeed, Category, FeedOutcome, RecommendationSection, SectionKey, ALGORITHM_VERSION,
};
pub use profile::{TasteProfile, TitleRating};
pub use title::{GenreId, RecommendedMovie, Title, TitleId, TmdbGenre, TmdbMovie, TmdbPage};
