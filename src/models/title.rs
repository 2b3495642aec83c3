use serde::{Deserialize, Serialize};

/// Stable catalog identity for a movie or show
pub type TitleId = u64;

/// Catalog genre identifier
pub type GenreId = u32;

/// A movie or show record as served to clients
///
/// Identity is `id`; every other field is informational and may be missing
/// depending on which upstream populated the record.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Title {
    pub id: TitleId,
    pub name: String,
    #[serde(default)]
    pub poster_path: Option<String>,
    #[serde(default)]
    pub backdrop_path: Option<String>,
    /// Catalog rating on the catalog's 0-10 scale
    #[serde(default)]
    pub vote_average: f32,
    #[serde(default)]
    pub overview: Option<String>,
    #[serde(default)]
    pub release_date: Option<String>,
    #[serde(default)]
    pub genre_ids: Vec<GenreId>,
    #[serde(default)]
    pub popularity: Option<f32>,
}

// ============================================================================
// Catalog API Types
// ============================================================================

/// Raw movie record from the catalog API
///
/// List endpoints carry `genre_ids`; the single-title details endpoint
/// expands them into `genres` objects instead. Both shapes deserialize here.
#[derive(Debug, Clone, Deserialize)]
pub struct TmdbMovie {
    pub id: TitleId,
    pub title: String,
    #[serde(default)]
    pub poster_path: Option<String>,
    #[serde(default)]
    pub backdrop_path: Option<String>,
    #[serde(default)]
    pub vote_average: f32,
    #[serde(default)]
    pub overview: Option<String>,
    #[serde(default)]
    pub release_date: Option<String>,
    #[serde(default)]
    pub genre_ids: Vec<GenreId>,
    #[serde(default)]
    pub genres: Vec<TmdbGenre>,
    #[serde(default)]
    pub popularity: Option<f32>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct TmdbGenre {
    pub id: GenreId,
    pub name: String,
}

/// One page of a catalog list endpoint
#[derive(Debug, Clone, Deserialize)]
pub struct TmdbPage {
    #[serde(default)]
    pub results: Vec<TmdbMovie>,
}

impl From<TmdbMovie> for Title {
    fn from(movie: TmdbMovie) -> Self {
        let genre_ids = if movie.genre_ids.is_empty() {
            movie.genres.into_iter().map(|g| g.id).collect()
        } else {
            movie.genre_ids
        };

        Title {
            id: movie.id,
            name: movie.title,
            poster_path: movie.poster_path,
            backdrop_path: movie.backdrop_path,
            vote_average: movie.vote_average,
            overview: none_if_blank(movie.overview),
            release_date: none_if_blank(movie.release_date),
            genre_ids,
            popularity: movie.popularity,
        }
    }
}

// ============================================================================
// Recommendation Service Types
// ============================================================================

/// Raw entry from the recommendation service's ranked list
#[derive(Debug, Clone, Deserialize)]
pub struct RecommendedMovie {
    pub movie_id: TitleId,
    pub title: String,
    /// Model similarity in [0, 1]
    pub similarity_score: f32,
    #[serde(default)]
    pub poster_path: Option<String>,
    #[serde(default)]
    pub backdrop_path: Option<String>,
    #[serde(default)]
    pub overview: Option<String>,
    #[serde(default)]
    pub release_date: Option<String>,
    #[serde(default)]
    pub genre_ids: Vec<GenreId>,
    #[serde(default)]
    pub popularity: Option<f32>,
}

impl From<RecommendedMovie> for Title {
    fn from(rec: RecommendedMovie) -> Self {
        Title {
            id: rec.movie_id,
            name: rec.title,
            poster_path: rec.poster_path,
            backdrop_path: rec.backdrop_path,
            // Normalize the model's [0, 1] similarity onto the catalog's vote scale
            vote_average: rec.similarity_score * 10.0 / 2.0,
            overview: none_if_blank(rec.overview),
            release_date: none_if_blank(rec.release_date),
            genre_ids: rec.genre_ids,
            popularity: rec.popularity,
        }
    }
}

fn none_if_blank(value: Option<String>) -> Option<String> {
    value.filter(|s| !s.trim().is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tmdb_movie_list_shape_deserialization() {
        let json = r#"{
            "id": 27205,
            "title": "Inception",
            "poster_path": "/inception.jpg",
            "vote_average": 8.4,
            "release_date": "2010-07-15",
            "genre_ids": [28, 878],
            "popularity": 91.5
        }"#;

        let movie: TmdbMovie = serde_json::from_str(json).unwrap();
        let title = Title::from(movie);

        assert_eq!(title.id, 27205);
        assert_eq!(title.name, "Inception");
        assert_eq!(title.genre_ids, vec![28, 878]);
        assert_eq!(title.release_date.as_deref(), Some("2010-07-15"));
        assert_eq!(title.popularity, Some(91.5));
    }

    #[test]
    fn test_tmdb_movie_details_shape_uses_expanded_genres() {
        let json = r#"{
            "id": 603,
            "title": "The Matrix",
            "vote_average": 8.2,
            "genres": [{"id": 28, "name": "Action"}, {"id": 878, "name": "Science Fiction"}]
        }"#;

        let movie: TmdbMovie = serde_json::from_str(json).unwrap();
        let title = Title::from(movie);

        assert_eq!(title.genre_ids, vec![28, 878]);
        assert_eq!(title.poster_path, None);
    }

    #[test]
    fn test_blank_release_date_normalized_to_none() {
        let json = r#"{"id": 1, "title": "Untitled", "release_date": ""}"#;

        let movie: TmdbMovie = serde_json::from_str(json).unwrap();
        let title = Title::from(movie);

        assert_eq!(title.release_date, None);
    }

    #[test]
    fn test_recommended_movie_score_conversion() {
        let json = r#"{
            "movie_id": 550,
            "title": "Fight Club",
            "similarity_score": 0.8,
            "genre_ids": [18]
        }"#;

        let rec: RecommendedMovie = serde_json::from_str(json).unwrap();
        let title = Title::from(rec);

        assert_eq!(title.id, 550);
        // 0.8 * 10 / 2 = 4.0 on the catalog vote scale
        assert!((title.vote_average - 4.0).abs() < f32::EPSILON);
    }
}
