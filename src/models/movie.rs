use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// TMDB movie identifier
pub type TmdbId = i64;

/// Movie as returned by the catalog endpoints
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Movie {
    pub id: TmdbId,
    pub title: String,
    #[serde(default)]
    pub overview: Option<String>,
    /// Raw poster path; turning it into an image URL is the CDN's job
    #[serde(default)]
    pub poster_url: Option<String>,
    /// "YYYY-MM-DD"
    #[serde(default)]
    pub release_date: Option<String>,
    #[serde(default)]
    pub vote_average: Option<f64>,
}

impl Movie {
    /// Release year taken from the release date, if any
    pub fn release_year(&self) -> Option<i32> {
        self.release_date
            .as_deref()
            .and_then(|date| date.get(..4))
            .and_then(|year| year.parse().ok())
    }
}

/// One page of search or popular results
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
pub struct MoviePage {
    #[serde(default)]
    pub results: Vec<Movie>,
    #[serde(default)]
    pub page: Option<u32>,
    #[serde(default)]
    pub total_results: Option<u32>,
    #[serde(default)]
    pub total_pages: Option<u32>,
}

/// Movie saved to the user's library
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct LibraryItem {
    pub id: i64,
    pub user_id: i64,
    pub movie_id: TmdbId,
    pub title: String,
    #[serde(default)]
    pub poster_path: Option<String>,
    #[serde(default)]
    pub release_date: Option<String>,
    #[serde(default)]
    pub vote_average: Option<f64>,
    pub created_at: DateTime<Utc>,
}

/// Movie payload accepted by `POST /api/library/add`
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct LibraryMovie {
    pub id: TmdbId,
    pub title: String,
    pub poster_path: Option<String>,
    pub release_date: Option<String>,
    pub vote_average: Option<f64>,
}

impl From<&Movie> for LibraryMovie {
    fn from(movie: &Movie) -> Self {
        Self {
            id: movie.id,
            title: movie.title.clone(),
            poster_path: movie.poster_url.clone(),
            release_date: movie.release_date.clone(),
            vote_average: movie.vote_average,
        }
    }
}

/// Result of saving a movie to the library
#[derive(Debug, Clone, PartialEq)]
pub enum LibraryAddOutcome {
    Added(LibraryItem),
    AlreadyInLibrary,
}

/// Group recommendation: a movie plus the reason it was picked
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Recommendation {
    #[serde(flatten)]
    pub movie: Movie,
    pub why: String,
}
