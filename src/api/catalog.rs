/// Catalog, library and recommendation endpoints
///
/// Shares the [`ApiClient`] (and therefore the session cookie) with the auth
/// API, so library and recommendation calls run as the signed-in user.
use reqwest::{Method, StatusCode};
use serde::{Deserialize, Serialize};

use super::ApiClient;
use crate::{
    error::AppResult,
    models::{
        LibraryAddOutcome, LibraryItem, LibraryMovie, Movie, MoviePage, Recommendation, TmdbId,
        UserSummary,
    },
};

#[derive(Debug, Deserialize)]
struct ResultsEnvelope<T> {
    #[serde(default = "Vec::new")]
    results: Vec<T>,
}

#[derive(Debug, Deserialize)]
struct AddResponse {
    item: Option<LibraryItem>,
}

#[derive(Debug, Serialize)]
struct AddRequest<'a> {
    movie: &'a LibraryMovie,
}

#[derive(Debug, Serialize)]
struct RecommendationRequest<'a> {
    user_ids: &'a [i64],
}

#[derive(Clone)]
pub struct CatalogClient {
    client: ApiClient,
}

impl CatalogClient {
    pub fn new(client: ApiClient) -> Self {
        Self { client }
    }

    /// Searches the catalog; a blank query yields an empty page without a request
    pub async fn search_movies(&self, query: &str, page: u32) -> AppResult<MoviePage> {
        let query = query.trim();
        if query.is_empty() {
            return Ok(MoviePage::default());
        }

        let page_param = page.max(1).to_string();
        let results: MoviePage = self
            .client
            .send_json(
                self.client
                    .request(Method::GET, "/api/movies/search")
                    .query(&[("q", query), ("page", page_param.as_str())]),
            )
            .await?;

        tracing::info!(
            query = %query,
            results = results.results.len(),
            "Movie search completed"
        );

        Ok(results)
    }

    pub async fn popular_movies(&self, page: u32) -> AppResult<MoviePage> {
        let page_param = page.max(1).to_string();
        self.client
            .send_json(
                self.client
                    .request(Method::GET, "/api/movies/popular")
                    .query(&[("page", page_param.as_str())]),
            )
            .await
    }

    pub async fn movie(&self, tmdb_id: TmdbId) -> AppResult<Movie> {
        self.client
            .send_json(
                self.client
                    .request(Method::GET, &format!("/api/movies/{}", tmdb_id)),
            )
            .await
    }

    /// Saved movies of the signed-in user, newest first
    pub async fn library(&self) -> AppResult<Vec<LibraryItem>> {
        self.client
            .send_json(self.client.request(Method::GET, "/api/library"))
            .await
    }

    /// Saves a movie; saving one that is already there is not an error
    pub async fn add_to_library(&self, movie: &Movie) -> AppResult<LibraryAddOutcome> {
        let payload = LibraryMovie::from(movie);
        let response = self
            .client
            .send(
                self.client
                    .request(Method::POST, "/api/library/add")
                    .json(&AddRequest { movie: &payload }),
            )
            .await?;

        if response.status() != StatusCode::CREATED {
            tracing::debug!(movie_id = movie.id, "Movie already in library");
            return Ok(LibraryAddOutcome::AlreadyInLibrary);
        }

        let body: AddResponse = response.json().await?;
        Ok(match body.item {
            Some(item) => {
                tracing::info!(movie_id = item.movie_id, "Movie added to library");
                LibraryAddOutcome::Added(item)
            }
            None => LibraryAddOutcome::AlreadyInLibrary,
        })
    }

    pub async fn remove_from_library(&self, movie_id: TmdbId) -> AppResult<()> {
        self.client
            .send(
                self.client
                    .request(Method::DELETE, &format!("/api/library/remove/{}", movie_id)),
            )
            .await?;

        tracing::info!(movie_id = movie_id, "Movie removed from library");
        Ok(())
    }

    /// Looks up other users to add to a recommendation group
    pub async fn search_users(&self, query: &str) -> AppResult<Vec<UserSummary>> {
        let query = query.trim();
        if query.is_empty() {
            return Ok(Vec::new());
        }

        let envelope: ResultsEnvelope<UserSummary> = self
            .client
            .send_json(
                self.client
                    .request(Method::GET, "/api/auth/search")
                    .query(&[("q", query)]),
            )
            .await?;
        Ok(envelope.results)
    }

    /// Asks for picks for the signed-in user plus `user_ids`
    pub async fn recommendations(&self, user_ids: &[i64]) -> AppResult<Vec<Recommendation>> {
        let envelope: ResultsEnvelope<Recommendation> = self
            .client
            .send_json(
                self.client
                    .request(Method::POST, "/api/recs")
                    .json(&RecommendationRequest { user_ids }),
            )
            .await?;

        tracing::info!(
            group_size = user_ids.len() + 1,
            recommendations = envelope.results.len(),
            "Recommendations received"
        );

        Ok(envelope.results)
    }
}
