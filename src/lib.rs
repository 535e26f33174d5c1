pub mod api;
pub mod config;
pub mod error;
pub mod middleware;
pub mod models;
pub mod routes;
pub mod services;

use std::sync::Arc;

use api::{ApiClient, CatalogClient, HttpAuthApi};
use config::Config;
use error::AppResult;
use services::SessionManager;

/// Everything a running client needs, wired to one cookie jar
#[derive(Clone)]
pub struct Client {
    pub sessions: SessionManager,
    pub catalog: CatalogClient,
    pub router: routes::Router,
}

impl Client {
    /// Builds the client; no request is made until the session is initialized
    pub fn new(config: &Config) -> AppResult<Self> {
        let api_client = ApiClient::new(config)?;
        let sessions = SessionManager::new(Arc::new(HttpAuthApi::new(api_client.clone())));

        tracing::debug!(api_url = %api_client.base_url(), "Client created");

        Ok(Self {
            sessions,
            catalog: CatalogClient::new(api_client),
            router: routes::create_router(),
        })
    }
}
