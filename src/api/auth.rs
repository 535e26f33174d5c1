use reqwest::Method;
use tracing::instrument;

use super::ApiClient;
use crate::{
    error::AppResult,
    models::{LoginRequest, RegisterRequest, User},
};

/// Remote auth API consulted by the session manager
///
/// Authentication state lives in the cookie jar of the implementation; the
/// methods only report what the server said.
#[cfg_attr(test, mockall::automock)]
#[async_trait::async_trait]
pub trait AuthApi: Send + Sync {
    /// `GET /api/auth/me`: identity bound to the current session cookie
    async fn current_user(&self) -> AppResult<User>;

    /// `POST /api/auth/login`: establishes a session, body is ignored
    async fn login(&self, email: &str, password: &str) -> AppResult<()>;

    /// `POST /api/auth/register`: creates the account and returns its identity
    async fn register(&self, email: &str, password: &str, display_name: &str) -> AppResult<User>;

    /// `POST /api/auth/logout`
    async fn logout(&self) -> AppResult<()>;
}

/// [`AuthApi`] over HTTP
#[derive(Clone)]
pub struct HttpAuthApi {
    client: ApiClient,
}

impl HttpAuthApi {
    pub fn new(client: ApiClient) -> Self {
        Self { client }
    }
}

#[async_trait::async_trait]
impl AuthApi for HttpAuthApi {
    #[instrument(skip(self))]
    async fn current_user(&self) -> AppResult<User> {
        self.client
            .send_json(self.client.request(Method::GET, "/api/auth/me"))
            .await
    }

    #[instrument(skip(self, password))]
    async fn login(&self, email: &str, password: &str) -> AppResult<()> {
        let body = LoginRequest { email, password };
        self.client
            .send(self.client.request(Method::POST, "/api/auth/login").json(&body))
            .await?;
        Ok(())
    }

    #[instrument(skip(self, password))]
    async fn register(&self, email: &str, password: &str, display_name: &str) -> AppResult<User> {
        let body = RegisterRequest {
            email,
            password,
            display_name,
        };
        self.client
            .send_json(self.client.request(Method::POST, "/api/auth/register").json(&body))
            .await
    }

    #[instrument(skip(self))]
    async fn logout(&self) -> AppResult<()> {
        self.client
            .send(self.client.request(Method::POST, "/api/auth/logout"))
            .await?;
        Ok(())
    }
}
