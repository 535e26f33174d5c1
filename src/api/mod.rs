//! HTTP access to the MovieMatch API
//!
//! Every request goes through [`ApiClient`], which owns the cookie store that
//! carries the server-side session, stamps a request id, and turns non-success
//! responses into [`AppError::Rejected`] with the server's message.

use reqwest::header::CONTENT_TYPE;
use reqwest::{Client as HttpClient, Method, RequestBuilder, Response, StatusCode};
use serde::de::DeserializeOwned;
use serde_json::Value;
use tracing::Instrument;

use crate::{
    config::Config,
    error::{AppError, AppResult},
    middleware::{make_span_with_request_id, with_request_id},
};

pub mod auth;
pub mod catalog;

pub use auth::{AuthApi, HttpAuthApi};
pub use catalog::CatalogClient;

/// Shared HTTP client bound to one API origin and one cookie jar
#[derive(Clone)]
pub struct ApiClient {
    http_client: HttpClient,
    base_url: String,
}

impl ApiClient {
    /// Creates a client with its own cookie store
    pub fn new(config: &Config) -> AppResult<Self> {
        let http_client = HttpClient::builder()
            .cookie_store(true)
            .user_agent(config.user_agent.as_str())
            .build()?;

        Ok(Self {
            http_client,
            base_url: config.api_url.clone(),
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Starts a request against `path` on the configured origin
    pub(crate) fn request(&self, method: Method, path: &str) -> RequestBuilder {
        self.http_client
            .request(method, format!("{}{}", self.base_url, path))
    }

    /// Sends a request and fails on any non-success status
    pub(crate) async fn send(&self, builder: RequestBuilder) -> AppResult<Response> {
        let (builder, request_id) = with_request_id(builder);
        let request = builder.build()?;
        let span = make_span_with_request_id(request.method(), request.url().path(), &request_id);

        async move {
            let response = self.http_client.execute(request).await.map_err(|e| {
                tracing::warn!(error = %e, "Request failed before a response arrived");
                AppError::HttpClient(e)
            })?;

            let status = response.status();
            if status.is_success() {
                tracing::debug!(status = status.as_u16(), "Request succeeded");
                return Ok(response);
            }

            let error = rejection(response).await;
            tracing::info!(status = status.as_u16(), error = %error, "Request rejected");
            Err(error)
        }
        .instrument(span)
        .await
    }

    /// Sends a request and decodes the JSON body of a success response
    pub(crate) async fn send_json<T: DeserializeOwned>(&self, builder: RequestBuilder) -> AppResult<T> {
        let response = self.send(builder).await?;
        Ok(response.json().await?)
    }
}

/// Builds the error for a non-success response
async fn rejection(response: Response) -> AppError {
    let status = response.status();
    let is_json = response
        .headers()
        .get(CONTENT_TYPE)
        .and_then(|value| value.to_str().ok())
        .map_or(false, |content_type| content_type.contains("application/json"));

    let body = if is_json {
        response.json::<Value>().await.ok()
    } else {
        None
    };

    AppError::Rejected {
        status,
        message: error_message(status, body.as_ref()),
    }
}

/// Picks the message shown for a rejected request: `error`, then `message`,
/// then the status reason phrase.
pub(crate) fn error_message(status: StatusCode, body: Option<&Value>) -> String {
    let field = |name: &str| {
        body.and_then(|body| body.get(name))
            .and_then(Value::as_str)
            .filter(|message| !message.is_empty())
    };

    field("error")
        .or_else(|| field("message"))
        .map(str::to_string)
        .unwrap_or_else(|| match status.canonical_reason() {
            Some(reason) => reason.to_string(),
            None => format!("HTTP {}", status.as_u16()),
        })
}
