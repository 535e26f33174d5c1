use reqwest::header::{HeaderValue, InvalidHeaderValue};
use reqwest::{Method, RequestBuilder};
use uuid::Uuid;

/// HTTP header name for request ID
pub const REQUEST_ID_HEADER: &str = "x-request-id";

/// Correlation ID attached to every outgoing request
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RequestId(pub Uuid);

impl RequestId {
    /// Creates a new random request ID
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    /// Returns the UUID as a string
    pub fn as_str(&self) -> String {
        self.0.to_string()
    }

    /// Header value form of the ID
    pub fn header_value(&self) -> Result<HeaderValue, InvalidHeaderValue> {
        HeaderValue::from_str(&self.as_str())
    }
}

impl Default for RequestId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for RequestId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Stamps a fresh request ID onto an outgoing request.
///
/// Returns the ID so the caller can record it in its span.
pub fn with_request_id(builder: RequestBuilder) -> (RequestBuilder, RequestId) {
    let request_id = RequestId::new();
    let builder = match request_id.header_value() {
        Ok(value) => builder.header(REQUEST_ID_HEADER, value),
        Err(_) => builder,
    };
    (builder, request_id)
}

/// Helper function to create a tracing span with request ID
pub fn make_span_with_request_id(method: &Method, path: &str, request_id: &RequestId) -> tracing::Span {
    tracing::info_span!(
        "http_request",
        method = %method,
        path = %path,
        request_id = %request_id,
    )
}
