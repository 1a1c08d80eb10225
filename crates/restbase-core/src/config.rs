use std::fmt;
use std::sync::Arc;

use reqwest::header::{HeaderMap, HeaderValue, AUTHORIZATION};

use crate::error::{RestError, RestResult};

/// Source of per-request headers (API keys, bearer tokens).
///
/// Called once for every request the client sends, so a provider backed by
/// a token store sees refreshed credentials without rebuilding the client.
pub trait HeaderProvider: Send + Sync {
    fn headers(&self) -> HeaderMap;
}

impl<F> HeaderProvider for F
where
    F: Fn() -> HeaderMap + Send + Sync,
{
    fn headers(&self) -> HeaderMap {
        self()
    }
}

/// Provider that adds nothing.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoHeaders;

impl HeaderProvider for NoHeaders {
    fn headers(&self) -> HeaderMap {
        HeaderMap::new()
    }
}

/// Static `apikey` + `Authorization: Bearer` headers.
#[derive(Debug, Clone)]
pub struct ApiKeyHeaders {
    headers: HeaderMap,
}

impl ApiKeyHeaders {
    /// Use `api_key` for both the `apikey` header and the bearer token.
    pub fn new(api_key: &str) -> RestResult<Self> {
        let mut headers = HeaderMap::new();
        headers.insert("apikey", header_value(api_key, "API key")?);
        headers.insert(AUTHORIZATION, bearer(api_key)?);
        Ok(Self { headers })
    }

    /// Replace the bearer token with a user access token, keeping `apikey`.
    pub fn with_access_token(mut self, token: &str) -> RestResult<Self> {
        self.headers.insert(AUTHORIZATION, bearer(token)?);
        Ok(self)
    }
}

impl HeaderProvider for ApiKeyHeaders {
    fn headers(&self) -> HeaderMap {
        self.headers.clone()
    }
}

fn header_value(value: &str, what: &str) -> RestResult<HeaderValue> {
    HeaderValue::from_str(value)
        .map_err(|e| RestError::config(format!("Invalid {what} header: {e}")))
}

fn bearer(token: &str) -> RestResult<HeaderValue> {
    header_value(&format!("Bearer {token}"), "authorization")
}

/// Configuration for a PostgREST-compatible data API.
#[derive(Clone)]
pub struct ClientConfig {
    /// REST root, e.g. `https://project.example.co/rest/v1`.
    pub base_url: String,
    /// Default schema; `None` means the server default (`public`).
    pub schema: Option<String>,
    /// Injected auth/header source.
    pub headers: Arc<dyn HeaderProvider>,
    /// Pre-built HTTP client to share with the rest of the application.
    pub http: Option<reqwest::Client>,
}

impl fmt::Debug for ClientConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ClientConfig")
            .field("base_url", &self.base_url)
            .field("schema", &self.schema)
            .finish_non_exhaustive()
    }
}

impl ClientConfig {
    /// Create a config pointing at `base_url` with no auth headers.
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            schema: None,
            headers: Arc::new(NoHeaders),
            http: None,
        }
    }

    /// Set the default schema.
    pub fn schema(mut self, schema: impl Into<String>) -> Self {
        self.schema = Some(schema.into());
        self
    }

    /// Send a static API key on every request.
    pub fn api_key(self, api_key: &str) -> RestResult<Self> {
        Ok(self.header_provider(ApiKeyHeaders::new(api_key)?))
    }

    /// Inject a custom header provider.
    pub fn header_provider(mut self, provider: impl HeaderProvider + 'static) -> Self {
        self.headers = Arc::new(provider);
        self
    }

    /// Reuse an existing `reqwest::Client`.
    pub fn http_client(mut self, http: reqwest::Client) -> Self {
        self.http = Some(http);
        self
    }
}
