use std::sync::Arc;

use reqwest::header::HeaderMap;
use url::Url;

use crate::config::ClientConfig;
use crate::error::{RestError, RestResult};

/// The main handle for talking to a PostgREST-compatible data API.
///
/// Cheap to clone: builders each take their own copy.
#[derive(Debug, Clone)]
pub struct RestClient {
    http: reqwest::Client,
    base_url: Arc<Url>,
    config: Arc<ClientConfig>,
}

impl RestClient {
    /// Create a new client, validating the base URL.
    pub fn new(config: ClientConfig) -> RestResult<Self> {
        let base_url = Url::parse(&config.base_url)?;
        if base_url.cannot_be_a_base() {
            return Err(RestError::config(format!(
                "Base URL cannot have path segments: {}",
                config.base_url
            )));
        }
        let http = match config.http.clone() {
            Some(http) => http,
            None => reqwest::Client::builder()
                .build()
                .map_err(|e| RestError::config(format!("Failed to build HTTP client: {e}")))?,
        };
        tracing::debug!(base_url = %base_url, schema = ?config.schema, "Created REST client");
        Ok(Self {
            http,
            base_url: Arc::new(base_url),
            config: Arc::new(config),
        })
    }

    /// Get the underlying HTTP client.
    pub fn http(&self) -> &reqwest::Client {
        &self.http
    }

    /// The validated REST root.
    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    /// Get the default schema, if one was configured.
    pub fn schema(&self) -> Option<&str> {
        self.config.schema.as_deref()
    }

    /// Headers from the injected provider, fetched fresh for each request.
    pub fn default_headers(&self) -> HeaderMap {
        self.config.headers.headers()
    }

    /// Get the full config.
    pub fn config(&self) -> &ClientConfig {
        &self.config
    }
}
