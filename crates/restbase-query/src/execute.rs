use reqwest::header::HeaderMap;
use reqwest::StatusCode;
use serde::de::DeserializeOwned;

use restbase_core::{RestClient, RestError, RestResponse};

use crate::normalize::{normalize_rows, normalize_value};
use crate::parts::QueryParts;
use crate::request::{build_request, PreparedRequest};

/// Raw HTTP outcome handed to the normalizer.
struct RawResponse {
    status: StatusCode,
    headers: HeaderMap,
    body: String,
}

/// Send a prepared request with the client's provider headers merged in.
///
/// Request-specific headers override provider headers with the same name.
async fn send(client: &RestClient, request: PreparedRequest) -> Result<RawResponse, RestError> {
    let mut headers = client.default_headers();
    for (name, value) in request.headers.iter() {
        headers.insert(name.clone(), value.clone());
    }

    tracing::debug!(
        method = %request.method,
        url = %request.url,
        "Executing PostgREST request"
    );

    let mut builder = client
        .http()
        .request(request.method, request.url)
        .headers(headers);
    if let Some(body) = request.body {
        builder = builder.json(&body);
    }

    let response = builder
        .send()
        .await
        .map_err(|e| RestError::Http(e.to_string()))?;

    let status = response.status();
    let headers = response.headers().clone();
    let body = response
        .text()
        .await
        .map_err(|e| RestError::Http(e.to_string()))?;

    if !status.is_success() {
        tracing::debug!(status = status.as_u16(), "PostgREST request failed");
    }

    Ok(RawResponse {
        status,
        headers,
        body,
    })
}

/// Execute a table query and normalize the response into rows.
pub(crate) async fn execute_rows<T: DeserializeOwned>(
    client: &RestClient,
    parts: &QueryParts,
) -> RestResponse<Vec<T>> {
    let request = match build_request(client.base_url(), client.schema(), parts) {
        Ok(r) => r,
        Err(e) => return RestResponse::error(e),
    };
    match send(client, request).await {
        Ok(raw) => normalize_rows(raw.status, &raw.headers, &raw.body, parts.head_only()),
        Err(e) => RestResponse::error(e),
    }
}

/// Execute an already-built request whose response is arbitrary JSON.
pub(crate) async fn execute_value<T: DeserializeOwned>(
    client: &RestClient,
    request: PreparedRequest,
) -> RestResponse<T> {
    match send(client, request).await {
        Ok(raw) => normalize_value(raw.status, &raw.headers, &raw.body),
        Err(e) => RestResponse::error(e),
    }
}
