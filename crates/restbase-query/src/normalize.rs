//! HTTP outcome → [`RestResponse`] envelope.
//!
//! These functions are pure over `(status, headers, body)` so every rule can
//! be exercised without a server.

use reqwest::header::HeaderMap;
use reqwest::StatusCode;
use serde::de::DeserializeOwned;
use serde::Deserialize;
use serde_json::Value as JsonValue;

use restbase_core::{RestError, RestResponse};

/// PostgREST error body: `{ "message", "code", "details", "hint" }`.
#[derive(Debug, Default, Deserialize)]
struct ErrorBody {
    #[serde(default)]
    message: Option<String>,
    #[serde(default)]
    code: Option<String>,
    #[serde(default)]
    details: Option<String>,
    #[serde(default)]
    hint: Option<String>,
}

/// Total from `Content-Range: <start>-<end>/<total>`; `*` totals yield `None`.
pub fn parse_content_range_total(headers: &HeaderMap) -> Option<i64> {
    let value = headers.get("content-range")?.to_str().ok()?;
    let (_, total) = value.rsplit_once('/')?;
    match total.trim() {
        "*" => None,
        total => total.parse::<i64>().ok(),
    }
}

/// Error for a non-success status.
///
/// Falls back to the status text when the body is not a JSON error object.
pub fn error_from_body(status: StatusCode, body: &str) -> RestError {
    let parsed = serde_json::from_str::<ErrorBody>(body).unwrap_or_default();
    let message = parsed.message.unwrap_or_else(|| status_text(status));
    RestError::Server {
        status: status.as_u16(),
        message,
        code: parsed.code,
        details: parsed.details,
        hint: parsed.hint,
    }
}

fn status_text(status: StatusCode) -> String {
    status
        .canonical_reason()
        .map(str::to_string)
        .unwrap_or_else(|| format!("HTTP {}", status.as_u16()))
}

/// Normalize a collection response (table reads and mutations).
pub fn normalize_rows<T: DeserializeOwned>(
    status: StatusCode,
    headers: &HeaderMap,
    body: &str,
    head_only: bool,
) -> RestResponse<Vec<T>> {
    if !status.is_success() {
        return RestResponse::error(error_from_body(status, body));
    }
    let count = parse_content_range_total(headers);

    if head_only {
        return RestResponse::empty(status.as_u16()).with_count(count);
    }

    let rows = match serde_json::from_str::<JsonValue>(body) {
        Ok(JsonValue::Array(items)) => decode_rows(items),
        Ok(JsonValue::Null) | Err(_) => Ok(Vec::new()),
        Ok(single) => serde_json::from_value::<T>(single).map(|row| vec![row]),
    };

    match rows {
        Ok(rows) => RestResponse::ok(rows, status.as_u16()).with_count(count),
        Err(e) => RestResponse::error(RestError::serialization(format!(
            "Failed to decode rows: {e}"
        ))),
    }
}

fn decode_rows<T: DeserializeOwned>(items: Vec<JsonValue>) -> Result<Vec<T>, serde_json::Error> {
    items.into_iter().map(serde_json::from_value).collect()
}

/// Normalize an RPC response. Whatever JSON the function returns is `data`.
pub fn normalize_value<T: DeserializeOwned>(
    status: StatusCode,
    headers: &HeaderMap,
    body: &str,
) -> RestResponse<T> {
    if !status.is_success() {
        return RestResponse::error(error_from_body(status, body));
    }
    let count = parse_content_range_total(headers);
    let value = serde_json::from_str::<JsonValue>(body)
        .unwrap_or_else(|_| JsonValue::Array(Vec::new()));
    match serde_json::from_value::<T>(value) {
        Ok(data) => RestResponse::ok(data, status.as_u16()).with_count(count),
        Err(e) => RestResponse::error(RestError::serialization(format!(
            "Failed to decode response: {e}"
        ))),
    }
}
