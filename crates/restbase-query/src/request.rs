use reqwest::header::{HeaderMap, HeaderValue, ACCEPT, CONTENT_TYPE};
use reqwest::Method;
use serde_json::Value as JsonValue;
use url::Url;

use restbase_core::RestError;

use crate::parts::{Intent, QueryParts};

/// A fully-resolved HTTP request, ready to send.
#[derive(Debug, Clone)]
pub struct PreparedRequest {
    pub method: Method,
    pub url: Url,
    pub headers: HeaderMap,
    pub body: Option<JsonValue>,
}

impl PreparedRequest {
    /// Decoded query pairs, in order.
    pub fn query_pairs(&self) -> Vec<(String, String)> {
        self.url
            .query_pairs()
            .map(|(k, v)| (k.into_owned(), v.into_owned()))
            .collect()
    }

    /// First decoded value for `key`.
    pub fn query_value(&self, key: &str) -> Option<String> {
        self.url
            .query_pairs()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.into_owned())
    }
}

/// Build `{base}/{segments...}` with each segment percent-encoded.
pub(crate) fn resource_url(base_url: &Url, segments: &[&str]) -> Result<Url, RestError> {
    let mut url = base_url.clone();
    url.set_query(None);
    {
        let mut path = url
            .path_segments_mut()
            .map_err(|_| RestError::query_builder(format!("Base URL cannot be a base: {base_url}")))?;
        path.pop_if_empty();
        for segment in segments {
            path.push(segment);
        }
    }
    Ok(url)
}

fn append_query(url: &mut Url, pairs: &[(String, String)]) {
    if pairs.is_empty() {
        return;
    }
    let mut query = url.query_pairs_mut();
    for (key, value) in pairs {
        query.append_pair(key, value);
    }
}

/// `public` is the server default and needs no profile header.
fn non_public(schema: Option<&str>) -> Option<&str> {
    schema.filter(|s| *s != "public")
}

fn header(value: &str) -> Result<HeaderValue, RestError> {
    HeaderValue::from_str(value)
        .map_err(|e| RestError::query_builder(format!("Invalid header value {value:?}: {e}")))
}

/// Translate accumulated builder state into a single request.
///
/// Dispatch follows the intent: insert is POST, update is PATCH, delete
/// is DELETE, anything else is GET (or HEAD when head-only).
pub fn build_request(
    base_url: &Url,
    default_schema: Option<&str>,
    parts: &QueryParts,
) -> Result<PreparedRequest, RestError> {
    if let Some(reason) = &parts.invalid {
        return Err(RestError::query_builder(format!(
            "Refusing {} on {}: {reason}",
            parts.intent.name(),
            parts.resource
        )));
    }
    let mut url = resource_url(base_url, &[&parts.resource])?;
    let mut headers = HeaderMap::new();
    let mut query: Vec<(String, String)> = Vec::new();

    let filters = parts
        .filters
        .iter()
        .map(|f| (f.column.clone(), f.value.clone()));

    let select = ("select".to_string(), parts.projection.clone());

    let (method, body) = match &parts.intent {
        Intent::Insert(payload) => {
            query.push(select);
            (Method::POST, Some(payload.clone().into_json()))
        }
        Intent::Update(row) => {
            query.push(select);
            query.extend(filters);
            (Method::PATCH, Some(JsonValue::from(row.clone())))
        }
        Intent::Delete => {
            query.extend(filters);
            (Method::DELETE, None)
        }
        Intent::Read => {
            query.push(select);
            query.extend(filters);
            if !parts.orders.is_empty() {
                let order = parts
                    .orders
                    .iter()
                    .map(|o| o.render())
                    .collect::<Vec<_>>()
                    .join(",");
                query.push(("order".to_string(), order));
            }
            if let Some(limit) = parts.limit {
                query.push(("limit".to_string(), limit.to_string()));
            }
            if let Some(offset) = parts.offset {
                query.push(("offset".to_string(), offset.to_string()));
            }
            let method = if parts.head_only() { Method::HEAD } else { Method::GET };
            (method, None)
        }
    };

    append_query(&mut url, &query);

    // Prefer header (compose return + count)
    let count = parts.count.prefer();
    let mut prefer = Vec::new();
    if parts.intent.is_mutation() || count.is_some() {
        prefer.push("return=representation");
    }
    if let Some(count) = count {
        prefer.push(count);
    }
    if !prefer.is_empty() {
        headers.insert("Prefer", header(&prefer.join(","))?);
    }

    headers.insert(ACCEPT, HeaderValue::from_static("application/json"));
    if body.is_some() {
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
    }

    if let Some(schema) = parts.schema.as_deref().or(non_public(default_schema)) {
        let profile = if parts.intent.is_mutation() {
            "Content-Profile"
        } else {
            "Accept-Profile"
        };
        headers.insert(profile, header(schema)?);
    }

    Ok(PreparedRequest {
        method,
        url,
        headers,
        body,
    })
}

/// Build the request for `POST {base}/rpc/{function}`.
pub fn build_rpc_request(
    base_url: &Url,
    default_schema: Option<&str>,
    function: &str,
    args: &JsonValue,
    count: crate::parts::CountOption,
) -> Result<PreparedRequest, RestError> {
    let url = resource_url(base_url, &["rpc", function])?;
    let mut headers = HeaderMap::new();
    headers.insert(ACCEPT, HeaderValue::from_static("application/json"));
    headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
    if let Some(count) = count.prefer() {
        headers.insert("Prefer", HeaderValue::from_static(count));
    }
    if let Some(schema) = non_public(default_schema) {
        headers.insert("Content-Profile", header(schema)?);
    }

    let body = if args.is_null() {
        JsonValue::Object(serde_json::Map::new())
    } else {
        args.clone()
    };

    Ok(PreparedRequest {
        method: Method::POST,
        url,
        headers,
        body: Some(body),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::filter::{Filter, FilterOperator};
    use crate::param::Param;
    use crate::parts::{CountOption, OrderClause, OrderDirection};
    use restbase_core::row;

    fn base() -> Url {
        Url::parse("http://localhost:3000/rest/v1").unwrap()
    }

    fn eq(column: &str, value: i64) -> Filter {
        Filter::comparison(column, FilterOperator::Eq, &Param::I64(value))
    }

    #[test]
    fn read_select_all() {
        let parts = QueryParts::new("campaigns");
        let req = build_request(&base(), None, &parts).unwrap();
        assert_eq!(req.method, Method::GET);
        assert_eq!(req.url.path(), "/rest/v1/campaigns");
        assert_eq!(req.query_pairs(), vec![("select".to_string(), "*".to_string())]);
        assert!(req.body.is_none());
        assert!(req.headers.get("Prefer").is_none());
        assert_eq!(req.headers.get(ACCEPT).unwrap(), "application/json");
    }

    #[test]
    fn read_with_filters_order_and_pagination() {
        let mut parts = QueryParts::new("messages");
        parts.projection = "id,body".into();
        parts.filters.push(eq("campaign_id", 3));
        parts.orders.push(OrderClause {
            column: "sent_at".into(),
            direction: OrderDirection::Descending,
            nulls: None,
        });
        parts.orders.push(OrderClause {
            column: "id".into(),
            direction: OrderDirection::Ascending,
            nulls: None,
        });
        parts.limit = Some(10);
        parts.offset = Some(20);
        let req = build_request(&base(), None, &parts).unwrap();
        let pairs: Vec<(String, String)> = vec![
            ("select".into(), "id,body".into()),
            ("campaign_id".into(), "eq.3".into()),
            ("order".into(), "sent_at.desc,id.asc".into()),
            ("limit".into(), "10".into()),
            ("offset".into(), "20".into()),
        ];
        assert_eq!(req.query_pairs(), pairs);
    }

    #[test]
    fn head_count_uses_head_method() {
        let mut parts = QueryParts::new("contacts");
        parts.head = true;
        parts.count = CountOption::Exact;
        let req = build_request(&base(), None, &parts).unwrap();
        assert_eq!(req.method, Method::HEAD);
        assert_eq!(
            req.headers.get("Prefer").unwrap(),
            "return=representation,count=exact"
        );
    }

    #[test]
    fn insert_posts_body_with_select() {
        let mut parts = QueryParts::new("broadcasts");
        parts.intent = Intent::Insert(row![("name", "Launch")].into());
        parts.filters.push(eq("ignored", 1));
        let req = build_request(&base(), None, &parts).unwrap();
        assert_eq!(req.method, Method::POST);
        assert_eq!(req.query_pairs(), vec![("select".to_string(), "*".to_string())]);
        assert_eq!(req.body.as_ref().unwrap()["name"], "Launch");
        assert_eq!(req.headers.get("Prefer").unwrap(), "return=representation");
        assert_eq!(req.headers.get(CONTENT_TYPE).unwrap(), "application/json");
    }

    #[test]
    fn insert_many_posts_array() {
        let mut parts = QueryParts::new("contacts");
        parts.intent = Intent::Insert(vec![row![("phone", "1")], row![("phone", "2")]].into());
        let req = build_request(&base(), None, &parts).unwrap();
        assert_eq!(req.body.unwrap().as_array().unwrap().len(), 2);
    }

    #[test]
    fn update_patches_with_select_and_filters() {
        let mut parts = QueryParts::new("sequences");
        parts.intent = Intent::Update(row![("active", false)]);
        parts.filters.push(eq("id", 9));
        parts.count = CountOption::Planned;
        let req = build_request(&base(), None, &parts).unwrap();
        assert_eq!(req.method, Method::PATCH);
        assert_eq!(req.query_value("select").as_deref(), Some("*"));
        assert_eq!(req.query_value("id").as_deref(), Some("eq.9"));
        assert_eq!(req.body.unwrap()["active"], false);
        assert_eq!(
            req.headers.get("Prefer").unwrap(),
            "return=representation,count=planned"
        );
    }

    #[test]
    fn delete_has_filters_and_no_body() {
        let mut parts = QueryParts::new("sequences");
        parts.intent = Intent::Delete;
        parts.filters.push(eq("id", 9));
        parts.orders.push(OrderClause {
            column: "id".into(),
            direction: OrderDirection::Ascending,
            nulls: None,
        });
        let req = build_request(&base(), None, &parts).unwrap();
        assert_eq!(req.method, Method::DELETE);
        assert_eq!(req.query_pairs(), vec![("id".to_string(), "eq.9".to_string())]);
        assert!(req.body.is_none());
        assert!(req.headers.get(CONTENT_TYPE).is_none());
    }

    #[test]
    fn rejected_parts_build_no_request() {
        let mut parts = QueryParts::new("contacts");
        parts.intent = Intent::Delete;
        parts.reject("eq filter: Invalid column name");
        let err = build_request(&base(), None, &parts).unwrap_err();
        assert!(matches!(err, RestError::QueryBuilder(_)));
        assert!(err.message().contains("delete on contacts"));
    }

    #[test]
    fn delete_without_filters_has_no_query() {
        let mut parts = QueryParts::new("drafts");
        parts.intent = Intent::Delete;
        let req = build_request(&base(), None, &parts).unwrap();
        assert_eq!(req.url.query(), None);
    }

    #[test]
    fn schema_profile_headers() {
        let parts = QueryParts::new("campaigns");
        let req = build_request(&base(), Some("marketing"), &parts).unwrap();
        assert_eq!(req.headers.get("Accept-Profile").unwrap(), "marketing");

        let mut parts = QueryParts::new("campaigns");
        parts.intent = Intent::Delete;
        parts.schema = Some("archive".into());
        let req = build_request(&base(), Some("marketing"), &parts).unwrap();
        assert_eq!(req.headers.get("Content-Profile").unwrap(), "archive");
        assert!(req.headers.get("Accept-Profile").is_none());
    }

    #[test]
    fn public_default_schema_sends_no_profile() {
        let parts = QueryParts::new("campaigns");
        let req = build_request(&base(), Some("public"), &parts).unwrap();
        assert!(req.headers.get("Accept-Profile").is_none());

        let mut parts = QueryParts::new("campaigns");
        parts.schema = Some("public".into());
        let req = build_request(&base(), Some("marketing"), &parts).unwrap();
        assert_eq!(req.headers.get("Accept-Profile").unwrap(), "public");
    }

    #[test]
    fn base_url_trailing_slash_and_encoding() {
        let base = Url::parse("http://localhost:3000/rest/v1/").unwrap();
        let parts = QueryParts::new("odd name");
        let req = build_request(&base, None, &parts).unwrap();
        assert_eq!(req.url.path(), "/rest/v1/odd%20name");
    }

    #[test]
    fn rpc_request() {
        let args = serde_json::json!({"campaign_id": 4});
        let req = build_rpc_request(&base(), None, "schedule_campaign", &args, CountOption::None)
            .unwrap();
        assert_eq!(req.method, Method::POST);
        assert_eq!(req.url.as_str(), "http://localhost:3000/rest/v1/rpc/schedule_campaign");
        assert_eq!(req.body.unwrap()["campaign_id"], 4);
        assert!(req.headers.get("Prefer").is_none());
    }

    #[test]
    fn rpc_null_args_become_empty_object() {
        let req = build_rpc_request(
            &base(),
            None,
            "stats",
            &JsonValue::Null,
            CountOption::Exact,
        )
        .unwrap();
        assert_eq!(req.body.unwrap(), serde_json::json!({}));
        assert_eq!(req.headers.get("Prefer").unwrap(), "count=exact");
    }
}
