use std::future::IntoFuture;

use futures_util::future::BoxFuture;
use serde::de::DeserializeOwned;
use serde_json::Value as JsonValue;

use restbase_core::{RestClient, RestError, RestResponse};

use crate::execute;
use crate::filter::validate_identifier;
use crate::parts::CountOption;
use crate::request::{build_rpc_request, PreparedRequest};

/// Builder for stored-procedure calls created by `client.rpc(name, args)`.
///
/// Validation is deferred: an invalid function name or non-object args
/// come back as an error envelope when executed.
#[derive(Debug, Clone)]
#[must_use = "rpc builders do nothing until executed or awaited"]
pub struct RpcBuilder {
    client: RestClient,
    function: String,
    args: JsonValue,
    count: CountOption,
}

impl RpcBuilder {
    pub fn new(client: RestClient, function: &str, args: JsonValue) -> Self {
        Self {
            client,
            function: function.to_string(),
            args,
            count: CountOption::None,
        }
    }

    /// Request a row count for set-returning functions.
    pub fn count(mut self, count: CountOption) -> Self {
        self.count = count;
        self
    }

    pub fn function(&self) -> &str {
        &self.function
    }

    pub fn args(&self) -> &JsonValue {
        &self.args
    }

    /// Resolve the request without sending it.
    pub fn prepare(&self) -> Result<PreparedRequest, RestError> {
        validate_identifier(&self.function, "Function")?;
        match &self.args {
            JsonValue::Object(map) => {
                for key in map.keys() {
                    validate_identifier(key, "Parameter")?;
                }
            }
            JsonValue::Null => {}
            _ => {
                return Err(RestError::query_builder(
                    "RPC arguments must be a JSON object or null",
                ))
            }
        }
        build_rpc_request(
            self.client.base_url(),
            self.client.schema(),
            &self.function,
            &self.args,
            self.count,
        )
    }

    /// Call the function and return its JSON result.
    pub async fn execute(self) -> RestResponse<JsonValue> {
        self.execute_as::<JsonValue>().await
    }

    /// Call the function and decode its result into `T`.
    pub async fn execute_as<T: DeserializeOwned>(self) -> RestResponse<T> {
        let request = match self.prepare() {
            Ok(r) => r,
            Err(e) => return RestResponse::error(e),
        };
        tracing::debug!(function = %self.function, "Calling RPC function");
        execute::execute_value::<T>(&self.client, request).await
    }
}

impl IntoFuture for RpcBuilder {
    type Output = RestResponse<JsonValue>;
    type IntoFuture = BoxFuture<'static, Self::Output>;

    fn into_future(self) -> Self::IntoFuture {
        Box::pin(self.execute())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use restbase_core::ClientConfig;
    use serde_json::json;

    fn client() -> RestClient {
        RestClient::new(ClientConfig::new("http://localhost:3000/rest/v1")).unwrap()
    }

    #[test]
    fn prepare_posts_to_rpc_path() {
        let rpc = RpcBuilder::new(client(), "schedule_campaign", json!({"campaign_id": 4}));
        let req = rpc.prepare().unwrap();
        assert_eq!(req.url.path(), "/rest/v1/rpc/schedule_campaign");
        assert_eq!(req.body.unwrap(), json!({"campaign_id": 4}));
    }

    #[test]
    fn null_args_are_allowed() {
        let req = RpcBuilder::new(client(), "stats", JsonValue::Null)
            .count(CountOption::Exact)
            .prepare()
            .unwrap();
        assert_eq!(req.body.unwrap(), json!({}));
        assert_eq!(req.headers.get("Prefer").unwrap(), "count=exact");
    }

    #[test]
    fn rejects_non_object_args() {
        let err = RpcBuilder::new(client(), "stats", json!([1, 2]))
            .prepare()
            .unwrap_err();
        assert!(matches!(err, RestError::QueryBuilder(_)));
    }

    #[test]
    fn rejects_bad_names() {
        assert!(RpcBuilder::new(client(), "", JsonValue::Null).prepare().is_err());
        assert!(RpcBuilder::new(client(), "drop;--", JsonValue::Null)
            .prepare()
            .is_err());
        assert!(RpcBuilder::new(client(), "ok", json!({"bad\"key": 1}))
            .prepare()
            .is_err());
    }

    #[tokio::test]
    async fn invalid_args_surface_as_error_envelope() {
        let resp = RpcBuilder::new(client(), "stats", json!("nope")).await;
        assert!(resp.data.is_none());
        assert!(matches!(resp.error, Some(RestError::QueryBuilder(_))));
    }
}
