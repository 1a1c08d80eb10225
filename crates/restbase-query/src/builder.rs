use std::future::IntoFuture;

use futures_util::future::BoxFuture;
use serde::de::DeserializeOwned;

use restbase_core::{Payload, RestClient, RestResponse, Row};

use crate::execute;
use crate::filter::{Filter, Filterable};
use crate::modifier::Modifiable;
use crate::parts::{normalize_projection, CountOption, Intent, QueryParts, SelectOptions};

/// Fluent query builder created by `client.from("table")`.
///
/// Every setter consumes and returns the builder. Nothing is sent until
/// one of the terminal methods runs or the builder is awaited.
#[derive(Debug, Clone)]
#[must_use = "query builders do nothing until executed or awaited"]
pub struct QueryBuilder {
    client: RestClient,
    parts: QueryParts,
}

impl Filterable for QueryBuilder {
    fn filters_mut(&mut self) -> &mut Vec<Filter> {
        &mut self.parts.filters
    }

    fn reject(&mut self, message: String) {
        self.parts.reject(message);
    }
}

impl Modifiable for QueryBuilder {
    fn parts_mut(&mut self) -> &mut QueryParts {
        &mut self.parts
    }
}

impl QueryBuilder {
    pub fn new(client: RestClient, resource: &str) -> Self {
        Self {
            client,
            parts: QueryParts::new(resource),
        }
    }

    /// Everything accumulated so far.
    pub fn parts(&self) -> &QueryParts {
        &self.parts
    }

    /// Set the projection, e.g. `"id, name, steps(id, body)"`.
    pub fn select(mut self, columns: &str) -> Self {
        self.parts.projection = normalize_projection(columns);
        self
    }

    /// Set the projection together with count/head options.
    pub fn select_with(mut self, columns: &str, options: SelectOptions) -> Self {
        self.parts.projection = normalize_projection(columns);
        self.parts.count = options.count;
        self.parts.head = options.head;
        self
    }

    /// Request a row count in the response.
    pub fn count(mut self, count: CountOption) -> Self {
        self.parts.count = count;
        self
    }

    /// Fetch metadata only. Sent as HEAD for reads.
    ///
    /// Ignored for insert, update and delete: those still return their rows.
    pub fn head(mut self) -> Self {
        self.parts.head = true;
        self
    }

    /// Override the schema for this query.
    pub fn schema(mut self, schema: &str) -> Self {
        self.parts.schema = Some(schema.to_string());
        self
    }

    /// Insert one row or many.
    pub fn insert(mut self, payload: impl Into<Payload>) -> Self {
        self.parts.set_intent(Intent::Insert(payload.into()));
        self
    }

    /// Update every row matching the filters with `values`.
    pub fn update(mut self, values: Row) -> Self {
        self.parts.set_intent(Intent::Update(values));
        self
    }

    /// Delete every row matching the filters.
    pub fn delete(mut self) -> Self {
        self.parts.set_intent(Intent::Delete);
        self
    }

    /// Execute and return dynamic rows.
    pub async fn execute(self) -> RestResponse<Vec<Row>> {
        self.execute_as::<Row>().await
    }

    /// Execute and decode each row into `T`.
    pub async fn execute_as<T: DeserializeOwned>(self) -> RestResponse<Vec<T>> {
        execute::execute_rows::<T>(&self.client, &self.parts).await
    }

    /// Exactly one row expected. Zero rows is a `NoRows` error; extra rows
    /// are ignored.
    pub async fn single(self) -> RestResponse<Row> {
        self.single_as::<Row>().await
    }

    pub async fn single_as<T: DeserializeOwned>(self) -> RestResponse<T> {
        self.execute_as::<T>().await.into_single()
    }

    /// Zero or one row expected. Zero rows is `data: None` with no error.
    pub async fn maybe_single(self) -> RestResponse<Row> {
        self.maybe_single_as::<Row>().await
    }

    pub async fn maybe_single_as<T: DeserializeOwned>(self) -> RestResponse<T> {
        self.execute_as::<T>().await.into_maybe_single()
    }
}

impl IntoFuture for QueryBuilder {
    type Output = RestResponse<Vec<Row>>;
    type IntoFuture = BoxFuture<'static, Self::Output>;

    fn into_future(self) -> Self::IntoFuture {
        Box::pin(self.execute())
    }
}
