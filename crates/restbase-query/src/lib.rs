pub mod param;
pub mod filter;
pub mod parts;
pub mod modifier;
pub mod request;
pub mod normalize;
mod execute;
pub mod builder;
pub mod rpc;

pub use param::{IntoParam, Param};
pub use filter::{DecodedFilter, Filter, FilterOperator, Filterable, IsValue, TextSearchType};
pub use parts::{
    CountOption, Intent, NullsPosition, OrderClause, OrderDirection, QueryParts, SelectOptions,
};
pub use modifier::Modifiable;
pub use request::{build_request, build_rpc_request, PreparedRequest};
pub use builder::QueryBuilder;
pub use rpc::RpcBuilder;

use serde_json::Value as JsonValue;
use restbase_core::RestClient;

/// Extension trait adding query builder methods to RestClient.
pub trait RestClientQueryExt {
    /// Start a query on a table or view.
    fn from(&self, resource: &str) -> QueryBuilder;

    /// Call a stored procedure/function.
    fn rpc(&self, function: &str, args: JsonValue) -> RpcBuilder;
}

impl RestClientQueryExt for RestClient {
    fn from(&self, resource: &str) -> QueryBuilder {
        QueryBuilder::new(self.clone(), resource)
    }

    fn rpc(&self, function: &str, args: JsonValue) -> RpcBuilder {
        RpcBuilder::new(self.clone(), function, args)
    }
}
