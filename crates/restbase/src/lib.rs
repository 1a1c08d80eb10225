//! PostgREST data-access client with a chainable query builder.
//!
//! ```ignore
//! use restbase::prelude::*;
//!
//! let client = RestClient::new(
//!     ClientConfig::new("https://project.example.com/rest/v1").api_key("anon-key")?,
//! )?;
//!
//! let resp = client
//!     .from("campaigns")
//!     .select("id, name, status")
//!     .eq("status", "active")
//!     .order("created_at", OrderDirection::Descending)
//!     .limit(20)
//!     .await;
//! ```

// Re-export core (always available)
pub use restbase_core::*;

#[doc(hidden)]
pub use restbase_core::__json;

// Re-export query builder (feature-gated)
#[cfg(feature = "query")]
pub use restbase_query::*;

#[cfg(feature = "realtime")]
pub use restbase_realtime;

/// Prelude module for convenient imports.
///
/// ```ignore
/// use restbase::prelude::*;
/// ```
pub mod prelude {
    pub use restbase_core::row;
    pub use restbase_core::{
        ApiKeyHeaders, ClientConfig, HeaderProvider, NoHeaders, Payload, RestClient, RestError,
        RestResponse, RestResult, Row,
    };

    #[cfg(feature = "query")]
    pub use restbase_query::{
        CountOption, Filterable, IsValue, Modifiable, NullsPosition, OrderDirection,
        RestClientQueryExt, SelectOptions, TextSearchType,
    };

    #[cfg(feature = "realtime")]
    pub use restbase_realtime::{
        ChannelState, PostgresChangesEvent, PostgresChangesFilter, RealtimeCapability,
        RealtimeChannel, RealtimeError, RestClientRealtimeExt, SubscriptionStatus,
    };
}
