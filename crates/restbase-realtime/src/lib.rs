//! Realtime channel surface for restbase.
//!
//! The API mirrors a live realtime client so callers can keep their
//! subscription code, but there is no transport behind it. Subscribing
//! reports `SUBSCRIBED` once and no change, broadcast or presence event
//! is ever delivered.
//!
//! # Usage
//!
//! ```ignore
//! use restbase::prelude::*;
//!
//! let channel = client
//!     .channel("campaign-updates")
//!     .on_postgres_changes(
//!         PostgresChangesEvent::Update,
//!         PostgresChangesFilter::new("public", "campaigns"),
//!         |payload| println!("changed: {:?}", payload.record),
//!     )
//!     .subscribe(|status, _err| println!("Status: {}", status));
//!
//! assert!(!channel.delivers_events());
//! ```

use std::future::Future;

pub mod channel;
pub mod error;
pub mod types;

pub use channel::{BindingKind, ChannelBuilder, RealtimeChannel};
pub use error::RealtimeError;
pub use types::{
    ChannelState, ColumnInfo, PostgresChangePayload, PostgresChangesEvent,
    PostgresChangesFilter, PresenceMeta, PresenceState, RealtimeCapability, SubscriptionStatus,
};

use restbase_core::RestClient;

/// Extension trait adding realtime channel methods to [`RestClient`].
pub trait RestClientRealtimeExt {
    /// Start building a channel. Logs a capability warning on every call.
    fn channel(&self, name: &str) -> ChannelBuilder;

    /// Unsubscribe and forget a channel.
    fn remove_channel<'a>(
        &'a self,
        channel: &'a RealtimeChannel,
    ) -> impl Future<Output = Result<(), RealtimeError>> + Send + 'a;
}

impl RestClientRealtimeExt for RestClient {
    fn channel(&self, name: &str) -> ChannelBuilder {
        tracing::warn!(
            channel = name,
            "Realtime is unavailable: subscriptions succeed but no events will be delivered"
        );
        ChannelBuilder::new(name)
    }

    fn remove_channel<'a>(
        &'a self,
        channel: &'a RealtimeChannel,
    ) -> impl Future<Output = Result<(), RealtimeError>> + Send + 'a {
        channel.unsubscribe()
    }
}
