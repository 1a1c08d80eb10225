use std::collections::HashMap;
use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::Value;

// ── Channel State ─────────────────────────────────────────────────────────────

/// The lifecycle state of a channel.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChannelState {
    Closed,
    Joining,
    Joined,
    /// Never entered here; a live transport passes through it on unsubscribe.
    Leaving,
    /// Never entered here; a live transport lands here when a join fails.
    Errored,
}

impl fmt::Display for ChannelState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Closed => write!(f, "closed"),
            Self::Joining => write!(f, "joining"),
            Self::Joined => write!(f, "joined"),
            Self::Leaving => write!(f, "leaving"),
            Self::Errored => write!(f, "errored"),
        }
    }
}

// ── Subscription Status ───────────────────────────────────────────────────────

/// Status reported to the subscribe callback.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SubscriptionStatus {
    Subscribed,
    TimedOut,
    Closed,
    ChannelError,
}

impl fmt::Display for SubscriptionStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Subscribed => write!(f, "SUBSCRIBED"),
            Self::TimedOut => write!(f, "TIMED_OUT"),
            Self::Closed => write!(f, "CLOSED"),
            Self::ChannelError => write!(f, "CHANNEL_ERROR"),
        }
    }
}

// ── Capability ────────────────────────────────────────────────────────────────

/// Whether a channel can actually deliver events.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RealtimeCapability {
    /// Subscriptions succeed but no change, broadcast or presence events
    /// ever arrive.
    Unavailable,
}

impl fmt::Display for RealtimeCapability {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Unavailable => write!(f, "unavailable"),
        }
    }
}

// ── Postgres Changes ──────────────────────────────────────────────────────────

/// Which row change events a binding asks for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PostgresChangesEvent {
    #[serde(rename = "*")]
    All,
    #[serde(rename = "INSERT")]
    Insert,
    #[serde(rename = "UPDATE")]
    Update,
    #[serde(rename = "DELETE")]
    Delete,
}

impl fmt::Display for PostgresChangesEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::All => write!(f, "*"),
            Self::Insert => write!(f, "INSERT"),
            Self::Update => write!(f, "UPDATE"),
            Self::Delete => write!(f, "DELETE"),
        }
    }
}

/// Filter for postgres_changes bindings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PostgresChangesFilter {
    pub event: String,
    pub schema: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub table: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub filter: Option<String>,
}

impl PostgresChangesFilter {
    pub fn new(schema: impl Into<String>, table: impl Into<String>) -> Self {
        Self {
            event: "*".to_string(),
            schema: schema.into(),
            table: Some(table.into()),
            filter: None,
        }
    }

    /// Every table in `schema`.
    pub fn schema_only(schema: impl Into<String>) -> Self {
        Self {
            event: "*".to_string(),
            schema: schema.into(),
            table: None,
            filter: None,
        }
    }

    pub fn event(mut self, event: PostgresChangesEvent) -> Self {
        self.event = event.to_string();
        self
    }

    /// Row-level filter in `column=op.value` form, e.g. `"campaign_id=eq.3"`.
    pub fn with_filter(mut self, filter: impl Into<String>) -> Self {
        self.filter = Some(filter.into());
        self
    }
}

/// Shape of a postgres_changes event. Declared so callback signatures
/// match a live client; never constructed here.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PostgresChangePayload {
    pub schema: String,
    pub table: String,
    #[serde(rename = "type")]
    pub change_type: String,
    #[serde(default)]
    pub commit_timestamp: Option<String>,
    #[serde(default)]
    pub columns: Vec<ColumnInfo>,
    #[serde(default)]
    pub record: Option<Value>,
    #[serde(default)]
    pub old_record: Option<Value>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ColumnInfo {
    pub name: String,
    #[serde(rename = "type")]
    pub column_type: String,
}

// ── Presence ──────────────────────────────────────────────────────────────────

/// Full presence state: key → list of presence metas.
pub type PresenceState = HashMap<String, Vec<PresenceMeta>>;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PresenceMeta {
    #[serde(default)]
    pub phx_ref: Option<String>,
    #[serde(flatten)]
    pub data: Value,
}
