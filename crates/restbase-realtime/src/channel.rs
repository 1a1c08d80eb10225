use std::sync::Arc;

use serde_json::Value;
use tokio::sync::RwLock;

use crate::error::RealtimeError;
use crate::types::{
    ChannelState, PostgresChangePayload, PostgresChangesEvent, PostgresChangesFilter,
    PresenceMeta, PresenceState, RealtimeCapability, SubscriptionStatus,
};

/// Kinds of event bindings a channel was asked for. The callbacks
/// themselves are not kept.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BindingKind {
    PostgresChanges {
        event: PostgresChangesEvent,
        filter: PostgresChangesFilter,
    },
    Broadcast {
        event: String,
    },
    PresenceSync,
    PresenceJoin,
    PresenceLeave,
}

// ── ChannelBuilder ────────────────────────────────────────────────────────────

/// Builder for a realtime channel, created via `client.channel("name")`.
///
/// Registration methods accept the same callbacks a live client would and
/// drop them immediately. Consumed by `subscribe()`.
#[derive(Debug)]
#[must_use = "channel builders do nothing until subscribed"]
pub struct ChannelBuilder {
    name: String,
    topic: String,
    bindings: Vec<BindingKind>,
}

impl ChannelBuilder {
    pub fn new(name: &str) -> Self {
        Self {
            name: name.to_string(),
            topic: format!("realtime:{name}"),
            bindings: Vec::new(),
        }
    }

    fn ignore(mut self, binding: BindingKind) -> Self {
        tracing::debug!(topic = %self.topic, ?binding, "Ignoring realtime binding");
        self.bindings.push(binding);
        self
    }

    /// Register interest in row changes. The callback is never invoked.
    pub fn on_postgres_changes<F>(
        self,
        event: PostgresChangesEvent,
        filter: PostgresChangesFilter,
        _callback: F,
    ) -> Self
    where
        F: Fn(PostgresChangePayload) + Send + Sync + 'static,
    {
        let filter = filter.event(event);
        self.ignore(BindingKind::PostgresChanges { event, filter })
    }

    pub fn on_broadcast<F>(self, event: &str, _callback: F) -> Self
    where
        F: Fn(Value) + Send + Sync + 'static,
    {
        self.ignore(BindingKind::Broadcast {
            event: event.to_string(),
        })
    }

    pub fn on_presence_sync<F>(self, _callback: F) -> Self
    where
        F: Fn(&PresenceState) + Send + Sync + 'static,
    {
        self.ignore(BindingKind::PresenceSync)
    }

    pub fn on_presence_join<F>(self, _callback: F) -> Self
    where
        F: Fn(String, Vec<PresenceMeta>) + Send + Sync + 'static,
    {
        self.ignore(BindingKind::PresenceJoin)
    }

    pub fn on_presence_leave<F>(self, _callback: F) -> Self
    where
        F: Fn(String, Vec<PresenceMeta>) + Send + Sync + 'static,
    {
        self.ignore(BindingKind::PresenceLeave)
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn topic(&self) -> &str {
        &self.topic
    }

    /// Number of bindings registered so far.
    pub fn binding_count(&self) -> usize {
        self.bindings.len()
    }

    pub fn bindings(&self) -> &[BindingKind] {
        &self.bindings
    }

    /// Subscribe to the channel.
    ///
    /// Returns immediately in the `Joining` state. `status_callback` runs
    /// later, never inline: the channel moves to `Joined` and the callback
    /// receives `Subscribed` exactly once. Nothing else is ever reported.
    /// If the channel is unsubscribed first, the callback is not called.
    pub fn subscribe<F>(self, status_callback: F) -> RealtimeChannel
    where
        F: Fn(SubscriptionStatus, Option<RealtimeError>) + Send + Sync + 'static,
    {
        let state = Arc::new(RwLock::new(ChannelState::Joining));
        let channel = RealtimeChannel {
            inner: Arc::new(ChannelInner {
                name: self.name,
                topic: self.topic,
                binding_count: self.bindings.len(),
                state: state.clone(),
            }),
        };

        match tokio::runtime::Handle::try_current() {
            Ok(handle) => {
                handle.spawn(async move {
                    tokio::task::yield_now().await;
                    if join(&mut *state.write().await) {
                        status_callback(SubscriptionStatus::Subscribed, None);
                    }
                });
            }
            Err(_) => {
                tracing::warn!(
                    topic = %channel.topic(),
                    "No tokio runtime; reporting subscription status from a helper thread"
                );
                std::thread::spawn(move || {
                    if join(&mut state.blocking_write()) {
                        status_callback(SubscriptionStatus::Subscribed, None);
                    }
                });
            }
        }

        channel
    }
}

/// `Joining` → `Joined`. Returns whether the transition happened.
fn join(state: &mut ChannelState) -> bool {
    if *state == ChannelState::Joining {
        *state = ChannelState::Joined;
        true
    } else {
        false
    }
}

// ── RealtimeChannel ───────────────────────────────────────────────────────────

/// A handle to a subscribed channel.
///
/// This is cheaply cloneable and `Send + Sync`.
#[derive(Debug, Clone)]
pub struct RealtimeChannel {
    inner: Arc<ChannelInner>,
}

#[derive(Debug)]
struct ChannelInner {
    name: String,
    topic: String,
    binding_count: usize,
    state: Arc<RwLock<ChannelState>>,
}

impl RealtimeChannel {
    /// Get the channel topic (e.g., "realtime:campaign-updates").
    pub fn topic(&self) -> &str {
        &self.inner.topic
    }

    /// Get the channel name (user-provided name without prefix).
    pub fn name(&self) -> &str {
        &self.inner.name
    }

    pub async fn state(&self) -> ChannelState {
        *self.inner.state.read().await
    }

    pub fn binding_count(&self) -> usize {
        self.inner.binding_count
    }

    pub fn capability(&self) -> RealtimeCapability {
        RealtimeCapability::Unavailable
    }

    /// Always `false`: registered bindings never fire.
    pub fn delivers_events(&self) -> bool {
        false
    }

    pub async fn send_broadcast(&self, event: &str, _payload: Value) -> Result<(), RealtimeError> {
        Err(RealtimeError::Unsupported(format!(
            "broadcast {event:?} on {}: no realtime transport",
            self.inner.topic
        )))
    }

    /// Close the channel. Calling it again is a no-op.
    pub async fn unsubscribe(&self) -> Result<(), RealtimeError> {
        let mut state = self.inner.state.write().await;
        if *state != ChannelState::Closed {
            tracing::debug!(topic = %self.inner.topic, "Closing realtime channel");
            *state = ChannelState::Closed;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::time::Duration;

    fn recorder() -> (
        impl Fn(SubscriptionStatus, Option<RealtimeError>) + Send + Sync + 'static,
        tokio::sync::mpsc::UnboundedReceiver<SubscriptionStatus>,
    ) {
        let (tx, rx) = tokio::sync::mpsc::unbounded_channel();
        let callback = move |status: SubscriptionStatus, _err: Option<RealtimeError>| {
            let _ = tx.send(status);
        };
        (callback, rx)
    }

    #[test]
    fn topic_is_prefixed() {
        let builder = ChannelBuilder::new("campaign-updates");
        assert_eq!(builder.name(), "campaign-updates");
        assert_eq!(builder.topic(), "realtime:campaign-updates");
    }

    #[test]
    fn registration_drops_callbacks() {
        let hits = Arc::new(AtomicUsize::new(0));
        let h1 = hits.clone();
        let h2 = hits.clone();
        let builder = ChannelBuilder::new("changes")
            .on_postgres_changes(
                PostgresChangesEvent::Insert,
                PostgresChangesFilter::new("public", "messages"),
                move |_| {
                    h1.fetch_add(1, Ordering::SeqCst);
                },
            )
            .on_broadcast("typing", move |_| {
                h2.fetch_add(1, Ordering::SeqCst);
            })
            .on_presence_sync(|_| {});
        assert_eq!(builder.binding_count(), 3);
        assert_eq!(Arc::strong_count(&hits), 1);
        match &builder.bindings()[0] {
            BindingKind::PostgresChanges { filter, .. } => assert_eq!(filter.event, "INSERT"),
            other => panic!("unexpected binding: {other:?}"),
        }
    }

    #[tokio::test]
    async fn status_callback_is_deferred_and_fires_once() {
        let (callback, mut rx) = recorder();
        let channel = ChannelBuilder::new("c").subscribe(callback);

        assert!(rx.try_recv().is_err());
        assert_eq!(channel.state().await, ChannelState::Joining);

        let status = tokio::time::timeout(Duration::from_secs(1), rx.recv())
            .await
            .unwrap();
        assert_eq!(status, Some(SubscriptionStatus::Subscribed));
        assert_eq!(channel.state().await, ChannelState::Joined);

        // The task drops the callback after reporting, closing the channel.
        let next = tokio::time::timeout(Duration::from_secs(1), rx.recv())
            .await
            .unwrap();
        assert_eq!(next, None);
    }

    #[tokio::test]
    async fn no_events_are_delivered() {
        let hits = Arc::new(AtomicUsize::new(0));
        let h = hits.clone();
        let channel = ChannelBuilder::new("c")
            .on_broadcast("ping", move |_| {
                h.fetch_add(1, Ordering::SeqCst);
            })
            .subscribe(|_, _| {});
        tokio::time::sleep(Duration::from_millis(20)).await;

        assert_eq!(hits.load(Ordering::SeqCst), 0);
        assert!(!channel.delivers_events());
        assert_eq!(channel.capability(), RealtimeCapability::Unavailable);
        assert_eq!(channel.binding_count(), 1);
    }

    #[tokio::test]
    async fn unsubscribe_is_idempotent() {
        let channel = ChannelBuilder::new("c").subscribe(|_, _| {});
        channel.unsubscribe().await.unwrap();
        channel.unsubscribe().await.unwrap();
        assert_eq!(channel.state().await, ChannelState::Closed);
    }

    #[tokio::test]
    async fn joined_channel_closes_without_leaving() {
        let (callback, mut rx) = recorder();
        let channel = ChannelBuilder::new("c").subscribe(callback);
        tokio::time::timeout(Duration::from_secs(1), rx.recv())
            .await
            .unwrap();
        assert_eq!(channel.state().await, ChannelState::Joined);
        channel.unsubscribe().await.unwrap();
        let state = channel.state().await;
        assert_eq!(state, ChannelState::Closed);
        assert_ne!(state, ChannelState::Leaving);
    }

    #[tokio::test]
    async fn unsubscribe_before_join_suppresses_status() {
        let (callback, mut rx) = recorder();
        let channel = ChannelBuilder::new("c").subscribe(callback);
        channel.unsubscribe().await.unwrap();

        let next = tokio::time::timeout(Duration::from_secs(1), rx.recv())
            .await
            .unwrap();
        assert_eq!(next, None);
        assert_eq!(channel.state().await, ChannelState::Closed);
    }

    #[tokio::test]
    async fn broadcast_is_unsupported() {
        let channel = ChannelBuilder::new("c").subscribe(|_, _| {});
        let err = channel
            .send_broadcast("ping", serde_json::json!({}))
            .await
            .unwrap_err();
        assert!(matches!(err, RealtimeError::Unsupported(_)));
    }

    #[test]
    fn subscribe_without_runtime_uses_helper_thread() {
        let (tx, rx) = std::sync::mpsc::channel();
        let _channel = ChannelBuilder::new("c").subscribe(move |status, _| {
            let _ = tx.send(status);
        });
        let status = rx.recv_timeout(Duration::from_secs(1)).unwrap();
        assert_eq!(status, SubscriptionStatus::Subscribed);
    }
}
