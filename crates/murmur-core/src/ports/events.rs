//! Event bus port - real-time post notifications.

use async_trait::async_trait;
use std::future::Future;
use std::pin::Pin;
use uuid::Uuid;

use crate::domain::PostEvent;

/// Handler for incoming events.
pub type EventHandler =
    Box<dyn Fn(PostEvent) -> Pin<Box<dyn Future<Output = ()> + Send>> + Send + Sync>;

/// Handle returned by [`EventBus::subscribe`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Subscription {
    pub id: Uuid,
    pub post_id: Uuid,
}

/// Event bus trait - abstraction over pub/sub backends.
///
/// Each post has its own channel (see [`PostEvent::channel_for`]).
#[async_trait]
pub trait EventBus: Send + Sync {
    /// Publish an event on its post's channel.
    async fn publish(&self, event: &PostEvent) -> Result<(), EventBusError>;

    /// Deliver every later event for `post_id` to `handler`.
    async fn subscribe(
        &self,
        post_id: Uuid,
        handler: EventHandler,
    ) -> Result<Subscription, EventBusError>;

    /// Stop delivering to a subscription. Unknown subscriptions are ignored.
    async fn unsubscribe(&self, subscription: Subscription) -> Result<(), EventBusError>;
}

/// Event bus errors.
#[derive(Debug, thiserror::Error)]
pub enum EventBusError {
    #[error("Failed to publish: {0}")]
    Publish(String),

    #[error("Failed to subscribe: {0}")]
    Subscribe(String),

    #[error("Connection error: {0}")]
    Connection(String),
}
