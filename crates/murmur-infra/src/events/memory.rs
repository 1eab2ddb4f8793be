//! In-memory event bus.
//!
//! This is the fallback when Redis is not available.
//! Works within a single process only.

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::{RwLock, broadcast};
use tokio::task::JoinHandle;
use uuid::Uuid;

use murmur_core::domain::PostEvent;
use murmur_core::ports::{EventBus, EventBusError, EventHandler, Subscription};

/// Broadcast channel per post, one forwarding task per subscription.
pub struct InMemoryEventBus {
    channels: Arc<RwLock<HashMap<String, broadcast::Sender<PostEvent>>>>,
    subscriptions: RwLock<HashMap<Uuid, JoinHandle<()>>>,
    buffer_size: usize,
}

impl InMemoryEventBus {
    pub fn new(buffer_size: usize) -> Self {
        Self {
            channels: Arc::new(RwLock::new(HashMap::new())),
            subscriptions: RwLock::new(HashMap::new()),
            buffer_size,
        }
    }
}

impl Default for InMemoryEventBus {
    fn default() -> Self {
        Self::new(100)
    }
}

#[async_trait]
impl EventBus for InMemoryEventBus {
    async fn publish(&self, event: &PostEvent) -> Result<(), EventBusError> {
        let channel = event.channel();
        let delivered = {
            let channels = self.channels.read().await;
            match channels.get(&channel) {
                Some(sender) => sender.send(event.clone()).is_ok(),
                None => {
                    tracing::debug!(channel = %channel, "No subscribers for channel");
                    return Ok(());
                }
            }
        };

        if delivered {
            tracing::debug!(channel = %channel, "Event published");
        } else {
            // Every receiver is gone; drop the channel.
            let mut channels = self.channels.write().await;
            if channels
                .get(&channel)
                .is_some_and(|sender| sender.receiver_count() == 0)
            {
                channels.remove(&channel);
                tracing::debug!(channel = %channel, "Removed idle channel");
            }
        }

        Ok(())
    }

    async fn subscribe(
        &self,
        post_id: Uuid,
        handler: EventHandler,
    ) -> Result<Subscription, EventBusError> {
        let channel_name = PostEvent::channel_for(post_id);
        let mut receiver = {
            let mut channels = self.channels.write().await;
            channels
                .entry(channel_name.clone())
                .or_insert_with(|| broadcast::channel(self.buffer_size).0)
                .subscribe()
        };

        let subscription = Subscription {
            id: Uuid::new_v4(),
            post_id,
        };

        let handle = tokio::spawn(async move {
            tracing::info!(channel = %channel_name, "Subscribed to channel");

            loop {
                match receiver.recv().await {
                    Ok(event) => handler(event).await,
                    Err(broadcast::error::RecvError::Lagged(count)) => {
                        tracing::warn!(
                            channel = %channel_name,
                            lagged = count,
                            "Subscriber lagged behind"
                        );
                    }
                    Err(broadcast::error::RecvError::Closed) => {
                        tracing::info!(channel = %channel_name, "Channel closed");
                        break;
                    }
                }
            }
        });

        self.subscriptions
            .write()
            .await
            .insert(subscription.id, handle);

        Ok(subscription)
    }

    async fn unsubscribe(&self, subscription: Subscription) -> Result<(), EventBusError> {
        if let Some(handle) = self.subscriptions.write().await.remove(&subscription.id) {
            handle.abort();
            tracing::info!(post_id = %subscription.post_id, "Unsubscribed from channel");
        }
        Ok(())
    }
}
