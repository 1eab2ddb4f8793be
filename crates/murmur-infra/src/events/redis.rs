//! Redis event bus: post events fan out across server instances.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use futures::StreamExt;
use redis::aio::ConnectionManager;
use redis::{AsyncCommands, Client};
use tokio::sync::RwLock;
use tokio::task::JoinHandle;
use uuid::Uuid;

use murmur_core::domain::PostEvent;
use murmur_core::ports::{EventBus, EventBusError, EventHandler, Subscription};

/// Redis connection configuration.
#[derive(Debug, Clone)]
pub struct RedisConfig {
    /// Redis URL (e.g., redis://localhost:6379)
    pub url: String,
    /// Connection timeout
    pub connect_timeout: Duration,
}

impl Default for RedisConfig {
    fn default() -> Self {
        Self {
            url: "redis://localhost:6379".to_string(),
            connect_timeout: Duration::from_secs(5),
        }
    }
}

impl RedisConfig {
    /// Load configuration from environment variables.
    pub fn from_env() -> Self {
        Self {
            url: std::env::var("REDIS_URL")
                .unwrap_or_else(|_| "redis://localhost:6379".to_string()),
            connect_timeout: Duration::from_secs(
                std::env::var("REDIS_CONNECT_TIMEOUT_SECS")
                    .ok()
                    .and_then(|s| s.parse().ok())
                    .unwrap_or(5),
            ),
        }
    }
}

/// Events are JSON-encoded on the `post:<id>` channel.
pub struct RedisEventBus {
    conn: ConnectionManager,
    client: Client,
    subscriptions: Arc<RwLock<HashMap<Uuid, JoinHandle<()>>>>,
}

impl RedisEventBus {
    pub async fn new(config: RedisConfig) -> Result<Self, EventBusError> {
        let client = Client::open(config.url.as_str())
            .map_err(|e| EventBusError::Connection(e.to_string()))?;

        // Use timeout to prevent hanging if Redis is unreachable
        let conn = tokio::time::timeout(
            config.connect_timeout,
            ConnectionManager::new(client.clone()),
        )
        .await
        .map_err(|_| EventBusError::Connection("Connection timed out".to_string()))?
        .map_err(|e| EventBusError::Connection(e.to_string()))?;

        tracing::info!(url = %config.url, "Connected to Redis event bus");

        Ok(Self {
            conn,
            client,
            subscriptions: Arc::new(RwLock::new(HashMap::new())),
        })
    }
}

#[async_trait]
impl EventBus for RedisEventBus {
    async fn publish(&self, event: &PostEvent) -> Result<(), EventBusError> {
        let payload =
            serde_json::to_string(event).map_err(|e| EventBusError::Publish(e.to_string()))?;

        let mut conn = self.conn.clone();
        conn.publish::<_, _, ()>(event.channel(), payload)
            .await
            .map_err(|e| EventBusError::Publish(e.to_string()))?;
        Ok(())
    }

    async fn subscribe(
        &self,
        post_id: Uuid,
        handler: EventHandler,
    ) -> Result<Subscription, EventBusError> {
        let channel_name = PostEvent::channel_for(post_id);

        // Subscribe before returning so no event published afterwards is missed.
        let mut pubsub = self
            .client
            .get_async_pubsub()
            .await
            .map_err(|e| EventBusError::Subscribe(e.to_string()))?;
        pubsub
            .subscribe(&channel_name)
            .await
            .map_err(|e| EventBusError::Subscribe(e.to_string()))?;

        tracing::debug!(channel = %channel_name, "Subscribed to Redis channel");

        let handle = tokio::spawn(async move {
            let mut stream = pubsub.on_message();
            while let Some(msg) = stream.next().await {
                let payload: String = match msg.get_payload() {
                    Ok(p) => p,
                    Err(e) => {
                        tracing::warn!(error = %e, "Failed to get message payload");
                        continue;
                    }
                };

                match serde_json::from_str::<PostEvent>(&payload) {
                    Ok(event) => handler(event).await,
                    Err(e) => tracing::warn!(error = %e, "Dropping undecodable event"),
                }
            }

            tracing::info!(channel = %channel_name, "PubSub connection closed");
        });

        let subscription = Subscription {
            id: Uuid::new_v4(),
            post_id,
        };
        self.subscriptions
            .write()
            .await
            .insert(subscription.id, handle);

        Ok(subscription)
    }

    async fn unsubscribe(&self, subscription: Subscription) -> Result<(), EventBusError> {
        if let Some(handle) = self.subscriptions.write().await.remove(&subscription.id) {
            handle.abort();
            tracing::debug!(post_id = %subscription.post_id, "Unsubscribed from Redis channel");
        }
        Ok(())
    }
}
