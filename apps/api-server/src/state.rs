//! Application state - shared across all handlers.

use std::path::Path;
use std::sync::Arc;

use murmur_core::ports::{
    CommentRepository, EventBus, PostRepository, TokenService, UserRepository,
};
use murmur_core::services::{PostActions, ProfileService};
use murmur_infra::{
    InMemoryCommentStore, InMemoryEventBus, InMemoryPostStore, InMemoryUserStore, JwtTokenService,
};

use crate::config::AppConfig;
use crate::sessions::FeedSessions;

const EVENT_BUFFER: usize = 64;

/// Shared application state.
#[derive(Clone)]
pub struct AppState {
    pub actions: Arc<PostActions>,
    pub profiles: Arc<ProfileService>,
    pub events: Arc<dyn EventBus>,
    pub sessions: Arc<FeedSessions>,
    pub tokens: Arc<dyn TokenService>,
    pub dev_tokens: bool,
}

/// The three collections the services read and write.
pub struct Stores {
    pub posts: Arc<dyn PostRepository>,
    pub comments: Arc<dyn CommentRepository>,
    pub users: Arc<dyn UserRepository>,
}

impl Stores {
    pub fn in_memory(posts: Arc<InMemoryPostStore>) -> Self {
        Self {
            posts,
            comments: Arc::new(InMemoryCommentStore::new()),
            users: Arc::new(InMemoryUserStore::new()),
        }
    }
}

impl AppState {
    /// Build the application state with appropriate implementations.
    pub async fn new(config: &AppConfig) -> Self {
        let stores = match postgres_stores(config).await {
            Some(stores) => stores,
            None => {
                let posts = Arc::new(InMemoryPostStore::new());
                if let Some(path) = &config.seed_file {
                    seed_posts(&posts, path).await;
                }
                Stores::in_memory(posts)
            }
        };

        let events = match redis_event_bus(config).await {
            Some(bus) => bus,
            None => Arc::new(InMemoryEventBus::new(EVENT_BUFFER)) as Arc<dyn EventBus>,
        };

        let tokens: Arc<dyn TokenService> = Arc::new(JwtTokenService::new(config.jwt.clone()));

        let state = Self::from_parts(stores, events, tokens, config);
        tracing::info!("Application state initialized");
        state
    }

    pub fn from_parts(
        stores: Stores,
        events: Arc<dyn EventBus>,
        tokens: Arc<dyn TokenService>,
        config: &AppConfig,
    ) -> Self {
        let actions = PostActions::new(
            stores.posts.clone(),
            stores.comments,
            events.clone(),
            config.public_base_url.as_str(),
        );
        let profiles = ProfileService::new(stores.users, stores.posts.clone());
        let sessions = FeedSessions::new(
            stores.posts,
            config.feed.feed_config(),
            config.feed.session_ttl,
        );

        Self {
            actions: Arc::new(actions),
            profiles: Arc::new(profiles),
            events,
            sessions: Arc::new(sessions),
            tokens,
            dev_tokens: config.dev_tokens,
        }
    }
}

/// Load a JSON array of post documents. Failures leave the store empty.
async fn seed_posts(store: &InMemoryPostStore, path: &Path) {
    let raw = match tokio::fs::read_to_string(path).await {
        Ok(raw) => raw,
        Err(e) => {
            tracing::error!(path = %path.display(), error = %e, "Failed to read seed file");
            return;
        }
    };

    match serde_json::from_str::<Vec<serde_json::Value>>(&raw) {
        Ok(documents) => {
            let total = documents.len();
            let loaded = store.load_documents(documents).await;
            tracing::info!(path = %path.display(), loaded, skipped = total - loaded, "Seeded posts");
        }
        Err(e) => {
            tracing::error!(path = %path.display(), error = %e, "Seed file is not a JSON array");
        }
    }
}

#[cfg(feature = "postgres")]
async fn postgres_stores(config: &AppConfig) -> Option<Stores> {
    use migration::{Migrator, MigratorTrait};
    use murmur_infra::{
        PostgresCommentRepository, PostgresPostRepository, PostgresUserRepository, connect,
    };

    let Some(db_config) = &config.database else {
        tracing::warn!("DATABASE_URL not set. Running without database (in-memory mode).");
        return None;
    };

    let db = match connect(db_config).await {
        Ok(db) => db,
        Err(e) => {
            tracing::error!(error = %e, "Failed to connect to database. Using in-memory fallback.");
            return None;
        }
    };

    if let Err(e) = Migrator::up(&db, None).await {
        tracing::error!(error = %e, "Migrations failed. Using in-memory fallback.");
        return None;
    }

    Some(Stores {
        posts: Arc::new(PostgresPostRepository::new(db.clone())),
        comments: Arc::new(PostgresCommentRepository::new(db.clone())),
        users: Arc::new(PostgresUserRepository::new(db)),
    })
}

#[cfg(not(feature = "postgres"))]
async fn postgres_stores(_config: &AppConfig) -> Option<Stores> {
    tracing::info!("Running without postgres feature - using in-memory stores");
    None
}

#[cfg(feature = "redis")]
async fn redis_event_bus(config: &AppConfig) -> Option<Arc<dyn EventBus>> {
    use murmur_infra::RedisEventBus;

    let redis_config = config.redis.clone()?;
    match RedisEventBus::new(redis_config).await {
        Ok(bus) => Some(Arc::new(bus)),
        Err(e) => {
            tracing::error!(error = %e, "Failed to connect to Redis. Using in-process event bus.");
            None
        }
    }
}

#[cfg(not(feature = "redis"))]
async fn redis_event_bus(_config: &AppConfig) -> Option<Arc<dyn EventBus>> {
    None
}
