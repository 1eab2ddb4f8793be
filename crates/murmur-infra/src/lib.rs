//! # Murmur Infrastructure
//!
//! Concrete implementations of the ports defined in `murmur-core`.
//!
//! ## Feature Flags
//!
//! - `full` (default) - All features enabled
//! - `minimal` - No external services, in-memory only
//! - `postgres` - PostgreSQL post, comment and profile stores via SeaORM
//! - `auth` - JWT bearer tokens
//! - `redis` - Redis-backed event bus for real-time notifications

pub mod database;
pub mod events;
pub mod memory;

#[cfg(feature = "auth")]
pub mod auth;

// Re-exports - In-Memory
pub use events::InMemoryEventBus;
pub use memory::{InMemoryCommentStore, InMemoryPostStore, InMemoryUserStore};

#[cfg(feature = "auth")]
pub use auth::{JwtConfig, JwtTokenService};

#[cfg(feature = "postgres")]
pub use database::{
    DatabaseConfig, PostgresCommentRepository, PostgresPostRepository, PostgresUserRepository,
    connect,
};

// Re-exports - Redis
#[cfg(feature = "redis")]
pub use events::{RedisConfig, RedisEventBus};
