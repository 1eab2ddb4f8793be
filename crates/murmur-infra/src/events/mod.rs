//! Event bus implementations.

mod memory;

pub use memory::InMemoryEventBus;

#[cfg(feature = "redis")]
mod redis;
#[cfg(feature = "redis")]
pub use self::redis::{RedisConfig, RedisEventBus};
