//! Application configuration loaded from environment variables.

use std::env;
use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

use murmur_core::feed::{DEFAULT_PAGE_SIZE, FeedConfig};
use murmur_infra::JwtConfig;

#[cfg(feature = "postgres")]
use murmur_infra::DatabaseConfig;
#[cfg(feature = "redis")]
use murmur_infra::RedisConfig;

/// Feed session settings.
#[derive(Debug, Clone)]
pub struct FeedSettings {
    pub page_size: usize,
    /// Sessions untouched for longer than this are swept.
    pub session_ttl: Duration,
    /// Six-field cron expression for the idle-session sweep.
    pub sweep_cron: String,
}

impl Default for FeedSettings {
    fn default() -> Self {
        Self {
            page_size: DEFAULT_PAGE_SIZE,
            session_ttl: Duration::from_secs(1800),
            sweep_cron: "0 */5 * * * *".to_string(),
        }
    }
}

impl FeedSettings {
    pub fn feed_config(&self) -> FeedConfig {
        FeedConfig::new(self.page_size).unwrap_or_default()
    }
}

/// Application configuration.
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub host: String,
    pub port: u16,
    pub feed: FeedSettings,
    /// Origin share links point at.
    pub public_base_url: String,
    /// JSON array of post documents loaded into the in-memory store.
    pub seed_file: Option<PathBuf>,
    /// Expose `POST /api/auth/dev-token`.
    pub dev_tokens: bool,
    pub jwt: JwtConfig,
    #[cfg(feature = "postgres")]
    pub database: Option<DatabaseConfig>,
    #[cfg(feature = "redis")]
    pub redis: Option<RedisConfig>,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 8080,
            feed: FeedSettings::default(),
            public_base_url: "http://localhost:5173".to_string(),
            seed_file: None,
            dev_tokens: false,
            jwt: JwtConfig::default(),
            #[cfg(feature = "postgres")]
            database: None,
            #[cfg(feature = "redis")]
            redis: None,
        }
    }
}

impl AppConfig {
    /// Load configuration from environment variables.
    pub fn from_env() -> Self {
        let defaults = Self::default();

        let mut page_size = parse_or("FEED_PAGE_SIZE", defaults.feed.page_size);
        if page_size == 0 {
            tracing::warn!(
                default = DEFAULT_PAGE_SIZE,
                "FEED_PAGE_SIZE must be positive, using default"
            );
            page_size = DEFAULT_PAGE_SIZE;
        }

        let feed = FeedSettings {
            page_size,
            session_ttl: Duration::from_secs(parse_or(
                "FEED_SESSION_TTL_SECS",
                defaults.feed.session_ttl.as_secs(),
            )),
            sweep_cron: env::var("FEED_SWEEP_CRON").unwrap_or(defaults.feed.sweep_cron),
        };

        Self {
            host: env::var("HOST").unwrap_or(defaults.host),
            port: parse_or("PORT", defaults.port),
            feed,
            public_base_url: env::var("PUBLIC_BASE_URL").unwrap_or(defaults.public_base_url),
            seed_file: env::var("FEED_SEED_FILE").ok().map(PathBuf::from),
            dev_tokens: env::var("AUTH_DEV_TOKENS")
                .map(|v| v == "true" || v == "1")
                .unwrap_or(false),
            jwt: JwtConfig::from_env(),
            #[cfg(feature = "postgres")]
            database: DatabaseConfig::from_env(),
            #[cfg(feature = "redis")]
            redis: env::var("REDIS_URL").ok().map(|_| RedisConfig::from_env()),
        }
    }
}

fn parse_or<T: FromStr>(key: &str, default: T) -> T {
    env::var(key)
        .ok()
        .and_then(|s| s.parse().ok())
        .unwrap_or(default)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = AppConfig::default();

        assert_eq!(config.port, 8080);
        assert_eq!(config.feed.feed_config().page_size, 5);
        assert_eq!(config.feed.session_ttl, Duration::from_secs(1800));
        assert!(!config.dev_tokens);
    }

    #[test]
    fn test_zero_page_size_falls_back_to_default() {
        let settings = FeedSettings {
            page_size: 0,
            ..FeedSettings::default()
        };
        assert_eq!(settings.feed_config(), FeedConfig::default());
    }
}
