//! Server-side registry of mounted feed sessions.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::{Duration, Instant};

use tokio::sync::RwLock;
use uuid::Uuid;

use murmur_core::FeedError;
use murmur_core::feed::{FeedConfig, FeedPaginator};
use murmur_core::ports::PostRepository;

pub type FeedSession = FeedPaginator<dyn PostRepository>;

#[derive(Debug, thiserror::Error)]
pub enum SessionError {
    #[error("Feed session {0} not found")]
    NotFound(Uuid),

    #[error("Feed session belongs to another user")]
    NotOwner,
}

struct SessionEntry {
    owner: Uuid,
    paginator: Arc<FeedSession>,
    last_active: Instant,
}

/// Feed sessions keyed by id. Each belongs to the user who mounted it.
///
/// The registry lock is only held to look a session up; fetches run on
/// the returned handle.
pub struct FeedSessions {
    source: Arc<dyn PostRepository>,
    defaults: FeedConfig,
    ttl: Duration,
    sessions: RwLock<HashMap<Uuid, SessionEntry>>,
}

impl FeedSessions {
    pub fn new(source: Arc<dyn PostRepository>, defaults: FeedConfig, ttl: Duration) -> Self {
        Self {
            source,
            defaults,
            ttl,
            sessions: RwLock::new(HashMap::new()),
        }
    }

    /// Mount a new session for `owner`.
    pub async fn create(
        &self,
        owner: Uuid,
        page_size: Option<usize>,
    ) -> Result<(Uuid, Arc<FeedSession>), FeedError> {
        let config = match page_size {
            Some(size) => FeedConfig::new(size)?,
            None => self.defaults,
        };

        let paginator = Arc::new(FeedPaginator::new(self.source.clone(), config));
        let id = Uuid::new_v4();

        self.sessions.write().await.insert(
            id,
            SessionEntry {
                owner,
                paginator: paginator.clone(),
                last_active: Instant::now(),
            },
        );

        tracing::info!(session_id = %id, owner = %owner, page_size = config.page_size, "Feed session mounted");
        Ok((id, paginator))
    }

    /// Look a session up for its owner and mark it active.
    pub async fn get(&self, id: Uuid, owner: Uuid) -> Result<Arc<FeedSession>, SessionError> {
        let mut sessions = self.sessions.write().await;
        let entry = sessions.get_mut(&id).ok_or(SessionError::NotFound(id))?;

        if entry.owner != owner {
            return Err(SessionError::NotOwner);
        }

        entry.last_active = Instant::now();
        Ok(entry.paginator.clone())
    }

    /// Unmount and forget a session.
    pub async fn remove(&self, id: Uuid, owner: Uuid) -> Result<(), SessionError> {
        let mut sessions = self.sessions.write().await;

        match sessions.get(&id) {
            None => return Err(SessionError::NotFound(id)),
            Some(entry) if entry.owner != owner => return Err(SessionError::NotOwner),
            Some(_) => {}
        }

        if let Some(entry) = sessions.remove(&id) {
            entry.paginator.unmount();
        }

        tracing::info!(session_id = %id, "Feed session unmounted");
        Ok(())
    }

    /// Unmount sessions idle for longer than the TTL. Returns how many went.
    pub async fn sweep_idle(&self) -> usize {
        self.sweep_idle_at(Instant::now()).await
    }

    pub async fn sweep_idle_at(&self, now: Instant) -> usize {
        let mut sessions = self.sessions.write().await;
        let before = sessions.len();

        sessions.retain(|id, entry| {
            let keep = now.saturating_duration_since(entry.last_active) <= self.ttl;
            if !keep {
                entry.paginator.unmount();
                tracing::debug!(session_id = %id, "Sweeping idle feed session");
            }
            keep
        });

        let swept = before - sessions.len();
        if swept > 0 {
            tracing::info!(swept, remaining = sessions.len(), "Idle feed sessions swept");
        }
        swept
    }

    pub async fn len(&self) -> usize {
        self.sessions.read().await.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use murmur_infra::InMemoryPostStore;

    fn registry(ttl: Duration) -> FeedSessions {
        FeedSessions::new(Arc::new(InMemoryPostStore::new()), FeedConfig::default(), ttl)
    }

    #[tokio::test]
    async fn test_create_uses_default_or_requested_page_size() {
        let sessions = registry(Duration::from_secs(60));
        let owner = Uuid::new_v4();

        let (_, default_session) = sessions.create(owner, None).await.unwrap();
        let (_, custom_session) = sessions.create(owner, Some(2)).await.unwrap();

        assert_eq!(default_session.config().page_size, 5);
        assert_eq!(custom_session.config().page_size, 2);
        assert!(matches!(
            sessions.create(owner, Some(0)).await,
            Err(FeedError::InvalidConfig(_))
        ));
        assert_eq!(sessions.len().await, 2);
    }

    #[tokio::test]
    async fn test_sessions_are_private_to_their_owner() {
        let sessions = registry(Duration::from_secs(60));
        let owner = Uuid::new_v4();
        let (id, _) = sessions.create(owner, None).await.unwrap();

        assert!(sessions.get(id, owner).await.is_ok());
        assert!(matches!(
            sessions.get(id, Uuid::new_v4()).await,
            Err(SessionError::NotOwner)
        ));
        assert!(matches!(
            sessions.remove(id, Uuid::new_v4()).await,
            Err(SessionError::NotOwner)
        ));
    }

    #[tokio::test]
    async fn test_remove_unmounts() {
        let sessions = registry(Duration::from_secs(60));
        let owner = Uuid::new_v4();
        let (id, paginator) = sessions.create(owner, None).await.unwrap();

        sessions.remove(id, owner).await.unwrap();

        assert!(!paginator.is_mounted());
        assert!(matches!(
            sessions.get(id, owner).await,
            Err(SessionError::NotFound(_))
        ));
    }

    #[tokio::test]
    async fn test_sweep_removes_only_idle_sessions() {
        let ttl = Duration::from_secs(60);
        let sessions = registry(ttl);
        let owner = Uuid::new_v4();
        let (_, paginator) = sessions.create(owner, None).await.unwrap();

        assert_eq!(sessions.sweep_idle().await, 0);
        assert_eq!(sessions.len().await, 1);

        let later = Instant::now() + ttl + Duration::from_secs(1);
        assert_eq!(sessions.sweep_idle_at(later).await, 1);
        assert_eq!(sessions.len().await, 0);
        assert!(!paginator.is_mounted());
    }
}
