use std::collections::HashMap;

use async_trait::async_trait;
use tokio::sync::RwLock;
use uuid::Uuid;

use murmur_core::domain::UserProfile;
use murmur_core::error::RepoError;
use murmur_core::ports::{BaseRepository, UserRepository};

pub struct InMemoryUserStore {
    profiles: RwLock<HashMap<Uuid, UserProfile>>,
}

impl InMemoryUserStore {
    pub fn new() -> Self {
        Self {
            profiles: RwLock::new(HashMap::new()),
        }
    }
}

impl Default for InMemoryUserStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl BaseRepository<UserProfile, Uuid> for InMemoryUserStore {
    async fn find_by_id(&self, id: Uuid) -> Result<Option<UserProfile>, RepoError> {
        Ok(self.profiles.read().await.get(&id).cloned())
    }

    async fn save(&self, entity: UserProfile) -> Result<UserProfile, RepoError> {
        let mut profiles = self.profiles.write().await;

        // Usernames are unique across profiles.
        if profiles
            .values()
            .any(|p| p.uid != entity.uid && p.username == entity.username)
        {
            return Err(RepoError::Constraint(format!(
                "username '{}' is taken",
                entity.username
            )));
        }

        profiles.insert(entity.uid, entity.clone());
        Ok(entity)
    }

    async fn delete(&self, id: Uuid) -> Result<(), RepoError> {
        self.profiles
            .write()
            .await
            .remove(&id)
            .map(|_| ())
            .ok_or(RepoError::NotFound)
    }
}

#[async_trait]
impl UserRepository for InMemoryUserStore {
    async fn find_by_username(&self, username: &str) -> Result<Option<UserProfile>, RepoError> {
        Ok(self
            .profiles
            .read()
            .await
            .values()
            .find(|p| p.username == username)
            .cloned())
    }
}
