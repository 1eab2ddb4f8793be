//! Profile sign-in and lookup.

use std::sync::Arc;

use serde::Serialize;
use uuid::Uuid;

use crate::domain::{Post, ProviderIdentity, UserProfile};
use crate::error::DomainError;
use crate::ports::{PostRepository, UserRepository};

/// A profile page: the user and their posts, newest first.
#[derive(Debug, Clone, Serialize)]
pub struct ProfileView {
    pub profile: UserProfile,
    pub posts: Vec<Post>,
}

pub struct ProfileService {
    users: Arc<dyn UserRepository>,
    posts: Arc<dyn PostRepository>,
}

impl ProfileService {
    pub fn new(users: Arc<dyn UserRepository>, posts: Arc<dyn PostRepository>) -> Self {
        Self { users, posts }
    }

    /// Create the profile on first sign-in, refresh it afterwards.
    pub async fn sign_in(&self, identity: &ProviderIdentity) -> Result<UserProfile, DomainError> {
        let profile = match self.users.find_by_id(identity.uid).await? {
            Some(mut existing) => {
                existing.merge_identity(identity);
                existing
            }
            None => {
                tracing::info!(uid = %identity.uid, "Creating profile on first sign-in");
                UserProfile::from_identity(identity)
            }
        };

        Ok(self.users.save(profile).await?)
    }

    pub async fn get_profile(&self, uid: Uuid) -> Result<ProfileView, DomainError> {
        let profile = self
            .users
            .find_by_id(uid)
            .await?
            .ok_or(DomainError::NotFound {
                entity_type: "UserProfile",
                id: uid,
            })?;

        self.view(profile).await
    }

    pub async fn get_profile_by_username(
        &self,
        username: &str,
    ) -> Result<Option<ProfileView>, DomainError> {
        match self.users.find_by_username(username).await? {
            Some(profile) => Ok(Some(self.view(profile).await?)),
            None => Ok(None),
        }
    }

    async fn view(&self, profile: UserProfile) -> Result<ProfileView, DomainError> {
        let posts = self.posts.find_by_author(profile.uid).await?;
        Ok(ProfileView { profile, posts })
    }
}
