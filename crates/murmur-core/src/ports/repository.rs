use async_trait::async_trait;
use uuid::Uuid;

use crate::domain::{Comment, Post, UserProfile};
use crate::error::RepoError;
use crate::feed::FeedCursor;

/// Generic repository trait defining standard CRUD operations.
#[async_trait]
pub trait BaseRepository<T, ID>: Send + Sync {
    /// Find an entity by its unique ID.
    async fn find_by_id(&self, id: ID) -> Result<Option<T>, RepoError>;

    /// Save an entity (create or replace).
    async fn save(&self, entity: T) -> Result<T, RepoError>;

    /// Delete an entity by its ID.
    async fn delete(&self, id: ID) -> Result<(), RepoError>;
}

/// Ordered, cursor-addressable view of the post collection.
///
/// Posts come newest first (`created_at` descending, then `id`
/// descending). `after` is exclusive. An exhausted collection yields an
/// empty page, never an error.
#[async_trait]
pub trait FeedSource: Send + Sync {
    async fn fetch_page(
        &self,
        after: Option<&FeedCursor>,
        limit: usize,
    ) -> Result<Vec<Post>, RepoError>;
}

/// Post repository.
#[async_trait]
pub trait PostRepository: BaseRepository<Post, Uuid> + FeedSource {
    /// A user's posts, newest first.
    async fn find_by_author(&self, author_id: Uuid) -> Result<Vec<Post>, RepoError>;

    /// Atomically flip `user_id` in `liked_by` and adjust `likes_count`.
    /// Returns the new liked state.
    async fn toggle_like(&self, post_id: Uuid, user_id: Uuid) -> Result<bool, RepoError>;

    /// Atomically flip `user_id` in `bookmarked_by`.
    /// Returns the new bookmarked state.
    async fn toggle_bookmark(&self, post_id: Uuid, user_id: Uuid) -> Result<bool, RepoError>;

    /// Atomically add `delta` to `comments_count`, clamped at zero.
    async fn increment_comments(&self, post_id: Uuid, delta: i64) -> Result<(), RepoError>;
}

/// Comment repository.
#[async_trait]
pub trait CommentRepository: Send + Sync {
    async fn add(&self, comment: Comment) -> Result<Comment, RepoError>;

    /// Comments on a post, oldest first.
    async fn list_for_post(&self, post_id: Uuid) -> Result<Vec<Comment>, RepoError>;
}

/// User profile repository.
#[async_trait]
pub trait UserRepository: BaseRepository<UserProfile, Uuid> {
    async fn find_by_username(&self, username: &str) -> Result<Option<UserProfile>, RepoError>;
}
