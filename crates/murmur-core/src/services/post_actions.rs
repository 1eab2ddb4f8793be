//! Post actions: create, like, bookmark, comment, delete, share.
//!
//! Each action is a single write against the post store, logged on entry
//! and on failure. Real-time notifications are best effort: a publish
//! failure is logged and does not undo the write.

use std::sync::Arc;

use uuid::Uuid;

use crate::domain::{Comment, CommentAuthor, Post, PostEvent, validate_content};
use crate::error::{DomainError, RepoError};
use crate::ports::{CommentRepository, EventBus, PostRepository};

pub struct PostActions {
    posts: Arc<dyn PostRepository>,
    comments: Arc<dyn CommentRepository>,
    events: Arc<dyn EventBus>,
    public_base_url: String,
}

impl PostActions {
    pub fn new(
        posts: Arc<dyn PostRepository>,
        comments: Arc<dyn CommentRepository>,
        events: Arc<dyn EventBus>,
        public_base_url: impl Into<String>,
    ) -> Self {
        Self {
            posts,
            comments,
            events,
            public_base_url: public_base_url.into().trim_end_matches('/').to_string(),
        }
    }

    pub async fn create_post(&self, author_id: Uuid, content: &str) -> Result<Post, DomainError> {
        let content = validate_content(content)?;
        let post = self.posts.save(Post::new(author_id, content)).await?;
        tracing::info!(post_id = %post.id, author_id = %author_id, "Post created");
        Ok(post)
    }

    pub async fn get_post(&self, post_id: Uuid) -> Result<Post, DomainError> {
        self.posts
            .find_by_id(post_id)
            .await?
            .ok_or_else(|| not_found(post_id))
    }

    pub async fn posts_by_author(&self, author_id: Uuid) -> Result<Vec<Post>, DomainError> {
        Ok(self.posts.find_by_author(author_id).await?)
    }

    /// Returns the new liked state.
    pub async fn toggle_like(&self, post_id: Uuid, user_id: Uuid) -> Result<bool, DomainError> {
        tracing::info!(post_id = %post_id, "Toggling like");

        let liked = self
            .posts
            .toggle_like(post_id, user_id)
            .await
            .map_err(|e| log_failure("toggle like", post_id, e))?;

        self.notify(PostEvent::LikeToggled {
            post_id,
            user_id,
            liked,
        })
        .await;

        tracing::info!(post_id = %post_id, liked, "Like toggled");
        Ok(liked)
    }

    /// Returns the new bookmarked state.
    pub async fn toggle_bookmark(&self, post_id: Uuid, user_id: Uuid) -> Result<bool, DomainError> {
        tracing::info!(post_id = %post_id, "Toggling bookmark");

        let bookmarked = self
            .posts
            .toggle_bookmark(post_id, user_id)
            .await
            .map_err(|e| log_failure("toggle bookmark", post_id, e))?;

        tracing::info!(post_id = %post_id, bookmarked, "Bookmark toggled");
        Ok(bookmarked)
    }

    pub async fn add_comment(
        &self,
        post_id: Uuid,
        author: &CommentAuthor,
        content: &str,
    ) -> Result<Comment, DomainError> {
        let content = validate_content(content)?;
        tracing::info!(post_id = %post_id, "Adding comment");

        if self.posts.find_by_id(post_id).await?.is_none() {
            return Err(not_found(post_id));
        }

        let comment = self
            .comments
            .add(Comment::new(post_id, author, content))
            .await
            .map_err(|e| log_failure("add comment", post_id, e))?;

        self.posts
            .increment_comments(post_id, 1)
            .await
            .map_err(|e| log_failure("count comment", post_id, e))?;

        self.notify(PostEvent::CommentAdded {
            comment: comment.clone(),
        })
        .await;

        tracing::info!(post_id = %post_id, comment_id = %comment.id, "Comment added");
        Ok(comment)
    }

    pub async fn list_comments(&self, post_id: Uuid) -> Result<Vec<Comment>, DomainError> {
        Ok(self.comments.list_for_post(post_id).await?)
    }

    /// Only the author may delete a post.
    pub async fn delete_post(&self, post_id: Uuid, requester: Uuid) -> Result<(), DomainError> {
        tracing::info!(post_id = %post_id, "Deleting post");

        let post = self.get_post(post_id).await?;
        if post.author_id != requester {
            tracing::warn!(post_id = %post_id, requester = %requester, "Delete refused");
            return Err(DomainError::Unauthorized);
        }

        self.posts
            .delete(post_id)
            .await
            .map_err(|e| log_failure("delete post", post_id, e))?;

        self.notify(PostEvent::PostDeleted { post_id }).await;

        tracing::info!(post_id = %post_id, "Post deleted");
        Ok(())
    }

    /// Public link to a post.
    pub fn share_link(&self, post_id: Uuid) -> String {
        let url = format!("{}/post/{}", self.public_base_url, post_id);
        tracing::info!(url = %url, "Sharing post");
        url
    }

    async fn notify(&self, event: PostEvent) {
        if let Err(e) = self.events.publish(&event).await {
            tracing::warn!(post_id = %event.post_id(), error = %e, "Event publish failed");
        }
    }
}

fn not_found(id: Uuid) -> DomainError {
    DomainError::NotFound {
        entity_type: "Post",
        id,
    }
}

fn log_failure(action: &'static str, post_id: Uuid, err: RepoError) -> DomainError {
    tracing::error!(post_id = %post_id, action, error = %err, "Post action failed");
    match err {
        RepoError::NotFound => not_found(post_id),
        other => DomainError::Repository(other),
    }
}
