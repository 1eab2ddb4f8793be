use std::collections::HashMap;

use async_trait::async_trait;
use tokio::sync::RwLock;
use uuid::Uuid;

use murmur_core::domain::Comment;
use murmur_core::error::RepoError;
use murmur_core::ports::CommentRepository;

/// Comments grouped by post, kept in insertion order.
pub struct InMemoryCommentStore {
    by_post: RwLock<HashMap<Uuid, Vec<Comment>>>,
}

impl InMemoryCommentStore {
    pub fn new() -> Self {
        Self {
            by_post: RwLock::new(HashMap::new()),
        }
    }
}

impl Default for InMemoryCommentStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl CommentRepository for InMemoryCommentStore {
    async fn add(&self, comment: Comment) -> Result<Comment, RepoError> {
        self.by_post
            .write()
            .await
            .entry(comment.post_id)
            .or_default()
            .push(comment.clone());
        Ok(comment)
    }

    async fn list_for_post(&self, post_id: Uuid) -> Result<Vec<Comment>, RepoError> {
        let mut comments = self
            .by_post
            .read()
            .await
            .get(&post_id)
            .cloned()
            .unwrap_or_default();
        comments.sort_by_key(|c| c.created_at);
        Ok(comments)
    }
}
