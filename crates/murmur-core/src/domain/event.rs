use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::Comment;

/// Real-time notification about a single post.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum PostEvent {
    CommentAdded { comment: Comment },
    LikeToggled { post_id: Uuid, user_id: Uuid, liked: bool },
    PostDeleted { post_id: Uuid },
}

impl PostEvent {
    pub fn post_id(&self) -> Uuid {
        match self {
            PostEvent::CommentAdded { comment } => comment.post_id,
            PostEvent::LikeToggled { post_id, .. } | PostEvent::PostDeleted { post_id } => *post_id,
        }
    }

    /// Channel name events for this post are published on.
    pub fn channel(&self) -> String {
        Self::channel_for(self.post_id())
    }

    pub fn channel_for(post_id: Uuid) -> String {
        format!("post:{post_id}")
    }
}
