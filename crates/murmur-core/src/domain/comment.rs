use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Comment entity - a reply attached to a post.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Comment {
    pub id: Uuid,
    pub post_id: Uuid,
    pub author_id: Uuid,
    pub author_name: String,
    pub author_photo_url: String,
    pub content: String,
    pub created_at: DateTime<Utc>,
}

/// Who is writing a comment, as shown next to it.
#[derive(Debug, Clone)]
pub struct CommentAuthor {
    pub id: Uuid,
    pub name: String,
    pub photo_url: String,
}

impl Comment {
    pub fn new(post_id: Uuid, author: &CommentAuthor, content: String) -> Self {
        let name = if author.name.trim().is_empty() {
            "Anonymous".to_string()
        } else {
            author.name.clone()
        };

        Self {
            id: Uuid::new_v4(),
            post_id,
            author_id: author.id,
            author_name: name,
            author_photo_url: author.photo_url.clone(),
            content,
            created_at: Utc::now(),
        }
    }
}
