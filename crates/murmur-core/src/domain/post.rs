use std::collections::BTreeSet;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::DomainError;

/// Longest post or comment body accepted, in characters.
pub const MAX_POST_LENGTH: usize = 280;

/// Post entity - a short-form entry in the feed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Post {
    pub id: Uuid,
    pub author_id: Uuid,
    pub content: String,
    pub created_at: DateTime<Utc>,
    pub likes_count: u64,
    pub comments_count: u64,
    pub liked_by: BTreeSet<Uuid>,
    pub bookmarked_by: BTreeSet<Uuid>,
}

impl Post {
    /// Create a new post with zeroed counters.
    pub fn new(author_id: Uuid, content: String) -> Self {
        Self {
            id: Uuid::new_v4(),
            author_id,
            content,
            created_at: Utc::now(),
            likes_count: 0,
            comments_count: 0,
            liked_by: BTreeSet::new(),
            bookmarked_by: BTreeSet::new(),
        }
    }

    pub fn is_liked_by(&self, user_id: Uuid) -> bool {
        self.liked_by.contains(&user_id)
    }

    pub fn is_bookmarked_by(&self, user_id: Uuid) -> bool {
        self.bookmarked_by.contains(&user_id)
    }

    /// Flip `user_id`'s like and keep `likes_count` in step.
    /// Returns the new liked state.
    pub fn toggle_like(&mut self, user_id: Uuid) -> bool {
        if self.liked_by.remove(&user_id) {
            self.likes_count = self.likes_count.saturating_sub(1);
            false
        } else {
            self.liked_by.insert(user_id);
            self.likes_count += 1;
            true
        }
    }

    /// Flip `user_id`'s bookmark. Returns the new bookmarked state.
    pub fn toggle_bookmark(&mut self, user_id: Uuid) -> bool {
        if self.bookmarked_by.remove(&user_id) {
            false
        } else {
            self.bookmarked_by.insert(user_id);
            true
        }
    }
}

/// A post with the score it was ranked by at fetch time.
///
/// The score is never persisted.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RankedPost {
    #[serde(flatten)]
    pub post: Post,
    pub score: f64,
}

/// Trim and check a post or comment body.
pub fn validate_content(content: &str) -> Result<String, DomainError> {
    let trimmed = content.trim();
    if trimmed.is_empty() {
        return Err(DomainError::Validation("Content must not be empty".to_string()));
    }
    if trimmed.chars().count() > MAX_POST_LENGTH {
        return Err(DomainError::Validation(format!(
            "Content must be at most {MAX_POST_LENGTH} characters"
        )));
    }
    Ok(trimmed.to_string())
}
