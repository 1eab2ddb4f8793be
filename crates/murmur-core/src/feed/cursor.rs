use std::cmp::Ordering;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::domain::Post;

/// Position of the last raw document handed out by a [`FeedSource`](crate::ports::FeedSource).
///
/// Opaque to callers. The id breaks ties between posts created at the same
/// instant so the feed order is total.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct FeedCursor {
    pub created_at: DateTime<Utc>,
    pub id: Uuid,
}

impl FeedCursor {
    /// Whether `post` comes strictly after this position in feed order.
    pub fn precedes(&self, post: &Post) -> bool {
        (post.created_at, post.id) < (self.created_at, self.id)
    }
}

impl From<&Post> for FeedCursor {
    fn from(post: &Post) -> Self {
        Self {
            created_at: post.created_at,
            id: post.id,
        }
    }
}

/// Store order of the feed: newest first, then id descending.
pub fn feed_order(a: &Post, b: &Post) -> Ordering {
    b.created_at
        .cmp(&a.created_at)
        .then_with(|| b.id.cmp(&a.id))
}
