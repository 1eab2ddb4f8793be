//! In-memory post store ordered for feed pagination.

use std::collections::{BTreeMap, HashMap};
use std::ops::Bound;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use tokio::sync::RwLock;
use uuid::Uuid;

use murmur_core::domain::{Post, PostDocument};
use murmur_core::error::RepoError;
use murmur_core::feed::FeedCursor;
use murmur_core::ports::{BaseRepository, FeedSource, PostRepository};

type FeedKey = (DateTime<Utc>, Uuid);

#[derive(Default)]
struct Inner {
    /// Ascending by key; the feed walks it in reverse.
    ordered: BTreeMap<FeedKey, Post>,
    created: HashMap<Uuid, DateTime<Utc>>,
}

impl Inner {
    fn key_of(&self, id: Uuid) -> Option<FeedKey> {
        self.created.get(&id).map(|created_at| (*created_at, id))
    }

    fn get_mut(&mut self, id: Uuid) -> Result<&mut Post, RepoError> {
        let key = self.key_of(id).ok_or(RepoError::NotFound)?;
        self.ordered.get_mut(&key).ok_or(RepoError::NotFound)
    }

    fn upsert(&mut self, post: Post) {
        if let Some(old) = self.key_of(post.id) {
            self.ordered.remove(&old);
        }
        self.created.insert(post.id, post.created_at);
        self.ordered.insert((post.created_at, post.id), post);
    }
}

/// Post store kept in a `BTreeMap` keyed by `(created_at, id)`.
pub struct InMemoryPostStore {
    inner: RwLock<Inner>,
}

impl InMemoryPostStore {
    pub fn new() -> Self {
        Self {
            inner: RwLock::new(Inner::default()),
        }
    }

    /// Import raw JSON documents, repairing missing or malformed fields with
    /// defaults.
    ///
    /// Values that are not JSON objects are skipped. Returns how many posts
    /// were stored.
    pub async fn load_documents(&self, documents: Vec<serde_json::Value>) -> usize {
        let mut inner = self.inner.write().await;
        let mut loaded = 0;

        for value in documents {
            if !value.is_object() {
                tracing::warn!("Skipping post document that is not an object");
                continue;
            }
            match serde_json::from_value::<PostDocument>(value) {
                Ok(doc) => {
                    inner.upsert(doc.into_post());
                    loaded += 1;
                }
                Err(e) => tracing::warn!(error = %e, "Skipping unreadable post document"),
            }
        }

        tracing::info!(loaded, "Post documents imported");
        loaded
    }

    pub async fn len(&self) -> usize {
        self.inner.read().await.ordered.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.len().await == 0
    }
}

impl Default for InMemoryPostStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl BaseRepository<Post, Uuid> for InMemoryPostStore {
    async fn find_by_id(&self, id: Uuid) -> Result<Option<Post>, RepoError> {
        let inner = self.inner.read().await;
        Ok(inner
            .key_of(id)
            .and_then(|key| inner.ordered.get(&key))
            .cloned())
    }

    async fn save(&self, entity: Post) -> Result<Post, RepoError> {
        self.inner.write().await.upsert(entity.clone());
        Ok(entity)
    }

    async fn delete(&self, id: Uuid) -> Result<(), RepoError> {
        let mut inner = self.inner.write().await;
        let created_at = inner.created.remove(&id).ok_or(RepoError::NotFound)?;
        inner.ordered.remove(&(created_at, id));
        Ok(())
    }
}

#[async_trait]
impl FeedSource for InMemoryPostStore {
    async fn fetch_page(
        &self,
        after: Option<&FeedCursor>,
        limit: usize,
    ) -> Result<Vec<Post>, RepoError> {
        let inner = self.inner.read().await;
        let upper = match after {
            Some(cursor) => Bound::Excluded((cursor.created_at, cursor.id)),
            None => Bound::Unbounded,
        };

        Ok(inner
            .ordered
            .range((Bound::Unbounded, upper))
            .rev()
            .take(limit)
            .map(|(_, post)| post.clone())
            .collect())
    }
}

#[async_trait]
impl PostRepository for InMemoryPostStore {
    async fn find_by_author(&self, author_id: Uuid) -> Result<Vec<Post>, RepoError> {
        let inner = self.inner.read().await;
        Ok(inner
            .ordered
            .values()
            .rev()
            .filter(|post| post.author_id == author_id)
            .cloned()
            .collect())
    }

    async fn toggle_like(&self, post_id: Uuid, user_id: Uuid) -> Result<bool, RepoError> {
        let mut inner = self.inner.write().await;
        Ok(inner.get_mut(post_id)?.toggle_like(user_id))
    }

    async fn toggle_bookmark(&self, post_id: Uuid, user_id: Uuid) -> Result<bool, RepoError> {
        let mut inner = self.inner.write().await;
        Ok(inner.get_mut(post_id)?.toggle_bookmark(user_id))
    }

    async fn increment_comments(&self, post_id: Uuid, delta: i64) -> Result<(), RepoError> {
        let mut inner = self.inner.write().await;
        let post = inner.get_mut(post_id)?;
        post.comments_count = post.comments_count.saturating_add_signed(delta);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, TimeZone};

    fn at(minutes_ago: i64) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 10, 15, 12, 0, 0).unwrap() - Duration::minutes(minutes_ago)
    }

    fn post_at(minutes_ago: i64) -> Post {
        let mut post = Post::new(Uuid::new_v4(), format!("{minutes_ago} minutes ago"));
        post.created_at = at(minutes_ago);
        post
    }

    async fn store_with(posts: &[Post]) -> InMemoryPostStore {
        let store = InMemoryPostStore::new();
        for post in posts {
            store.save(post.clone()).await.unwrap();
        }
        store
    }

    #[tokio::test]
    async fn test_fetch_page_newest_first_with_cursor() {
        let posts: Vec<Post> = (0..5).map(post_at).collect();
        let store = store_with(&posts).await;

        let first = store.fetch_page(None, 2).await.unwrap();
        assert_eq!(first[0].id, posts[0].id);
        assert_eq!(first[1].id, posts[1].id);

        let cursor = FeedCursor::from(&first[1]);
        let second = store.fetch_page(Some(&cursor), 2).await.unwrap();
        assert_eq!(second[0].id, posts[2].id);
        assert_eq!(second[1].id, posts[3].id);

        let cursor = FeedCursor::from(&posts[4]);
        assert!(store.fetch_page(Some(&cursor), 2).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_same_instant_posts_are_not_skipped() {
        let a = post_at(1);
        let b = post_at(1);
        assert_eq!(a.created_at, b.created_at);
        let store = store_with(&[a.clone(), b.clone()]).await;

        let first = store.fetch_page(None, 1).await.unwrap();
        let second = store
            .fetch_page(Some(&FeedCursor::from(&first[0])), 1)
            .await
            .unwrap();

        assert_eq!(second.len(), 1);
        assert_ne!(first[0].id, second[0].id);
    }

    #[tokio::test]
    async fn test_toggle_like_and_bookmark() {
        let post = post_at(0);
        let store = store_with(&[post.clone()]).await;
        let user = Uuid::new_v4();

        assert!(store.toggle_like(post.id, user).await.unwrap());
        assert!(store.toggle_bookmark(post.id, user).await.unwrap());
        let stored = store.find_by_id(post.id).await.unwrap().unwrap();
        assert_eq!(stored.likes_count, 1);
        assert!(stored.is_bookmarked_by(user));

        assert!(!store.toggle_like(post.id, user).await.unwrap());
        assert_eq!(store.find_by_id(post.id).await.unwrap().unwrap().likes_count, 0);

        assert!(matches!(
            store.toggle_like(Uuid::new_v4(), user).await,
            Err(RepoError::NotFound)
        ));
    }

    #[tokio::test]
    async fn test_increment_comments_clamps_at_zero() {
        let post = post_at(0);
        let store = store_with(&[post.clone()]).await;

        store.increment_comments(post.id, 2).await.unwrap();
        store.increment_comments(post.id, -5).await.unwrap();
        assert_eq!(store.find_by_id(post.id).await.unwrap().unwrap().comments_count, 0);
    }

    #[tokio::test]
    async fn test_delete_removes_from_feed() {
        let posts: Vec<Post> = (0..3).map(post_at).collect();
        let store = store_with(&posts).await;

        store.delete(posts[1].id).await.unwrap();
        let page = store.fetch_page(None, 10).await.unwrap();
        assert_eq!(page.len(), 2);
        assert!(page.iter().all(|p| p.id != posts[1].id));
        assert!(matches!(store.delete(posts[1].id).await, Err(RepoError::NotFound)));
    }

    #[tokio::test]
    async fn test_find_by_author_newest_first() {
        let author = Uuid::new_v4();
        let mut older = post_at(10);
        older.author_id = author;
        let mut newer = post_at(1);
        newer.author_id = author;
        let other = post_at(5);
        let store = store_with(&[older.clone(), other, newer.clone()]).await;

        let ids: Vec<Uuid> = store
            .find_by_author(author)
            .await
            .unwrap()
            .iter()
            .map(|p| p.id)
            .collect();
        assert_eq!(ids, vec![newer.id, older.id]);
    }

    #[tokio::test]
    async fn test_load_documents_repairs_and_skips() {
        let store = InMemoryPostStore::new();
        let id = Uuid::new_v4();

        let loaded = store
            .load_documents(vec![
                serde_json::json!({ "id": id, "content": "hi", "likes": 3 }),
                serde_json::json!("not a document"),
                serde_json::json!({ "content": "many", "likesCount": "many" }),
            ])
            .await;

        assert_eq!(loaded, 2);
        let post = store.find_by_id(id).await.unwrap().unwrap();
        assert_eq!(post.likes_count, 3);
        assert_eq!(post.comments_count, 0);
    }

    #[tokio::test]
    async fn test_load_documents_keeps_posts_with_bad_fields() {
        let store = InMemoryPostStore::new();

        let loaded = store
            .load_documents(vec![
                serde_json::json!({ "content": "string counter", "likesCount": "7" }),
                serde_json::json!({ "content": "negative counter", "commentsCount": -1 }),
                serde_json::json!({ "id": "Xk3pQ9aFirestoreId01", "content": "opaque id" }),
            ])
            .await;

        assert_eq!(loaded, 3);
        let page = store.fetch_page(None, 10).await.unwrap();
        assert_eq!(page.len(), 3);
        assert!(page.iter().all(|p| p.likes_count == 0 && p.comments_count == 0));
    }
}
