//! Lenient decoding of posts stored by a schemaless document backend.

use std::collections::BTreeSet;

use chrono::{DateTime, Utc};
use serde::de::IgnoredAny;
use serde::{Deserialize, Deserializer};
use uuid::Uuid;

use super::Post;

/// A post as loosely stored by a document backend.
///
/// Every field is optional and a few legacy field names are accepted.
/// A field of the wrong shape decodes as absent, so one bad field never
/// costs the whole document. Converting into a [`Post`] then substitutes
/// defaults: counters become zero, sets become empty, a missing creation
/// time becomes the Unix epoch.
///
/// Document keys that are not UUIDs (opaque store ids, provider uids) map
/// to stable name-based UUIDs, so the same key always yields the same id.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct PostDocument {
    #[serde(deserialize_with = "document_key")]
    pub id: Option<Uuid>,
    #[serde(alias = "uid", deserialize_with = "document_key")]
    pub author_id: Option<Uuid>,
    #[serde(deserialize_with = "lenient")]
    pub content: Option<String>,
    #[serde(alias = "timestamp", deserialize_with = "timestamp")]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(alias = "likes", deserialize_with = "lenient")]
    pub likes_count: Option<u64>,
    #[serde(alias = "comments", deserialize_with = "lenient")]
    pub comments_count: Option<u64>,
    #[serde(deserialize_with = "key_set")]
    pub liked_by: Option<BTreeSet<Uuid>>,
    #[serde(deserialize_with = "key_set")]
    pub bookmarked_by: Option<BTreeSet<Uuid>>,
}

impl PostDocument {
    pub fn into_post(self) -> Post {
        Post {
            id: self.id.unwrap_or_else(Uuid::new_v4),
            author_id: self.author_id.unwrap_or_else(Uuid::nil),
            content: self.content.unwrap_or_default(),
            created_at: self.created_at.unwrap_or(DateTime::UNIX_EPOCH),
            likes_count: self.likes_count.unwrap_or(0),
            comments_count: self.comments_count.unwrap_or(0),
            liked_by: self.liked_by.unwrap_or_default(),
            bookmarked_by: self.bookmarked_by.unwrap_or_default(),
        }
    }
}

impl From<PostDocument> for Post {
    fn from(doc: PostDocument) -> Self {
        doc.into_post()
    }
}

/// Either the expected shape or anything else, swallowed.
#[derive(Deserialize)]
#[serde(untagged)]
enum Lenient<T> {
    Value(T),
    Other(IgnoredAny),
}

impl<T> Lenient<T> {
    fn ok(self) -> Option<T> {
        match self {
            Lenient::Value(v) => Some(v),
            Lenient::Other(_) => None,
        }
    }
}

#[derive(Deserialize)]
#[serde(untagged)]
enum Key {
    Uuid(Uuid),
    Text(String),
    Other(IgnoredAny),
}

impl Key {
    fn into_uuid(self) -> Option<Uuid> {
        match self {
            Key::Uuid(id) => Some(id),
            Key::Text(text) if !text.trim().is_empty() => {
                Some(Uuid::new_v5(&Uuid::NAMESPACE_OID, text.trim().as_bytes()))
            }
            Key::Text(_) | Key::Other(_) => None,
        }
    }
}

#[derive(Deserialize)]
#[serde(untagged)]
enum Stamp {
    Text(DateTime<Utc>),
    Parts {
        #[serde(alias = "_seconds")]
        seconds: i64,
        #[serde(default, alias = "_nanoseconds")]
        nanoseconds: u32,
    },
    Millis(i64),
    Other(IgnoredAny),
}

fn lenient<'de, D, T>(deserializer: D) -> Result<Option<T>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    Ok(Lenient::<T>::deserialize(deserializer)?.ok())
}

fn document_key<'de, D>(deserializer: D) -> Result<Option<Uuid>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Key::deserialize(deserializer)?.into_uuid())
}

/// Keeps the readable members of an id list and drops the rest.
fn key_set<'de, D>(deserializer: D) -> Result<Option<BTreeSet<Uuid>>, D::Error>
where
    D: Deserializer<'de>,
{
    let keys = Lenient::<Vec<Key>>::deserialize(deserializer)?.ok();
    Ok(keys.map(|keys| keys.into_iter().filter_map(Key::into_uuid).collect()))
}

/// RFC 3339 text, a `{seconds, nanoseconds}` timestamp object, or epoch
/// milliseconds.
fn timestamp<'de, D>(deserializer: D) -> Result<Option<DateTime<Utc>>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match Stamp::deserialize(deserializer)? {
        Stamp::Text(at) => Some(at),
        Stamp::Parts {
            seconds,
            nanoseconds,
        } => DateTime::from_timestamp(seconds, nanoseconds),
        Stamp::Millis(millis) => DateTime::from_timestamp_millis(millis),
        Stamp::Other(_) => None,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn decode(value: serde_json::Value) -> Post {
        serde_json::from_value::<PostDocument>(value).unwrap().into_post()
    }

    #[test]
    fn test_document_defaults_missing_fields() {
        let post = decode(json!({ "content": "just text" }));

        assert_eq!(post.content, "just text");
        assert_eq!(post.likes_count, 0);
        assert_eq!(post.comments_count, 0);
        assert!(post.liked_by.is_empty());
        assert_eq!(post.created_at, DateTime::UNIX_EPOCH);
        assert_eq!(post.author_id, Uuid::nil());
    }

    #[test]
    fn test_document_accepts_legacy_names() {
        let id = Uuid::new_v4();
        let author = Uuid::new_v4();
        let post = decode(json!({
            "id": id,
            "uid": author,
            "likes": 4,
            "comments": 2,
            "timestamp": "2025-10-15T12:00:00Z"
        }));

        assert_eq!(post.id, id);
        assert_eq!(post.author_id, author);
        assert_eq!(post.likes_count, 4);
        assert_eq!(post.comments_count, 2);
        assert_eq!(post.created_at.to_rfc3339(), "2025-10-15T12:00:00+00:00");
    }

    #[test]
    fn test_bad_fields_fall_back_to_defaults() {
        let post = decode(json!({
            "content": 42,
            "likesCount": "7",
            "commentsCount": -1,
            "createdAt": "yesterday",
            "likedBy": "everyone",
            "bookmarkedBy": null
        }));

        assert_eq!(post.content, "");
        assert_eq!(post.likes_count, 0);
        assert_eq!(post.comments_count, 0);
        assert_eq!(post.created_at, DateTime::UNIX_EPOCH);
        assert!(post.liked_by.is_empty());
        assert!(post.bookmarked_by.is_empty());
    }

    #[test]
    fn test_opaque_keys_map_to_stable_ids() {
        let first = decode(json!({ "id": "Xk3pQ9aFirestoreId01", "uid": "google-oauth2|ada" }));
        let again = decode(json!({ "id": "Xk3pQ9aFirestoreId01", "uid": "google-oauth2|ada" }));

        assert_eq!(first.id, again.id);
        assert_eq!(first.author_id, again.author_id);
        assert_ne!(first.author_id, Uuid::nil());
    }

    #[test]
    fn test_id_lists_keep_readable_members() {
        let member = Uuid::new_v4();
        let post = decode(json!({ "likedBy": [member, 7, null, ""], "likesCount": 1 }));

        assert_eq!(post.liked_by, BTreeSet::from([member]));
    }

    #[test]
    fn test_timestamp_shapes() {
        let expected = DateTime::from_timestamp(1_760_529_600, 500_000_000).unwrap();

        let parts = decode(json!({ "timestamp": { "seconds": 1_760_529_600, "nanoseconds": 500_000_000 } }));
        assert_eq!(parts.created_at, expected);

        let admin = decode(json!({ "createdAt": { "_seconds": 1_760_529_600, "_nanoseconds": 500_000_000 } }));
        assert_eq!(admin.created_at, expected);

        let millis = decode(json!({ "createdAt": 1_760_529_600_500_i64 }));
        assert_eq!(millis.created_at, expected);
    }
}
