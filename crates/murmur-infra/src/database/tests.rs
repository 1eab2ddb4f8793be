use chrono::{TimeZone, Utc};
use sea_orm::{DatabaseBackend, MockDatabase};
use serde_json::json;
use uuid::Uuid;

use murmur_core::domain::Post;
use murmur_core::feed::FeedCursor;
use murmur_core::ports::{BaseRepository, FeedSource, PostRepository, UserRepository};

use crate::database::entity::{post, user};
use crate::database::postgres_repo::{PostgresPostRepository, PostgresUserRepository};

fn post_model(id: Uuid, author_id: Uuid, hour: u32) -> post::Model {
    post::Model {
        id,
        author_id,
        content: format!("posted at {hour}:00"),
        created_at: Utc
            .with_ymd_and_hms(2025, 10, 15, hour, 0, 0)
            .unwrap()
            .into(),
        likes_count: 3,
        comments_count: 1,
        liked_by: json!([author_id.to_string(), "not-a-uuid"]),
        bookmarked_by: json!(null),
    }
}

#[tokio::test]
async fn test_find_post_by_id() {
    let post_id = Uuid::new_v4();
    let author_id = Uuid::new_v4();

    let db = MockDatabase::new(DatabaseBackend::Postgres)
        .append_query_results([vec![post_model(post_id, author_id, 9)]])
        .into_connection();

    let repo = PostgresPostRepository::new(db);

    let post: Post = repo.find_by_id(post_id).await.unwrap().unwrap();

    assert_eq!(post.id, post_id);
    assert_eq!(post.content, "posted at 9:00");
    assert_eq!(post.likes_count, 3);
    assert!(post.is_liked_by(author_id));
    assert_eq!(post.liked_by.len(), 1);
    assert!(post.bookmarked_by.is_empty());
}

#[tokio::test]
async fn test_fetch_page_with_cursor() {
    let author_id = Uuid::new_v4();
    let first = Uuid::new_v4();
    let second = Uuid::new_v4();

    let db = MockDatabase::new(DatabaseBackend::Postgres)
        .append_query_results([vec![
            post_model(first, author_id, 8),
            post_model(second, author_id, 7),
        ]])
        .into_connection();

    let repo = PostgresPostRepository::new(db);
    let cursor = FeedCursor {
        created_at: Utc.with_ymd_and_hms(2025, 10, 15, 9, 0, 0).unwrap(),
        id: Uuid::new_v4(),
    };

    let page = repo.fetch_page(Some(&cursor), 2).await.unwrap();
    assert_eq!(
        page.iter().map(|p| p.id).collect::<Vec<_>>(),
        vec![first, second]
    );
}

#[tokio::test]
async fn test_fetch_page_past_the_end_is_empty() {
    let db = MockDatabase::new(DatabaseBackend::Postgres)
        .append_query_results([Vec::<post::Model>::new()])
        .into_connection();

    let repo = PostgresPostRepository::new(db);
    assert!(repo.fetch_page(None, 5).await.unwrap().is_empty());
}

#[tokio::test]
async fn test_find_by_author() {
    let author_id = Uuid::new_v4();
    let db = MockDatabase::new(DatabaseBackend::Postgres)
        .append_query_results([vec![
            post_model(Uuid::new_v4(), author_id, 11),
            post_model(Uuid::new_v4(), author_id, 10),
        ]])
        .into_connection();

    let repo = PostgresPostRepository::new(db);
    let posts = repo.find_by_author(author_id).await.unwrap();

    assert_eq!(posts.len(), 2);
    assert!(posts.iter().all(|p| p.author_id == author_id));
}

#[tokio::test]
async fn test_find_user_by_username() {
    let uid = Uuid::new_v4();
    let db = MockDatabase::new(DatabaseBackend::Postgres)
        .append_query_results([vec![user::Model {
            uid,
            username: "ada-a1b2c3".to_string(),
            display_name: "Ada".to_string(),
            email: "ada@example.com".to_string(),
            photo_url: String::new(),
            bio: String::new(),
            created_at: Utc::now().into(),
            verified: false,
        }]])
        .into_connection();

    let repo = PostgresUserRepository::new(db);
    let profile = repo.find_by_username("ada-a1b2c3").await.unwrap().unwrap();

    assert_eq!(profile.uid, uid);
    assert_eq!(profile.display_name, "Ada");
}

