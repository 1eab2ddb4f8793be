use std::sync::Arc;

use actix_web::http::{StatusCode, header};
use actix_web::{App, test, web};
use serde_json::{Value, json};
use uuid::Uuid;

use async_trait::async_trait;
use murmur_core::RepoError;
use murmur_core::domain::{Post, ProviderIdentity};
use murmur_core::feed::FeedCursor;
use murmur_core::ports::{BaseRepository, FeedSource, PostRepository};
use murmur_infra::{
    InMemoryCommentStore, InMemoryEventBus, InMemoryPostStore, InMemoryUserStore, JwtConfig,
    JwtTokenService,
};

use super::configure_routes;
use crate::config::AppConfig;
use crate::state::{AppState, Stores};

fn test_state(dev_tokens: bool) -> AppState {
    state_with(Stores::in_memory(Arc::new(InMemoryPostStore::new())), dev_tokens)
}

fn state_with(stores: Stores, dev_tokens: bool) -> AppState {
    let config = AppConfig {
        public_base_url: "https://murmur.test/".to_string(),
        dev_tokens,
        ..AppConfig::default()
    };
    let tokens = JwtTokenService::new(JwtConfig {
        secret: "handler-test-secret".to_string(),
        expiration_hours: 1,
        issuer: "murmur-test".to_string(),
    });

    AppState::from_parts(
        stores,
        Arc::new(InMemoryEventBus::new(16)),
        Arc::new(tokens),
        &config,
    )
}

fn sign_in_as(state: &AppState, name: &str) -> (Uuid, String) {
    let uid = Uuid::new_v4();
    let token = state
        .tokens
        .generate_token(&ProviderIdentity {
            uid,
            display_name: Some(name.to_string()),
            email: Some(format!("{}@example.com", name.to_lowercase())),
            photo_url: None,
        })
        .unwrap();
    (uid, format!("Bearer {token}"))
}

macro_rules! init_app {
    ($state:expr) => {
        test::init_service(
            App::new()
                .app_data(web::Data::new($state.clone()))
                .configure(configure_routes),
        )
        .await
    };
}

#[actix_rt::test]
async fn test_health_is_public() {
    let state = test_state(false);
    let app = init_app!(state);

    let req = test::TestRequest::get().uri("/api/health").to_request();
    let body: Value = test::call_and_read_body_json(&app, req).await;

    assert_eq!(body["status"], "ok");
    assert_eq!(body["active_sessions"], 0);
}

#[actix_rt::test]
async fn test_guarded_routes_reject_missing_or_bad_tokens() {
    let state = test_state(false);
    let app = init_app!(state);

    let req = test::TestRequest::post()
        .uri("/api/posts")
        .set_json(json!({"content": "hello"}))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["status"], 401);
    assert_eq!(body["instance"], "/api/posts");

    let req = test::TestRequest::get()
        .uri("/api/auth/me")
        .insert_header((header::AUTHORIZATION, "Bearer not-a-jwt"))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["title"], "Invalid Token");
}

#[actix_rt::test]
async fn test_dev_token_only_when_enabled() {
    let disabled = test_state(false);
    let app = init_app!(disabled);
    let req = test::TestRequest::post()
        .uri("/api/auth/dev-token")
        .set_json(json!({}))
        .to_request();
    assert_eq!(
        test::call_service(&app, req).await.status(),
        StatusCode::NOT_FOUND
    );

    let enabled = test_state(true);
    let app = init_app!(enabled);
    let uid = Uuid::new_v4();
    let req = test::TestRequest::post()
        .uri("/api/auth/dev-token")
        .set_json(json!({"uid": uid, "display_name": "Grace"}))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::CREATED);
    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["token_type"], "Bearer");
    assert_eq!(body["expires_in"], 3600);

    let token = body["access_token"].as_str().unwrap();
    let req = test::TestRequest::get()
        .uri("/api/auth/me")
        .insert_header((header::AUTHORIZATION, format!("Bearer {token}")))
        .to_request();
    let me: Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(me["user_id"], uid.to_string());
    assert_eq!(me["name"], "Grace");
}

#[actix_rt::test]
async fn test_sign_in_creates_profile_with_posts() {
    let state = test_state(false);
    let app = init_app!(state);
    let (uid, auth) = sign_in_as(&state, "Ada");

    let req = test::TestRequest::post()
        .uri("/api/auth/session")
        .insert_header((header::AUTHORIZATION, auth.clone()))
        .to_request();
    let profile: Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(profile["uid"], uid.to_string());
    assert_eq!(
        profile["username"],
        format!("ada-{}", &uid.to_string()[..6])
    );

    let req = test::TestRequest::post()
        .uri("/api/posts")
        .insert_header((header::AUTHORIZATION, auth.clone()))
        .set_json(json!({"content": "first post"}))
        .to_request();
    assert_eq!(
        test::call_service(&app, req).await.status(),
        StatusCode::CREATED
    );

    let req = test::TestRequest::get()
        .uri(&format!("/api/profiles/{uid}"))
        .insert_header((header::AUTHORIZATION, auth.clone()))
        .to_request();
    let view: Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(view["profile"]["display_name"], "Ada");
    assert_eq!(view["posts"].as_array().unwrap().len(), 1);

    let username = profile["username"].as_str().unwrap();
    let req = test::TestRequest::get()
        .uri(&format!("/api/profiles/by-username/{username}"))
        .insert_header((header::AUTHORIZATION, auth))
        .to_request();
    let view: Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(view["profile"]["uid"], uid.to_string());
}

#[actix_rt::test]
async fn test_post_actions_round_trip() {
    let state = test_state(false);
    let app = init_app!(state);
    let (_, author) = sign_in_as(&state, "Ada");
    let (_, reader) = sign_in_as(&state, "Grace");

    let req = test::TestRequest::post()
        .uri("/api/posts")
        .insert_header((header::AUTHORIZATION, author.clone()))
        .set_json(json!({"content": "   "}))
        .to_request();
    assert_eq!(
        test::call_service(&app, req).await.status(),
        StatusCode::UNPROCESSABLE_ENTITY
    );

    let req = test::TestRequest::post()
        .uri("/api/posts")
        .insert_header((header::AUTHORIZATION, author.clone()))
        .set_json(json!({"content": "  hello murmur  "}))
        .to_request();
    let post: Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(post["content"], "hello murmur");
    let post_id = post["id"].as_str().unwrap().to_string();

    for expected in [true, false, true] {
        let req = test::TestRequest::post()
            .uri(&format!("/api/posts/{post_id}/like"))
            .insert_header((header::AUTHORIZATION, reader.clone()))
            .to_request();
        let toggle: Value = test::call_and_read_body_json(&app, req).await;
        assert_eq!(toggle["active"], expected);
    }

    let req = test::TestRequest::post()
        .uri(&format!("/api/posts/{post_id}/bookmark"))
        .insert_header((header::AUTHORIZATION, reader.clone()))
        .to_request();
    let toggle: Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(toggle["active"], true);

    let req = test::TestRequest::post()
        .uri(&format!("/api/posts/{post_id}/comments"))
        .insert_header((header::AUTHORIZATION, reader.clone()))
        .set_json(json!({"content": "nice"}))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::CREATED);

    let req = test::TestRequest::get()
        .uri(&format!("/api/posts/{post_id}/comments"))
        .insert_header((header::AUTHORIZATION, reader.clone()))
        .to_request();
    let comments: Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(comments.as_array().unwrap().len(), 1);
    assert_eq!(comments[0]["author_name"], "Grace");

    let req = test::TestRequest::get()
        .uri(&format!("/api/posts/{post_id}"))
        .insert_header((header::AUTHORIZATION, reader.clone()))
        .to_request();
    let post: Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(post["likes_count"], 1);
    assert_eq!(post["comments_count"], 1);

    let req = test::TestRequest::get()
        .uri(&format!("/api/posts/{post_id}/share"))
        .insert_header((header::AUTHORIZATION, reader.clone()))
        .to_request();
    let share: Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(share["url"], format!("https://murmur.test/post/{post_id}"));

    let req = test::TestRequest::delete()
        .uri(&format!("/api/posts/{post_id}"))
        .insert_header((header::AUTHORIZATION, reader.clone()))
        .to_request();
    assert_eq!(
        test::call_service(&app, req).await.status(),
        StatusCode::FORBIDDEN
    );

    let req = test::TestRequest::delete()
        .uri(&format!("/api/posts/{post_id}"))
        .insert_header((header::AUTHORIZATION, author))
        .to_request();
    assert_eq!(
        test::call_service(&app, req).await.status(),
        StatusCode::NO_CONTENT
    );

    let req = test::TestRequest::get()
        .uri(&format!("/api/posts/{post_id}"))
        .insert_header((header::AUTHORIZATION, reader))
        .to_request();
    assert_eq!(
        test::call_service(&app, req).await.status(),
        StatusCode::NOT_FOUND
    );
}

#[actix_rt::test]
async fn test_feed_session_pages_until_exhausted() {
    let state = test_state(false);
    let app = init_app!(state);
    let (_, auth) = sign_in_as(&state, "Ada");
    let (_, stranger) = sign_in_as(&state, "Mallory");

    for i in 0..7 {
        let req = test::TestRequest::post()
            .uri("/api/posts")
            .insert_header((header::AUTHORIZATION, auth.clone()))
            .set_json(json!({"content": format!("post {i}")}))
            .to_request();
        assert_eq!(
            test::call_service(&app, req).await.status(),
            StatusCode::CREATED
        );
    }

    let req = test::TestRequest::post()
        .uri("/api/feed/sessions")
        .insert_header((header::AUTHORIZATION, auth.clone()))
        .set_json(json!({}))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::CREATED);
    let mounted: Value = test::read_body_json(resp).await;
    assert_eq!(mounted["page_size"], 5);
    assert_eq!(mounted["outcome"], "appended");
    assert_eq!(mounted["count"], 5);
    assert_eq!(mounted["feed"]["has_more"], true);
    let session_id = mounted["session_id"].as_str().unwrap().to_string();

    let req = test::TestRequest::post()
        .uri(&format!("/api/feed/sessions/{session_id}/visible"))
        .insert_header((header::AUTHORIZATION, auth.clone()))
        .set_json(json!({"visible": false}))
        .to_request();
    let skipped: Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(skipped["outcome"], "skipped");
    assert_eq!(skipped["reason"], "not_visible");

    let req = test::TestRequest::post()
        .uri(&format!("/api/feed/sessions/{session_id}/visible"))
        .insert_header((header::AUTHORIZATION, auth.clone()))
        .set_json(json!({"visible": true}))
        .to_request();
    let second: Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(second["outcome"], "appended");
    assert_eq!(second["count"], 2);

    let req = test::TestRequest::post()
        .uri(&format!("/api/feed/sessions/{session_id}/next"))
        .insert_header((header::AUTHORIZATION, auth.clone()))
        .to_request();
    let last: Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(last["outcome"], "exhausted");
    assert_eq!(last["feed"]["has_more"], false);
    assert_eq!(last["feed"]["state"], "exhausted");

    let posts = last["feed"]["posts"].as_array().unwrap();
    let mut ids: Vec<&str> = posts.iter().map(|p| p["id"].as_str().unwrap()).collect();
    ids.sort_unstable();
    ids.dedup();
    assert_eq!(ids.len(), 7);

    let req = test::TestRequest::get()
        .uri(&format!("/api/feed/sessions/{session_id}"))
        .insert_header((header::AUTHORIZATION, stranger))
        .to_request();
    assert_eq!(
        test::call_service(&app, req).await.status(),
        StatusCode::FORBIDDEN
    );

    let req = test::TestRequest::delete()
        .uri(&format!("/api/feed/sessions/{session_id}"))
        .insert_header((header::AUTHORIZATION, auth.clone()))
        .to_request();
    assert_eq!(
        test::call_service(&app, req).await.status(),
        StatusCode::NO_CONTENT
    );

    let req = test::TestRequest::get()
        .uri(&format!("/api/feed/sessions/{session_id}"))
        .insert_header((header::AUTHORIZATION, auth))
        .to_request();
    assert_eq!(
        test::call_service(&app, req).await.status(),
        StatusCode::NOT_FOUND
    );
}

#[actix_rt::test]
async fn test_zero_page_size_is_rejected() {
    let state = test_state(false);
    let app = init_app!(state);
    let (_, auth) = sign_in_as(&state, "Ada");

    let req = test::TestRequest::post()
        .uri("/api/feed/sessions")
        .insert_header((header::AUTHORIZATION, auth))
        .set_json(json!({"page_size": 0}))
        .to_request();
    assert_eq!(
        test::call_service(&app, req).await.status(),
        StatusCode::BAD_REQUEST
    );
}

/// Post store whose backend never answers.
struct UnreachablePosts;

fn unreachable() -> RepoError {
    RepoError::Connection("connection refused".to_string())
}

#[async_trait]
impl BaseRepository<Post, Uuid> for UnreachablePosts {
    async fn find_by_id(&self, _id: Uuid) -> Result<Option<Post>, RepoError> {
        Err(unreachable())
    }

    async fn save(&self, _entity: Post) -> Result<Post, RepoError> {
        Err(unreachable())
    }

    async fn delete(&self, _id: Uuid) -> Result<(), RepoError> {
        Err(unreachable())
    }
}

#[async_trait]
impl FeedSource for UnreachablePosts {
    async fn fetch_page(
        &self,
        _after: Option<&FeedCursor>,
        _limit: usize,
    ) -> Result<Vec<Post>, RepoError> {
        Err(unreachable())
    }
}

#[async_trait]
impl PostRepository for UnreachablePosts {
    async fn find_by_author(&self, _author_id: Uuid) -> Result<Vec<Post>, RepoError> {
        Err(unreachable())
    }

    async fn toggle_like(&self, _post_id: Uuid, _user_id: Uuid) -> Result<bool, RepoError> {
        Err(unreachable())
    }

    async fn toggle_bookmark(&self, _post_id: Uuid, _user_id: Uuid) -> Result<bool, RepoError> {
        Err(unreachable())
    }

    async fn increment_comments(&self, _post_id: Uuid, _delta: i64) -> Result<(), RepoError> {
        Err(unreachable())
    }
}

#[actix_rt::test]
async fn test_failed_first_page_drops_session() {
    let stores = Stores {
        posts: Arc::new(UnreachablePosts),
        comments: Arc::new(InMemoryCommentStore::new()),
        users: Arc::new(InMemoryUserStore::new()),
    };
    let state = state_with(stores, false);
    let app = init_app!(state);
    let (_, auth) = sign_in_as(&state, "Ada");

    let req = test::TestRequest::post()
        .uri("/api/feed/sessions")
        .insert_header((header::AUTHORIZATION, auth))
        .to_request();
    let resp = test::call_service(&app, req).await;

    assert_eq!(resp.status(), StatusCode::SERVICE_UNAVAILABLE);
    assert_eq!(state.sessions.len().await, 0);
}
