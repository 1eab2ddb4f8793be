//! Feed session handlers: mount, page, observe, unmount.

use actix_web::{HttpResponse, web};
use serde::Serialize;
use uuid::Uuid;

use murmur_core::feed::{FeedSnapshot, FeedState, FetchOutcome};
use murmur_shared::dto::{CreateSessionRequest, VisibilityRequest};

use crate::middleware::auth::Identity;
use crate::middleware::error::AppResult;
use crate::sessions::FeedSession;
use crate::state::AppState;

#[derive(Serialize)]
struct FeedView {
    state: FeedState,
    #[serde(flatten)]
    snapshot: FeedSnapshot,
}

impl FeedView {
    fn of(session: &FeedSession) -> Self {
        Self {
            state: session.state(),
            snapshot: session.snapshot(),
        }
    }
}

#[derive(Serialize)]
struct MountedSession {
    session_id: Uuid,
    page_size: usize,
    #[serde(flatten)]
    outcome: FetchOutcome,
    feed: FeedView,
}

#[derive(Serialize)]
struct FetchResponse {
    #[serde(flatten)]
    outcome: FetchOutcome,
    feed: FeedView,
}

/// POST /api/feed/sessions
///
/// Mounting loads the first page, as a freshly shown feed does.
pub async fn create_session(
    state: web::Data<AppState>,
    identity: Identity,
    body: Option<web::Json<CreateSessionRequest>>,
) -> AppResult<HttpResponse> {
    let page_size = body.and_then(|b| b.into_inner().page_size);
    let (session_id, session) = state.sessions.create(identity.user_id, page_size).await?;

    // The client never learns the id of a session whose first page failed.
    let outcome = match session.fetch_next_page().await {
        Ok(outcome) => outcome,
        Err(e) => {
            if let Err(remove_err) = state.sessions.remove(session_id, identity.user_id).await {
                tracing::warn!(%session_id, error = %remove_err, "Failed to drop unmounted session");
            }
            return Err(e.into());
        }
    };

    Ok(HttpResponse::Created().json(MountedSession {
        session_id,
        page_size: session.config().page_size,
        outcome,
        feed: FeedView::of(&session),
    }))
}

/// GET /api/feed/sessions/{id}
pub async fn get_session(
    state: web::Data<AppState>,
    identity: Identity,
    path: web::Path<Uuid>,
) -> AppResult<HttpResponse> {
    let session = state.sessions.get(path.into_inner(), identity.user_id).await?;
    Ok(HttpResponse::Ok().json(FeedView::of(&session)))
}

/// POST /api/feed/sessions/{id}/next
pub async fn next_page(
    state: web::Data<AppState>,
    identity: Identity,
    path: web::Path<Uuid>,
) -> AppResult<HttpResponse> {
    let session = state.sessions.get(path.into_inner(), identity.user_id).await?;
    let outcome = session.fetch_next_page().await?;

    Ok(HttpResponse::Ok().json(FetchResponse {
        outcome,
        feed: FeedView::of(&session),
    }))
}

/// POST /api/feed/sessions/{id}/visible
pub async fn sentinel_visible(
    state: web::Data<AppState>,
    identity: Identity,
    path: web::Path<Uuid>,
    body: web::Json<VisibilityRequest>,
) -> AppResult<HttpResponse> {
    let session = state.sessions.get(path.into_inner(), identity.user_id).await?;
    let outcome = session
        .request_load_more_when_visible(body.visible)
        .await?;

    Ok(HttpResponse::Ok().json(FetchResponse {
        outcome,
        feed: FeedView::of(&session),
    }))
}

/// DELETE /api/feed/sessions/{id}
pub async fn delete_session(
    state: web::Data<AppState>,
    identity: Identity,
    path: web::Path<Uuid>,
) -> AppResult<HttpResponse> {
    state
        .sessions
        .remove(path.into_inner(), identity.user_id)
        .await?;
    Ok(HttpResponse::NoContent().finish())
}
