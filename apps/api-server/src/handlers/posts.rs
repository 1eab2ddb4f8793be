//! Post handlers.

use actix_web::{HttpResponse, web};
use uuid::Uuid;

use murmur_shared::dto::{CreatePostRequest, ShareResponse, ToggleResponse};

use crate::middleware::auth::Identity;
use crate::middleware::error::AppResult;
use crate::state::AppState;

/// POST /api/posts
pub async fn create_post(
    state: web::Data<AppState>,
    identity: Identity,
    body: web::Json<CreatePostRequest>,
) -> AppResult<HttpResponse> {
    let post = state
        .actions
        .create_post(identity.user_id, &body.content)
        .await?;
    Ok(HttpResponse::Created().json(post))
}

/// GET /api/posts/{id}
pub async fn get_post(
    state: web::Data<AppState>,
    _identity: Identity,
    path: web::Path<Uuid>,
) -> AppResult<HttpResponse> {
    let post = state.actions.get_post(path.into_inner()).await?;
    Ok(HttpResponse::Ok().json(post))
}

/// DELETE /api/posts/{id} - author only.
pub async fn delete_post(
    state: web::Data<AppState>,
    identity: Identity,
    path: web::Path<Uuid>,
) -> AppResult<HttpResponse> {
    state
        .actions
        .delete_post(path.into_inner(), identity.user_id)
        .await?;
    Ok(HttpResponse::NoContent().finish())
}

/// POST /api/posts/{id}/like
pub async fn toggle_like(
    state: web::Data<AppState>,
    identity: Identity,
    path: web::Path<Uuid>,
) -> AppResult<HttpResponse> {
    let post_id = path.into_inner();
    let active = state.actions.toggle_like(post_id, identity.user_id).await?;
    Ok(HttpResponse::Ok().json(ToggleResponse { post_id, active }))
}

/// POST /api/posts/{id}/bookmark
pub async fn toggle_bookmark(
    state: web::Data<AppState>,
    identity: Identity,
    path: web::Path<Uuid>,
) -> AppResult<HttpResponse> {
    let post_id = path.into_inner();
    let active = state
        .actions
        .toggle_bookmark(post_id, identity.user_id)
        .await?;
    Ok(HttpResponse::Ok().json(ToggleResponse { post_id, active }))
}

/// GET /api/posts/{id}/share
pub async fn share_link(
    state: web::Data<AppState>,
    _identity: Identity,
    path: web::Path<Uuid>,
) -> AppResult<HttpResponse> {
    let post = state.actions.get_post(path.into_inner()).await?;
    Ok(HttpResponse::Ok().json(ShareResponse {
        url: state.actions.share_link(post.id),
    }))
}
