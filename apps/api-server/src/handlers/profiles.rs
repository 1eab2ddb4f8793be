//! Profile pages.

use actix_web::{HttpResponse, web};
use uuid::Uuid;

use crate::middleware::auth::Identity;
use crate::middleware::error::{AppError, AppResult};
use crate::state::AppState;

/// GET /api/profiles/{uid}
pub async fn get_profile(
    state: web::Data<AppState>,
    _identity: Identity,
    path: web::Path<Uuid>,
) -> AppResult<HttpResponse> {
    let view = state.profiles.get_profile(path.into_inner()).await?;
    Ok(HttpResponse::Ok().json(view))
}

/// GET /api/profiles/by-username/{username}
pub async fn get_by_username(
    state: web::Data<AppState>,
    _identity: Identity,
    path: web::Path<String>,
) -> AppResult<HttpResponse> {
    let username = path.into_inner();
    let view = state
        .profiles
        .get_profile_by_username(&username)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("No user named {username}")))?;
    Ok(HttpResponse::Ok().json(view))
}
