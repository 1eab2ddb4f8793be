//! Authentication handlers.
//!
//! Users sign in at an external identity provider; the API only sees the
//! resulting bearer token.

use actix_web::{HttpResponse, web};
use chrono::DateTime;
use uuid::Uuid;

use murmur_core::domain::ProviderIdentity;
use murmur_shared::dto::{AuthResponse, DevTokenRequest, MeResponse};

use crate::middleware::auth::Identity;
use crate::middleware::error::{AppError, AppResult};
use crate::state::AppState;

/// POST /api/auth/dev-token - local stand-in for the identity provider.
pub async fn dev_token(
    state: web::Data<AppState>,
    body: web::Json<DevTokenRequest>,
) -> AppResult<HttpResponse> {
    if !state.dev_tokens {
        return Err(AppError::NotFound("Development tokens are disabled".to_string()));
    }

    let req = body.into_inner();
    let identity = ProviderIdentity {
        uid: req.uid.unwrap_or_else(Uuid::new_v4),
        display_name: req.display_name,
        email: req.email,
        photo_url: req.photo_url,
    };

    let token = state
        .tokens
        .generate_token(&identity)
        .map_err(|e| AppError::Internal(e.to_string()))?;

    tracing::warn!(uid = %identity.uid, "Issued development token");

    Ok(HttpResponse::Created().json(AuthResponse {
        access_token: token,
        token_type: "Bearer".to_string(),
        expires_in: u64::try_from(state.tokens.expiration_seconds()).unwrap_or(0),
    }))
}

/// POST /api/auth/session - create or refresh the caller's profile.
pub async fn sign_in(state: web::Data<AppState>, identity: Identity) -> AppResult<HttpResponse> {
    let profile = state
        .profiles
        .sign_in(&identity.provider_identity())
        .await?;

    Ok(HttpResponse::Ok().json(profile))
}

/// GET /api/auth/me
pub async fn me(identity: Identity) -> AppResult<HttpResponse> {
    let expires_at = DateTime::from_timestamp(identity.expires_at, 0)
        .ok_or_else(|| AppError::BadRequest("Token expiry out of range".to_string()))?;

    Ok(HttpResponse::Ok().json(MeResponse {
        user_id: identity.user_id,
        email: identity.email,
        name: identity.name,
        expires_at,
    }))
}
