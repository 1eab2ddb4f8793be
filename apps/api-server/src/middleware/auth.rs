//! Bearer token guard.

use actix_web::{FromRequest, HttpRequest, dev::Payload, http::StatusCode, http::header, web};
use std::future::{Ready, ready};
use uuid::Uuid;

use murmur_core::domain::{CommentAuthor, ProviderIdentity};
use murmur_core::ports::{AuthError, TokenClaims};
use murmur_shared::ErrorResponse;

use crate::state::AppState;

/// Authenticated caller, decoded from the bearer token.
///
/// Taking this as a handler argument guards the route:
/// ```ignore
/// async fn protected_route(identity: Identity) -> impl Responder {
///     format!("Hello, user {}!", identity.user_id)
/// }
/// ```
#[derive(Debug, Clone)]
pub struct Identity {
    pub user_id: Uuid,
    pub email: Option<String>,
    pub name: Option<String>,
    pub picture: Option<String>,
    /// Token expiry, seconds since the epoch.
    pub expires_at: i64,
}

impl Identity {
    pub fn comment_author(&self) -> CommentAuthor {
        CommentAuthor {
            id: self.user_id,
            name: self.name.clone().unwrap_or_default(),
            photo_url: self.picture.clone().unwrap_or_default(),
        }
    }

    pub fn provider_identity(&self) -> ProviderIdentity {
        ProviderIdentity {
            uid: self.user_id,
            display_name: self.name.clone(),
            email: self.email.clone(),
            photo_url: self.picture.clone(),
        }
    }
}

impl From<TokenClaims> for Identity {
    fn from(claims: TokenClaims) -> Self {
        Self {
            user_id: claims.user_id,
            email: claims.email,
            name: claims.name,
            picture: claims.picture,
            expires_at: claims.exp,
        }
    }
}

/// Error type for authentication failures.
#[derive(Debug, thiserror::Error)]
#[error("{error}")]
pub struct AuthenticationError {
    error: AuthError,
    path: String,
}

impl actix_web::ResponseError for AuthenticationError {
    fn status_code(&self) -> StatusCode {
        match &self.error {
            AuthError::TokenExpired | AuthError::InvalidToken(_) | AuthError::MissingAuth => {
                StatusCode::UNAUTHORIZED
            }
            AuthError::Signing(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn error_response(&self) -> actix_web::HttpResponse {
        let error = match &self.error {
            AuthError::TokenExpired => ErrorResponse::new(401, "Token Expired")
                .with_detail("Your session has expired. Please sign in again."),
            AuthError::InvalidToken(msg) => {
                ErrorResponse::new(401, "Invalid Token").with_detail(msg.clone())
            }
            AuthError::MissingAuth => ErrorResponse::unauthorized(
                "Please sign in: provide a Bearer token in the Authorization header.",
            ),
            AuthError::Signing(_) => ErrorResponse::internal_error(),
        };

        actix_web::HttpResponse::build(self.status_code()).json(error.with_instance(&self.path))
    }
}

fn bearer_token(req: &HttpRequest) -> Result<&str, AuthError> {
    let value = req
        .headers()
        .get(header::AUTHORIZATION)
        .ok_or(AuthError::MissingAuth)?;

    let value = value
        .to_str()
        .map_err(|_| AuthError::InvalidToken("Invalid authorization header".to_string()))?;

    value
        .strip_prefix("Bearer ")
        .ok_or_else(|| AuthError::InvalidToken("Expected Bearer token".to_string()))
}

impl FromRequest for Identity {
    type Error = AuthenticationError;
    type Future = Ready<Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _payload: &mut Payload) -> Self::Future {
        let result = match req.app_data::<web::Data<AppState>>() {
            Some(state) => bearer_token(req)
                .and_then(|token| state.tokens.validate_token(token))
                .map(Identity::from),
            None => {
                tracing::error!("AppState not found in app data");
                Err(AuthError::InvalidToken("Server configuration error".to_string()))
            }
        };

        if let Err(error) = &result {
            tracing::debug!(path = %req.path(), error = %error, "Rejected unauthenticated request");
        }

        ready(result.map_err(|error| AuthenticationError {
            error,
            path: req.path().to_string(),
        }))
    }
}
