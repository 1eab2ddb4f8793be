//! Authentication ports.
//!
//! Sign-in itself happens at an external identity provider. These ports
//! only mint and check the bearer tokens that guard the API.

use uuid::Uuid;

use crate::domain::ProviderIdentity;

/// Claims carried by a bearer token.
#[derive(Debug, Clone)]
pub struct TokenClaims {
    pub user_id: Uuid,
    pub email: Option<String>,
    pub name: Option<String>,
    pub picture: Option<String>,
    pub exp: i64,
}

impl From<TokenClaims> for ProviderIdentity {
    fn from(claims: TokenClaims) -> Self {
        Self {
            uid: claims.user_id,
            display_name: claims.name,
            email: claims.email,
            photo_url: claims.picture,
        }
    }
}

/// Token service trait for JWT operations.
pub trait TokenService: Send + Sync {
    /// Issue a token for a signed-in identity.
    fn generate_token(&self, identity: &ProviderIdentity) -> Result<String, AuthError>;

    /// Validate and decode a token.
    fn validate_token(&self, token: &str) -> Result<TokenClaims, AuthError>;

    /// Lifetime of issued tokens.
    fn expiration_seconds(&self) -> i64;
}

/// Authentication errors.
#[derive(Debug, thiserror::Error)]
pub enum AuthError {
    #[error("Token expired")]
    TokenExpired,

    #[error("Invalid token: {0}")]
    InvalidToken(String),

    #[error("Missing authorization header")]
    MissingAuth,

    #[error("Token signing failed: {0}")]
    Signing(String),
}
