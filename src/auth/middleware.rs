// Identity extractors for protected routes

use axum::{
    async_trait,
    extract::{FromRef, FromRequestParts},
    http::{header, request::Parts},
};
use std::sync::Arc;
use tracing::{debug, warn};

use crate::auth::{
    error::AuthError,
    models::{Identity, Role},
    token::TokenService,
};

/// Authenticated user extractor for protected routes
#[derive(Debug, Clone, Copy)]
pub struct AuthenticatedUser {
    pub user_id: i32,
    pub role: Role,
}

impl AuthenticatedUser {
    pub fn identity(&self) -> Identity {
        Identity::new(self.user_id, self.role)
    }
}

#[async_trait]
impl<S> FromRequestParts<S> for AuthenticatedUser
where
    Arc<TokenService>: FromRef<S>,
    S: Send + Sync,
{
    type Rejection = AuthError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let auth_header = parts
            .headers
            .get(header::AUTHORIZATION)
            .ok_or(AuthError::MissingToken)?
            .to_str()
            .map_err(|_| AuthError::InvalidToken)?;

        let token = auth_header.strip_prefix("Bearer ").ok_or_else(|| {
            warn!(
                "Authorization header missing 'Bearer ' prefix for endpoint: {}",
                parts.uri.path()
            );
            AuthError::InvalidToken
        })?;

        let token_service = Arc::<TokenService>::from_ref(state);
        let claims = token_service.validate_access_token(token)?;

        Ok(AuthenticatedUser {
            user_id: claims.sub,
            role: claims.role,
        })
    }
}

/// Extractor that only admits identities with the admin role
#[derive(Debug, Clone, Copy)]
pub struct AdminUser(pub AuthenticatedUser);

#[async_trait]
impl<S> FromRequestParts<S> for AdminUser
where
    Arc<TokenService>: FromRef<S>,
    S: Send + Sync,
{
    type Rejection = AuthError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let user = AuthenticatedUser::from_request_parts(parts, state).await?;
        match user.role {
            Role::Admin => {
                debug!(
                    "Authorization successful: user_id={}, endpoint={}",
                    user.user_id,
                    parts.uri.path()
                );
                Ok(AdminUser(user))
            }
            Role::User => {
                warn!(
                    "Authorization failed: user_id={}, required_role=admin, endpoint={}",
                    user.user_id,
                    parts.uri.path()
                );
                Err(AuthError::InsufficientPermissions {
                    required: Role::Admin,
                    actual: user.role,
                })
            }
        }
    }
}
