//! Authentication middleware
//!
//! Resolves the Bearer token into a request-scoped [`AuthUser`] extension.
//! Handlers receive the authenticated principal as an argument; there is no
//! ambient global identity.

use axum::{
    extract::{Request, State},
    http::header::AUTHORIZATION,
    middleware::Next,
    response::Response,
};
use humantic_shared::types::UserRole;
use uuid::Uuid;

use crate::auth::jwt::JwtManager;
use crate::error::ApiError;

/// Shared state for the auth middleware
#[derive(Clone)]
pub struct AuthState {
    pub jwt: JwtManager,
}

/// Authenticated principal attached to each request
#[derive(Debug, Clone)]
pub struct AuthUser {
    pub id: Uuid,
    pub email: String,
    pub role: UserRole,
}

/// Require a valid Bearer token and attach the principal as an extension
pub async fn require_auth(
    State(auth): State<AuthState>,
    mut request: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let token = request
        .headers()
        .get(AUTHORIZATION)
        .and_then(|h| h.to_str().ok())
        .and_then(|h| h.strip_prefix("Bearer "))
        .ok_or(ApiError::Unauthorized)?;

    let claims = auth.jwt.validate_token(token).map_err(|e| {
        tracing::debug!("Token validation failed: {}", e);
        ApiError::InvalidToken
    })?;

    let user = AuthUser {
        id: claims.sub,
        email: claims.email,
        role: UserRole::from_str_lossy(&claims.role),
    };

    request.extensions_mut().insert(user);
    Ok(next.run(request).await)
}
