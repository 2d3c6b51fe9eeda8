//! Authentication Middleware
//!
//! JWT validation middleware for protected routes. The bearer token is
//! decoded, the account is loaded from the database, and non-active
//! accounts are rejected even when their token is still valid.

use axum::{
    extract::{Request, State},
    http::header::AUTHORIZATION,
    middleware::Next,
    response::Response,
};
use jsonwebtoken::{decode, DecodingKey, Validation};
use uuid::Uuid;

use crate::application::services::Claims;
use crate::domain::{UserRepository, UserRole, UserStatus};
use crate::infrastructure::repositories::PgUserRepository;
use crate::shared::error::AppError;
use crate::startup::AppState;

/// Authenticated user extension
#[derive(Debug, Clone)]
pub struct AuthUser {
    pub id: Uuid,
    pub username: String,
    pub role: UserRole,
    pub status: UserStatus,
}

impl AuthUser {
    pub fn is_admin(&self) -> bool {
        self.role == UserRole::Admin
    }
}

/// Authentication middleware that validates JWT tokens and loads the
/// account behind them.
pub async fn auth_middleware(
    State(state): State<AppState>,
    mut request: Request,
    next: Next,
) -> Result<Response, AppError> {
    // Extract Authorization header
    let auth_header = request
        .headers()
        .get(AUTHORIZATION)
        .and_then(|h| h.to_str().ok())
        .ok_or_else(|| AppError::Unauthorized("Missing authorization header".into()))?;

    // Check for Bearer token
    let token = auth_header
        .strip_prefix("Bearer ")
        .ok_or_else(|| AppError::Unauthorized("Invalid authorization header format".into()))?;

    // Decode and validate JWT
    let token_data = decode::<Claims>(
        token,
        &DecodingKey::from_secret(state.settings.jwt.secret.as_bytes()),
        &Validation::default(),
    )
    .map_err(|e| match e.kind() {
        jsonwebtoken::errors::ErrorKind::ExpiredSignature => {
            AppError::Unauthorized("Token expired".into())
        }
        _ => AppError::Unauthorized("Invalid token".into()),
    })?;

    // Parse user ID from claims
    let user_id: Uuid = token_data
        .claims
        .sub
        .parse()
        .map_err(|_| AppError::Unauthorized("Invalid token claims".into()))?;

    // The account may have been deleted or moderated since the token was
    // issued; what matters is its current state
    let user_repo = PgUserRepository::new(state.db.clone());
    let user = user_repo
        .find_by_id(user_id)
        .await?
        .ok_or_else(|| AppError::Unauthorized("Invalid token".into()))?;

    match user.status {
        UserStatus::Active => {}
        UserStatus::Pending => {
            return Err(AppError::Forbidden("Account is awaiting review".into()));
        }
        UserStatus::Suspended => {
            return Err(AppError::Forbidden("Account is suspended".into()));
        }
        UserStatus::Banned => {
            return Err(AppError::Forbidden("Account is banned".into()));
        }
    }

    // Insert authenticated user into request extensions
    request.extensions_mut().insert(AuthUser {
        id: user.id,
        username: user.username,
        role: user.role,
        status: user.status,
    });

    // Continue to the next handler
    Ok(next.run(request).await)
}

/// Authorization middleware restricting a route tree to site admins.
/// Must run after `auth_middleware`.
pub async fn require_admin(request: Request, next: Next) -> Result<Response, AppError> {
    let auth_user = request
        .extensions()
        .get::<AuthUser>()
        .ok_or_else(|| AppError::Unauthorized("Missing authorization header".into()))?;

    if !auth_user.is_admin() {
        return Err(AppError::Forbidden("Administrator access required".into()));
    }

    Ok(next.run(request).await)
}
