//! Authentication Handlers

use std::sync::Arc;

use axum::{
    extract::{Extension, State},
    http::StatusCode,
    Json,
};
use validator::Validate;

use crate::application::dto::request::{
    LoginRequest, RefreshTokenRequest, RegisterRequest, RequestPasswordResetRequest,
    ResetPasswordRequest, VerifyResetCodeRequest,
};
use crate::application::dto::response::{
    ApiResponse, LoginResponse, ResetRequestResponse, ResetVerifyResponse, TokenResponse,
    UserResponse,
};
use crate::application::services::{AuthError, AuthService, AuthServiceImpl};
use crate::infrastructure::repositories::{
    PgPasswordResetRepository, PgSessionRepository, PgUserRepository,
};
use crate::presentation::middleware::AuthUser;
use crate::shared::error::AppError;
use crate::shared::validation::validation_error;
use crate::startup::AppState;

impl From<AuthError> for AppError {
    fn from(e: AuthError) -> Self {
        match e {
            AuthError::InvalidCredentials
            | AuthError::SessionNotFound
            | AuthError::TokenExpired
            | AuthError::InvalidToken => AppError::Unauthorized(e.to_string()),
            AuthError::AccountPending | AuthError::AccountSuspended | AuthError::AccountBanned => {
                AppError::Forbidden(e.to_string())
            }
            AuthError::UsernameExists => AppError::Conflict(e.to_string()),
            AuthError::UserNotFound | AuthError::ResetRequestNotFound => {
                AppError::NotFound(e.to_string())
            }
            AuthError::InvalidResetCode | AuthError::ResetRequestExpired => {
                AppError::BadRequest(e.to_string())
            }
            AuthError::HashingError(_) | AuthError::Repository(_) => {
                AppError::Internal(e.to_string())
            }
        }
    }
}

/// Assemble the auth service from request state.
fn auth_service(
    state: &AppState,
) -> AuthServiceImpl<PgUserRepository, PgSessionRepository, PgPasswordResetRepository> {
    AuthServiceImpl::new(
        Arc::new(PgUserRepository::new(state.db.clone())),
        Arc::new(PgSessionRepository::new(state.db.clone())),
        Arc::new(PgPasswordResetRepository::new(state.db.clone())),
        state.settings.jwt.clone(),
        state.settings.password_reset.clone(),
    )
}

/// Register a new account. The account starts out pending review, so no
/// tokens are issued here.
pub async fn register(
    State(state): State<AppState>,
    Json(body): Json<RegisterRequest>,
) -> Result<(StatusCode, Json<ApiResponse<UserResponse>>), AppError> {
    body.validate().map_err(validation_error)?;

    let user = auth_service(&state)
        .register(&body.username, &body.password, body.note.as_deref())
        .await?;

    Ok((
        StatusCode::CREATED,
        Json(ApiResponse::data_with_message(
            UserResponse::from_user(user),
            "Registration successful. Your account is awaiting review.",
        )),
    ))
}

/// Login with username and password
pub async fn login(
    State(state): State<AppState>,
    Json(body): Json<LoginRequest>,
) -> Result<Json<ApiResponse<LoginResponse>>, AppError> {
    body.validate().map_err(validation_error)?;

    let (user, tokens) = auth_service(&state)
        .authenticate(&body.username, &body.password)
        .await?;

    Ok(Json(ApiResponse::data(LoginResponse::new(user, tokens))))
}

/// Exchange a refresh token for a fresh token pair
pub async fn refresh_token(
    State(state): State<AppState>,
    Json(body): Json<RefreshTokenRequest>,
) -> Result<Json<ApiResponse<TokenResponse>>, AppError> {
    let tokens = auth_service(&state)
        .refresh_token(&body.refresh_token)
        .await?;

    Ok(Json(ApiResponse::data(TokenResponse::from(tokens))))
}

/// Logout: revoke the session behind the refresh token
pub async fn logout(
    State(state): State<AppState>,
    Json(body): Json<RefreshTokenRequest>,
) -> Result<StatusCode, AppError> {
    auth_service(&state).revoke_token(&body.refresh_token).await?;

    Ok(StatusCode::NO_CONTENT)
}

/// Get the authenticated user's own profile
pub async fn me(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthUser>,
) -> Result<Json<ApiResponse<UserResponse>>, AppError> {
    let user = auth_service(&state).get_current_user(auth.id).await?;

    Ok(Json(ApiResponse::data(UserResponse::from_user(user))))
}

/// Start a password reset for the given username
pub async fn request_password_reset(
    State(state): State<AppState>,
    Json(body): Json<RequestPasswordResetRequest>,
) -> Result<Json<ApiResponse<ResetRequestResponse>>, AppError> {
    body.validate().map_err(validation_error)?;

    let reset_request_id = auth_service(&state)
        .request_password_reset(&body.username)
        .await?;

    Ok(Json(ApiResponse::data_with_message(
        ResetRequestResponse {
            reset_request_id: reset_request_id.to_string(),
        },
        "Reset code issued. An administrator will deliver it to you.",
    )))
}

/// Verify a reset code and mint the one-time verification token
pub async fn verify_reset_code(
    State(state): State<AppState>,
    Json(body): Json<VerifyResetCodeRequest>,
) -> Result<Json<ApiResponse<ResetVerifyResponse>>, AppError> {
    body.validate().map_err(validation_error)?;

    let verification_token = auth_service(&state)
        .verify_reset_code(body.reset_request_id, &body.reset_code)
        .await?;

    Ok(Json(ApiResponse::data(ResetVerifyResponse {
        verification_token,
    })))
}

/// Consume a verification token and set the new password
pub async fn reset_password(
    State(state): State<AppState>,
    Json(body): Json<ResetPasswordRequest>,
) -> Result<Json<ApiResponse<()>>, AppError> {
    body.validate().map_err(validation_error)?;

    auth_service(&state)
        .reset_password(&body.verification_token, &body.new_password)
        .await?;

    Ok(Json(ApiResponse::message(
        "Password has been reset. Please log in again.",
    )))
}
