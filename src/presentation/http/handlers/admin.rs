//! Admin Console Handlers
//!
//! All routes here sit behind the admin guard. Per-operation rules
//! (self-deletion, approver recording) live in the admin service.

use std::sync::Arc;

use axum::{
    extract::{Extension, Path, Query, State},
    Json,
};
use uuid::Uuid;
use validator::Validate;

use crate::application::dto::request::{
    RoomListParams, UpdateRoomRequest, UpdateUserPasswordRequest, UpdateUserRoleRequest,
    UpdateUserStatusRequest, UserListParams,
};
use crate::application::dto::response::{ApiResponse, RoomListResponse, UserListResponse};
use crate::application::services::{AdminError, AdminService, AdminServiceImpl};
use crate::domain::{UserRole, UserStatus};
use crate::infrastructure::cache::RoomListCacheService;
use crate::infrastructure::repositories::{PgRoomRepository, PgUserRepository};
use crate::presentation::middleware::AuthUser;
use crate::shared::error::AppError;
use crate::shared::validation::validation_error;
use crate::startup::AppState;

const DEFAULT_PAGE: i64 = 1;
const DEFAULT_LIMIT: i64 = 20;

impl From<AdminError> for AppError {
    fn from(e: AdminError) -> Self {
        match e {
            AdminError::UserNotFound | AdminError::RoomNotFound => {
                AppError::NotFound(e.to_string())
            }
            AdminError::SelfDeletion => AppError::BadRequest(e.to_string()),
            AdminError::HashingError(_) | AdminError::Internal(_) => {
                AppError::Internal(e.to_string())
            }
        }
    }
}

/// Assemble the admin service from request state.
fn admin_service(state: &AppState) -> AdminServiceImpl<PgUserRepository, PgRoomRepository> {
    AdminServiceImpl::new(
        Arc::new(PgUserRepository::new(state.db.clone())),
        Arc::new(PgRoomRepository::new(state.db.clone())),
    )
}

/// Strict status parse for admin input. `UserStatus::from_str` is lenient
/// by design (it defaults), which is wrong for moderation commands.
fn parse_status(s: &str) -> Result<UserStatus, AppError> {
    match s {
        "pending" => Ok(UserStatus::Pending),
        "active" => Ok(UserStatus::Active),
        "suspended" => Ok(UserStatus::Suspended),
        "banned" => Ok(UserStatus::Banned),
        _ => Err(AppError::BadRequest(
            "Invalid status. Must be one of 'pending', 'active', 'suspended', 'banned'.".into(),
        )),
    }
}

fn parse_role(s: &str) -> Result<UserRole, AppError> {
    match s {
        "user" => Ok(UserRole::User),
        "moderator" => Ok(UserRole::Moderator),
        "admin" => Ok(UserRole::Admin),
        _ => Err(AppError::BadRequest(
            "Invalid role. Must be one of 'user', 'moderator', 'admin'.".into(),
        )),
    }
}

/// Paginated user listing with optional status filter and username search
pub async fn list_users(
    State(state): State<AppState>,
    Query(params): Query<UserListParams>,
) -> Result<Json<ApiResponse<UserListResponse>>, AppError> {
    let status = params.status.as_deref().map(parse_status).transpose()?;

    let page = admin_service(&state)
        .list_users(
            params.page.unwrap_or(DEFAULT_PAGE),
            params.limit.unwrap_or(DEFAULT_LIMIT),
            status,
            params.search.as_deref(),
        )
        .await?;

    Ok(Json(ApiResponse::data(UserListResponse::from(page))))
}

/// Change an account's status, optionally recording a moderation note
pub async fn update_user_status(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthUser>,
    Path(user_id): Path<Uuid>,
    Json(body): Json<UpdateUserStatusRequest>,
) -> Result<Json<ApiResponse<()>>, AppError> {
    body.validate().map_err(validation_error)?;
    let status = parse_status(&body.status)?;

    admin_service(&state)
        .update_user_status(auth.id, user_id, status, body.admin_note.as_deref())
        .await?;

    Ok(Json(ApiResponse::message("User status updated")))
}

/// Change an account's site-wide role
pub async fn update_user_role(
    State(state): State<AppState>,
    Path(user_id): Path<Uuid>,
    Json(body): Json<UpdateUserRoleRequest>,
) -> Result<Json<ApiResponse<()>>, AppError> {
    let role = parse_role(&body.role)?;

    admin_service(&state).update_user_role(user_id, role).await?;

    Ok(Json(ApiResponse::message("User role updated")))
}

/// Set a new password on behalf of a user
pub async fn update_user_password(
    State(state): State<AppState>,
    Path(user_id): Path<Uuid>,
    Json(body): Json<UpdateUserPasswordRequest>,
) -> Result<Json<ApiResponse<()>>, AppError> {
    body.validate().map_err(validation_error)?;

    admin_service(&state)
        .update_user_password(user_id, &body.new_password)
        .await?;

    Ok(Json(ApiResponse::message("Password updated")))
}

/// Delete a user account. Admins cannot delete themselves.
pub async fn delete_user(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthUser>,
    Path(user_id): Path<Uuid>,
) -> Result<Json<ApiResponse<()>>, AppError> {
    admin_service(&state).delete_user(auth.id, user_id).await?;

    Ok(Json(ApiResponse::message("User deleted")))
}

/// Paginated listing of all rooms, public and private
pub async fn list_rooms(
    State(state): State<AppState>,
    Query(params): Query<RoomListParams>,
) -> Result<Json<ApiResponse<RoomListResponse>>, AppError> {
    let page = admin_service(&state)
        .list_rooms(
            params.page.unwrap_or(DEFAULT_PAGE),
            params.limit.unwrap_or(DEFAULT_LIMIT),
        )
        .await?;

    Ok(Json(ApiResponse::data(RoomListResponse::from(page))))
}

/// Update a room's name and/or description
pub async fn update_room(
    State(state): State<AppState>,
    Path(room_id): Path<i64>,
    Json(body): Json<UpdateRoomRequest>,
) -> Result<Json<ApiResponse<()>>, AppError> {
    body.validate().map_err(validation_error)?;

    admin_service(&state)
        .update_room(room_id, body.name.as_deref(), body.description.as_deref())
        .await?;

    let _ = RoomListCacheService::new(state.redis.clone()).invalidate().await;

    Ok(Json(ApiResponse::message("Room updated")))
}

/// Delete any room regardless of ownership
pub async fn delete_room(
    State(state): State<AppState>,
    Path(room_id): Path<i64>,
) -> Result<Json<ApiResponse<()>>, AppError> {
    admin_service(&state).delete_room(room_id).await?;

    let _ = RoomListCacheService::new(state.redis.clone()).invalidate().await;

    Ok(Json(ApiResponse::message("Room deleted")))
}
