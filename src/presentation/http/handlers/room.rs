//! Room Handlers

use std::sync::Arc;

use axum::{
    extract::{Extension, Path, State},
    http::StatusCode,
    Json,
};
use uuid::Uuid;
use validator::Validate;

use crate::application::dto::request::{CreateRoomRequest, RespondJoinRequest};
use crate::application::dto::response::{
    ApiResponse, JoinRequestResponse, RoomMemberResponse, RoomResponse,
};
use crate::application::services::{
    JoinOutcome, JoinRequestAction, RoomError, RoomService, RoomServiceImpl,
};
use crate::domain::RoomType;
use crate::infrastructure::cache::RoomListCacheService;
use crate::infrastructure::repositories::{
    PgRoomJoinRequestRepository, PgRoomMemberRepository, PgRoomRepository,
};
use crate::presentation::middleware::AuthUser;
use crate::shared::error::AppError;
use crate::shared::validation::validation_error;
use crate::startup::AppState;

impl From<RoomError> for AppError {
    fn from(e: RoomError) -> Self {
        match e {
            RoomError::RoomNotFound
            | RoomError::MembershipNotFound
            | RoomError::JoinRequestNotFound
            | RoomError::KickTargetNotFound => AppError::NotFound(e.to_string()),
            RoomError::OwnerCannotLeave => AppError::BadRequest(e.to_string()),
            RoomError::MemberAccessRequired
            | RoomError::OnlyCreatorCanDelete
            | RoomError::JoinRequestAccessDenied
            | RoomError::KickAccessDenied
            | RoomError::CannotKickOwner => AppError::Forbidden(e.to_string()),
            RoomError::Internal(_) => AppError::Internal(e.to_string()),
        }
    }
}

/// Assemble the room service from request state.
fn room_service(
    state: &AppState,
) -> RoomServiceImpl<PgRoomRepository, PgRoomMemberRepository, PgRoomJoinRequestRepository> {
    RoomServiceImpl::new(
        Arc::new(PgRoomRepository::new(state.db.clone())),
        Arc::new(PgRoomMemberRepository::new(state.db.clone())),
        Arc::new(PgRoomJoinRequestRepository::new(state.db.clone())),
    )
}

fn room_list_cache(state: &AppState) -> RoomListCacheService {
    RoomListCacheService::new(state.redis.clone())
}

/// Create a room. The creator becomes its owner member.
pub async fn create_room(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthUser>,
    Json(body): Json<CreateRoomRequest>,
) -> Result<(StatusCode, Json<ApiResponse<RoomResponse>>), AppError> {
    body.validate().map_err(validation_error)?;

    let room_type = match body.room_type.as_deref() {
        None | Some("public") => RoomType::Public,
        Some("private") => RoomType::Private,
        Some(_) => {
            return Err(AppError::BadRequest(
                "Invalid room type. Must be 'public' or 'private'.".into(),
            ))
        }
    };

    let room = room_service(&state)
        .create_room(auth.id, &body.name, body.description.as_deref(), room_type)
        .await?;

    // Cache failures degrade to a stale listing until the TTL expires
    let _ = room_list_cache(&state).invalidate().await;

    Ok((
        StatusCode::CREATED,
        Json(ApiResponse::data_with_message(
            RoomResponse::from_room(room, auth.username, 1),
            "Room created",
        )),
    ))
}

/// Public room listing for the lobby. Served from cache when possible.
pub async fn list_rooms(
    State(state): State<AppState>,
) -> Result<Json<ApiResponse<Vec<RoomResponse>>>, AppError> {
    let cache = room_list_cache(&state);

    // Cache failures fall through to the database
    if let Ok(Some(rooms)) = cache.get_public_rooms().await {
        let list: Vec<RoomResponse> = rooms.into_iter().map(RoomResponse::from).collect();
        return Ok(Json(ApiResponse::data(list)));
    }

    let rooms = room_service(&state).list_public_rooms().await?;
    let _ = cache.set_public_rooms(&rooms).await;

    let list: Vec<RoomResponse> = rooms.into_iter().map(RoomResponse::from).collect();
    Ok(Json(ApiResponse::data(list)))
}

/// Join a room, or file a join request when it is private
pub async fn join_room(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthUser>,
    Path(room_id): Path<i64>,
) -> Result<(StatusCode, Json<ApiResponse<()>>), AppError> {
    let outcome = room_service(&state).join_room(auth.id, room_id).await?;

    let (status, message) = match outcome {
        JoinOutcome::Joined => (StatusCode::OK, "Joined the room"),
        JoinOutcome::AlreadyMember => (StatusCode::OK, "You are already a member of this room"),
        JoinOutcome::RequestSubmitted => (StatusCode::ACCEPTED, "Join request submitted"),
        JoinOutcome::RequestPending => (StatusCode::OK, "Join request already pending"),
    };

    Ok((status, Json(ApiResponse::message(message))))
}

/// Leave a room. The last member out deletes it.
pub async fn leave_room(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthUser>,
    Path(room_id): Path<i64>,
) -> Result<Json<ApiResponse<()>>, AppError> {
    let outcome = room_service(&state).leave_room(auth.id, room_id).await?;

    if outcome.room_deleted {
        let _ = room_list_cache(&state).invalidate().await;
        return Ok(Json(ApiResponse::message(
            "Left the room. The empty room was deleted.",
        )));
    }

    Ok(Json(ApiResponse::message("Left the room")))
}

/// List room members. Members and site admins only.
pub async fn list_members(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthUser>,
    Path(room_id): Path<i64>,
) -> Result<Json<ApiResponse<Vec<RoomMemberResponse>>>, AppError> {
    let entries = room_service(&state)
        .list_members(auth.id, auth.is_admin(), room_id)
        .await?;

    let members: Vec<RoomMemberResponse> =
        entries.into_iter().map(RoomMemberResponse::from).collect();
    Ok(Json(ApiResponse::data(members)))
}

/// List pending join requests. Room owner and site admins only.
pub async fn list_join_requests(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthUser>,
    Path(room_id): Path<i64>,
) -> Result<Json<ApiResponse<Vec<JoinRequestResponse>>>, AppError> {
    let entries = room_service(&state)
        .list_join_requests(auth.id, auth.is_admin(), room_id)
        .await?;

    let requests: Vec<JoinRequestResponse> =
        entries.into_iter().map(JoinRequestResponse::from).collect();
    Ok(Json(ApiResponse::data(requests)))
}

/// Approve or reject a pending join request
pub async fn respond_join_request(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthUser>,
    Path((room_id, request_id)): Path<(i64, i64)>,
    Json(body): Json<RespondJoinRequest>,
) -> Result<Json<ApiResponse<()>>, AppError> {
    let action = match body.action.as_str() {
        "approve" => JoinRequestAction::Approve,
        "reject" => JoinRequestAction::Reject,
        _ => {
            return Err(AppError::BadRequest(
                "Invalid action. Must be 'approve' or 'reject'.".into(),
            ))
        }
    };

    room_service(&state)
        .respond_join_request(auth.id, auth.is_admin(), room_id, request_id, action)
        .await?;

    let message = match action {
        JoinRequestAction::Approve => "Join request approved",
        JoinRequestAction::Reject => "Join request rejected",
    };
    Ok(Json(ApiResponse::message(message)))
}

/// Remove a member. Room owners kick from their own rooms, site admins
/// from any room.
pub async fn kick_member(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthUser>,
    Path((room_id, user_id)): Path<(i64, Uuid)>,
) -> Result<Json<ApiResponse<()>>, AppError> {
    room_service(&state)
        .kick_member(auth.id, auth.is_admin(), room_id, user_id)
        .await?;

    Ok(Json(ApiResponse::message("Member removed from the room")))
}

/// Delete a room. Creator only; memberships and join requests cascade.
pub async fn delete_room(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthUser>,
    Path(room_id): Path<i64>,
) -> Result<Json<ApiResponse<()>>, AppError> {
    room_service(&state).delete_room(auth.id, room_id).await?;

    let _ = room_list_cache(&state).invalidate().await;

    Ok(Json(ApiResponse::message("Room deleted")))
}
