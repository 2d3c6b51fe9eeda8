//! Friend Handlers

use std::sync::Arc;

use axum::{
    extract::{Extension, Path, State},
    http::StatusCode,
    Json,
};
use uuid::Uuid;

use crate::application::dto::request::RespondFriendRequest;
use crate::application::dto::response::{ApiResponse, FriendRequestResponse, FriendResponse};
use crate::application::services::{
    FriendError, FriendRequestAction, FriendService, FriendServiceImpl,
};
use crate::infrastructure::repositories::{PgFriendshipRepository, PgUserRepository};
use crate::presentation::middleware::AuthUser;
use crate::shared::error::AppError;
use crate::startup::AppState;

impl From<FriendError> for AppError {
    fn from(e: FriendError) -> Self {
        match e {
            FriendError::UserNotFound | FriendError::RequestNotFound | FriendError::NotFriends => {
                AppError::NotFound(e.to_string())
            }
            FriendError::CannotFriendSelf
            | FriendError::AlreadyFriends
            | FriendError::RequestAlreadySent
            | FriendError::RequestAlreadyReceived
            | FriendError::BlockedByYou
            | FriendError::CannotBlockSelf => AppError::BadRequest(e.to_string()),
            FriendError::BlockedByThem | FriendError::CannotRespondToOwnRequest => {
                AppError::Forbidden(e.to_string())
            }
            FriendError::Internal(_) => AppError::Internal(e.to_string()),
        }
    }
}

/// Assemble the friend service from request state.
fn friend_service(
    state: &AppState,
) -> FriendServiceImpl<PgFriendshipRepository, PgUserRepository> {
    FriendServiceImpl::new(
        Arc::new(PgFriendshipRepository::new(state.db.clone())),
        Arc::new(PgUserRepository::new(state.db.clone())),
    )
}

/// List accepted friends
pub async fn list_friends(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthUser>,
) -> Result<Json<ApiResponse<Vec<FriendResponse>>>, AppError> {
    let entries = friend_service(&state).list_friends(auth.id).await?;

    let friends: Vec<FriendResponse> = entries.into_iter().map(FriendResponse::from).collect();
    Ok(Json(ApiResponse::data(friends)))
}

/// List incoming pending friend requests
pub async fn list_requests(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthUser>,
) -> Result<Json<ApiResponse<Vec<FriendRequestResponse>>>, AppError> {
    let entries = friend_service(&state).list_requests(auth.id).await?;

    let requests: Vec<FriendRequestResponse> =
        entries.into_iter().map(FriendRequestResponse::from).collect();
    Ok(Json(ApiResponse::data(requests)))
}

/// Send a friend request to a user by username
pub async fn send_request(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthUser>,
    Path(username): Path<String>,
) -> Result<(StatusCode, Json<ApiResponse<()>>), AppError> {
    friend_service(&state).send_request(auth.id, &username).await?;

    Ok((
        StatusCode::CREATED,
        Json(ApiResponse::message("Friend request sent")),
    ))
}

/// Accept or reject a pending friend request
pub async fn respond_request(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthUser>,
    Path(friendship_id): Path<i64>,
    Json(body): Json<RespondFriendRequest>,
) -> Result<Json<ApiResponse<()>>, AppError> {
    let action = match body.action.as_str() {
        "accept" => FriendRequestAction::Accept,
        "reject" => FriendRequestAction::Reject,
        _ => {
            return Err(AppError::BadRequest(
                "Invalid action. Must be 'accept' or 'reject'.".into(),
            ))
        }
    };

    friend_service(&state)
        .respond(auth.id, friendship_id, action)
        .await?;

    let message = match action {
        FriendRequestAction::Accept => "Friend request accepted",
        FriendRequestAction::Reject => "Friend request rejected",
    };
    Ok(Json(ApiResponse::message(message)))
}

/// Remove an accepted friend
pub async fn remove_friend(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthUser>,
    Path(friend_id): Path<Uuid>,
) -> Result<Json<ApiResponse<()>>, AppError> {
    friend_service(&state).remove_friend(auth.id, friend_id).await?;

    Ok(Json(ApiResponse::message("Friend removed")))
}

/// Block a user
pub async fn block_user(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthUser>,
    Path(user_id): Path<Uuid>,
) -> Result<Json<ApiResponse<()>>, AppError> {
    friend_service(&state).block_user(auth.id, user_id).await?;

    Ok(Json(ApiResponse::message("User blocked")))
}
