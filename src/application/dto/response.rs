//! Response DTOs
//!
//! Data structures for API response bodies. Every endpoint wraps its
//! payload in the `{success, data|message}` envelope; numeric database ids
//! are rendered as strings for JavaScript clients.

use serde::Serialize;

use crate::application::services::{AuthTokens, RoomPage, UserPage};
use crate::domain::{FriendEntry, JoinRequestEntry, Room, RoomMemberEntry, RoomSummary, User};

/// Standard response envelope.
#[derive(Debug, Serialize)]
pub struct ApiResponse<T: Serialize> {
    pub success: bool,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

impl<T: Serialize> ApiResponse<T> {
    /// Successful response carrying a payload.
    pub fn data(data: T) -> Self {
        Self {
            success: true,
            data: Some(data),
            message: None,
        }
    }

    /// Successful response carrying a payload and a human-readable message.
    pub fn data_with_message(data: T, message: impl Into<String>) -> Self {
        Self {
            success: true,
            data: Some(data),
            message: Some(message.into()),
        }
    }
}

impl ApiResponse<()> {
    /// Successful response carrying only a message.
    pub fn message(message: impl Into<String>) -> Self {
        Self {
            success: true,
            data: None,
            message: Some(message.into()),
        }
    }
}

/// Authentication tokens response
#[derive(Debug, Serialize)]
pub struct TokenResponse {
    pub access_token: String,
    pub refresh_token: String,
    pub expires_in: i64,
    pub token_type: String,
}

impl From<AuthTokens> for TokenResponse {
    fn from(tokens: AuthTokens) -> Self {
        Self {
            access_token: tokens.access_token,
            refresh_token: tokens.refresh_token,
            expires_in: tokens.expires_in,
            token_type: tokens.token_type,
        }
    }
}

/// User profile response
#[derive(Debug, Serialize)]
pub struct UserResponse {
    pub id: String,
    pub username: String,
    pub role: String,
    pub status: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub note: Option<String>,
    pub created_at: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_login_at: Option<String>,
}

impl UserResponse {
    pub fn from_user(user: User) -> Self {
        Self {
            id: user.id.to_string(),
            username: user.username,
            role: user.role.as_str().to_string(),
            status: user.status.as_str().to_string(),
            note: user.note,
            created_at: user.created_at.to_rfc3339(),
            last_login_at: user.last_login_at.map(|t| t.to_rfc3339()),
        }
    }
}

/// User response for the admin console, including moderation fields.
#[derive(Debug, Serialize)]
pub struct AdminUserResponse {
    pub id: String,
    pub username: String,
    pub role: String,
    pub status: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub note: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub admin_note: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub approved_by: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub approved_at: Option<String>,
    pub created_at: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_login_at: Option<String>,
}

impl AdminUserResponse {
    pub fn from_user(user: User) -> Self {
        Self {
            id: user.id.to_string(),
            username: user.username,
            role: user.role.as_str().to_string(),
            status: user.status.as_str().to_string(),
            note: user.note,
            admin_note: user.admin_note,
            approved_by: user.approved_by.map(|id| id.to_string()),
            approved_at: user.approved_at.map(|t| t.to_rfc3339()),
            created_at: user.created_at.to_rfc3339(),
            last_login_at: user.last_login_at.map(|t| t.to_rfc3339()),
        }
    }
}

/// Login response (user profile and tokens)
#[derive(Debug, Serialize)]
pub struct LoginResponse {
    pub user: UserResponse,
    pub access_token: String,
    pub refresh_token: String,
    pub expires_in: i64,
    pub token_type: String,
}

impl LoginResponse {
    pub fn new(user: User, tokens: AuthTokens) -> Self {
        Self {
            user: UserResponse::from_user(user),
            access_token: tokens.access_token,
            refresh_token: tokens.refresh_token,
            expires_in: tokens.expires_in,
            token_type: tokens.token_type,
        }
    }
}

/// Password reset: step 1 response
#[derive(Debug, Serialize)]
pub struct ResetRequestResponse {
    pub reset_request_id: String,
}

/// Password reset: step 2 response
#[derive(Debug, Serialize)]
pub struct ResetVerifyResponse {
    pub verification_token: String,
}

/// A friend in the friends listing
#[derive(Debug, Serialize)]
pub struct FriendResponse {
    /// The friend's user id
    pub id: String,
    pub username: String,
    pub friendship_id: String,
}

impl From<FriendEntry> for FriendResponse {
    fn from(entry: FriendEntry) -> Self {
        Self {
            id: entry.user_id.to_string(),
            username: entry.username,
            friendship_id: entry.friendship_id.to_string(),
        }
    }
}

/// Sender info embedded in a friend request response
#[derive(Debug, Serialize)]
pub struct FriendRequestUser {
    pub id: String,
    pub username: String,
}

/// An incoming friend request
#[derive(Debug, Serialize)]
pub struct FriendRequestResponse {
    /// The friendship row id, used to accept or reject
    pub id: String,
    pub user: FriendRequestUser,
}

impl From<FriendEntry> for FriendRequestResponse {
    fn from(entry: FriendEntry) -> Self {
        Self {
            id: entry.friendship_id.to_string(),
            user: FriendRequestUser {
                id: entry.user_id.to_string(),
                username: entry.username,
            },
        }
    }
}

/// Room response
#[derive(Debug, Serialize)]
pub struct RoomResponse {
    pub id: String,
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub room_type: String,
    pub creator_id: String,
    pub creator_username: String,
    pub member_count: i64,
    pub last_active_at: String,
    pub created_at: String,
}

impl From<RoomSummary> for RoomResponse {
    fn from(summary: RoomSummary) -> Self {
        Self {
            id: summary.id.to_string(),
            name: summary.name,
            description: summary.description,
            room_type: summary.room_type.as_str().to_string(),
            creator_id: summary.creator_id.to_string(),
            creator_username: summary.creator_username,
            member_count: summary.member_count,
            last_active_at: summary.last_active_at.to_rfc3339(),
            created_at: summary.created_at.to_rfc3339(),
        }
    }
}

impl RoomResponse {
    /// Build a response for a freshly created room, before any listing
    /// query has run.
    pub fn from_room(room: Room, creator_username: String, member_count: i64) -> Self {
        Self {
            id: room.id.to_string(),
            name: room.name,
            description: room.description,
            room_type: room.room_type.as_str().to_string(),
            creator_id: room.creator_id.to_string(),
            creator_username,
            member_count,
            last_active_at: room.last_active_at.to_rfc3339(),
            created_at: room.created_at.to_rfc3339(),
        }
    }
}

/// A member in the room member listing
#[derive(Debug, Serialize)]
pub struct RoomMemberResponse {
    pub user_id: String,
    pub username: String,
    pub role: String,
    pub joined_at: String,
}

impl From<RoomMemberEntry> for RoomMemberResponse {
    fn from(entry: RoomMemberEntry) -> Self {
        Self {
            user_id: entry.user_id.to_string(),
            username: entry.username,
            role: entry.role.as_str().to_string(),
            joined_at: entry.joined_at.to_rfc3339(),
        }
    }
}

/// A pending join request in the owner's review queue
#[derive(Debug, Serialize)]
pub struct JoinRequestResponse {
    pub id: String,
    pub user: FriendRequestUser,
    pub requested_at: String,
}

impl From<JoinRequestEntry> for JoinRequestResponse {
    fn from(entry: JoinRequestEntry) -> Self {
        Self {
            id: entry.request_id.to_string(),
            user: FriendRequestUser {
                id: entry.user_id.to_string(),
                username: entry.username,
            },
            requested_at: entry.requested_at.to_rfc3339(),
        }
    }
}

/// Page bookkeeping for the admin listings
#[derive(Debug, Serialize)]
pub struct PaginationMeta {
    pub page: i64,
    pub limit: i64,
    pub total: i64,
    pub total_pages: i64,
}

/// Paginated user listing (admin console)
#[derive(Debug, Serialize)]
pub struct UserListResponse {
    pub users: Vec<AdminUserResponse>,
    pub pagination: PaginationMeta,
}

impl From<UserPage> for UserListResponse {
    fn from(page: UserPage) -> Self {
        Self {
            users: page
                .users
                .into_iter()
                .map(AdminUserResponse::from_user)
                .collect(),
            pagination: PaginationMeta {
                page: page.page,
                limit: page.limit,
                total: page.total,
                total_pages: page.total_pages,
            },
        }
    }
}

/// Paginated room listing (admin console)
#[derive(Debug, Serialize)]
pub struct RoomListResponse {
    pub rooms: Vec<RoomResponse>,
    pub pagination: PaginationMeta,
}

impl From<RoomPage> for RoomListResponse {
    fn from(page: RoomPage) -> Self {
        Self {
            rooms: page.rooms.into_iter().map(RoomResponse::from).collect(),
            pagination: PaginationMeta {
                page: page.page,
                limit: page.limit,
                total: page.total,
                total_pages: page.total_pages,
            },
        }
    }
}
