//! Request DTOs
//!
//! Data structures for API request bodies.

use serde::Deserialize;
use validator::Validate;

/// Registration request
#[derive(Debug, Deserialize, Validate)]
pub struct RegisterRequest {
    #[validate(length(min = 3, max = 50, message = "Username must be 3-50 characters"))]
    pub username: String,

    #[validate(length(min = 6, message = "Password must be at least 6 characters"))]
    pub password: String,

    /// Free-text note to the reviewing administrator
    #[validate(length(max = 500, message = "Note must be at most 500 characters"))]
    pub note: Option<String>,
}

/// Login request
#[derive(Debug, Deserialize, Validate)]
pub struct LoginRequest {
    #[validate(length(min = 1, message = "Username is required"))]
    pub username: String,

    #[validate(length(min = 1, message = "Password is required"))]
    pub password: String,
}

/// Refresh token request
#[derive(Debug, Deserialize)]
pub struct RefreshTokenRequest {
    pub refresh_token: String,
}

/// Password reset: step 1, request a code by username
#[derive(Debug, Deserialize, Validate)]
pub struct RequestPasswordResetRequest {
    #[validate(length(min = 1, message = "Username is required"))]
    pub username: String,
}

/// Password reset: step 2, verify the delivered code
#[derive(Debug, Deserialize, Validate)]
pub struct VerifyResetCodeRequest {
    pub reset_request_id: uuid::Uuid,

    #[validate(length(equal = 6, message = "Reset code must be 6 digits"))]
    pub reset_code: String,
}

/// Password reset: step 3, set the new password
#[derive(Debug, Deserialize, Validate)]
pub struct ResetPasswordRequest {
    #[validate(length(min = 1, message = "Verification token is required"))]
    pub verification_token: String,

    #[validate(length(min = 6, message = "Password must be at least 6 characters"))]
    pub new_password: String,
}

/// Create room request
#[derive(Debug, Deserialize, Validate)]
pub struct CreateRoomRequest {
    #[validate(length(min = 3, max = 100, message = "Room name must be 3-100 characters"))]
    pub name: String,

    #[validate(length(max = 1000, message = "Description must be at most 1000 characters"))]
    pub description: Option<String>,

    /// `public` (default) or `private`
    pub room_type: Option<String>,
}

/// Update room request (admin console)
#[derive(Debug, Deserialize, Validate)]
pub struct UpdateRoomRequest {
    #[validate(length(min = 3, max = 100, message = "Room name must be 3-100 characters"))]
    pub name: Option<String>,

    #[validate(length(max = 1000, message = "Description must be at most 1000 characters"))]
    pub description: Option<String>,
}

/// Respond to a friend request: `accept` or `reject`
#[derive(Debug, Deserialize)]
pub struct RespondFriendRequest {
    pub action: String,
}

/// Respond to a room join request: `approve` or `reject`
#[derive(Debug, Deserialize)]
pub struct RespondJoinRequest {
    pub action: String,
}

/// Update account status (admin console)
#[derive(Debug, Deserialize, Validate)]
pub struct UpdateUserStatusRequest {
    pub status: String,
    #[validate(length(max = 1000, message = "Admin note must be at most 1000 characters"))]
    pub admin_note: Option<String>,
}

/// Update site-wide role (admin console)
#[derive(Debug, Deserialize)]
pub struct UpdateUserRoleRequest {
    pub role: String,
}

/// Reset a user's password (admin console)
#[derive(Debug, Deserialize, Validate)]
pub struct UpdateUserPasswordRequest {
    #[validate(length(min = 6, message = "Password must be at least 6 characters"))]
    pub new_password: String,
}

/// Admin user listing query parameters
#[derive(Debug, Deserialize)]
pub struct UserListParams {
    pub page: Option<i64>,
    pub limit: Option<i64>,
    pub status: Option<String>,
    pub search: Option<String>,
}

/// Admin room listing query parameters
#[derive(Debug, Deserialize)]
pub struct RoomListParams {
    pub page: Option<i64>,
    pub limit: Option<i64>,
}
