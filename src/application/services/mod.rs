//! Application Services
//!
//! Business logic services that coordinate domain operations.
//!
//! ## Available Services
//!
//! - **AuthService**: Registration, login, JWT tokens, password reset
//! - **FriendService**: Friendship ledger operations
//! - **RoomService**: Rooms, memberships, join requests
//! - **AdminService**: Moderation console operations

pub mod admin_service;
pub mod auth_service;
pub mod friend_service;
pub mod room_service;

// Re-export auth service types
pub use auth_service::{AuthError, AuthService, AuthServiceImpl, AuthTokens, Claims};

// Re-export friend service types
pub use friend_service::{FriendError, FriendRequestAction, FriendService, FriendServiceImpl};

// Re-export room service types
pub use room_service::{
    JoinOutcome, JoinRequestAction, LeaveOutcome, RoomError, RoomService, RoomServiceImpl,
};

// Re-export admin service types
pub use admin_service::{AdminError, AdminService, AdminServiceImpl, RoomPage, UserPage};
