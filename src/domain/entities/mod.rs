//! # Domain Entities
//!
//! Core domain entities representing the main business objects in the lobby server.
//! All entities map directly to their corresponding database tables.
//!
//! ## Core Entities
//!
//! - **User**: User account with authentication data and moderation status
//! - **Friendship**: A relationship between two users (pending, accepted, or blocked)
//! - **Room**: A game lobby that players gather in
//! - **RoomMember**: A user's membership in a specific room
//!
//! ## Supporting Entities
//!
//! - **RoomJoinRequest**: Pending requests to join private rooms
//! - **Session**: User sessions for JWT refresh token management
//! - **PasswordResetRequest**: In-flight password resets with hashed codes
//!
//! ## Repository Traits
//!
//! Each entity has an associated repository trait defining data access operations.
//! These traits are implemented in the infrastructure layer, following the
//! dependency inversion principle.

mod friendship;
mod join_request;
mod password_reset;
mod room;
mod room_member;
mod session;
mod user;

// Re-export User entity and related types
pub use user::{User, UserRepository, UserRole, UserStatus};

// Re-export Friendship entity and related types
pub use friendship::{
    canonical_pair, FriendEntry, Friendship, FriendshipRepository, FriendshipStatus,
};

// Re-export Room entity and related types
pub use room::{Room, RoomRepository, RoomSummary, RoomType};

// Re-export RoomMember entity and related types
pub use room_member::{RoomMember, RoomMemberEntry, RoomMemberRepository, RoomRole};

// Re-export RoomJoinRequest entity and related types
pub use join_request::{
    JoinRequestEntry, JoinRequestStatus, RoomJoinRequest, RoomJoinRequestRepository,
};

// Re-export Session entity and related types
pub use session::{Session, SessionRepository};

// Re-export password reset entity and related types
pub use password_reset::{
    generate_reset_code, PasswordResetRepository, PasswordResetRequest,
};
