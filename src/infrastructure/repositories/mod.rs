//! Repository Implementations
//!
//! PostgreSQL implementations of domain repository traits.
//!
//! This module provides concrete implementations of the repository traits
//! defined in the domain layer. Each repository handles data access for
//! a specific entity type.
//!
//! ## Available Repositories
//!
//! - **UserRepository** - User account management, moderation, admin listing
//! - **FriendshipRepository** - Friend requests, blocks, friend listings
//! - **RoomRepository** - Room CRUD and lobby/admin listings
//! - **RoomMemberRepository** - Room membership and the leave transaction
//! - **RoomJoinRequestRepository** - Private room join requests
//! - **SessionRepository** - Refresh token sessions
//! - **PasswordResetRepository** - Password reset requests
//!
//! ## Usage Example
//!
//! ```rust,ignore
//! use sqlx::PgPool;
//! use crate::infrastructure::repositories::{
//!     PgFriendshipRepository, PgRoomMemberRepository, PgRoomRepository, PgUserRepository,
//! };
//!
//! async fn setup_repositories(pool: PgPool) {
//!     let user_repo = PgUserRepository::new(pool.clone());
//!     let friendship_repo = PgFriendshipRepository::new(pool.clone());
//!     let room_repo = PgRoomRepository::new(pool.clone());
//!     let member_repo = PgRoomMemberRepository::new(pool.clone());
//! }
//! ```

// Core repositories
pub mod friendship_repository;
pub mod room_member_repository;
pub mod room_repository;
pub mod user_repository;

// Additional repositories
pub mod join_request_repository;
pub mod password_reset_repository;
pub mod session_repository;

// Re-export core repository structs for convenience
pub use friendship_repository::PgFriendshipRepository;
pub use room_member_repository::PgRoomMemberRepository;
pub use room_repository::PgRoomRepository;
pub use user_repository::PgUserRepository;

// Re-export additional repository structs
pub use join_request_repository::PgRoomJoinRequestRepository;
pub use password_reset_repository::PgPasswordResetRepository;
pub use session_repository::PgSessionRepository;
