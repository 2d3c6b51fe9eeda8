//! Room membership entity and repository trait.
//!
//! Maps to the `room_members` table in the database schema.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::shared::error::AppError;

/// Per-room role enum matching database TEXT constraint.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum RoomRole {
    #[default]
    Member,
    Moderator,
    Admin,
    Owner,
}

impl RoomRole {
    /// Convert from database string representation.
    pub fn from_str(s: &str) -> Self {
        match s.to_lowercase().as_str() {
            "moderator" => Self::Moderator,
            "admin" => Self::Admin,
            "owner" => Self::Owner,
            _ => Self::Member,
        }
    }

    /// Convert to database string representation.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Member => "member",
            Self::Moderator => "moderator",
            Self::Admin => "admin",
            Self::Owner => "owner",
        }
    }
}

impl std::fmt::Display for RoomRole {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Represents a user's membership in a room.
///
/// Maps to the `room_members` table:
/// - id: BIGSERIAL PRIMARY KEY
/// - room_id: BIGINT NOT NULL REFERENCES rooms(id)
/// - user_id: UUID NOT NULL REFERENCES users(id)
/// - role: TEXT DEFAULT 'member'
/// - joined_at: TIMESTAMPTZ NOT NULL DEFAULT NOW()
/// - last_active: TIMESTAMPTZ NOT NULL DEFAULT NOW()
///
/// (room_id, user_id) is unique.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RoomMember {
    /// Primary key
    pub id: i64,

    /// Room this membership belongs to
    pub room_id: i64,

    /// Member's user id
    pub user_id: Uuid,

    /// Role within the room
    #[serde(default)]
    pub role: RoomRole,

    /// When the user joined the room
    pub joined_at: DateTime<Utc>,

    /// Last activity within the room
    pub last_active: DateTime<Utc>,

    /// Row creation timestamp
    pub created_at: DateTime<Utc>,

    /// Last update timestamp
    pub updated_at: DateTime<Utc>,
}

impl RoomMember {
    /// Create a new membership. The id is assigned by the database.
    pub fn new(room_id: i64, user_id: Uuid, role: RoomRole) -> Self {
        let now = Utc::now();
        Self {
            id: 0,
            room_id,
            user_id,
            role,
            joined_at: now,
            last_active: now,
            created_at: now,
            updated_at: now,
        }
    }

    /// Check whether this member owns the room.
    pub fn is_owner(&self) -> bool {
        self.role == RoomRole::Owner
    }
}

/// Read model for member listings: membership plus the user's username.
#[derive(Debug, Clone, Serialize)]
pub struct RoomMemberEntry {
    pub user_id: Uuid,
    pub username: String,
    pub role: RoomRole,
    pub joined_at: DateTime<Utc>,
}

/// Repository trait for RoomMember data access operations.
#[async_trait]
pub trait RoomMemberRepository: Send + Sync {
    /// Find a membership by room and user.
    async fn find(&self, room_id: i64, user_id: Uuid) -> Result<Option<RoomMember>, AppError>;

    /// Check if a user is a member of a room.
    async fn is_member(&self, room_id: i64, user_id: Uuid) -> Result<bool, AppError>;

    /// Insert a membership row.
    async fn create(&self, member: &RoomMember) -> Result<RoomMember, AppError>;

    /// Remove a membership. Returns `false` if no row existed.
    async fn delete(&self, room_id: i64, user_id: Uuid) -> Result<bool, AppError>;

    /// Remove a membership and, if the room is left with no members,
    /// delete the room as well, all in one transaction. Returns
    /// `(membership_removed, room_deleted)`.
    async fn leave(&self, room_id: i64, user_id: Uuid) -> Result<(bool, bool), AppError>;

    /// List members of a room with usernames, oldest join first.
    async fn list_by_room(&self, room_id: i64) -> Result<Vec<RoomMemberEntry>, AppError>;

    /// Get the member count for a room.
    async fn count_by_room(&self, room_id: i64) -> Result<i64, AppError>;
}
