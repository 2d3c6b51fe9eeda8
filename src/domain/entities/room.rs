//! Room entity and repository trait.
//!
//! Maps to the `rooms` table in the database schema.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::shared::error::AppError;

/// Room visibility enum matching database TEXT constraint.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum RoomType {
    #[default]
    Public,
    Private,
}

impl RoomType {
    /// Convert from database string representation.
    pub fn from_str(s: &str) -> Self {
        match s.to_lowercase().as_str() {
            "private" => Self::Private,
            _ => Self::Public,
        }
    }

    /// Convert to database string representation.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Public => "public",
            Self::Private => "private",
        }
    }
}

impl std::fmt::Display for RoomType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Represents a game room.
///
/// Maps to the `rooms` table:
/// - id: BIGSERIAL PRIMARY KEY
/// - name: TEXT NOT NULL (3-100 characters)
/// - description: TEXT NULL (up to 1000 characters)
/// - creator_id: UUID NOT NULL
/// - room_type: TEXT DEFAULT 'public'
/// - last_active_at: TIMESTAMPTZ NOT NULL DEFAULT NOW()
/// - created_at: TIMESTAMPTZ NOT NULL DEFAULT NOW()
/// - updated_at: TIMESTAMPTZ NOT NULL DEFAULT NOW()
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Room {
    /// Primary key
    pub id: i64,

    /// Room name (3-100 characters)
    pub name: String,

    /// Optional description (up to 1000 characters)
    pub description: Option<String>,

    /// The user who created the room
    pub creator_id: Uuid,

    /// Visibility of the room
    #[serde(default)]
    pub room_type: RoomType,

    /// Last activity timestamp, bumped on joins and messages
    pub last_active_at: DateTime<Utc>,

    /// Row creation timestamp
    pub created_at: DateTime<Utc>,

    /// Last update timestamp
    pub updated_at: DateTime<Utc>,
}

impl Room {
    /// Create a new room owned by `creator_id`. The id is assigned by the
    /// database on insert.
    pub fn new(
        name: String,
        description: Option<String>,
        room_type: RoomType,
        creator_id: Uuid,
    ) -> Self {
        let now = Utc::now();
        Self {
            id: 0,
            name,
            description,
            creator_id,
            room_type,
            last_active_at: now,
            created_at: now,
            updated_at: now,
        }
    }

    /// Check whether the room is publicly joinable.
    pub fn is_public(&self) -> bool {
        self.room_type == RoomType::Public
    }

    /// Check whether the given user created this room.
    pub fn is_creator(&self, user_id: Uuid) -> bool {
        self.creator_id == user_id
    }
}

/// Read model for room listings: a room plus its creator's username and
/// current member count.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RoomSummary {
    pub id: i64,
    pub name: String,
    pub description: Option<String>,
    pub room_type: RoomType,
    pub creator_id: Uuid,
    pub creator_username: String,
    pub member_count: i64,
    pub last_active_at: DateTime<Utc>,
    pub created_at: DateTime<Utc>,
}

/// Repository trait for Room data access operations.
#[async_trait]
pub trait RoomRepository: Send + Sync {
    /// Find a room by its id.
    async fn find_by_id(&self, id: i64) -> Result<Option<Room>, AppError>;

    /// Insert a room and its owner membership in one transaction.
    async fn create_with_owner(&self, room: &Room) -> Result<Room, AppError>;

    /// List public rooms, most recently active first.
    async fn list_public(&self) -> Result<Vec<RoomSummary>, AppError>;

    /// List rooms for the admin console, newest first.
    async fn list_all(&self, offset: i64, limit: i64) -> Result<Vec<RoomSummary>, AppError>;

    /// Count all rooms.
    async fn count_all(&self) -> Result<i64, AppError>;

    /// Update name and/or description. Returns the updated room.
    async fn update_details(
        &self,
        id: i64,
        name: Option<&str>,
        description: Option<&str>,
    ) -> Result<Room, AppError>;

    /// Delete a room. Memberships and join requests cascade.
    async fn delete(&self, id: i64) -> Result<(), AppError>;

    /// Bump the room's last activity timestamp.
    async fn touch_last_active(&self, id: i64) -> Result<(), AppError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    // ==========================================================================
    // RoomType Tests
    // ==========================================================================

    #[test]
    fn test_room_type_default_is_public() {
        assert_eq!(RoomType::default(), RoomType::Public);
    }

    #[test]
    fn test_room_type_from_str() {
        assert_eq!(RoomType::from_str("public"), RoomType::Public);
        assert_eq!(RoomType::from_str("private"), RoomType::Private);
        assert_eq!(RoomType::from_str("PRIVATE"), RoomType::Private);
    }

    #[test]
    fn test_room_type_from_str_unknown_defaults_to_public() {
        assert_eq!(RoomType::from_str("hidden"), RoomType::Public);
        assert_eq!(RoomType::from_str(""), RoomType::Public);
    }

    #[test]
    fn test_room_type_as_str_roundtrip() {
        for room_type in [RoomType::Public, RoomType::Private] {
            let parsed = RoomType::from_str(room_type.as_str());
            assert_eq!(parsed, room_type);
        }
    }

    // ==========================================================================
    // Room Entity Tests
    // ==========================================================================

    #[test]
    fn test_room_new() {
        let creator = Uuid::now_v7();
        let room = Room::new("Test Room".into(), None, RoomType::Public, creator);

        assert_eq!(room.id, 0);
        assert_eq!(room.name, "Test Room");
        assert_eq!(room.creator_id, creator);
        assert!(room.is_public());
    }

    #[test]
    fn test_room_is_public() {
        let creator = Uuid::now_v7();
        let public = Room::new("Public".into(), None, RoomType::Public, creator);
        let private = Room::new("Private".into(), None, RoomType::Private, creator);

        assert!(public.is_public());
        assert!(!private.is_public());
    }

    #[test]
    fn test_room_is_creator() {
        let creator = Uuid::now_v7();
        let room = Room::new("Test".into(), None, RoomType::Public, creator);

        assert!(room.is_creator(creator));
        assert!(!room.is_creator(Uuid::now_v7()));
    }

    #[test]
    fn test_room_type_serializes_lowercase() {
        let creator = Uuid::now_v7();
        let room = Room::new("Test".into(), None, RoomType::Private, creator);

        let serialized = serde_json::to_string(&room).expect("Failed to serialize room");
        assert!(serialized.contains("\"room_type\":\"private\""));
    }
}
