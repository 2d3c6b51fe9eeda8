//! Room join request entity and repository trait.
//!
//! Maps to the `room_join_requests` table in the database schema.
//! Private rooms are joined through these requests: a pending row is
//! created on join and resolved by the room owner or a site admin.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::shared::error::AppError;

/// Join request status enum matching database TEXT constraint.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum JoinRequestStatus {
    #[default]
    Pending,
    Approved,
    Rejected,
}

impl JoinRequestStatus {
    /// Convert from database string representation.
    pub fn from_str(s: &str) -> Self {
        match s.to_lowercase().as_str() {
            "approved" => Self::Approved,
            "rejected" => Self::Rejected,
            _ => Self::Pending,
        }
    }

    /// Convert to database string representation.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Approved => "approved",
            Self::Rejected => "rejected",
        }
    }
}

impl std::fmt::Display for JoinRequestStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Represents a user's request to join a private room.
///
/// Maps to the `room_join_requests` table:
/// - id: BIGSERIAL PRIMARY KEY
/// - room_id: BIGINT NOT NULL REFERENCES rooms(id)
/// - user_id: UUID NOT NULL REFERENCES users(id)
/// - status: TEXT DEFAULT 'pending'
/// - requested_at: TIMESTAMPTZ NOT NULL DEFAULT NOW()
///
/// (room_id, user_id) is unique.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RoomJoinRequest {
    /// Primary key
    pub id: i64,

    /// Room the request targets
    pub room_id: i64,

    /// Requesting user
    pub user_id: Uuid,

    /// Resolution status
    #[serde(default)]
    pub status: JoinRequestStatus,

    /// When the request was made
    pub requested_at: DateTime<Utc>,

    /// Row creation timestamp
    pub created_at: DateTime<Utc>,

    /// Last update timestamp
    pub updated_at: DateTime<Utc>,
}

impl RoomJoinRequest {
    /// Create a new pending request. The id is assigned by the database.
    pub fn new(room_id: i64, user_id: Uuid) -> Self {
        let now = Utc::now();
        Self {
            id: 0,
            room_id,
            user_id,
            status: JoinRequestStatus::Pending,
            requested_at: now,
            created_at: now,
            updated_at: now,
        }
    }

    /// Check whether the request is still awaiting resolution.
    pub fn is_pending(&self) -> bool {
        self.status == JoinRequestStatus::Pending
    }
}

/// Read model for join request listings: request plus the requester's
/// username.
#[derive(Debug, Clone, Serialize)]
pub struct JoinRequestEntry {
    pub request_id: i64,
    pub user_id: Uuid,
    pub username: String,
    pub requested_at: DateTime<Utc>,
}

/// Repository trait for RoomJoinRequest data access operations.
#[async_trait]
pub trait RoomJoinRequestRepository: Send + Sync {
    /// Find a request by its id.
    async fn find_by_id(&self, id: i64) -> Result<Option<RoomJoinRequest>, AppError>;

    /// Find the pending request of a user for a room, if any.
    async fn find_pending(
        &self,
        room_id: i64,
        user_id: Uuid,
    ) -> Result<Option<RoomJoinRequest>, AppError>;

    /// Insert a new request row.
    async fn create(&self, request: &RoomJoinRequest) -> Result<RoomJoinRequest, AppError>;

    /// Approve a pending request and insert the corresponding membership
    /// in one transaction.
    async fn approve(&self, id: i64) -> Result<(), AppError>;

    /// Reject a pending request.
    async fn reject(&self, id: i64) -> Result<(), AppError>;

    /// List pending requests for a room with usernames, oldest first.
    async fn list_pending(&self, room_id: i64) -> Result<Vec<JoinRequestEntry>, AppError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_join_request_status_from_str() {
        assert_eq!(JoinRequestStatus::from_str("pending"), JoinRequestStatus::Pending);
        assert_eq!(JoinRequestStatus::from_str("approved"), JoinRequestStatus::Approved);
        assert_eq!(JoinRequestStatus::from_str("rejected"), JoinRequestStatus::Rejected);
    }

    #[test]
    fn test_join_request_status_from_str_unknown_defaults_to_pending() {
        assert_eq!(JoinRequestStatus::from_str("expired"), JoinRequestStatus::Pending);
        assert_eq!(JoinRequestStatus::from_str(""), JoinRequestStatus::Pending);
    }

    #[test]
    fn test_join_request_status_as_str_roundtrip() {
        let statuses = vec![
            JoinRequestStatus::Pending,
            JoinRequestStatus::Approved,
            JoinRequestStatus::Rejected,
        ];

        for status in statuses {
            let parsed = JoinRequestStatus::from_str(status.as_str());
            assert_eq!(parsed, status, "Roundtrip failed for {:?}", status);
        }
    }

    #[test]
    fn test_join_request_new_is_pending() {
        let request = RoomJoinRequest::new(7, Uuid::now_v7());

        assert_eq!(request.room_id, 7);
        assert!(request.is_pending());
    }
}
