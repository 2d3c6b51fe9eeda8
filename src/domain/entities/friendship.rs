//! Friendship entity and repository trait.
//!
//! Maps to the `friendships` table in the database schema.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::shared::error::AppError;

/// Friendship status enum matching database TEXT constraint.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FriendshipStatus {
    Pending,
    Accepted,
    Blocked,
}

impl FriendshipStatus {
    /// Convert from database string representation.
    pub fn from_str(s: &str) -> Self {
        match s.to_lowercase().as_str() {
            "accepted" => Self::Accepted,
            "blocked" => Self::Blocked,
            _ => Self::Pending,
        }
    }

    /// Convert to database string representation.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Accepted => "accepted",
            Self::Blocked => "blocked",
        }
    }
}

impl std::fmt::Display for FriendshipStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Order a pair of user ids canonically (smaller id first).
///
/// Every friendship row stores its pair in this order, so an unordered
/// pair of users can never produce two rows.
pub fn canonical_pair(a: Uuid, b: Uuid) -> (Uuid, Uuid) {
    if a < b {
        (a, b)
    } else {
        (b, a)
    }
}

/// Represents a relationship between two users.
///
/// Maps to the `friendships` table:
/// - id: BIGSERIAL PRIMARY KEY
/// - user_id_1: UUID NOT NULL (always the smaller id)
/// - user_id_2: UUID NOT NULL (always the larger id)
/// - status: TEXT NOT NULL
/// - action_user_id: UUID NOT NULL (who last changed the row)
/// - created_at: TIMESTAMPTZ NOT NULL DEFAULT NOW()
/// - updated_at: TIMESTAMPTZ NOT NULL DEFAULT NOW()
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Friendship {
    /// Primary key
    pub id: i64,

    /// Smaller user id of the pair
    pub user_id_1: Uuid,

    /// Larger user id of the pair
    pub user_id_2: Uuid,

    /// Relationship status
    pub status: FriendshipStatus,

    /// The user who performed the last state change
    pub action_user_id: Uuid,

    /// Row creation timestamp
    pub created_at: DateTime<Utc>,

    /// Last update timestamp
    pub updated_at: DateTime<Utc>,
}

impl Friendship {
    /// Create a new pending request from `sender` to `recipient`.
    /// The pair is stored in canonical order regardless of who sent it.
    pub fn new_request(sender: Uuid, recipient: Uuid) -> Self {
        let (user_id_1, user_id_2) = canonical_pair(sender, recipient);
        let now = Utc::now();
        Self {
            id: 0,
            user_id_1,
            user_id_2,
            status: FriendshipStatus::Pending,
            action_user_id: sender,
            created_at: now,
            updated_at: now,
        }
    }

    /// Check whether the given user is one side of this relationship.
    pub fn involves(&self, user_id: Uuid) -> bool {
        self.user_id_1 == user_id || self.user_id_2 == user_id
    }

    /// Get the other side of the relationship from the given user's
    /// perspective. Returns `None` if the user is not part of the pair.
    pub fn other_user(&self, user_id: Uuid) -> Option<Uuid> {
        if self.user_id_1 == user_id {
            Some(self.user_id_2)
        } else if self.user_id_2 == user_id {
            Some(self.user_id_1)
        } else {
            None
        }
    }

    /// Check whether the given user is the recipient of this row's last
    /// action, i.e. part of the pair but not the action user.
    pub fn is_recipient(&self, user_id: Uuid) -> bool {
        self.involves(user_id) && self.action_user_id != user_id
    }
}

/// Read model for friend and request listings: the other user of a
/// friendship row plus the row id.
#[derive(Debug, Clone, Serialize)]
pub struct FriendEntry {
    /// Friendship row id
    pub friendship_id: i64,

    /// The other user's id
    pub user_id: Uuid,

    /// The other user's username
    pub username: String,
}

/// Repository trait for Friendship data access operations.
#[async_trait]
pub trait FriendshipRepository: Send + Sync {
    /// Find a friendship row by its id.
    async fn find_by_id(&self, id: i64) -> Result<Option<Friendship>, AppError>;

    /// Find the row for an unordered pair of users, if any.
    async fn find_by_pair(&self, a: Uuid, b: Uuid) -> Result<Option<Friendship>, AppError>;

    /// Insert a new friendship row.
    async fn create(&self, friendship: &Friendship) -> Result<Friendship, AppError>;

    /// Mark a pending request as accepted and record the acceptor.
    async fn accept(&self, id: i64, acceptor: Uuid) -> Result<(), AppError>;

    /// Delete a friendship row by id.
    async fn delete(&self, id: i64) -> Result<(), AppError>;

    /// Delete the accepted friendship for a pair. Returns `false` if no
    /// accepted row existed.
    async fn delete_accepted(&self, a: Uuid, b: Uuid) -> Result<bool, AppError>;

    /// Block `target` on behalf of `blocker`: any non-blocked row for the
    /// pair is removed and a blocked row is written in its place, all in
    /// one transaction.
    async fn block(&self, blocker: Uuid, target: Uuid) -> Result<(), AppError>;

    /// List accepted friends of a user with usernames.
    async fn list_friends(&self, user_id: Uuid) -> Result<Vec<FriendEntry>, AppError>;

    /// List incoming pending requests for a user (rows where the user is
    /// part of the pair but did not initiate) with sender usernames.
    async fn list_incoming_requests(&self, user_id: Uuid) -> Result<Vec<FriendEntry>, AppError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    fn uuid_small() -> Uuid {
        Uuid::parse_str("00000000-0000-7000-8000-000000000001").unwrap()
    }

    fn uuid_large() -> Uuid {
        Uuid::parse_str("ffffffff-ffff-7fff-bfff-ffffffffffff").unwrap()
    }

    // ==========================================================================
    // Canonical Pair Tests
    // ==========================================================================

    #[test]
    fn test_canonical_pair_orders_smaller_first() {
        let (a, b) = canonical_pair(uuid_large(), uuid_small());
        assert_eq!(a, uuid_small());
        assert_eq!(b, uuid_large());
    }

    #[test]
    fn test_canonical_pair_keeps_ordered_input() {
        let (a, b) = canonical_pair(uuid_small(), uuid_large());
        assert_eq!(a, uuid_small());
        assert_eq!(b, uuid_large());
    }

    #[test]
    fn test_canonical_pair_is_order_independent() {
        let forward = canonical_pair(uuid_small(), uuid_large());
        let reverse = canonical_pair(uuid_large(), uuid_small());
        assert_eq!(forward, reverse);
    }

    // ==========================================================================
    // FriendshipStatus Tests
    // ==========================================================================

    #[test]
    fn test_friendship_status_from_str() {
        assert_eq!(FriendshipStatus::from_str("pending"), FriendshipStatus::Pending);
        assert_eq!(FriendshipStatus::from_str("accepted"), FriendshipStatus::Accepted);
        assert_eq!(FriendshipStatus::from_str("blocked"), FriendshipStatus::Blocked);
        assert_eq!(FriendshipStatus::from_str("BLOCKED"), FriendshipStatus::Blocked);
    }

    #[test]
    fn test_friendship_status_from_str_unknown_defaults_to_pending() {
        assert_eq!(FriendshipStatus::from_str("declined"), FriendshipStatus::Pending);
        assert_eq!(FriendshipStatus::from_str(""), FriendshipStatus::Pending);
    }

    #[test]
    fn test_friendship_status_as_str_roundtrip() {
        let statuses = vec![
            FriendshipStatus::Pending,
            FriendshipStatus::Accepted,
            FriendshipStatus::Blocked,
        ];

        for status in statuses {
            let s = status.as_str();
            let parsed = FriendshipStatus::from_str(s);
            assert_eq!(parsed, status, "Roundtrip failed for {:?}", status);
        }
    }

    // ==========================================================================
    // Friendship Entity Tests
    // ==========================================================================

    #[test]
    fn test_new_request_canonicalizes_pair() {
        // Sender has the larger id, so the columns must swap
        let friendship = Friendship::new_request(uuid_large(), uuid_small());

        assert_eq!(friendship.user_id_1, uuid_small());
        assert_eq!(friendship.user_id_2, uuid_large());
        assert_eq!(friendship.action_user_id, uuid_large());
        assert_eq!(friendship.status, FriendshipStatus::Pending);
    }

    #[test]
    fn test_new_request_same_pair_regardless_of_direction() {
        let forward = Friendship::new_request(uuid_small(), uuid_large());
        let reverse = Friendship::new_request(uuid_large(), uuid_small());

        assert_eq!(forward.user_id_1, reverse.user_id_1);
        assert_eq!(forward.user_id_2, reverse.user_id_2);
        assert_ne!(forward.action_user_id, reverse.action_user_id);
    }

    #[test]
    fn test_involves() {
        let friendship = Friendship::new_request(uuid_small(), uuid_large());

        assert!(friendship.involves(uuid_small()));
        assert!(friendship.involves(uuid_large()));
        assert!(!friendship.involves(Uuid::now_v7()));
    }

    #[test]
    fn test_other_user() {
        let friendship = Friendship::new_request(uuid_small(), uuid_large());

        assert_eq!(friendship.other_user(uuid_small()), Some(uuid_large()));
        assert_eq!(friendship.other_user(uuid_large()), Some(uuid_small()));
        assert_eq!(friendship.other_user(Uuid::now_v7()), None);
    }

    #[test]
    fn test_is_recipient_only_for_non_action_side() {
        // Request sent by the user with the larger id
        let friendship = Friendship::new_request(uuid_large(), uuid_small());

        assert!(friendship.is_recipient(uuid_small()));
        assert!(!friendship.is_recipient(uuid_large()));
        assert!(!friendship.is_recipient(Uuid::now_v7()));
    }
}
