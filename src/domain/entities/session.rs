//! User Session entity and repository trait.
//!
//! Maps to the `user_sessions` table in the database schema.
//! Used for JWT refresh token management.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::shared::error::AppError;

/// Represents a user session for JWT refresh token management.
///
/// Maps to the `user_sessions` table:
/// - id: UUID PRIMARY KEY
/// - user_id: UUID NOT NULL REFERENCES users(id)
/// - refresh_token_hash: TEXT NOT NULL (SHA-256 hash)
/// - expires_at: TIMESTAMPTZ NOT NULL
/// - created_at: TIMESTAMPTZ NOT NULL DEFAULT NOW()
/// - last_used_at: TIMESTAMPTZ NOT NULL DEFAULT NOW()
/// - revoked_at: TIMESTAMPTZ NULL
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Session {
    /// UUID primary key
    pub id: Uuid,

    /// User this session belongs to
    pub user_id: Uuid,

    /// SHA-256 hash of the refresh token (never store raw tokens)
    #[serde(skip_serializing)]
    pub refresh_token_hash: String,

    /// When this session expires
    pub expires_at: DateTime<Utc>,

    /// When the session was created
    pub created_at: DateTime<Utc>,

    /// When the session was last used (refresh token used)
    pub last_used_at: DateTime<Utc>,

    /// When the session was revoked (None if active)
    pub revoked_at: Option<DateTime<Utc>>,
}

impl Session {
    /// Create a new session.
    pub fn new(user_id: Uuid, refresh_token_hash: String, expires_at: DateTime<Utc>) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4(),
            user_id,
            refresh_token_hash,
            expires_at,
            created_at: now,
            last_used_at: now,
            revoked_at: None,
        }
    }

    /// Check if the session is currently active (not expired, not revoked).
    pub fn is_active(&self) -> bool {
        self.revoked_at.is_none() && self.expires_at > Utc::now()
    }

    /// Check if the session has been revoked.
    pub fn is_revoked(&self) -> bool {
        self.revoked_at.is_some()
    }

    /// Check if the session has expired.
    pub fn is_expired(&self) -> bool {
        self.expires_at < Utc::now()
    }
}

/// Repository trait for Session data access operations.
#[async_trait]
pub trait SessionRepository: Send + Sync {
    /// Find a session by refresh token hash.
    async fn find_by_token_hash(&self, token_hash: &str) -> Result<Option<Session>, AppError>;

    /// Create a new session.
    async fn create(&self, session: &Session) -> Result<Session, AppError>;

    /// Replace the refresh token hash and expiry (token rotation).
    async fn update_token_hash(
        &self,
        id: Uuid,
        token_hash: &str,
        expires_at: DateTime<Utc>,
    ) -> Result<(), AppError>;

    /// Revoke a session (set revoked_at).
    async fn revoke(&self, id: Uuid) -> Result<(), AppError>;

    /// Revoke all active sessions for a user. Returns the number revoked.
    async fn revoke_all_for_user(&self, user_id: Uuid) -> Result<i64, AppError>;

    /// Delete all expired and old revoked sessions (cleanup job).
    async fn cleanup_expired(&self) -> Result<i64, AppError>;
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    #[test]
    fn test_session_new_is_active() {
        let session = Session::new(
            Uuid::now_v7(),
            "hash".into(),
            Utc::now() + Duration::days(7),
        );

        assert!(session.is_active());
        assert!(!session.is_revoked());
        assert!(!session.is_expired());
    }

    #[test]
    fn test_session_expired_is_not_active() {
        let session = Session::new(
            Uuid::now_v7(),
            "hash".into(),
            Utc::now() - Duration::seconds(1),
        );

        assert!(session.is_expired());
        assert!(!session.is_active());
    }

    #[test]
    fn test_session_revoked_is_not_active() {
        let mut session = Session::new(
            Uuid::now_v7(),
            "hash".into(),
            Utc::now() + Duration::days(7),
        );
        session.revoked_at = Some(Utc::now());

        assert!(session.is_revoked());
        assert!(!session.is_active());
    }

    #[test]
    fn test_session_token_hash_not_serialized() {
        let session = Session::new(
            Uuid::now_v7(),
            "secret_hash".into(),
            Utc::now() + Duration::days(7),
        );

        let serialized = serde_json::to_string(&session).expect("Failed to serialize session");
        assert!(!serialized.contains("secret_hash"));
    }
}
