//! Password reset request entity and repository trait.
//!
//! Maps to the `password_reset_requests` table. A reset flows through three
//! steps: a request row with a hashed 6-digit code, verification of that code
//! which mints a one-time verification token, and the final password change
//! which consumes the token.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::shared::error::AppError;

/// Represents a pending password reset.
///
/// Maps to the `password_reset_requests` table:
/// - id: UUID PRIMARY KEY
/// - user_id: UUID NOT NULL REFERENCES users(id)
/// - reset_code_hash: TEXT NOT NULL (SHA-256 hash of the 6-digit code)
/// - verification_token: TEXT NULL (set once the code has been verified)
/// - expires_at: TIMESTAMPTZ NOT NULL
/// - used: BOOLEAN NOT NULL DEFAULT FALSE
/// - created_at, updated_at: TIMESTAMPTZ NOT NULL DEFAULT NOW()
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PasswordResetRequest {
    /// UUID primary key, returned to the client as the reset request id
    pub id: Uuid,

    /// User requesting the reset
    pub user_id: Uuid,

    /// SHA-256 hash of the 6-digit reset code (never store raw codes)
    #[serde(skip_serializing)]
    pub reset_code_hash: String,

    /// One-time token minted after the code is verified
    #[serde(skip_serializing)]
    pub verification_token: Option<String>,

    /// When this request expires
    pub expires_at: DateTime<Utc>,

    /// Whether the request has been consumed by a password change
    pub used: bool,

    /// When the request was created
    pub created_at: DateTime<Utc>,

    /// When the request was last updated
    pub updated_at: DateTime<Utc>,
}

impl PasswordResetRequest {
    /// Create a new reset request.
    pub fn new(user_id: Uuid, reset_code_hash: String, expires_at: DateTime<Utc>) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4(),
            user_id,
            reset_code_hash,
            verification_token: None,
            expires_at,
            used: false,
            created_at: now,
            updated_at: now,
        }
    }

    /// Check if the request has expired.
    pub fn is_expired(&self) -> bool {
        self.expires_at < Utc::now()
    }

    /// Check if the request can still be verified or consumed.
    pub fn is_usable(&self) -> bool {
        !self.used && !self.is_expired()
    }
}

/// Generate a random 6-digit reset code, zero-padded.
pub fn generate_reset_code() -> String {
    use rand::Rng;

    let mut rng = rand::rng();
    format!("{:06}", rng.random_range(0..1_000_000))
}

/// Repository trait for password reset data access operations.
#[async_trait]
pub trait PasswordResetRepository: Send + Sync {
    /// Find a reset request by id.
    async fn find_by_id(&self, id: Uuid) -> Result<Option<PasswordResetRequest>, AppError>;

    /// Create a new reset request.
    async fn create(
        &self,
        request: &PasswordResetRequest,
    ) -> Result<PasswordResetRequest, AppError>;

    /// Attach the one-time verification token after code verification.
    async fn set_verification_token(&self, id: Uuid, token: &str) -> Result<(), AppError>;

    /// Find an unused request by its verification token.
    async fn find_by_verification_token(
        &self,
        token: &str,
    ) -> Result<Option<PasswordResetRequest>, AppError>;

    /// Mark a request as consumed.
    async fn mark_used(&self, id: Uuid) -> Result<(), AppError>;
}
