//! Password Reset Repository Implementation
//!
//! PostgreSQL implementation of the PasswordResetRepository trait.
//! Only code hashes and one-time verification tokens are stored.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::PgPool;
use uuid::Uuid;

use crate::domain::{PasswordResetRepository, PasswordResetRequest};
use crate::shared::error::AppError;

/// Database row representation matching the password_reset_requests table schema.
#[derive(Debug, sqlx::FromRow)]
struct PasswordResetRow {
    id: Uuid,
    user_id: Uuid,
    reset_code_hash: String,
    verification_token: Option<String>,
    expires_at: DateTime<Utc>,
    used: bool,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl PasswordResetRow {
    /// Convert database row to domain entity.
    fn into_request(self) -> PasswordResetRequest {
        PasswordResetRequest {
            id: self.id,
            user_id: self.user_id,
            reset_code_hash: self.reset_code_hash,
            verification_token: self.verification_token,
            expires_at: self.expires_at,
            used: self.used,
            created_at: self.created_at,
            updated_at: self.updated_at,
        }
    }
}

/// PostgreSQL password reset repository implementation.
#[derive(Clone)]
pub struct PgPasswordResetRepository {
    pool: PgPool,
}

impl PgPasswordResetRepository {
    /// Create a new PgPasswordResetRepository with the given connection pool.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl PasswordResetRepository for PgPasswordResetRepository {
    /// Find a reset request by its ID.
    async fn find_by_id(&self, id: Uuid) -> Result<Option<PasswordResetRequest>, AppError> {
        let row = sqlx::query_as::<_, PasswordResetRow>(
            r#"
            SELECT id, user_id, reset_code_hash, verification_token,
                   expires_at, used, created_at, updated_at
            FROM password_reset_requests
            WHERE id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.map(|r| r.into_request()))
    }

    /// Create a new reset request.
    async fn create(
        &self,
        request: &PasswordResetRequest,
    ) -> Result<PasswordResetRequest, AppError> {
        let row = sqlx::query_as::<_, PasswordResetRow>(
            r#"
            INSERT INTO password_reset_requests (id, user_id, reset_code_hash, expires_at)
            VALUES ($1, $2, $3, $4)
            RETURNING id, user_id, reset_code_hash, verification_token,
                      expires_at, used, created_at, updated_at
            "#,
        )
        .bind(request.id)
        .bind(request.user_id)
        .bind(&request.reset_code_hash)
        .bind(request.expires_at)
        .fetch_one(&self.pool)
        .await?;

        Ok(row.into_request())
    }

    /// Attach the one-time verification token after code verification.
    async fn set_verification_token(&self, id: Uuid, token: &str) -> Result<(), AppError> {
        let result =
            sqlx::query("UPDATE password_reset_requests SET verification_token = $2 WHERE id = $1")
                .bind(id)
                .bind(token)
                .execute(&self.pool)
                .await?;

        if result.rows_affected() == 0 {
            return Err(AppError::NotFound(format!(
                "Reset request with id {} not found",
                id
            )));
        }

        Ok(())
    }

    /// Find an unused request by its verification token.
    async fn find_by_verification_token(
        &self,
        token: &str,
    ) -> Result<Option<PasswordResetRequest>, AppError> {
        let row = sqlx::query_as::<_, PasswordResetRow>(
            r#"
            SELECT id, user_id, reset_code_hash, verification_token,
                   expires_at, used, created_at, updated_at
            FROM password_reset_requests
            WHERE verification_token = $1 AND used = FALSE
            "#,
        )
        .bind(token)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.map(|r| r.into_request()))
    }

    /// Mark a request as consumed.
    async fn mark_used(&self, id: Uuid) -> Result<(), AppError> {
        let result = sqlx::query("UPDATE password_reset_requests SET used = TRUE WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(AppError::NotFound(format!(
                "Reset request with id {} not found",
                id
            )));
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    // Integration tests would go here, requiring a test database
}
