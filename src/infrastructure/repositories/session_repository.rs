//! Session Repository Implementation
//!
//! PostgreSQL implementation of the SessionRepository trait.
//! Handles user sessions for JWT refresh token management.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::PgPool;
use uuid::Uuid;

use crate::domain::{Session, SessionRepository};
use crate::shared::error::AppError;

/// Database row representation matching the user_sessions table schema.
#[derive(Debug, sqlx::FromRow)]
struct SessionRow {
    id: Uuid,
    user_id: Uuid,
    refresh_token_hash: String,
    expires_at: DateTime<Utc>,
    created_at: DateTime<Utc>,
    last_used_at: DateTime<Utc>,
    revoked_at: Option<DateTime<Utc>>,
}

impl SessionRow {
    /// Convert database row to domain Session entity.
    fn into_session(self) -> Session {
        Session {
            id: self.id,
            user_id: self.user_id,
            refresh_token_hash: self.refresh_token_hash,
            expires_at: self.expires_at,
            created_at: self.created_at,
            last_used_at: self.last_used_at,
            revoked_at: self.revoked_at,
        }
    }
}

/// PostgreSQL session repository implementation.
#[derive(Clone)]
pub struct PgSessionRepository {
    pool: PgPool,
}

impl PgSessionRepository {
    /// Create a new PgSessionRepository with the given connection pool.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl SessionRepository for PgSessionRepository {
    /// Find an active session by refresh token hash.
    async fn find_by_token_hash(&self, token_hash: &str) -> Result<Option<Session>, AppError> {
        let row = sqlx::query_as::<_, SessionRow>(
            r#"
            SELECT id, user_id, refresh_token_hash, expires_at,
                   created_at, last_used_at, revoked_at
            FROM user_sessions
            WHERE refresh_token_hash = $1 AND revoked_at IS NULL
            "#,
        )
        .bind(token_hash)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.map(|r| r.into_session()))
    }

    /// Create a new session.
    async fn create(&self, session: &Session) -> Result<Session, AppError> {
        let row = sqlx::query_as::<_, SessionRow>(
            r#"
            INSERT INTO user_sessions (id, user_id, refresh_token_hash, expires_at)
            VALUES ($1, $2, $3, $4)
            RETURNING id, user_id, refresh_token_hash, expires_at,
                      created_at, last_used_at, revoked_at
            "#,
        )
        .bind(session.id)
        .bind(session.user_id)
        .bind(&session.refresh_token_hash)
        .bind(session.expires_at)
        .fetch_one(&self.pool)
        .await?;

        Ok(row.into_session())
    }

    /// Replace the refresh token hash and expiry (token rotation).
    async fn update_token_hash(
        &self,
        id: Uuid,
        token_hash: &str,
        expires_at: DateTime<Utc>,
    ) -> Result<(), AppError> {
        let result = sqlx::query(
            r#"
            UPDATE user_sessions
            SET refresh_token_hash = $2, expires_at = $3, last_used_at = NOW()
            WHERE id = $1 AND revoked_at IS NULL
            "#,
        )
        .bind(id)
        .bind(token_hash)
        .bind(expires_at)
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(AppError::NotFound(format!(
                "Session with id {} not found",
                id
            )));
        }

        Ok(())
    }

    /// Revoke a session (set revoked_at).
    async fn revoke(&self, id: Uuid) -> Result<(), AppError> {
        let result = sqlx::query(
            "UPDATE user_sessions SET revoked_at = NOW() WHERE id = $1 AND revoked_at IS NULL",
        )
        .bind(id)
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(AppError::NotFound(format!(
                "Session with id {} not found",
                id
            )));
        }

        Ok(())
    }

    /// Revoke all active sessions for a user.
    async fn revoke_all_for_user(&self, user_id: Uuid) -> Result<i64, AppError> {
        let result = sqlx::query(
            "UPDATE user_sessions SET revoked_at = NOW() WHERE user_id = $1 AND revoked_at IS NULL",
        )
        .bind(user_id)
        .execute(&self.pool)
        .await?;

        Ok(result.rows_affected() as i64)
    }

    /// Delete expired sessions and revoked sessions older than 7 days.
    async fn cleanup_expired(&self) -> Result<i64, AppError> {
        let result = sqlx::query(
            r#"
            DELETE FROM user_sessions
            WHERE expires_at < NOW()
               OR (revoked_at IS NOT NULL AND revoked_at < NOW() - INTERVAL '7 days')
            "#,
        )
        .execute(&self.pool)
        .await?;

        Ok(result.rows_affected() as i64)
    }
}
