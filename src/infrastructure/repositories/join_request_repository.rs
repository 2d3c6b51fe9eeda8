//! Room Join Request Repository Implementation
//!
//! PostgreSQL implementation of the RoomJoinRequestRepository trait.
//! Approval writes the membership row in the same transaction as the
//! status change.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::PgPool;
use uuid::Uuid;

use crate::domain::{
    JoinRequestEntry, JoinRequestStatus, RoomJoinRequest, RoomJoinRequestRepository,
};
use crate::shared::error::AppError;

/// Database row representation matching the room_join_requests table schema.
#[derive(Debug, sqlx::FromRow)]
struct JoinRequestRow {
    id: i64,
    room_id: i64,
    user_id: Uuid,
    status: String,
    requested_at: DateTime<Utc>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl JoinRequestRow {
    /// Convert database row to domain RoomJoinRequest entity.
    fn into_request(self) -> RoomJoinRequest {
        RoomJoinRequest {
            id: self.id,
            room_id: self.room_id,
            user_id: self.user_id,
            status: JoinRequestStatus::from_str(&self.status),
            requested_at: self.requested_at,
            created_at: self.created_at,
            updated_at: self.updated_at,
        }
    }
}

/// Row shape for pending request listings joined against users.
#[derive(Debug, sqlx::FromRow)]
struct JoinRequestEntryRow {
    request_id: i64,
    user_id: Uuid,
    username: String,
    requested_at: DateTime<Utc>,
}

impl JoinRequestEntryRow {
    fn into_entry(self) -> JoinRequestEntry {
        JoinRequestEntry {
            request_id: self.request_id,
            user_id: self.user_id,
            username: self.username,
            requested_at: self.requested_at,
        }
    }
}

/// PostgreSQL join request repository implementation.
#[derive(Clone)]
pub struct PgRoomJoinRequestRepository {
    pool: PgPool,
}

impl PgRoomJoinRequestRepository {
    /// Create a new PgRoomJoinRequestRepository with the given connection pool.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl RoomJoinRequestRepository for PgRoomJoinRequestRepository {
    /// Find a join request by its ID.
    async fn find_by_id(&self, id: i64) -> Result<Option<RoomJoinRequest>, AppError> {
        let row = sqlx::query_as::<_, JoinRequestRow>(
            r#"
            SELECT id, room_id, user_id, status, requested_at, created_at, updated_at
            FROM room_join_requests
            WHERE id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.map(|r| r.into_request()))
    }

    /// Find a user's pending request for a room, if any.
    async fn find_pending(
        &self,
        room_id: i64,
        user_id: Uuid,
    ) -> Result<Option<RoomJoinRequest>, AppError> {
        let row = sqlx::query_as::<_, JoinRequestRow>(
            r#"
            SELECT id, room_id, user_id, status, requested_at, created_at, updated_at
            FROM room_join_requests
            WHERE room_id = $1 AND user_id = $2 AND status = 'pending'
            "#,
        )
        .bind(room_id)
        .bind(user_id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.map(|r| r.into_request()))
    }

    /// Insert a join request. A previously resolved request for the same
    /// user and room is reopened as pending.
    async fn create(&self, request: &RoomJoinRequest) -> Result<RoomJoinRequest, AppError> {
        let row = sqlx::query_as::<_, JoinRequestRow>(
            r#"
            INSERT INTO room_join_requests (room_id, user_id, status)
            VALUES ($1, $2, $3)
            ON CONFLICT (room_id, user_id)
            DO UPDATE SET status = 'pending', requested_at = NOW()
            RETURNING id, room_id, user_id, status, requested_at, created_at, updated_at
            "#,
        )
        .bind(request.room_id)
        .bind(request.user_id)
        .bind(request.status.as_str())
        .fetch_one(&self.pool)
        .await?;

        Ok(row.into_request())
    }

    /// Approve a request and insert the membership in one transaction.
    async fn approve(&self, id: i64) -> Result<(), AppError> {
        let mut tx = self.pool.begin().await?;

        let row = sqlx::query_as::<_, JoinRequestRow>(
            r#"
            UPDATE room_join_requests
            SET status = 'approved'
            WHERE id = $1 AND status = 'pending'
            RETURNING id, room_id, user_id, status, requested_at, created_at, updated_at
            "#,
        )
        .bind(id)
        .fetch_optional(&mut *tx)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Join request with id {} not found", id)))?;

        sqlx::query(
            r#"
            INSERT INTO room_members (room_id, user_id, role)
            VALUES ($1, $2, 'member')
            ON CONFLICT (room_id, user_id) DO NOTHING
            "#,
        )
        .bind(row.room_id)
        .bind(row.user_id)
        .execute(&mut *tx)
        .await?;

        tx.commit().await?;

        Ok(())
    }

    /// Reject a pending request.
    async fn reject(&self, id: i64) -> Result<(), AppError> {
        let result = sqlx::query(
            "UPDATE room_join_requests SET status = 'rejected' WHERE id = $1 AND status = 'pending'",
        )
        .bind(id)
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(AppError::NotFound(format!(
                "Join request with id {} not found",
                id
            )));
        }

        Ok(())
    }

    /// List a room's pending requests with usernames, oldest first.
    async fn list_pending(&self, room_id: i64) -> Result<Vec<JoinRequestEntry>, AppError> {
        let rows = sqlx::query_as::<_, JoinRequestEntryRow>(
            r#"
            SELECT jr.id AS request_id, jr.user_id, u.username, jr.requested_at
            FROM room_join_requests jr
            JOIN users u ON u.id = jr.user_id
            WHERE jr.room_id = $1 AND jr.status = 'pending'
            ORDER BY jr.requested_at ASC
            "#,
        )
        .bind(room_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows.into_iter().map(|r| r.into_entry()).collect())
    }
}
