//! Room Member Repository Implementation
//!
//! PostgreSQL implementation of the RoomMemberRepository trait.
//! The leave operation removes the membership and deletes the room in the
//! same transaction when the last member walks out.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::PgPool;
use uuid::Uuid;

use crate::domain::{RoomMember, RoomMemberEntry, RoomMemberRepository, RoomRole};
use crate::shared::error::AppError;

/// Database row representation matching the room_members table schema.
#[derive(Debug, sqlx::FromRow)]
struct RoomMemberRow {
    id: i64,
    room_id: i64,
    user_id: Uuid,
    role: String,
    joined_at: DateTime<Utc>,
    last_active: DateTime<Utc>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl RoomMemberRow {
    /// Convert database row to domain RoomMember entity.
    fn into_member(self) -> RoomMember {
        RoomMember {
            id: self.id,
            room_id: self.room_id,
            user_id: self.user_id,
            role: RoomRole::from_str(&self.role),
            joined_at: self.joined_at,
            last_active: self.last_active,
            created_at: self.created_at,
            updated_at: self.updated_at,
        }
    }
}

/// Row shape for member listings joined against users.
#[derive(Debug, sqlx::FromRow)]
struct RoomMemberEntryRow {
    user_id: Uuid,
    username: String,
    role: String,
    joined_at: DateTime<Utc>,
}

impl RoomMemberEntryRow {
    fn into_entry(self) -> RoomMemberEntry {
        RoomMemberEntry {
            user_id: self.user_id,
            username: self.username,
            role: RoomRole::from_str(&self.role),
            joined_at: self.joined_at,
        }
    }
}

/// PostgreSQL room member repository implementation.
#[derive(Clone)]
pub struct PgRoomMemberRepository {
    pool: PgPool,
}

impl PgRoomMemberRepository {
    /// Create a new PgRoomMemberRepository with the given connection pool.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl RoomMemberRepository for PgRoomMemberRepository {
    /// Find a membership row for a user in a room.
    async fn find(&self, room_id: i64, user_id: Uuid) -> Result<Option<RoomMember>, AppError> {
        let row = sqlx::query_as::<_, RoomMemberRow>(
            r#"
            SELECT id, room_id, user_id, role, joined_at, last_active, created_at, updated_at
            FROM room_members
            WHERE room_id = $1 AND user_id = $2
            "#,
        )
        .bind(room_id)
        .bind(user_id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.map(|r| r.into_member()))
    }

    /// Check whether a user is a member of a room.
    async fn is_member(&self, room_id: i64, user_id: Uuid) -> Result<bool, AppError> {
        let result = sqlx::query_scalar::<_, bool>(
            "SELECT EXISTS(SELECT 1 FROM room_members WHERE room_id = $1 AND user_id = $2)",
        )
        .bind(room_id)
        .bind(user_id)
        .fetch_one(&self.pool)
        .await?;

        Ok(result)
    }

    /// Insert a new membership row.
    async fn create(&self, member: &RoomMember) -> Result<RoomMember, AppError> {
        let row = sqlx::query_as::<_, RoomMemberRow>(
            r#"
            INSERT INTO room_members (room_id, user_id, role)
            VALUES ($1, $2, $3)
            RETURNING id, room_id, user_id, role, joined_at, last_active, created_at, updated_at
            "#,
        )
        .bind(member.room_id)
        .bind(member.user_id)
        .bind(member.role.as_str())
        .fetch_one(&self.pool)
        .await
        .map_err(|e| match &e {
            sqlx::Error::Database(db_err) if db_err.is_unique_violation() => {
                AppError::Conflict("User is already a member of this room".to_string())
            }
            _ => AppError::Database(e),
        })?;

        Ok(row.into_member())
    }

    /// Remove a membership row. Returns whether a row was removed.
    async fn delete(&self, room_id: i64, user_id: Uuid) -> Result<bool, AppError> {
        let result = sqlx::query("DELETE FROM room_members WHERE room_id = $1 AND user_id = $2")
            .bind(room_id)
            .bind(user_id)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }

    /// Remove a membership and delete the room if it was the last one.
    /// Returns (membership_removed, room_deleted).
    async fn leave(&self, room_id: i64, user_id: Uuid) -> Result<(bool, bool), AppError> {
        let mut tx = self.pool.begin().await?;

        let removed = sqlx::query("DELETE FROM room_members WHERE room_id = $1 AND user_id = $2")
            .bind(room_id)
            .bind(user_id)
            .execute(&mut *tx)
            .await?
            .rows_affected()
            > 0;

        if !removed {
            tx.commit().await?;
            return Ok((false, false));
        }

        let remaining =
            sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM room_members WHERE room_id = $1")
                .bind(room_id)
                .fetch_one(&mut *tx)
                .await?;

        let room_deleted = if remaining == 0 {
            sqlx::query("DELETE FROM rooms WHERE id = $1")
                .bind(room_id)
                .execute(&mut *tx)
                .await?;
            true
        } else {
            false
        };

        tx.commit().await?;

        Ok((true, room_deleted))
    }

    /// List a room's members with usernames, oldest join first.
    async fn list_by_room(&self, room_id: i64) -> Result<Vec<RoomMemberEntry>, AppError> {
        let rows = sqlx::query_as::<_, RoomMemberEntryRow>(
            r#"
            SELECT m.user_id, u.username, m.role, m.joined_at
            FROM room_members m
            JOIN users u ON u.id = m.user_id
            WHERE m.room_id = $1
            ORDER BY m.joined_at ASC
            "#,
        )
        .bind(room_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows.into_iter().map(|r| r.into_entry()).collect())
    }

    /// Count a room's members.
    async fn count_by_room(&self, room_id: i64) -> Result<i64, AppError> {
        let count =
            sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM room_members WHERE room_id = $1")
                .bind(room_id)
                .fetch_one(&self.pool)
                .await?;

        Ok(count)
    }
}

#[cfg(test)]
mod tests {
    // Integration tests would go here, requiring a test database
}
