//! Room Repository Implementation
//!
//! PostgreSQL implementation of the RoomRepository trait.
//! Listing queries join users and room_members to build RoomSummary
//! read models with the creator's username and a live member count.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::PgPool;
use uuid::Uuid;

use crate::domain::{Room, RoomRepository, RoomSummary, RoomType};
use crate::shared::error::AppError;

/// Database row representation matching the rooms table schema.
#[derive(Debug, sqlx::FromRow)]
struct RoomRow {
    id: i64,
    name: String,
    description: Option<String>,
    creator_id: Uuid,
    room_type: String,
    last_active_at: DateTime<Utc>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl RoomRow {
    /// Convert database row to domain Room entity.
    fn into_room(self) -> Room {
        Room {
            id: self.id,
            name: self.name,
            description: self.description,
            creator_id: self.creator_id,
            room_type: RoomType::from_str(&self.room_type),
            last_active_at: self.last_active_at,
            created_at: self.created_at,
            updated_at: self.updated_at,
        }
    }
}

/// Row shape for room listings joined against users and room_members.
#[derive(Debug, sqlx::FromRow)]
struct RoomSummaryRow {
    id: i64,
    name: String,
    description: Option<String>,
    room_type: String,
    creator_id: Uuid,
    creator_username: String,
    member_count: i64,
    last_active_at: DateTime<Utc>,
    created_at: DateTime<Utc>,
}

impl RoomSummaryRow {
    fn into_summary(self) -> RoomSummary {
        RoomSummary {
            id: self.id,
            name: self.name,
            description: self.description,
            room_type: RoomType::from_str(&self.room_type),
            creator_id: self.creator_id,
            creator_username: self.creator_username,
            member_count: self.member_count,
            last_active_at: self.last_active_at,
            created_at: self.created_at,
        }
    }
}

/// PostgreSQL room repository implementation.
#[derive(Clone)]
pub struct PgRoomRepository {
    pool: PgPool,
}

impl PgRoomRepository {
    /// Create a new PgRoomRepository with the given connection pool.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl RoomRepository for PgRoomRepository {
    /// Find a room by its ID.
    async fn find_by_id(&self, id: i64) -> Result<Option<Room>, AppError> {
        let row = sqlx::query_as::<_, RoomRow>(
            r#"
            SELECT id, name, description, creator_id, room_type,
                   last_active_at, created_at, updated_at
            FROM rooms
            WHERE id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.map(|r| r.into_room()))
    }

    /// Insert a room and its owner membership in one transaction, so a room
    /// can never exist without its creator as a member.
    async fn create_with_owner(&self, room: &Room) -> Result<Room, AppError> {
        let mut tx = self.pool.begin().await?;

        let row = sqlx::query_as::<_, RoomRow>(
            r#"
            INSERT INTO rooms (name, description, creator_id, room_type)
            VALUES ($1, $2, $3, $4)
            RETURNING id, name, description, creator_id, room_type,
                      last_active_at, created_at, updated_at
            "#,
        )
        .bind(&room.name)
        .bind(&room.description)
        .bind(room.creator_id)
        .bind(room.room_type.as_str())
        .fetch_one(&mut *tx)
        .await?;

        sqlx::query("INSERT INTO room_members (room_id, user_id, role) VALUES ($1, $2, 'owner')")
            .bind(row.id)
            .bind(room.creator_id)
            .execute(&mut *tx)
            .await?;

        tx.commit().await?;

        Ok(row.into_room())
    }

    /// List public rooms for the lobby, most recently active first.
    async fn list_public(&self) -> Result<Vec<RoomSummary>, AppError> {
        let rows = sqlx::query_as::<_, RoomSummaryRow>(
            r#"
            SELECT r.id, r.name, r.description, r.room_type, r.creator_id,
                   u.username AS creator_username,
                   COUNT(m.id) AS member_count,
                   r.last_active_at, r.created_at
            FROM rooms r
            JOIN users u ON u.id = r.creator_id
            LEFT JOIN room_members m ON m.room_id = r.id
            WHERE r.room_type = 'public'
            GROUP BY r.id, u.username
            ORDER BY r.last_active_at DESC
            "#,
        )
        .fetch_all(&self.pool)
        .await?;

        Ok(rows.into_iter().map(|r| r.into_summary()).collect())
    }

    /// List every room for the admin panel, newest first.
    async fn list_all(&self, offset: i64, limit: i64) -> Result<Vec<RoomSummary>, AppError> {
        let rows = sqlx::query_as::<_, RoomSummaryRow>(
            r#"
            SELECT r.id, r.name, r.description, r.room_type, r.creator_id,
                   u.username AS creator_username,
                   COUNT(m.id) AS member_count,
                   r.last_active_at, r.created_at
            FROM rooms r
            JOIN users u ON u.id = r.creator_id
            LEFT JOIN room_members m ON m.room_id = r.id
            GROUP BY r.id, u.username
            ORDER BY r.created_at DESC
            OFFSET $1 LIMIT $2
            "#,
        )
        .bind(offset)
        .bind(limit)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows.into_iter().map(|r| r.into_summary()).collect())
    }

    /// Count all rooms.
    async fn count_all(&self) -> Result<i64, AppError> {
        let count = sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM rooms")
            .fetch_one(&self.pool)
            .await?;

        Ok(count)
    }

    /// Update a room's name and/or description. Absent fields are left unchanged.
    async fn update_details(
        &self,
        id: i64,
        name: Option<&str>,
        description: Option<&str>,
    ) -> Result<Room, AppError> {
        let row = sqlx::query_as::<_, RoomRow>(
            r#"
            UPDATE rooms
            SET name = COALESCE($2, name),
                description = COALESCE($3, description)
            WHERE id = $1
            RETURNING id, name, description, creator_id, room_type,
                      last_active_at, created_at, updated_at
            "#,
        )
        .bind(id)
        .bind(name)
        .bind(description)
        .fetch_optional(&self.pool)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Room with id {} not found", id)))?;

        Ok(row.into_room())
    }

    /// Delete a room (cascades to members and join requests).
    async fn delete(&self, id: i64) -> Result<(), AppError> {
        let result = sqlx::query("DELETE FROM rooms WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(AppError::NotFound(format!("Room with id {} not found", id)));
        }

        Ok(())
    }

    /// Bump a room's last_active_at to now.
    async fn touch_last_active(&self, id: i64) -> Result<(), AppError> {
        sqlx::query("UPDATE rooms SET last_active_at = NOW() WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    // Integration tests would go here, requiring a test database
}
