//! Friendship Repository Implementation
//!
//! PostgreSQL implementation of the FriendshipRepository trait.
//! Rows always store the user pair in canonical order (user_id_1 < user_id_2),
//! enforced by a table CHECK constraint.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::PgPool;
use uuid::Uuid;

use crate::domain::{
    canonical_pair, FriendEntry, Friendship, FriendshipRepository, FriendshipStatus,
};
use crate::shared::error::AppError;

/// Database row representation matching the friendships table schema.
#[derive(Debug, sqlx::FromRow)]
struct FriendshipRow {
    id: i64,
    user_id_1: Uuid,
    user_id_2: Uuid,
    status: String,
    action_user_id: Uuid,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl FriendshipRow {
    /// Convert database row to domain Friendship entity.
    fn into_friendship(self) -> Friendship {
        Friendship {
            id: self.id,
            user_id_1: self.user_id_1,
            user_id_2: self.user_id_2,
            status: FriendshipStatus::from_str(&self.status),
            action_user_id: self.action_user_id,
            created_at: self.created_at,
            updated_at: self.updated_at,
        }
    }
}

/// Row shape for friend and request listings joined against users.
#[derive(Debug, sqlx::FromRow)]
struct FriendEntryRow {
    friendship_id: i64,
    user_id: Uuid,
    username: String,
}

impl FriendEntryRow {
    fn into_entry(self) -> FriendEntry {
        FriendEntry {
            friendship_id: self.friendship_id,
            user_id: self.user_id,
            username: self.username,
        }
    }
}

/// PostgreSQL friendship repository implementation.
#[derive(Clone)]
pub struct PgFriendshipRepository {
    pool: PgPool,
}

impl PgFriendshipRepository {
    /// Create a new PgFriendshipRepository with the given connection pool.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl FriendshipRepository for PgFriendshipRepository {
    /// Find a friendship row by its ID.
    async fn find_by_id(&self, id: i64) -> Result<Option<Friendship>, AppError> {
        let row = sqlx::query_as::<_, FriendshipRow>(
            r#"
            SELECT id, user_id_1, user_id_2, status, action_user_id, created_at, updated_at
            FROM friendships
            WHERE id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.map(|r| r.into_friendship()))
    }

    /// Find the row for an unordered pair of users, if any.
    async fn find_by_pair(&self, a: Uuid, b: Uuid) -> Result<Option<Friendship>, AppError> {
        let (user_id_1, user_id_2) = canonical_pair(a, b);

        let row = sqlx::query_as::<_, FriendshipRow>(
            r#"
            SELECT id, user_id_1, user_id_2, status, action_user_id, created_at, updated_at
            FROM friendships
            WHERE user_id_1 = $1 AND user_id_2 = $2
            "#,
        )
        .bind(user_id_1)
        .bind(user_id_2)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.map(|r| r.into_friendship()))
    }

    /// Insert a new friendship row.
    async fn create(&self, friendship: &Friendship) -> Result<Friendship, AppError> {
        let row = sqlx::query_as::<_, FriendshipRow>(
            r#"
            INSERT INTO friendships (user_id_1, user_id_2, status, action_user_id)
            VALUES ($1, $2, $3, $4)
            RETURNING id, user_id_1, user_id_2, status, action_user_id, created_at, updated_at
            "#,
        )
        .bind(friendship.user_id_1)
        .bind(friendship.user_id_2)
        .bind(friendship.status.as_str())
        .bind(friendship.action_user_id)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| match &e {
            sqlx::Error::Database(db_err) if db_err.is_unique_violation() => {
                AppError::Conflict("A friendship for this pair already exists".to_string())
            }
            _ => AppError::Database(e),
        })?;

        Ok(row.into_friendship())
    }

    /// Mark a pending request as accepted, recording who accepted it.
    async fn accept(&self, id: i64, acceptor: Uuid) -> Result<(), AppError> {
        let result = sqlx::query(
            "UPDATE friendships SET status = 'accepted', action_user_id = $2 WHERE id = $1",
        )
        .bind(id)
        .bind(acceptor)
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(AppError::NotFound(format!(
                "Friendship with id {} not found",
                id
            )));
        }

        Ok(())
    }

    /// Delete a friendship row by ID (used to reject requests).
    async fn delete(&self, id: i64) -> Result<(), AppError> {
        let result = sqlx::query("DELETE FROM friendships WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(AppError::NotFound(format!(
                "Friendship with id {} not found",
                id
            )));
        }

        Ok(())
    }

    /// Delete the accepted friendship for a pair. Returns whether a row was removed.
    async fn delete_accepted(&self, a: Uuid, b: Uuid) -> Result<bool, AppError> {
        let (user_id_1, user_id_2) = canonical_pair(a, b);

        let result = sqlx::query(
            r#"
            DELETE FROM friendships
            WHERE user_id_1 = $1 AND user_id_2 = $2 AND status = 'accepted'
            "#,
        )
        .bind(user_id_1)
        .bind(user_id_2)
        .execute(&self.pool)
        .await?;

        Ok(result.rows_affected() > 0)
    }

    /// Replace whatever relationship exists for the pair with a block.
    /// Removing the old row and writing the block happen in one transaction.
    async fn block(&self, blocker: Uuid, target: Uuid) -> Result<(), AppError> {
        let (user_id_1, user_id_2) = canonical_pair(blocker, target);

        let mut tx = self.pool.begin().await?;

        sqlx::query(
            r#"
            DELETE FROM friendships
            WHERE user_id_1 = $1 AND user_id_2 = $2 AND status <> 'blocked'
            "#,
        )
        .bind(user_id_1)
        .bind(user_id_2)
        .execute(&mut *tx)
        .await?;

        sqlx::query(
            r#"
            INSERT INTO friendships (user_id_1, user_id_2, status, action_user_id)
            VALUES ($1, $2, 'blocked', $3)
            ON CONFLICT (user_id_1, user_id_2)
            DO UPDATE SET status = 'blocked', action_user_id = $3
            "#,
        )
        .bind(user_id_1)
        .bind(user_id_2)
        .bind(blocker)
        .execute(&mut *tx)
        .await?;

        tx.commit().await?;

        Ok(())
    }

    /// List a user's accepted friends with the other user's profile attached.
    async fn list_friends(&self, user_id: Uuid) -> Result<Vec<FriendEntry>, AppError> {
        let rows = sqlx::query_as::<_, FriendEntryRow>(
            r#"
            SELECT f.id AS friendship_id, u.id AS user_id, u.username
            FROM friendships f
            JOIN users u
              ON u.id = CASE WHEN f.user_id_1 = $1 THEN f.user_id_2 ELSE f.user_id_1 END
            WHERE (f.user_id_1 = $1 OR f.user_id_2 = $1)
              AND f.status = 'accepted'
            ORDER BY u.username ASC
            "#,
        )
        .bind(user_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows.into_iter().map(|r| r.into_entry()).collect())
    }

    /// List pending requests sent to a user. The sender is always the row's
    /// action_user_id, so the join works regardless of which pair column the
    /// recipient landed in.
    async fn list_incoming_requests(&self, user_id: Uuid) -> Result<Vec<FriendEntry>, AppError> {
        let rows = sqlx::query_as::<_, FriendEntryRow>(
            r#"
            SELECT f.id AS friendship_id, u.id AS user_id, u.username
            FROM friendships f
            JOIN users u ON u.id = f.action_user_id
            WHERE (f.user_id_1 = $1 OR f.user_id_2 = $1)
              AND f.status = 'pending'
              AND f.action_user_id <> $1
            ORDER BY f.created_at DESC
            "#,
        )
        .bind(user_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows.into_iter().map(|r| r.into_entry()).collect())
    }
}

#[cfg(test)]
mod tests {
    // Integration tests would go here, requiring a test database
}
