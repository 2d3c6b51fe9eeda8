//! User Repository Implementation
//!
//! PostgreSQL implementation of the UserRepository trait.
//! Maps between the database schema and domain User entity.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::PgPool;
use uuid::Uuid;

use crate::domain::{User, UserRepository, UserRole, UserStatus};
use crate::shared::error::AppError;

/// Database row representation matching the users table schema.
#[derive(Debug, sqlx::FromRow)]
struct UserRow {
    id: Uuid,
    username: String,
    password_hash: String,
    note: Option<String>,
    role: String,
    status: String,
    approved_by: Option<Uuid>,
    approved_at: Option<DateTime<Utc>>,
    admin_note: Option<String>,
    last_login_at: Option<DateTime<Utc>>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl UserRow {
    /// Convert database row to domain User entity.
    fn into_user(self) -> User {
        User {
            id: self.id,
            username: self.username,
            password_hash: self.password_hash,
            note: self.note,
            role: UserRole::from_str(&self.role),
            status: UserStatus::from_str(&self.status),
            approved_by: self.approved_by,
            approved_at: self.approved_at,
            admin_note: self.admin_note,
            last_login_at: self.last_login_at,
            created_at: self.created_at,
            updated_at: self.updated_at,
        }
    }
}

/// PostgreSQL user repository implementation.
///
/// Provides CRUD operations for users against a PostgreSQL database.
#[derive(Clone)]
pub struct PgUserRepository {
    pool: PgPool,
}

impl PgUserRepository {
    /// Create a new PgUserRepository with the given connection pool.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl UserRepository for PgUserRepository {
    /// Find a user by their ID.
    async fn find_by_id(&self, id: Uuid) -> Result<Option<User>, AppError> {
        let row = sqlx::query_as::<_, UserRow>(
            r#"
            SELECT id, username, password_hash, note, role, status, approved_by,
                   approved_at, admin_note, last_login_at, created_at, updated_at
            FROM users
            WHERE id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.map(|r| r.into_user()))
    }

    /// Find a user by username.
    async fn find_by_username(&self, username: &str) -> Result<Option<User>, AppError> {
        let row = sqlx::query_as::<_, UserRow>(
            r#"
            SELECT id, username, password_hash, note, role, status, approved_by,
                   approved_at, admin_note, last_login_at, created_at, updated_at
            FROM users
            WHERE username = $1
            "#,
        )
        .bind(username)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.map(|r| r.into_user()))
    }

    /// Create a new user in the database.
    async fn create(&self, user: &User) -> Result<User, AppError> {
        let row = sqlx::query_as::<_, UserRow>(
            r#"
            INSERT INTO users (id, username, password_hash, note, role, status)
            VALUES ($1, $2, $3, $4, $5, $6)
            RETURNING id, username, password_hash, note, role, status, approved_by,
                      approved_at, admin_note, last_login_at, created_at, updated_at
            "#,
        )
        .bind(user.id)
        .bind(&user.username)
        .bind(&user.password_hash)
        .bind(&user.note)
        .bind(user.role.as_str())
        .bind(user.status.as_str())
        .fetch_one(&self.pool)
        .await
        .map_err(|e| match &e {
            sqlx::Error::Database(db_err) if db_err.is_unique_violation() => {
                AppError::Conflict("Username is already taken".to_string())
            }
            _ => AppError::Database(e),
        })?;

        Ok(row.into_user())
    }

    /// Delete a user (hard delete, cascades to friendships and memberships).
    async fn delete(&self, id: Uuid) -> Result<(), AppError> {
        let result = sqlx::query("DELETE FROM users WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(AppError::NotFound(format!("User with id {} not found", id)));
        }

        Ok(())
    }

    /// Check if a username is taken.
    async fn username_exists(&self, username: &str) -> Result<bool, AppError> {
        let result =
            sqlx::query_scalar::<_, bool>("SELECT EXISTS(SELECT 1 FROM users WHERE username = $1)")
                .bind(username)
                .fetch_one(&self.pool)
                .await?;

        Ok(result)
    }

    /// Update a user's moderation status. When an approver is given the
    /// approval columns are recorded alongside the status change; a note,
    /// when given, replaces the stored admin note.
    async fn update_status(
        &self,
        id: Uuid,
        status: UserStatus,
        approved_by: Option<Uuid>,
        admin_note: Option<&str>,
    ) -> Result<(), AppError> {
        let result = sqlx::query(
            r#"
            UPDATE users
            SET status = $2,
                approved_by = COALESCE($3, approved_by),
                approved_at = CASE WHEN $3::uuid IS NULL THEN approved_at ELSE NOW() END,
                admin_note = COALESCE($4, admin_note)
            WHERE id = $1
            "#,
        )
        .bind(id)
        .bind(status.as_str())
        .bind(approved_by)
        .bind(admin_note)
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(AppError::NotFound(format!("User with id {} not found", id)));
        }

        Ok(())
    }

    /// Update a user's role.
    async fn update_role(&self, id: Uuid, role: UserRole) -> Result<(), AppError> {
        let result = sqlx::query("UPDATE users SET role = $2 WHERE id = $1")
            .bind(id)
            .bind(role.as_str())
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(AppError::NotFound(format!("User with id {} not found", id)));
        }

        Ok(())
    }

    /// Replace a user's password hash.
    async fn update_password(&self, id: Uuid, password_hash: &str) -> Result<(), AppError> {
        let result = sqlx::query("UPDATE users SET password_hash = $2 WHERE id = $1")
            .bind(id)
            .bind(password_hash)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(AppError::NotFound(format!("User with id {} not found", id)));
        }

        Ok(())
    }

    /// Record a successful login.
    async fn update_last_login(&self, id: Uuid) -> Result<(), AppError> {
        sqlx::query("UPDATE users SET last_login_at = NOW() WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;

        Ok(())
    }

    /// List users for the admin panel, newest first, with optional status
    /// filter and case-insensitive username search.
    async fn list(
        &self,
        offset: i64,
        limit: i64,
        status: Option<UserStatus>,
        search: Option<&str>,
    ) -> Result<Vec<User>, AppError> {
        let rows = sqlx::query_as::<_, UserRow>(
            r#"
            SELECT id, username, password_hash, note, role, status, approved_by,
                   approved_at, admin_note, last_login_at, created_at, updated_at
            FROM users
            WHERE ($1::TEXT IS NULL OR status = $1)
              AND ($2::TEXT IS NULL OR username ILIKE '%' || $2 || '%')
            ORDER BY created_at DESC
            OFFSET $3 LIMIT $4
            "#,
        )
        .bind(status.map(|s| s.as_str()))
        .bind(search)
        .bind(offset)
        .bind(limit)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows.into_iter().map(|r| r.into_user()).collect())
    }

    /// Count users matching the same filters as `list`.
    async fn count(
        &self,
        status: Option<UserStatus>,
        search: Option<&str>,
    ) -> Result<i64, AppError> {
        let count = sqlx::query_scalar::<_, i64>(
            r#"
            SELECT COUNT(*)
            FROM users
            WHERE ($1::TEXT IS NULL OR status = $1)
              AND ($2::TEXT IS NULL OR username ILIKE '%' || $2 || '%')
            "#,
        )
        .bind(status.map(|s| s.as_str()))
        .bind(search)
        .fetch_one(&self.pool)
        .await?;

        Ok(count)
    }
}
