//! Admin Service
//!
//! Moderation console operations: paginated user/room listings, account
//! status and role changes, password resets by an administrator, and
//! deletions. Route-level access control (admin role) lives in the
//! presentation layer; this service enforces the per-operation rules.

use std::sync::Arc;

use argon2::{
    password_hash::{rand_core::OsRng, PasswordHasher, SaltString},
    Argon2,
};
use async_trait::async_trait;
use uuid::Uuid;

use crate::domain::{
    Room, RoomRepository, RoomSummary, User, UserRepository, UserRole, UserStatus,
};

/// One page of the admin user listing.
#[derive(Debug, Clone)]
pub struct UserPage {
    pub users: Vec<User>,
    pub total: i64,
    pub page: i64,
    pub total_pages: i64,
    pub limit: i64,
}

/// One page of the admin room listing.
#[derive(Debug, Clone)]
pub struct RoomPage {
    pub rooms: Vec<RoomSummary>,
    pub total: i64,
    pub page: i64,
    pub total_pages: i64,
    pub limit: i64,
}

/// Admin service errors
#[derive(Debug, thiserror::Error)]
pub enum AdminError {
    #[error("User not found")]
    UserNotFound,

    #[error("Room not found")]
    RoomNotFound,

    #[error("You cannot delete your own account")]
    SelfDeletion,

    #[error("Password hashing failed: {0}")]
    HashingError(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

/// Admin service trait
#[async_trait]
pub trait AdminService: Send + Sync {
    /// List users, newest first, with optional status filter and username
    /// substring search.
    async fn list_users(
        &self,
        page: i64,
        limit: i64,
        status: Option<UserStatus>,
        search: Option<&str>,
    ) -> Result<UserPage, AdminError>;

    /// Change an account's status, optionally leaving a moderation note.
    /// Activating a pending account records the approving administrator
    /// and the approval time.
    async fn update_user_status(
        &self,
        admin_id: Uuid,
        user_id: Uuid,
        status: UserStatus,
        admin_note: Option<&str>,
    ) -> Result<(), AdminError>;

    /// Change an account's site-wide role.
    async fn update_user_role(&self, user_id: Uuid, role: UserRole) -> Result<(), AdminError>;

    /// Set a new password on behalf of the user.
    async fn update_user_password(
        &self,
        user_id: Uuid,
        new_password: &str,
    ) -> Result<(), AdminError>;

    /// Delete an account. Administrators cannot delete themselves.
    async fn delete_user(&self, admin_id: Uuid, user_id: Uuid) -> Result<(), AdminError>;

    /// List all rooms (public and private), newest first.
    async fn list_rooms(&self, page: i64, limit: i64) -> Result<RoomPage, AdminError>;

    /// Update a room's name and/or description.
    async fn update_room(
        &self,
        room_id: i64,
        name: Option<&str>,
        description: Option<&str>,
    ) -> Result<Room, AdminError>;

    /// Delete any room regardless of ownership.
    async fn delete_room(&self, room_id: i64) -> Result<(), AdminError>;
}

/// Clamp page/limit to sane bounds and compute the row offset.
fn pagination_window(page: i64, limit: i64) -> (i64, i64, i64) {
    let page = page.max(1);
    let limit = limit.clamp(1, 100);
    let offset = (page - 1) * limit;
    (page, limit, offset)
}

/// Number of pages needed to show `total` rows at `limit` per page.
fn total_pages(total: i64, limit: i64) -> i64 {
    if total == 0 {
        0
    } else {
        (total + limit - 1) / limit
    }
}

/// AdminService implementation backed by repository traits
pub struct AdminServiceImpl<U, R>
where
    U: UserRepository,
    R: RoomRepository,
{
    user_repo: Arc<U>,
    room_repo: Arc<R>,
}

impl<U, R> AdminServiceImpl<U, R>
where
    U: UserRepository,
    R: RoomRepository,
{
    pub fn new(user_repo: Arc<U>, room_repo: Arc<R>) -> Self {
        Self {
            user_repo,
            room_repo,
        }
    }

    fn hash_password(password: &str) -> Result<String, AdminError> {
        let salt = SaltString::generate(&mut OsRng);
        Argon2::default()
            .hash_password(password.as_bytes(), &salt)
            .map(|hash| hash.to_string())
            .map_err(|e| AdminError::HashingError(e.to_string()))
    }

    async fn find_user(&self, user_id: Uuid) -> Result<User, AdminError> {
        self.user_repo
            .find_by_id(user_id)
            .await
            .map_err(|e| AdminError::Internal(e.to_string()))?
            .ok_or(AdminError::UserNotFound)
    }

    async fn find_room(&self, room_id: i64) -> Result<Room, AdminError> {
        self.room_repo
            .find_by_id(room_id)
            .await
            .map_err(|e| AdminError::Internal(e.to_string()))?
            .ok_or(AdminError::RoomNotFound)
    }
}

#[async_trait]
impl<U, R> AdminService for AdminServiceImpl<U, R>
where
    U: UserRepository + 'static,
    R: RoomRepository + 'static,
{
    async fn list_users(
        &self,
        page: i64,
        limit: i64,
        status: Option<UserStatus>,
        search: Option<&str>,
    ) -> Result<UserPage, AdminError> {
        let (page, limit, offset) = pagination_window(page, limit);

        let users = self
            .user_repo
            .list(offset, limit, status, search)
            .await
            .map_err(|e| AdminError::Internal(e.to_string()))?;
        let total = self
            .user_repo
            .count(status, search)
            .await
            .map_err(|e| AdminError::Internal(e.to_string()))?;

        Ok(UserPage {
            users,
            total,
            page,
            total_pages: total_pages(total, limit),
            limit,
        })
    }

    async fn update_user_status(
        &self,
        admin_id: Uuid,
        user_id: Uuid,
        status: UserStatus,
        admin_note: Option<&str>,
    ) -> Result<(), AdminError> {
        let target = self.find_user(user_id).await?;

        // Record who activated a pending account
        let approver = if target.status == UserStatus::Pending && status == UserStatus::Active {
            Some(admin_id)
        } else {
            None
        };

        self.user_repo
            .update_status(user_id, status, approver, admin_note)
            .await
            .map_err(|e| AdminError::Internal(e.to_string()))
    }

    async fn update_user_role(&self, user_id: Uuid, role: UserRole) -> Result<(), AdminError> {
        self.find_user(user_id).await?;

        self.user_repo
            .update_role(user_id, role)
            .await
            .map_err(|e| AdminError::Internal(e.to_string()))
    }

    async fn update_user_password(
        &self,
        user_id: Uuid,
        new_password: &str,
    ) -> Result<(), AdminError> {
        self.find_user(user_id).await?;

        let password_hash = Self::hash_password(new_password)?;
        self.user_repo
            .update_password(user_id, &password_hash)
            .await
            .map_err(|e| AdminError::Internal(e.to_string()))
    }

    async fn delete_user(&self, admin_id: Uuid, user_id: Uuid) -> Result<(), AdminError> {
        if admin_id == user_id {
            return Err(AdminError::SelfDeletion);
        }

        self.find_user(user_id).await?;

        self.user_repo
            .delete(user_id)
            .await
            .map_err(|e| AdminError::Internal(e.to_string()))
    }

    async fn list_rooms(&self, page: i64, limit: i64) -> Result<RoomPage, AdminError> {
        let (page, limit, offset) = pagination_window(page, limit);

        let rooms = self
            .room_repo
            .list_all(offset, limit)
            .await
            .map_err(|e| AdminError::Internal(e.to_string()))?;
        let total = self
            .room_repo
            .count_all()
            .await
            .map_err(|e| AdminError::Internal(e.to_string()))?;

        Ok(RoomPage {
            rooms,
            total,
            page,
            total_pages: total_pages(total, limit),
            limit,
        })
    }

    async fn update_room(
        &self,
        room_id: i64,
        name: Option<&str>,
        description: Option<&str>,
    ) -> Result<Room, AdminError> {
        self.find_room(room_id).await?;

        self.room_repo
            .update_details(room_id, name, description)
            .await
            .map_err(|e| AdminError::Internal(e.to_string()))
    }

    async fn delete_room(&self, room_id: i64) -> Result<(), AdminError> {
        self.find_room(room_id).await?;

        self.room_repo
            .delete(room_id)
            .await
            .map_err(|e| AdminError::Internal(e.to_string()))
    }
}
