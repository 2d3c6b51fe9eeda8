//! User entity and repository trait.
//!
//! Maps to the `users` table in the database schema.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::shared::error::AppError;

/// User role enum matching database TEXT constraint.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum UserRole {
    #[default]
    User,
    Moderator,
    Admin,
}

impl UserRole {
    /// Convert from database string representation.
    pub fn from_str(s: &str) -> Self {
        match s.to_lowercase().as_str() {
            "moderator" => Self::Moderator,
            "admin" => Self::Admin,
            _ => Self::User,
        }
    }

    /// Convert to database string representation.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::User => "user",
            Self::Moderator => "moderator",
            Self::Admin => "admin",
        }
    }
}

impl std::fmt::Display for UserRole {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Account lifecycle status matching database TEXT constraint.
///
/// New accounts start as `pending` and must be activated by an
/// administrator before they can log in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum UserStatus {
    #[default]
    Pending,
    Active,
    Suspended,
    Banned,
}

impl UserStatus {
    /// Convert from database string representation.
    pub fn from_str(s: &str) -> Self {
        match s.to_lowercase().as_str() {
            "active" => Self::Active,
            "suspended" => Self::Suspended,
            "banned" => Self::Banned,
            _ => Self::Pending,
        }
    }

    /// Convert to database string representation.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Active => "active",
            Self::Suspended => "suspended",
            Self::Banned => "banned",
        }
    }
}

impl std::fmt::Display for UserStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Represents a user account.
///
/// Maps to the `users` table:
/// - id: UUID PRIMARY KEY
/// - username: TEXT NOT NULL UNIQUE (3-50 characters)
/// - password_hash: TEXT NOT NULL
/// - note: TEXT NULL (up to 500 characters)
/// - role: TEXT DEFAULT 'user'
/// - status: TEXT DEFAULT 'pending'
/// - approved_by: UUID NULL
/// - approved_at: TIMESTAMPTZ NULL
/// - admin_note: TEXT NULL (up to 1000 characters)
/// - last_login_at: TIMESTAMPTZ NULL
/// - created_at: TIMESTAMPTZ NOT NULL DEFAULT NOW()
/// - updated_at: TIMESTAMPTZ NOT NULL DEFAULT NOW()
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct User {
    /// Primary key (UUID v7, generated at registration)
    pub id: Uuid,

    /// Username (3-50 characters, unique)
    pub username: String,

    /// Argon2 password hash
    #[serde(skip_serializing)]
    pub password_hash: String,

    /// Free-form note supplied at registration
    pub note: Option<String>,

    /// Site-wide role
    #[serde(default)]
    pub role: UserRole,

    /// Account lifecycle status
    #[serde(default)]
    pub status: UserStatus,

    /// Admin who approved this account
    pub approved_by: Option<Uuid>,

    /// When the account was approved
    pub approved_at: Option<DateTime<Utc>>,

    /// Moderation note (visible to admins only)
    pub admin_note: Option<String>,

    /// Last successful login
    pub last_login_at: Option<DateTime<Utc>>,

    /// Account creation timestamp
    pub created_at: DateTime<Utc>,

    /// Last update timestamp
    pub updated_at: DateTime<Utc>,
}

impl User {
    /// Create a new pending account with a freshly generated UUID v7 id.
    pub fn new(username: String, password_hash: String, note: Option<String>) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::now_v7(),
            username,
            password_hash,
            note,
            role: UserRole::User,
            status: UserStatus::Pending,
            approved_by: None,
            approved_at: None,
            admin_note: None,
            last_login_at: None,
            created_at: now,
            updated_at: now,
        }
    }

    /// Check whether this account may authenticate.
    pub fn can_login(&self) -> bool {
        self.status == UserStatus::Active
    }

    /// Check whether this account has site-wide admin rights.
    pub fn is_admin(&self) -> bool {
        self.role == UserRole::Admin
    }
}

impl Default for User {
    fn default() -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::nil(),
            username: String::new(),
            password_hash: String::new(),
            note: None,
            role: UserRole::default(),
            status: UserStatus::default(),
            approved_by: None,
            approved_at: None,
            admin_note: None,
            last_login_at: None,
            created_at: now,
            updated_at: now,
        }
    }
}

/// Repository trait for User data access operations.
///
/// Implementations of this trait handle the actual database interactions.
/// The trait is defined in the domain layer to maintain dependency inversion.
#[async_trait]
pub trait UserRepository: Send + Sync {
    /// Find a user by their UUID.
    async fn find_by_id(&self, id: Uuid) -> Result<Option<User>, AppError>;

    /// Find a user by username.
    async fn find_by_username(&self, username: &str) -> Result<Option<User>, AppError>;

    /// Create a new user in the database.
    async fn create(&self, user: &User) -> Result<User, AppError>;

    /// Delete a user by ID.
    async fn delete(&self, id: Uuid) -> Result<(), AppError>;

    /// Check if a username is already taken.
    async fn username_exists(&self, username: &str) -> Result<bool, AppError>;

    /// Update account status. When `approved_by` is set, the approval
    /// timestamp is recorded alongside it.
    async fn update_status(
        &self,
        id: Uuid,
        status: UserStatus,
        approved_by: Option<Uuid>,
        admin_note: Option<&str>,
    ) -> Result<(), AppError>;

    /// Update site-wide role.
    async fn update_role(&self, id: Uuid, role: UserRole) -> Result<(), AppError>;

    /// Replace the stored password hash.
    async fn update_password(&self, id: Uuid, password_hash: &str) -> Result<(), AppError>;

    /// Record a successful login.
    async fn update_last_login(&self, id: Uuid) -> Result<(), AppError>;

    /// List users for the admin console, newest first.
    async fn list(
        &self,
        offset: i64,
        limit: i64,
        status: Option<UserStatus>,
        search: Option<&str>,
    ) -> Result<Vec<User>, AppError>;

    /// Count users matching the same filters as `list`.
    async fn count(
        &self,
        status: Option<UserStatus>,
        search: Option<&str>,
    ) -> Result<i64, AppError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    // ==========================================================================
    // UserRole Tests
    // ==========================================================================

    #[test]
    fn test_user_role_default_is_user() {
        assert_eq!(UserRole::default(), UserRole::User);
    }

    #[test]
    fn test_user_role_from_str() {
        assert_eq!(UserRole::from_str("user"), UserRole::User);
        assert_eq!(UserRole::from_str("moderator"), UserRole::Moderator);
        assert_eq!(UserRole::from_str("admin"), UserRole::Admin);
        assert_eq!(UserRole::from_str("ADMIN"), UserRole::Admin);
    }

    #[test]
    fn test_user_role_from_str_unknown_defaults_to_user() {
        assert_eq!(UserRole::from_str("superuser"), UserRole::User);
        assert_eq!(UserRole::from_str(""), UserRole::User);
    }

    #[test]
    fn test_user_role_as_str_roundtrip() {
        let roles = vec![UserRole::User, UserRole::Moderator, UserRole::Admin];

        for role in roles {
            let s = role.as_str();
            let parsed = UserRole::from_str(s);
            assert_eq!(parsed, role, "Roundtrip failed for {:?}", role);
        }
    }

    // ==========================================================================
    // UserStatus Tests
    // ==========================================================================

    #[test]
    fn test_user_status_default_is_pending() {
        assert_eq!(UserStatus::default(), UserStatus::Pending);
    }

    #[test]
    fn test_user_status_from_str() {
        assert_eq!(UserStatus::from_str("pending"), UserStatus::Pending);
        assert_eq!(UserStatus::from_str("active"), UserStatus::Active);
        assert_eq!(UserStatus::from_str("suspended"), UserStatus::Suspended);
        assert_eq!(UserStatus::from_str("banned"), UserStatus::Banned);
        assert_eq!(UserStatus::from_str("ACTIVE"), UserStatus::Active);
    }

    #[test]
    fn test_user_status_from_str_unknown_defaults_to_pending() {
        assert_eq!(UserStatus::from_str("unknown"), UserStatus::Pending);
        assert_eq!(UserStatus::from_str(""), UserStatus::Pending);
    }

    #[test]
    fn test_user_status_as_str_roundtrip() {
        let statuses = vec![
            UserStatus::Pending,
            UserStatus::Active,
            UserStatus::Suspended,
            UserStatus::Banned,
        ];

        for status in statuses {
            let s = status.as_str();
            let parsed = UserStatus::from_str(s);
            assert_eq!(parsed, status, "Roundtrip failed for {:?}", status);
        }
    }

    #[test]
    fn test_user_status_display() {
        assert_eq!(format!("{}", UserStatus::Pending), "pending");
        assert_eq!(format!("{}", UserStatus::Active), "active");
        assert_eq!(format!("{}", UserStatus::Suspended), "suspended");
        assert_eq!(format!("{}", UserStatus::Banned), "banned");
    }

    // ==========================================================================
    // User Entity Tests
    // ==========================================================================

    fn create_test_user() -> User {
        User {
            id: Uuid::now_v7(),
            username: "testuser".to_string(),
            password_hash: "hashed_password".to_string(),
            note: None,
            role: UserRole::User,
            status: UserStatus::Active,
            approved_by: None,
            approved_at: None,
            admin_note: None,
            last_login_at: None,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    #[test]
    fn test_user_new_starts_pending() {
        let user = User::new("alice".into(), "hash".into(), None);

        assert_eq!(user.status, UserStatus::Pending);
        assert_eq!(user.role, UserRole::User);
        assert!(user.approved_by.is_none());
        assert!(user.last_login_at.is_none());
        assert!(!user.id.is_nil());
    }

    #[test]
    fn test_user_new_generates_distinct_ids() {
        let a = User::new("alice".into(), "hash".into(), None);
        let b = User::new("bob".into(), "hash".into(), None);

        assert_ne!(a.id, b.id);
    }

    #[test]
    fn test_user_can_login_only_when_active() {
        let mut user = create_test_user();

        user.status = UserStatus::Active;
        assert!(user.can_login());

        user.status = UserStatus::Pending;
        assert!(!user.can_login());

        user.status = UserStatus::Suspended;
        assert!(!user.can_login());

        user.status = UserStatus::Banned;
        assert!(!user.can_login());
    }

    #[test]
    fn test_user_is_admin() {
        let mut user = create_test_user();
        assert!(!user.is_admin());

        user.role = UserRole::Admin;
        assert!(user.is_admin());

        user.role = UserRole::Moderator;
        assert!(!user.is_admin());
    }

    // ==========================================================================
    // User Serialization Tests
    // ==========================================================================

    #[test]
    fn test_user_password_hash_not_serialized() {
        let user = create_test_user();

        let serialized = serde_json::to_string(&user).expect("Failed to serialize user");

        // password_hash should not appear in serialized output
        assert!(!serialized.contains("password_hash"));
        assert!(!serialized.contains("hashed_password"));
    }

    #[test]
    fn test_user_status_serializes_lowercase() {
        let user = create_test_user();

        let serialized = serde_json::to_string(&user).expect("Failed to serialize user");

        assert!(serialized.contains("\"status\":\"active\""));
        assert!(serialized.contains("\"role\":\"user\""));
    }
}
