//! Authentication Service
//!
//! Handles registration, login, JWT access tokens, refresh token rotation,
//! and the password reset flow.
//!
//! New accounts start in `pending` status and cannot log in until an
//! administrator activates them. Refresh tokens are opaque strings stored
//! only as SHA-256 hashes and are rotated on every refresh.

use std::sync::Arc;

use argon2::{
    password_hash::{rand_core::OsRng, PasswordHash, PasswordHasher, PasswordVerifier, SaltString},
    Argon2,
};
use async_trait::async_trait;
use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use tracing::debug;
use uuid::Uuid;

use crate::config::{JwtSettings, PasswordResetSettings};
use crate::domain::{
    generate_reset_code, PasswordResetRepository, PasswordResetRequest, Session,
    SessionRepository, User, UserRepository, UserStatus,
};

/// Authentication service trait for dependency injection
#[async_trait]
pub trait AuthService: Send + Sync {
    /// Register a new account. The account starts in `pending` status and
    /// receives no tokens until an administrator activates it.
    async fn register(
        &self,
        username: &str,
        password: &str,
        note: Option<&str>,
    ) -> Result<User, AuthError>;

    /// Authenticate with username and password
    async fn authenticate(
        &self,
        username: &str,
        password: &str,
    ) -> Result<(User, AuthTokens), AuthError>;

    /// Exchange a refresh token for a new token pair (rotation)
    async fn refresh_token(&self, refresh_token: &str) -> Result<AuthTokens, AuthError>;

    /// Revoke the session behind a refresh token (logout)
    async fn revoke_token(&self, refresh_token: &str) -> Result<(), AuthError>;

    /// Validate an access token and return its claims
    async fn validate_token(&self, access_token: &str) -> Result<Claims, AuthError>;

    /// Get the authenticated user's profile
    async fn get_current_user(&self, user_id: Uuid) -> Result<User, AuthError>;

    /// Start a password reset. Returns the reset request id the client
    /// uses when submitting the delivered code.
    async fn request_password_reset(&self, username: &str) -> Result<Uuid, AuthError>;

    /// Verify a reset code and mint a one-time verification token
    async fn verify_reset_code(
        &self,
        reset_request_id: Uuid,
        code: &str,
    ) -> Result<String, AuthError>;

    /// Consume a verification token and set the new password. All of the
    /// user's sessions are revoked.
    async fn reset_password(
        &self,
        verification_token: &str,
        new_password: &str,
    ) -> Result<(), AuthError>;
}

/// Authentication tokens response
#[derive(Debug, Clone, Serialize)]
pub struct AuthTokens {
    pub access_token: String,
    pub refresh_token: String,
    pub expires_in: i64,
    pub token_type: String,
}

/// JWT claims structure
#[derive(Debug, Serialize, Deserialize)]
pub struct Claims {
    /// Subject (user ID)
    pub sub: String,
    /// Expiration time (Unix timestamp)
    pub exp: i64,
    /// Issued at time (Unix timestamp)
    pub iat: i64,
    /// JWT ID for token tracking
    pub jti: Option<String>,
}

/// Authentication service errors
#[derive(Debug, thiserror::Error)]
pub enum AuthError {
    #[error("Invalid username or password")]
    InvalidCredentials,

    #[error("Username already exists")]
    UsernameExists,

    #[error("Account is awaiting review")]
    AccountPending,

    #[error("Account is suspended")]
    AccountSuspended,

    #[error("Account is banned")]
    AccountBanned,

    #[error("Session not found")]
    SessionNotFound,

    #[error("Token expired")]
    TokenExpired,

    #[error("Invalid token")]
    InvalidToken,

    #[error("User not found")]
    UserNotFound,

    #[error("Reset request not found")]
    ResetRequestNotFound,

    #[error("Invalid reset code")]
    InvalidResetCode,

    #[error("Reset request expired")]
    ResetRequestExpired,

    #[error("Password hashing failed: {0}")]
    HashingError(String),

    #[error("Repository error: {0}")]
    Repository(String),
}

/// AuthService implementation backed by repository traits
pub struct AuthServiceImpl<U, S, P>
where
    U: UserRepository,
    S: SessionRepository,
    P: PasswordResetRepository,
{
    user_repo: Arc<U>,
    session_repo: Arc<S>,
    reset_repo: Arc<P>,
    jwt_settings: JwtSettings,
    reset_settings: PasswordResetSettings,
}

impl<U, S, P> AuthServiceImpl<U, S, P>
where
    U: UserRepository,
    S: SessionRepository,
    P: PasswordResetRepository,
{
    pub fn new(
        user_repo: Arc<U>,
        session_repo: Arc<S>,
        reset_repo: Arc<P>,
        jwt_settings: JwtSettings,
        reset_settings: PasswordResetSettings,
    ) -> Self {
        Self {
            user_repo,
            session_repo,
            reset_repo,
            jwt_settings,
            reset_settings,
        }
    }

    /// Hash a password with Argon2id
    pub fn hash_password(&self, password: &str) -> Result<String, AuthError> {
        let salt = SaltString::generate(&mut OsRng);
        let argon2 = Argon2::default();

        argon2
            .hash_password(password.as_bytes(), &salt)
            .map(|hash| hash.to_string())
            .map_err(|e| AuthError::HashingError(e.to_string()))
    }

    /// Verify a password against a stored hash
    pub fn verify_password(&self, password: &str, hash: &str) -> bool {
        match PasswordHash::new(hash) {
            Ok(parsed) => Argon2::default()
                .verify_password(password.as_bytes(), &parsed)
                .is_ok(),
            Err(_) => false,
        }
    }

    /// SHA-256 hash of an opaque token, hex encoded
    fn hash_token(token: &str) -> String {
        format!("{:x}", Sha256::digest(token.as_bytes()))
    }

    /// Generate a JWT access token and an opaque refresh token. Returns the
    /// token pair plus the refresh token hash and expiry for storage.
    fn generate_tokens(
        &self,
        user_id: Uuid,
    ) -> Result<(AuthTokens, String, chrono::DateTime<Utc>), AuthError> {
        let now = Utc::now();
        let access_expiry = now + Duration::minutes(self.jwt_settings.access_token_expiry_minutes);
        let refresh_expiry = now + Duration::days(self.jwt_settings.refresh_token_expiry_days);

        let claims = Claims {
            sub: user_id.to_string(),
            exp: access_expiry.timestamp(),
            iat: now.timestamp(),
            jti: Some(Uuid::new_v4().to_string()),
        };

        let access_token = encode(
            &Header::default(),
            &claims,
            &EncodingKey::from_secret(self.jwt_settings.secret.as_bytes()),
        )
        .map_err(|e| AuthError::Repository(format!("Token encoding failed: {}", e)))?;

        let refresh_token = format!("{}.{}", Uuid::new_v4(), Uuid::new_v4());
        let refresh_token_hash = Self::hash_token(&refresh_token);

        let tokens = AuthTokens {
            access_token,
            refresh_token,
            expires_in: self.jwt_settings.access_token_expiry_minutes * 60,
            token_type: "Bearer".to_string(),
        };

        Ok((tokens, refresh_token_hash, refresh_expiry))
    }

    /// Reject logins and refreshes for accounts that are not active
    fn check_account_status(user: &User) -> Result<(), AuthError> {
        match user.status {
            UserStatus::Active => Ok(()),
            UserStatus::Pending => Err(AuthError::AccountPending),
            UserStatus::Suspended => Err(AuthError::AccountSuspended),
            UserStatus::Banned => Err(AuthError::AccountBanned),
        }
    }
}

#[async_trait]
impl<U, S, P> AuthService for AuthServiceImpl<U, S, P>
where
    U: UserRepository + 'static,
    S: SessionRepository + 'static,
    P: PasswordResetRepository + 'static,
{
    async fn register(
        &self,
        username: &str,
        password: &str,
        note: Option<&str>,
    ) -> Result<User, AuthError> {
        let exists = self
            .user_repo
            .username_exists(username)
            .await
            .map_err(|e| AuthError::Repository(e.to_string()))?;

        if exists {
            return Err(AuthError::UsernameExists);
        }

        let password_hash = self.hash_password(password)?;
        let user = User::new(
            username.to_string(),
            password_hash,
            note.map(|n| n.to_string()),
        );

        self.user_repo
            .create(&user)
            .await
            .map_err(|e| AuthError::Repository(e.to_string()))
    }

    async fn authenticate(
        &self,
        username: &str,
        password: &str,
    ) -> Result<(User, AuthTokens), AuthError> {
        let user = self
            .user_repo
            .find_by_username(username)
            .await
            .map_err(|e| AuthError::Repository(e.to_string()))?
            .ok_or(AuthError::InvalidCredentials)?;

        if !self.verify_password(password, &user.password_hash) {
            return Err(AuthError::InvalidCredentials);
        }

        Self::check_account_status(&user)?;

        let (tokens, refresh_token_hash, refresh_expiry) = self.generate_tokens(user.id)?;

        let session = Session::new(user.id, refresh_token_hash, refresh_expiry);
        self.session_repo
            .create(&session)
            .await
            .map_err(|e| AuthError::Repository(e.to_string()))?;

        self.user_repo
            .update_last_login(user.id)
            .await
            .map_err(|e| AuthError::Repository(e.to_string()))?;

        Ok((user, tokens))
    }

    async fn refresh_token(&self, refresh_token: &str) -> Result<AuthTokens, AuthError> {
        let token_hash = Self::hash_token(refresh_token);

        let session = self
            .session_repo
            .find_by_token_hash(&token_hash)
            .await
            .map_err(|e| AuthError::Repository(e.to_string()))?
            .ok_or(AuthError::SessionNotFound)?;

        if session.is_revoked() {
            return Err(AuthError::SessionNotFound);
        }
        if session.is_expired() {
            return Err(AuthError::TokenExpired);
        }

        // The account may have been suspended or banned since login
        let user = self
            .user_repo
            .find_by_id(session.user_id)
            .await
            .map_err(|e| AuthError::Repository(e.to_string()))?
            .ok_or(AuthError::UserNotFound)?;

        Self::check_account_status(&user)?;

        let (tokens, new_token_hash, new_expiry) = self.generate_tokens(user.id)?;

        self.session_repo
            .update_token_hash(session.id, &new_token_hash, new_expiry)
            .await
            .map_err(|e| AuthError::Repository(e.to_string()))?;

        Ok(tokens)
    }

    async fn revoke_token(&self, refresh_token: &str) -> Result<(), AuthError> {
        let token_hash = Self::hash_token(refresh_token);

        let session = self
            .session_repo
            .find_by_token_hash(&token_hash)
            .await
            .map_err(|e| AuthError::Repository(e.to_string()))?
            .ok_or(AuthError::SessionNotFound)?;

        self.session_repo
            .revoke(session.id)
            .await
            .map_err(|e| AuthError::Repository(e.to_string()))
    }

    async fn validate_token(&self, access_token: &str) -> Result<Claims, AuthError> {
        let token_data = decode::<Claims>(
            access_token,
            &DecodingKey::from_secret(self.jwt_settings.secret.as_bytes()),
            &Validation::default(),
        )
        .map_err(|e| match e.kind() {
            jsonwebtoken::errors::ErrorKind::ExpiredSignature => AuthError::TokenExpired,
            _ => AuthError::InvalidToken,
        })?;

        Ok(token_data.claims)
    }

    async fn get_current_user(&self, user_id: Uuid) -> Result<User, AuthError> {
        self.user_repo
            .find_by_id(user_id)
            .await
            .map_err(|e| AuthError::Repository(e.to_string()))?
            .ok_or(AuthError::UserNotFound)
    }

    async fn request_password_reset(&self, username: &str) -> Result<Uuid, AuthError> {
        let user = self
            .user_repo
            .find_by_username(username)
            .await
            .map_err(|e| AuthError::Repository(e.to_string()))?
            .ok_or(AuthError::UserNotFound)?;

        let code = generate_reset_code();
        let code_hash = Self::hash_token(&code);
        let expires_at = Utc::now() + Duration::minutes(self.reset_settings.code_expiry_minutes);

        let request = PasswordResetRequest::new(user.id, code_hash, expires_at);
        let created = self
            .reset_repo
            .create(&request)
            .await
            .map_err(|e| AuthError::Repository(e.to_string()))?;

        // No mail transport is wired up; operators relay the code out of band
        debug!(reset_request_id = %created.id, code = %code, "Password reset code issued");

        Ok(created.id)
    }

    async fn verify_reset_code(
        &self,
        reset_request_id: Uuid,
        code: &str,
    ) -> Result<String, AuthError> {
        let request = self
            .reset_repo
            .find_by_id(reset_request_id)
            .await
            .map_err(|e| AuthError::Repository(e.to_string()))?
            .ok_or(AuthError::ResetRequestNotFound)?;

        if request.used {
            return Err(AuthError::ResetRequestNotFound);
        }
        if request.is_expired() {
            return Err(AuthError::ResetRequestExpired);
        }

        if Self::hash_token(code) != request.reset_code_hash {
            return Err(AuthError::InvalidResetCode);
        }

        let verification_token = format!("{}.{}", Uuid::new_v4(), Uuid::new_v4());
        self.reset_repo
            .set_verification_token(request.id, &verification_token)
            .await
            .map_err(|e| AuthError::Repository(e.to_string()))?;

        Ok(verification_token)
    }

    async fn reset_password(
        &self,
        verification_token: &str,
        new_password: &str,
    ) -> Result<(), AuthError> {
        let request = self
            .reset_repo
            .find_by_verification_token(verification_token)
            .await
            .map_err(|e| AuthError::Repository(e.to_string()))?
            .ok_or(AuthError::ResetRequestNotFound)?;

        if request.is_expired() {
            return Err(AuthError::ResetRequestExpired);
        }

        let password_hash = self.hash_password(new_password)?;
        self.user_repo
            .update_password(request.user_id, &password_hash)
            .await
            .map_err(|e| AuthError::Repository(e.to_string()))?;

        self.reset_repo
            .mark_used(request.id)
            .await
            .map_err(|e| AuthError::Repository(e.to_string()))?;

        // A stolen refresh token must not survive a password change
        self.session_repo
            .revoke_all_for_user(request.user_id)
            .await
            .map_err(|e| AuthError::Repository(e.to_string()))?;

        Ok(())
    }
}
