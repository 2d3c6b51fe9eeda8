//! Friend Service
//!
//! Manages the friendship ledger: pairwise rows between two users with a
//! pending/accepted/blocked status. At most one row exists per unordered
//! pair; the repository keeps the pair in canonical order.

use std::sync::Arc;

use async_trait::async_trait;
use uuid::Uuid;

use crate::domain::{
    FriendEntry, Friendship, FriendshipRepository, FriendshipStatus, UserRepository,
};

/// How the recipient resolves a pending request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FriendRequestAction {
    Accept,
    Reject,
}

/// Friend service errors
#[derive(Debug, thiserror::Error)]
pub enum FriendError {
    #[error("User not found")]
    UserNotFound,

    #[error("You cannot add yourself as a friend")]
    CannotFriendSelf,

    #[error("You are already friends with this user")]
    AlreadyFriends,

    #[error("Friend request already sent")]
    RequestAlreadySent,

    #[error("This user has already sent you a friend request")]
    RequestAlreadyReceived,

    #[error("You have blocked this user. Unblock them first.")]
    BlockedByYou,

    #[error("This user has blocked you")]
    BlockedByThem,

    #[error("Friend request not found")]
    RequestNotFound,

    #[error("You cannot respond to your own friend request")]
    CannotRespondToOwnRequest,

    #[error("Friendship not found")]
    NotFriends,

    #[error("You cannot block yourself")]
    CannotBlockSelf,

    #[error("Internal error: {0}")]
    Internal(String),
}

/// Friend service trait
#[async_trait]
pub trait FriendService: Send + Sync {
    /// List accepted friends, ordered by username.
    async fn list_friends(&self, user_id: Uuid) -> Result<Vec<FriendEntry>, FriendError>;

    /// List incoming pending requests, newest first.
    async fn list_requests(&self, user_id: Uuid) -> Result<Vec<FriendEntry>, FriendError>;

    /// Send a friend request to a user by username.
    async fn send_request(
        &self,
        user_id: Uuid,
        target_username: &str,
    ) -> Result<Friendship, FriendError>;

    /// Accept or reject a pending request. Only the recipient may respond;
    /// rejecting deletes the row.
    async fn respond(
        &self,
        user_id: Uuid,
        friendship_id: i64,
        action: FriendRequestAction,
    ) -> Result<(), FriendError>;

    /// Remove an accepted friendship with another user.
    async fn remove_friend(&self, user_id: Uuid, friend_id: Uuid) -> Result<(), FriendError>;

    /// Block a user. Any non-blocked row for the pair is replaced by a
    /// blocked row attributed to the blocker.
    async fn block_user(&self, user_id: Uuid, target_id: Uuid) -> Result<(), FriendError>;
}

/// FriendService implementation backed by repository traits
pub struct FriendServiceImpl<F, U>
where
    F: FriendshipRepository,
    U: UserRepository,
{
    friendship_repo: Arc<F>,
    user_repo: Arc<U>,
}

impl<F, U> FriendServiceImpl<F, U>
where
    F: FriendshipRepository,
    U: UserRepository,
{
    pub fn new(friendship_repo: Arc<F>, user_repo: Arc<U>) -> Self {
        Self {
            friendship_repo,
            user_repo,
        }
    }

    /// Map an existing row for the pair to the error a new request hits.
    fn existing_row_error(existing: &Friendship, sender: Uuid) -> FriendError {
        match existing.status {
            FriendshipStatus::Accepted => FriendError::AlreadyFriends,
            FriendshipStatus::Pending => {
                if existing.action_user_id == sender {
                    FriendError::RequestAlreadySent
                } else {
                    FriendError::RequestAlreadyReceived
                }
            }
            FriendshipStatus::Blocked => {
                if existing.action_user_id == sender {
                    FriendError::BlockedByYou
                } else {
                    FriendError::BlockedByThem
                }
            }
        }
    }
}

#[async_trait]
impl<F, U> FriendService for FriendServiceImpl<F, U>
where
    F: FriendshipRepository + 'static,
    U: UserRepository + 'static,
{
    async fn list_friends(&self, user_id: Uuid) -> Result<Vec<FriendEntry>, FriendError> {
        self.friendship_repo
            .list_friends(user_id)
            .await
            .map_err(|e| FriendError::Internal(e.to_string()))
    }

    async fn list_requests(&self, user_id: Uuid) -> Result<Vec<FriendEntry>, FriendError> {
        self.friendship_repo
            .list_incoming_requests(user_id)
            .await
            .map_err(|e| FriendError::Internal(e.to_string()))
    }

    async fn send_request(
        &self,
        user_id: Uuid,
        target_username: &str,
    ) -> Result<Friendship, FriendError> {
        let target = self
            .user_repo
            .find_by_username(target_username)
            .await
            .map_err(|e| FriendError::Internal(e.to_string()))?
            .ok_or(FriendError::UserNotFound)?;

        if target.id == user_id {
            return Err(FriendError::CannotFriendSelf);
        }

        if let Some(existing) = self
            .friendship_repo
            .find_by_pair(user_id, target.id)
            .await
            .map_err(|e| FriendError::Internal(e.to_string()))?
        {
            return Err(Self::existing_row_error(&existing, user_id));
        }

        let request = Friendship::new_request(user_id, target.id);
        self.friendship_repo
            .create(&request)
            .await
            .map_err(|e| FriendError::Internal(e.to_string()))
    }

    async fn respond(
        &self,
        user_id: Uuid,
        friendship_id: i64,
        action: FriendRequestAction,
    ) -> Result<(), FriendError> {
        let friendship = self
            .friendship_repo
            .find_by_id(friendship_id)
            .await
            .map_err(|e| FriendError::Internal(e.to_string()))?
            .ok_or(FriendError::RequestNotFound)?;

        if friendship.status != FriendshipStatus::Pending || !friendship.involves(user_id) {
            return Err(FriendError::RequestNotFound);
        }
        if friendship.action_user_id == user_id {
            return Err(FriendError::CannotRespondToOwnRequest);
        }

        match action {
            FriendRequestAction::Accept => self
                .friendship_repo
                .accept(friendship_id, user_id)
                .await
                .map_err(|e| FriendError::Internal(e.to_string())),
            FriendRequestAction::Reject => self
                .friendship_repo
                .delete(friendship_id)
                .await
                .map_err(|e| FriendError::Internal(e.to_string())),
        }
    }

    async fn remove_friend(&self, user_id: Uuid, friend_id: Uuid) -> Result<(), FriendError> {
        let removed = self
            .friendship_repo
            .delete_accepted(user_id, friend_id)
            .await
            .map_err(|e| FriendError::Internal(e.to_string()))?;

        if !removed {
            return Err(FriendError::NotFriends);
        }
        Ok(())
    }

    async fn block_user(&self, user_id: Uuid, target_id: Uuid) -> Result<(), FriendError> {
        if target_id == user_id {
            return Err(FriendError::CannotBlockSelf);
        }

        let target = self
            .user_repo
            .find_by_id(target_id)
            .await
            .map_err(|e| FriendError::Internal(e.to_string()))?;
        if target.is_none() {
            return Err(FriendError::UserNotFound);
        }

        self.friendship_repo
            .block(user_id, target_id)
            .await
            .map_err(|e| FriendError::Internal(e.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{User, UserRole, UserStatus};
    use crate::shared::error::AppError;
    use mockall::mock;
    use mockall::predicate::eq;

    mock! {
        FriendshipRepo {}

        #[async_trait]
        impl FriendshipRepository for FriendshipRepo {
            async fn find_by_id(&self, id: i64) -> Result<Option<Friendship>, AppError>;
            async fn find_by_pair(&self, a: Uuid, b: Uuid) -> Result<Option<Friendship>, AppError>;
            async fn create(&self, friendship: &Friendship) -> Result<Friendship, AppError>;
            async fn accept(&self, id: i64, acceptor: Uuid) -> Result<(), AppError>;
            async fn delete(&self, id: i64) -> Result<(), AppError>;
            async fn delete_accepted(&self, a: Uuid, b: Uuid) -> Result<bool, AppError>;
            async fn block(&self, blocker: Uuid, target: Uuid) -> Result<(), AppError>;
            async fn list_friends(&self, user_id: Uuid) -> Result<Vec<FriendEntry>, AppError>;
            async fn list_incoming_requests(&self, user_id: Uuid) -> Result<Vec<FriendEntry>, AppError>;
        }
    }

    mock! {
        UserRepo {}

        #[async_trait]
        impl UserRepository for UserRepo {
            async fn find_by_id(&self, id: Uuid) -> Result<Option<User>, AppError>;
            async fn find_by_username(&self, username: &str) -> Result<Option<User>, AppError>;
            async fn create(&self, user: &User) -> Result<User, AppError>;
            async fn delete(&self, id: Uuid) -> Result<(), AppError>;
            async fn username_exists(&self, username: &str) -> Result<bool, AppError>;
            async fn update_status(
                &self,
                id: Uuid,
                status: UserStatus,
                approved_by: Option<Uuid>,
                admin_note: Option<&str>,
            ) -> Result<(), AppError>;
            async fn update_role(&self, id: Uuid, role: UserRole) -> Result<(), AppError>;
            async fn update_password(&self, id: Uuid, password_hash: &str) -> Result<(), AppError>;
            async fn update_last_login(&self, id: Uuid) -> Result<(), AppError>;
            async fn list(
                &self,
                offset: i64,
                limit: i64,
                status: Option<UserStatus>,
                search: Option<&str>,
            ) -> Result<Vec<User>, AppError>;
            async fn count(
                &self,
                status: Option<UserStatus>,
                search: Option<&str>,
            ) -> Result<i64, AppError>;
        }
    }

    fn service(
        friendship_repo: MockFriendshipRepo,
        user_repo: MockUserRepo,
    ) -> FriendServiceImpl<MockFriendshipRepo, MockUserRepo> {
        FriendServiceImpl::new(Arc::new(friendship_repo), Arc::new(user_repo))
    }

    fn user_named(username: &str) -> User {
        let mut user = User::new(username.to_string(), "hash".to_string(), None);
        user.status = UserStatus::Active;
        user
    }

    fn row(sender: Uuid, recipient: Uuid, status: FriendshipStatus) -> Friendship {
        let mut friendship = Friendship::new_request(sender, recipient);
        friendship.id = 7;
        friendship.status = status;
        friendship
    }

    #[tokio::test]
    async fn test_send_request_to_unknown_user_fails() {
        let mut user_repo = MockUserRepo::new();
        user_repo.expect_find_by_username().returning(|_| Ok(None));

        let svc = service(MockFriendshipRepo::new(), user_repo);

        let result = svc.send_request(Uuid::new_v4(), "ghost").await;
        assert!(matches!(result, Err(FriendError::UserNotFound)));
    }

    #[tokio::test]
    async fn test_send_request_to_self_fails() {
        let me = user_named("loner");
        let my_id = me.id;

        let mut user_repo = MockUserRepo::new();
        user_repo
            .expect_find_by_username()
            .returning(move |_| Ok(Some(me.clone())));

        let svc = service(MockFriendshipRepo::new(), user_repo);

        let result = svc.send_request(my_id, "loner").await;
        assert!(matches!(result, Err(FriendError::CannotFriendSelf)));
    }

    #[tokio::test]
    async fn test_send_request_creates_pending_row() {
        let target = user_named("buddy");
        let target_id = target.id;
        let sender_id = Uuid::new_v4();

        let mut user_repo = MockUserRepo::new();
        user_repo
            .expect_find_by_username()
            .with(eq("buddy"))
            .returning(move |_| Ok(Some(target.clone())));

        let mut friendship_repo = MockFriendshipRepo::new();
        friendship_repo
            .expect_find_by_pair()
            .returning(|_, _| Ok(None));
        friendship_repo
            .expect_create()
            .withf(move |f| {
                f.status == FriendshipStatus::Pending
                    && f.action_user_id == sender_id
                    && f.involves(target_id)
            })
            .returning(|f| Ok(f.clone()));

        let svc = service(friendship_repo, user_repo);

        let created = svc.send_request(sender_id, "buddy").await.unwrap();
        assert_eq!(created.status, FriendshipStatus::Pending);
    }

    #[tokio::test]
    async fn test_send_request_when_already_friends() {
        let target = user_named("buddy");
        let target_id = target.id;
        let sender_id = Uuid::new_v4();

        let mut user_repo = MockUserRepo::new();
        user_repo
            .expect_find_by_username()
            .returning(move |_| Ok(Some(target.clone())));

        let mut friendship_repo = MockFriendshipRepo::new();
        friendship_repo
            .expect_find_by_pair()
            .returning(move |_, _| Ok(Some(row(sender_id, target_id, FriendshipStatus::Accepted))));

        let svc = service(friendship_repo, user_repo);

        let result = svc.send_request(sender_id, "buddy").await;
        assert!(matches!(result, Err(FriendError::AlreadyFriends)));
    }

    #[tokio::test]
    async fn test_send_request_twice_is_rejected() {
        let target = user_named("buddy");
        let target_id = target.id;
        let sender_id = Uuid::new_v4();

        let mut user_repo = MockUserRepo::new();
        user_repo
            .expect_find_by_username()
            .returning(move |_| Ok(Some(target.clone())));

        let mut friendship_repo = MockFriendshipRepo::new();
        friendship_repo
            .expect_find_by_pair()
            .returning(move |_, _| Ok(Some(row(sender_id, target_id, FriendshipStatus::Pending))));

        let svc = service(friendship_repo, user_repo);

        let result = svc.send_request(sender_id, "buddy").await;
        assert!(matches!(result, Err(FriendError::RequestAlreadySent)));
    }

    #[tokio::test]
    async fn test_send_request_when_reverse_request_pending() {
        let target = user_named("buddy");
        let target_id = target.id;
        let sender_id = Uuid::new_v4();

        let mut user_repo = MockUserRepo::new();
        user_repo
            .expect_find_by_username()
            .returning(move |_| Ok(Some(target.clone())));

        // The other side initiated the pending request
        let mut friendship_repo = MockFriendshipRepo::new();
        friendship_repo
            .expect_find_by_pair()
            .returning(move |_, _| Ok(Some(row(target_id, sender_id, FriendshipStatus::Pending))));

        let svc = service(friendship_repo, user_repo);

        let result = svc.send_request(sender_id, "buddy").await;
        assert!(matches!(result, Err(FriendError::RequestAlreadyReceived)));
    }

    #[tokio::test]
    async fn test_send_request_blocked_by_me() {
        let target = user_named("buddy");
        let target_id = target.id;
        let sender_id = Uuid::new_v4();

        let mut user_repo = MockUserRepo::new();
        user_repo
            .expect_find_by_username()
            .returning(move |_| Ok(Some(target.clone())));

        let mut friendship_repo = MockFriendshipRepo::new();
        friendship_repo
            .expect_find_by_pair()
            .returning(move |_, _| Ok(Some(row(sender_id, target_id, FriendshipStatus::Blocked))));

        let svc = service(friendship_repo, user_repo);

        let result = svc.send_request(sender_id, "buddy").await;
        assert!(matches!(result, Err(FriendError::BlockedByYou)));
    }

    #[tokio::test]
    async fn test_send_request_blocked_by_them() {
        let target = user_named("buddy");
        let target_id = target.id;
        let sender_id = Uuid::new_v4();

        let mut user_repo = MockUserRepo::new();
        user_repo
            .expect_find_by_username()
            .returning(move |_| Ok(Some(target.clone())));

        let mut friendship_repo = MockFriendshipRepo::new();
        friendship_repo
            .expect_find_by_pair()
            .returning(move |_, _| Ok(Some(row(target_id, sender_id, FriendshipStatus::Blocked))));

        let svc = service(friendship_repo, user_repo);

        let result = svc.send_request(sender_id, "buddy").await;
        assert!(matches!(result, Err(FriendError::BlockedByThem)));
    }

    #[tokio::test]
    async fn test_respond_accept_records_acceptor() {
        let sender = Uuid::new_v4();
        let recipient = Uuid::new_v4();
        let pending = row(sender, recipient, FriendshipStatus::Pending);

        let mut friendship_repo = MockFriendshipRepo::new();
        friendship_repo
            .expect_find_by_id()
            .with(eq(7i64))
            .returning(move |_| Ok(Some(pending.clone())));
        friendship_repo
            .expect_accept()
            .with(eq(7i64), eq(recipient))
            .times(1)
            .returning(|_, _| Ok(()));

        let svc = service(friendship_repo, MockUserRepo::new());

        svc.respond(recipient, 7, FriendRequestAction::Accept)
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn test_respond_reject_deletes_the_row() {
        let sender = Uuid::new_v4();
        let recipient = Uuid::new_v4();
        let pending = row(sender, recipient, FriendshipStatus::Pending);

        let mut friendship_repo = MockFriendshipRepo::new();
        friendship_repo
            .expect_find_by_id()
            .returning(move |_| Ok(Some(pending.clone())));
        friendship_repo
            .expect_delete()
            .with(eq(7i64))
            .times(1)
            .returning(|_| Ok(()));

        let svc = service(friendship_repo, MockUserRepo::new());

        svc.respond(recipient, 7, FriendRequestAction::Reject)
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn test_respond_to_own_request_is_forbidden() {
        let sender = Uuid::new_v4();
        let recipient = Uuid::new_v4();
        let pending = row(sender, recipient, FriendshipStatus::Pending);

        let mut friendship_repo = MockFriendshipRepo::new();
        friendship_repo
            .expect_find_by_id()
            .returning(move |_| Ok(Some(pending.clone())));

        let svc = service(friendship_repo, MockUserRepo::new());

        let result = svc.respond(sender, 7, FriendRequestAction::Accept).await;
        assert!(matches!(result, Err(FriendError::CannotRespondToOwnRequest)));
    }

    #[tokio::test]
    async fn test_respond_by_outsider_looks_like_missing_request() {
        let pending = row(Uuid::new_v4(), Uuid::new_v4(), FriendshipStatus::Pending);

        let mut friendship_repo = MockFriendshipRepo::new();
        friendship_repo
            .expect_find_by_id()
            .returning(move |_| Ok(Some(pending.clone())));

        let svc = service(friendship_repo, MockUserRepo::new());

        let result = svc
            .respond(Uuid::new_v4(), 7, FriendRequestAction::Accept)
            .await;
        assert!(matches!(result, Err(FriendError::RequestNotFound)));
    }

    #[tokio::test]
    async fn test_respond_to_accepted_row_fails() {
        let sender = Uuid::new_v4();
        let recipient = Uuid::new_v4();
        let accepted = row(sender, recipient, FriendshipStatus::Accepted);

        let mut friendship_repo = MockFriendshipRepo::new();
        friendship_repo
            .expect_find_by_id()
            .returning(move |_| Ok(Some(accepted.clone())));

        let svc = service(friendship_repo, MockUserRepo::new());

        let result = svc.respond(recipient, 7, FriendRequestAction::Accept).await;
        assert!(matches!(result, Err(FriendError::RequestNotFound)));
    }

    #[tokio::test]
    async fn test_remove_friend_when_not_friends() {
        let mut friendship_repo = MockFriendshipRepo::new();
        friendship_repo
            .expect_delete_accepted()
            .returning(|_, _| Ok(false));

        let svc = service(friendship_repo, MockUserRepo::new());

        let result = svc.remove_friend(Uuid::new_v4(), Uuid::new_v4()).await;
        assert!(matches!(result, Err(FriendError::NotFriends)));
    }

    #[tokio::test]
    async fn test_block_self_fails() {
        let svc = service(MockFriendshipRepo::new(), MockUserRepo::new());

        let me = Uuid::new_v4();
        let result = svc.block_user(me, me).await;
        assert!(matches!(result, Err(FriendError::CannotBlockSelf)));
    }

    #[tokio::test]
    async fn test_block_replaces_existing_row() {
        let target = user_named("nuisance");
        let target_id = target.id;
        let me = Uuid::new_v4();

        let mut user_repo = MockUserRepo::new();
        user_repo
            .expect_find_by_id()
            .with(eq(target_id))
            .returning(move |_| Ok(Some(target.clone())));

        let mut friendship_repo = MockFriendshipRepo::new();
        friendship_repo
            .expect_block()
            .with(eq(me), eq(target_id))
            .times(1)
            .returning(|_, _| Ok(()));

        let svc = service(friendship_repo, user_repo);

        svc.block_user(me, target_id).await.unwrap();
    }
}
