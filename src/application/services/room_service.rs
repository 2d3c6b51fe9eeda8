//! Room Service
//!
//! Manages game rooms, memberships, and the join request flow for private
//! rooms. Room creation inserts the room and the owner membership in one
//! transaction; the last member leaving takes the room down with them.

use std::sync::Arc;

use async_trait::async_trait;
use uuid::Uuid;

use crate::domain::{
    JoinRequestEntry, Room, RoomJoinRequest, RoomJoinRequestRepository, RoomMember,
    RoomMemberEntry, RoomMemberRepository, RoomRepository, RoomRole, RoomSummary, RoomType,
};

/// What happened when a user asked to join a room.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum JoinOutcome {
    /// Membership was created
    Joined,
    /// The user was already a member; no row was written
    AlreadyMember,
    /// Private room: a join request was created
    RequestSubmitted,
    /// Private room: an earlier request is still awaiting review
    RequestPending,
}

/// What happened when a user left a room.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LeaveOutcome {
    /// The departing member was the last one and the room was deleted
    pub room_deleted: bool,
}

/// How the owner resolves a join request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum JoinRequestAction {
    Approve,
    Reject,
}

/// Room service errors
#[derive(Debug, thiserror::Error)]
pub enum RoomError {
    #[error("Room not found")]
    RoomNotFound,

    #[error("You are not a member of this room")]
    MembershipNotFound,

    #[error("The room owner cannot leave the room")]
    OwnerCannotLeave,

    #[error("Only room members can view the member list")]
    MemberAccessRequired,

    #[error("Only the creator can delete this room")]
    OnlyCreatorCanDelete,

    #[error("Join request not found")]
    JoinRequestNotFound,

    #[error("Only the room owner can manage join requests")]
    JoinRequestAccessDenied,

    #[error("Only the room owner can kick members")]
    KickAccessDenied,

    #[error("Cannot kick the room owner")]
    CannotKickOwner,

    #[error("User is not a member of this room")]
    KickTargetNotFound,

    #[error("Internal error: {0}")]
    Internal(String),
}

/// Room service trait
#[async_trait]
pub trait RoomService: Send + Sync {
    /// Create a room. The creator becomes a member with role `owner` in the
    /// same transaction.
    async fn create_room(
        &self,
        creator_id: Uuid,
        name: &str,
        description: Option<&str>,
        room_type: RoomType,
    ) -> Result<Room, RoomError>;

    /// List public rooms, most recently active first.
    async fn list_public_rooms(&self) -> Result<Vec<RoomSummary>, RoomError>;

    /// Join a room, or file a join request when the room is private.
    async fn join_room(&self, user_id: Uuid, room_id: i64) -> Result<JoinOutcome, RoomError>;

    /// Leave a room. The owner may not leave; the last member leaving
    /// deletes the room.
    async fn leave_room(&self, user_id: Uuid, room_id: i64) -> Result<LeaveOutcome, RoomError>;

    /// List members of a room. Restricted to members and site admins.
    async fn list_members(
        &self,
        user_id: Uuid,
        is_admin: bool,
        room_id: i64,
    ) -> Result<Vec<RoomMemberEntry>, RoomError>;

    /// Delete a room. Only the creator may do this; memberships and join
    /// requests cascade.
    async fn delete_room(&self, user_id: Uuid, room_id: i64) -> Result<(), RoomError>;

    /// List pending join requests for a room. Owner or site admin only.
    async fn list_join_requests(
        &self,
        user_id: Uuid,
        is_admin: bool,
        room_id: i64,
    ) -> Result<Vec<JoinRequestEntry>, RoomError>;

    /// Approve or reject a pending join request. Owner or site admin only.
    async fn respond_join_request(
        &self,
        user_id: Uuid,
        is_admin: bool,
        room_id: i64,
        request_id: i64,
        action: JoinRequestAction,
    ) -> Result<(), RoomError>;

    /// Remove a member from a room. The room owner can kick from their own
    /// rooms, site admins from any room. The owner themselves can never be
    /// kicked.
    async fn kick_member(
        &self,
        user_id: Uuid,
        is_admin: bool,
        room_id: i64,
        target_id: Uuid,
    ) -> Result<(), RoomError>;
}

/// RoomService implementation backed by repository traits
pub struct RoomServiceImpl<R, M, J>
where
    R: RoomRepository,
    M: RoomMemberRepository,
    J: RoomJoinRequestRepository,
{
    room_repo: Arc<R>,
    member_repo: Arc<M>,
    join_request_repo: Arc<J>,
}

impl<R, M, J> RoomServiceImpl<R, M, J>
where
    R: RoomRepository,
    M: RoomMemberRepository,
    J: RoomJoinRequestRepository,
{
    pub fn new(room_repo: Arc<R>, member_repo: Arc<M>, join_request_repo: Arc<J>) -> Self {
        Self {
            room_repo,
            member_repo,
            join_request_repo,
        }
    }

    async fn find_room(&self, room_id: i64) -> Result<Room, RoomError> {
        self.room_repo
            .find_by_id(room_id)
            .await
            .map_err(|e| RoomError::Internal(e.to_string()))?
            .ok_or(RoomError::RoomNotFound)
    }
}

#[async_trait]
impl<R, M, J> RoomService for RoomServiceImpl<R, M, J>
where
    R: RoomRepository + 'static,
    M: RoomMemberRepository + 'static,
    J: RoomJoinRequestRepository + 'static,
{
    async fn create_room(
        &self,
        creator_id: Uuid,
        name: &str,
        description: Option<&str>,
        room_type: RoomType,
    ) -> Result<Room, RoomError> {
        let room = Room::new(
            name.to_string(),
            description.map(|d| d.to_string()),
            room_type,
            creator_id,
        );

        self.room_repo
            .create_with_owner(&room)
            .await
            .map_err(|e| RoomError::Internal(e.to_string()))
    }

    async fn list_public_rooms(&self) -> Result<Vec<RoomSummary>, RoomError> {
        self.room_repo
            .list_public()
            .await
            .map_err(|e| RoomError::Internal(e.to_string()))
    }

    async fn join_room(&self, user_id: Uuid, room_id: i64) -> Result<JoinOutcome, RoomError> {
        let room = self.find_room(room_id).await?;

        let already_member = self
            .member_repo
            .is_member(room_id, user_id)
            .await
            .map_err(|e| RoomError::Internal(e.to_string()))?;
        if already_member {
            return Ok(JoinOutcome::AlreadyMember);
        }

        if room.is_public() {
            let member = RoomMember::new(room_id, user_id, RoomRole::Member);
            self.member_repo
                .create(&member)
                .await
                .map_err(|e| RoomError::Internal(e.to_string()))?;
            self.room_repo
                .touch_last_active(room_id)
                .await
                .map_err(|e| RoomError::Internal(e.to_string()))?;
            return Ok(JoinOutcome::Joined);
        }

        // Private room: joining goes through the request queue
        let pending = self
            .join_request_repo
            .find_pending(room_id, user_id)
            .await
            .map_err(|e| RoomError::Internal(e.to_string()))?;
        if pending.is_some() {
            return Ok(JoinOutcome::RequestPending);
        }

        let request = RoomJoinRequest::new(room_id, user_id);
        self.join_request_repo
            .create(&request)
            .await
            .map_err(|e| RoomError::Internal(e.to_string()))?;

        Ok(JoinOutcome::RequestSubmitted)
    }

    async fn leave_room(&self, user_id: Uuid, room_id: i64) -> Result<LeaveOutcome, RoomError> {
        let room = self.find_room(room_id).await?;

        if room.is_creator(user_id) {
            return Err(RoomError::OwnerCannotLeave);
        }

        let (removed, room_deleted) = self
            .member_repo
            .leave(room_id, user_id)
            .await
            .map_err(|e| RoomError::Internal(e.to_string()))?;

        if !removed {
            return Err(RoomError::MembershipNotFound);
        }

        Ok(LeaveOutcome { room_deleted })
    }

    async fn list_members(
        &self,
        user_id: Uuid,
        is_admin: bool,
        room_id: i64,
    ) -> Result<Vec<RoomMemberEntry>, RoomError> {
        self.find_room(room_id).await?;

        if !is_admin {
            let member = self
                .member_repo
                .is_member(room_id, user_id)
                .await
                .map_err(|e| RoomError::Internal(e.to_string()))?;
            if !member {
                return Err(RoomError::MemberAccessRequired);
            }
        }

        self.member_repo
            .list_by_room(room_id)
            .await
            .map_err(|e| RoomError::Internal(e.to_string()))
    }

    async fn delete_room(&self, user_id: Uuid, room_id: i64) -> Result<(), RoomError> {
        let room = self.find_room(room_id).await?;

        if !room.is_creator(user_id) {
            return Err(RoomError::OnlyCreatorCanDelete);
        }

        self.room_repo
            .delete(room_id)
            .await
            .map_err(|e| RoomError::Internal(e.to_string()))
    }

    async fn list_join_requests(
        &self,
        user_id: Uuid,
        is_admin: bool,
        room_id: i64,
    ) -> Result<Vec<JoinRequestEntry>, RoomError> {
        let room = self.find_room(room_id).await?;

        if !is_admin && !room.is_creator(user_id) {
            return Err(RoomError::JoinRequestAccessDenied);
        }

        self.join_request_repo
            .list_pending(room_id)
            .await
            .map_err(|e| RoomError::Internal(e.to_string()))
    }

    async fn respond_join_request(
        &self,
        user_id: Uuid,
        is_admin: bool,
        room_id: i64,
        request_id: i64,
        action: JoinRequestAction,
    ) -> Result<(), RoomError> {
        let room = self.find_room(room_id).await?;

        if !is_admin && !room.is_creator(user_id) {
            return Err(RoomError::JoinRequestAccessDenied);
        }

        let request = self
            .join_request_repo
            .find_by_id(request_id)
            .await
            .map_err(|e| RoomError::Internal(e.to_string()))?
            .ok_or(RoomError::JoinRequestNotFound)?;

        if request.room_id != room_id || !request.is_pending() {
            return Err(RoomError::JoinRequestNotFound);
        }

        match action {
            JoinRequestAction::Approve => self
                .join_request_repo
                .approve(request_id)
                .await
                .map_err(|e| RoomError::Internal(e.to_string())),
            JoinRequestAction::Reject => self
                .join_request_repo
                .reject(request_id)
                .await
                .map_err(|e| RoomError::Internal(e.to_string())),
        }
    }

    async fn kick_member(
        &self,
        user_id: Uuid,
        is_admin: bool,
        room_id: i64,
        target_id: Uuid,
    ) -> Result<(), RoomError> {
        let room = self.find_room(room_id).await?;

        if !is_admin && !room.is_creator(user_id) {
            return Err(RoomError::KickAccessDenied);
        }

        if room.is_creator(target_id) {
            return Err(RoomError::CannotKickOwner);
        }

        let removed = self
            .member_repo
            .delete(room_id, target_id)
            .await
            .map_err(|e| RoomError::Internal(e.to_string()))?;

        if !removed {
            return Err(RoomError::KickTargetNotFound);
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::shared::error::AppError;
    use mockall::mock;
    use mockall::predicate::eq;

    mock! {
        RoomRepo {}

        #[async_trait]
        impl RoomRepository for RoomRepo {
            async fn find_by_id(&self, id: i64) -> Result<Option<Room>, AppError>;
            async fn create_with_owner(&self, room: &Room) -> Result<Room, AppError>;
            async fn list_public(&self) -> Result<Vec<RoomSummary>, AppError>;
            async fn list_all(&self, offset: i64, limit: i64) -> Result<Vec<RoomSummary>, AppError>;
            async fn count_all(&self) -> Result<i64, AppError>;
            async fn update_details(
                &self,
                id: i64,
                name: Option<&str>,
                description: Option<&str>,
            ) -> Result<Room, AppError>;
            async fn delete(&self, id: i64) -> Result<(), AppError>;
            async fn touch_last_active(&self, id: i64) -> Result<(), AppError>;
        }
    }

    mock! {
        MemberRepo {}

        #[async_trait]
        impl RoomMemberRepository for MemberRepo {
            async fn find(&self, room_id: i64, user_id: Uuid) -> Result<Option<RoomMember>, AppError>;
            async fn is_member(&self, room_id: i64, user_id: Uuid) -> Result<bool, AppError>;
            async fn create(&self, member: &RoomMember) -> Result<RoomMember, AppError>;
            async fn delete(&self, room_id: i64, user_id: Uuid) -> Result<bool, AppError>;
            async fn leave(&self, room_id: i64, user_id: Uuid) -> Result<(bool, bool), AppError>;
            async fn list_by_room(&self, room_id: i64) -> Result<Vec<RoomMemberEntry>, AppError>;
            async fn count_by_room(&self, room_id: i64) -> Result<i64, AppError>;
        }
    }

    mock! {
        JoinRequestRepo {}

        #[async_trait]
        impl RoomJoinRequestRepository for JoinRequestRepo {
            async fn find_by_id(&self, id: i64) -> Result<Option<RoomJoinRequest>, AppError>;
            async fn find_pending(
                &self,
                room_id: i64,
                user_id: Uuid,
            ) -> Result<Option<RoomJoinRequest>, AppError>;
            async fn create(&self, request: &RoomJoinRequest) -> Result<RoomJoinRequest, AppError>;
            async fn approve(&self, id: i64) -> Result<(), AppError>;
            async fn reject(&self, id: i64) -> Result<(), AppError>;
            async fn list_pending(&self, room_id: i64) -> Result<Vec<JoinRequestEntry>, AppError>;
        }
    }

    fn service(
        room_repo: MockRoomRepo,
        member_repo: MockMemberRepo,
        join_request_repo: MockJoinRequestRepo,
    ) -> RoomServiceImpl<MockRoomRepo, MockMemberRepo, MockJoinRequestRepo> {
        RoomServiceImpl::new(
            Arc::new(room_repo),
            Arc::new(member_repo),
            Arc::new(join_request_repo),
        )
    }

    fn room(room_type: RoomType, creator_id: Uuid) -> Room {
        let mut room = Room::new("Test Lobby".to_string(), None, room_type, creator_id);
        room.id = 42;
        room
    }

    #[tokio::test]
    async fn test_join_public_room_creates_membership() {
        let user_id = Uuid::new_v4();
        let lobby = room(RoomType::Public, Uuid::new_v4());

        let mut room_repo = MockRoomRepo::new();
        room_repo
            .expect_find_by_id()
            .with(eq(42i64))
            .returning(move |_| Ok(Some(lobby.clone())));
        room_repo
            .expect_touch_last_active()
            .with(eq(42i64))
            .returning(|_| Ok(()));

        let mut member_repo = MockMemberRepo::new();
        member_repo.expect_is_member().returning(|_, _| Ok(false));
        member_repo
            .expect_create()
            .withf(move |m| m.user_id == user_id && m.role == RoomRole::Member)
            .returning(|m| Ok(m.clone()));

        let svc = service(room_repo, member_repo, MockJoinRequestRepo::new());

        let outcome = svc.join_room(user_id, 42).await.unwrap();
        assert_eq!(outcome, JoinOutcome::Joined);
    }

    #[tokio::test]
    async fn test_join_twice_reports_existing_membership() {
        let lobby = room(RoomType::Public, Uuid::new_v4());

        let mut room_repo = MockRoomRepo::new();
        room_repo
            .expect_find_by_id()
            .returning(move |_| Ok(Some(lobby.clone())));

        let mut member_repo = MockMemberRepo::new();
        member_repo.expect_is_member().returning(|_, _| Ok(true));

        let svc = service(room_repo, member_repo, MockJoinRequestRepo::new());

        let outcome = svc.join_room(Uuid::new_v4(), 42).await.unwrap();
        assert_eq!(outcome, JoinOutcome::AlreadyMember);
    }

    #[tokio::test]
    async fn test_join_private_room_files_a_request() {
        let lobby = room(RoomType::Private, Uuid::new_v4());

        let mut room_repo = MockRoomRepo::new();
        room_repo
            .expect_find_by_id()
            .returning(move |_| Ok(Some(lobby.clone())));

        let mut member_repo = MockMemberRepo::new();
        member_repo.expect_is_member().returning(|_, _| Ok(false));

        let mut join_request_repo = MockJoinRequestRepo::new();
        join_request_repo
            .expect_find_pending()
            .returning(|_, _| Ok(None));
        join_request_repo
            .expect_create()
            .returning(|r| Ok(r.clone()));

        let svc = service(room_repo, member_repo, join_request_repo);

        let outcome = svc.join_room(Uuid::new_v4(), 42).await.unwrap();
        assert_eq!(outcome, JoinOutcome::RequestSubmitted);
    }

    #[tokio::test]
    async fn test_join_private_room_with_request_already_pending() {
        let user_id = Uuid::new_v4();
        let lobby = room(RoomType::Private, Uuid::new_v4());

        let mut room_repo = MockRoomRepo::new();
        room_repo
            .expect_find_by_id()
            .returning(move |_| Ok(Some(lobby.clone())));

        let mut member_repo = MockMemberRepo::new();
        member_repo.expect_is_member().returning(|_, _| Ok(false));

        let mut join_request_repo = MockJoinRequestRepo::new();
        join_request_repo
            .expect_find_pending()
            .returning(move |room_id, _| Ok(Some(RoomJoinRequest::new(room_id, user_id))));

        let svc = service(room_repo, member_repo, join_request_repo);

        let outcome = svc.join_room(user_id, 42).await.unwrap();
        assert_eq!(outcome, JoinOutcome::RequestPending);
    }

    #[tokio::test]
    async fn test_join_missing_room_fails() {
        let mut room_repo = MockRoomRepo::new();
        room_repo.expect_find_by_id().returning(|_| Ok(None));

        let svc = service(room_repo, MockMemberRepo::new(), MockJoinRequestRepo::new());

        let result = svc.join_room(Uuid::new_v4(), 999).await;
        assert!(matches!(result, Err(RoomError::RoomNotFound)));
    }

    #[tokio::test]
    async fn test_owner_cannot_leave() {
        let owner_id = Uuid::new_v4();
        let lobby = room(RoomType::Public, owner_id);

        let mut room_repo = MockRoomRepo::new();
        room_repo
            .expect_find_by_id()
            .returning(move |_| Ok(Some(lobby.clone())));

        let svc = service(room_repo, MockMemberRepo::new(), MockJoinRequestRepo::new());

        let result = svc.leave_room(owner_id, 42).await;
        assert!(matches!(result, Err(RoomError::OwnerCannotLeave)));
    }

    #[tokio::test]
    async fn test_last_member_leaving_deletes_the_room() {
        let lobby = room(RoomType::Public, Uuid::new_v4());

        let mut room_repo = MockRoomRepo::new();
        room_repo
            .expect_find_by_id()
            .returning(move |_| Ok(Some(lobby.clone())));

        let mut member_repo = MockMemberRepo::new();
        member_repo.expect_leave().returning(|_, _| Ok((true, true)));

        let svc = service(room_repo, member_repo, MockJoinRequestRepo::new());

        let outcome = svc.leave_room(Uuid::new_v4(), 42).await.unwrap();
        assert!(outcome.room_deleted);
    }

    #[tokio::test]
    async fn test_leave_without_membership_fails() {
        let lobby = room(RoomType::Public, Uuid::new_v4());

        let mut room_repo = MockRoomRepo::new();
        room_repo
            .expect_find_by_id()
            .returning(move |_| Ok(Some(lobby.clone())));

        let mut member_repo = MockMemberRepo::new();
        member_repo
            .expect_leave()
            .returning(|_, _| Ok((false, false)));

        let svc = service(room_repo, member_repo, MockJoinRequestRepo::new());

        let result = svc.leave_room(Uuid::new_v4(), 42).await;
        assert!(matches!(result, Err(RoomError::MembershipNotFound)));
    }

    #[tokio::test]
    async fn test_list_members_requires_membership() {
        let lobby = room(RoomType::Public, Uuid::new_v4());

        let mut room_repo = MockRoomRepo::new();
        room_repo
            .expect_find_by_id()
            .returning(move |_| Ok(Some(lobby.clone())));

        let mut member_repo = MockMemberRepo::new();
        member_repo.expect_is_member().returning(|_, _| Ok(false));

        let svc = service(room_repo, member_repo, MockJoinRequestRepo::new());

        let result = svc.list_members(Uuid::new_v4(), false, 42).await;
        assert!(matches!(result, Err(RoomError::MemberAccessRequired)));
    }

    #[tokio::test]
    async fn test_list_members_allows_site_admin() {
        let lobby = room(RoomType::Public, Uuid::new_v4());

        let mut room_repo = MockRoomRepo::new();
        room_repo
            .expect_find_by_id()
            .returning(move |_| Ok(Some(lobby.clone())));

        let mut member_repo = MockMemberRepo::new();
        member_repo.expect_list_by_room().returning(|_| Ok(vec![]));

        let svc = service(room_repo, member_repo, MockJoinRequestRepo::new());

        let members = svc.list_members(Uuid::new_v4(), true, 42).await.unwrap();
        assert!(members.is_empty());
    }

    #[tokio::test]
    async fn test_delete_room_requires_creator() {
        let lobby = room(RoomType::Public, Uuid::new_v4());

        let mut room_repo = MockRoomRepo::new();
        room_repo
            .expect_find_by_id()
            .returning(move |_| Ok(Some(lobby.clone())));

        let svc = service(room_repo, MockMemberRepo::new(), MockJoinRequestRepo::new());

        let result = svc.delete_room(Uuid::new_v4(), 42).await;
        assert!(matches!(result, Err(RoomError::OnlyCreatorCanDelete)));
    }

    #[tokio::test]
    async fn test_approve_join_request_from_another_room_fails() {
        let owner_id = Uuid::new_v4();
        let lobby = room(RoomType::Private, owner_id);

        let mut room_repo = MockRoomRepo::new();
        room_repo
            .expect_find_by_id()
            .returning(move |_| Ok(Some(lobby.clone())));

        // Request belongs to room 99, not room 42
        let mut join_request_repo = MockJoinRequestRepo::new();
        join_request_repo
            .expect_find_by_id()
            .returning(|id| {
                let mut request = RoomJoinRequest::new(99, Uuid::new_v4());
                request.id = id;
                Ok(Some(request))
            });

        let svc = service(room_repo, MockMemberRepo::new(), join_request_repo);

        let result = svc
            .respond_join_request(owner_id, false, 42, 5, JoinRequestAction::Approve)
            .await;
        assert!(matches!(result, Err(RoomError::JoinRequestNotFound)));
    }

    #[tokio::test]
    async fn test_approve_join_request_by_owner() {
        let owner_id = Uuid::new_v4();
        let lobby = room(RoomType::Private, owner_id);

        let mut room_repo = MockRoomRepo::new();
        room_repo
            .expect_find_by_id()
            .returning(move |_| Ok(Some(lobby.clone())));

        let mut join_request_repo = MockJoinRequestRepo::new();
        join_request_repo
            .expect_find_by_id()
            .returning(|id| {
                let mut request = RoomJoinRequest::new(42, Uuid::new_v4());
                request.id = id;
                Ok(Some(request))
            });
        join_request_repo
            .expect_approve()
            .with(eq(5i64))
            .times(1)
            .returning(|_| Ok(()));

        let svc = service(room_repo, MockMemberRepo::new(), join_request_repo);

        svc.respond_join_request(owner_id, false, 42, 5, JoinRequestAction::Approve)
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn test_respond_join_request_requires_owner_or_admin() {
        let lobby = room(RoomType::Private, Uuid::new_v4());

        let mut room_repo = MockRoomRepo::new();
        room_repo
            .expect_find_by_id()
            .returning(move |_| Ok(Some(lobby.clone())));

        let svc = service(room_repo, MockMemberRepo::new(), MockJoinRequestRepo::new());

        let result = svc
            .respond_join_request(Uuid::new_v4(), false, 42, 5, JoinRequestAction::Reject)
            .await;
        assert!(matches!(result, Err(RoomError::JoinRequestAccessDenied)));
    }

    #[tokio::test]
    async fn test_kick_owner_is_forbidden() {
        let owner_id = Uuid::new_v4();
        let lobby = room(RoomType::Public, owner_id);

        let mut room_repo = MockRoomRepo::new();
        room_repo
            .expect_find_by_id()
            .returning(move |_| Ok(Some(lobby.clone())));

        let svc = service(room_repo, MockMemberRepo::new(), MockJoinRequestRepo::new());

        // Even a site admin cannot kick the owner
        let result = svc.kick_member(Uuid::new_v4(), true, 42, owner_id).await;
        assert!(matches!(result, Err(RoomError::CannotKickOwner)));
    }

    #[tokio::test]
    async fn test_kick_non_member_fails() {
        let owner_id = Uuid::new_v4();
        let lobby = room(RoomType::Public, owner_id);

        let mut room_repo = MockRoomRepo::new();
        room_repo
            .expect_find_by_id()
            .returning(move |_| Ok(Some(lobby.clone())));

        let mut member_repo = MockMemberRepo::new();
        member_repo.expect_delete().returning(|_, _| Ok(false));

        let svc = service(room_repo, member_repo, MockJoinRequestRepo::new());

        let result = svc
            .kick_member(owner_id, false, 42, Uuid::new_v4())
            .await;
        assert!(matches!(result, Err(RoomError::KickTargetNotFound)));
    }
}
