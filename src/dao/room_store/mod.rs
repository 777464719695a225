pub mod memory;
/// MongoDB backend.
#[cfg(feature = "mongo-store")]
pub mod mongodb;

use crate::dao::models::{
    AnswerEntity, AnswerInsert, InviteEntity, QuestionSetEntity, RoomEntity, RoomStatus,
};
use crate::dao::storage::StorageResult;
use futures::future::BoxFuture;
use uuid::Uuid;

/// Abstraction over the persistence service holding rooms, invites, question sets and answers.
///
/// Every write that participates in the room protocol is conditional: implementations must
/// apply the check and the mutation atomically per record so concurrent callers cannot both
/// succeed.
pub trait RoomStore: Send + Sync {
    /// Persist a new room.
    fn insert_room(&self, room: RoomEntity) -> BoxFuture<'static, StorageResult<()>>;
    /// Fetch a room by id.
    fn find_room(&self, id: Uuid) -> BoxFuture<'static, StorageResult<Option<RoomEntity>>>;
    /// Rooms where `user_id` is creator or partner, newest first.
    fn list_rooms_for_user(
        &self,
        user_id: String,
    ) -> BoxFuture<'static, StorageResult<Vec<RoomEntity>>>;
    /// Bind `partner_id` only if the room has no partner yet.
    ///
    /// Returns the updated room, or `None` when the room is missing or the slot is taken.
    fn claim_partner(
        &self,
        room_id: Uuid,
        partner_id: String,
    ) -> BoxFuture<'static, StorageResult<Option<RoomEntity>>>;
    /// Move the room from `from` to `to`; returns `false` when the current status differs.
    fn transition_status(
        &self,
        room_id: Uuid,
        from: RoomStatus,
        to: RoomStatus,
    ) -> BoxFuture<'static, StorageResult<bool>>;

    /// Persist a new invite.
    fn insert_invite(&self, invite: InviteEntity) -> BoxFuture<'static, StorageResult<()>>;
    /// Every invite of a room, whatever its status.
    fn list_room_invites(
        &self,
        room_id: Uuid,
    ) -> BoxFuture<'static, StorageResult<Vec<InviteEntity>>>;
    /// Pending invites addressed to an already normalised email, newest first.
    fn list_pending_invites(
        &self,
        email: String,
    ) -> BoxFuture<'static, StorageResult<Vec<InviteEntity>>>;
    /// Flip the invite from pending to accepted; returns `false` if it was not pending.
    fn mark_invite_accepted(&self, invite_id: Uuid) -> BoxFuture<'static, StorageResult<bool>>;

    /// Insert or replace the set keyed by `(room_id, author_id)`.
    fn upsert_question_set(
        &self,
        set: QuestionSetEntity,
    ) -> BoxFuture<'static, StorageResult<()>>;
    /// Set authored by `author_id` in the room, if any.
    fn find_question_set(
        &self,
        room_id: Uuid,
        author_id: String,
    ) -> BoxFuture<'static, StorageResult<Option<QuestionSetEntity>>>;
    /// Every set authored in the room.
    fn list_question_sets(
        &self,
        room_id: Uuid,
    ) -> BoxFuture<'static, StorageResult<Vec<QuestionSetEntity>>>;

    /// Append an answer unless one exists for the same `(room, user, question)`.
    fn insert_answer(&self, answer: AnswerEntity)
    -> BoxFuture<'static, StorageResult<AnswerInsert>>;
    /// Answers of the room, oldest first.
    fn list_answers(&self, room_id: Uuid) -> BoxFuture<'static, StorageResult<Vec<AnswerEntity>>>;
    /// Number of answers recorded in the room.
    fn count_answers(&self, room_id: Uuid) -> BoxFuture<'static, StorageResult<usize>>;

    /// Cheap round-trip proving the backend is reachable.
    fn health_check(&self) -> BoxFuture<'static, StorageResult<()>>;
    /// Re-establish the backend connection after a failed health check.
    fn try_reconnect(&self) -> BoxFuture<'static, StorageResult<()>>;
}
