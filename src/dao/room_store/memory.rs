//! In-process [`RoomStore`] backed by concurrent hash maps.
//!
//! Conditional writes rely on DashMap shard locks: the check and the mutation of a single
//! record happen while holding the write guard for that key.

use std::{sync::Arc, time::SystemTime};

use dashmap::{DashMap, mapref::entry::Entry};
use futures::future::{self, BoxFuture, FutureExt};
use uuid::Uuid;

use crate::dao::{
    models::{
        AnswerEntity, AnswerInsert, InviteEntity, InviteStatus, QuestionSetEntity, RoomEntity,
        RoomStatus,
    },
    room_store::RoomStore,
    storage::StorageResult,
};

type AnswerKey = (Uuid, String, usize);

#[derive(Default)]
struct Tables {
    rooms: DashMap<Uuid, RoomEntity>,
    invites: DashMap<Uuid, InviteEntity>,
    question_sets: DashMap<(Uuid, String), QuestionSetEntity>,
    answers: DashMap<AnswerKey, AnswerEntity>,
}

/// Memory-resident store, cheap to clone and shared between handlers.
#[derive(Clone, Default)]
pub struct MemoryRoomStore {
    tables: Arc<Tables>,
}

impl MemoryRoomStore {
    /// Empty store.
    pub fn new() -> Self {
        Self::default()
    }

    fn claim(&self, room_id: Uuid, partner_id: String) -> Option<RoomEntity> {
        let mut room = self.tables.rooms.get_mut(&room_id)?;
        if room.partner_id.is_some() {
            return None;
        }
        room.partner_id = Some(partner_id);
        room.updated_at = SystemTime::now();
        Some(room.value().clone())
    }

    fn transition(&self, room_id: Uuid, from: RoomStatus, to: RoomStatus) -> bool {
        match self.tables.rooms.get_mut(&room_id) {
            Some(mut room) if room.status == from => {
                room.status = to;
                room.updated_at = SystemTime::now();
                true
            }
            _ => false,
        }
    }

    fn accept(&self, invite_id: Uuid) -> bool {
        match self.tables.invites.get_mut(&invite_id) {
            Some(mut invite) if invite.status == InviteStatus::Pending => {
                invite.status = InviteStatus::Accepted;
                true
            }
            _ => false,
        }
    }

    fn append_answer(&self, answer: AnswerEntity) -> AnswerInsert {
        let key = (answer.room_id, answer.user_id.clone(), answer.question_id);
        match self.tables.answers.entry(key) {
            Entry::Occupied(_) => AnswerInsert::Duplicate,
            Entry::Vacant(slot) => {
                slot.insert(answer);
                AnswerInsert::Inserted
            }
        }
    }

    fn rooms_for(&self, user_id: &str) -> Vec<RoomEntity> {
        let mut rooms: Vec<RoomEntity> = self
            .tables
            .rooms
            .iter()
            .filter(|room| room.is_participant(user_id))
            .map(|room| room.value().clone())
            .collect();
        rooms.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        rooms
    }

    fn pending_for(&self, email: &str) -> Vec<InviteEntity> {
        let mut invites: Vec<InviteEntity> = self
            .tables
            .invites
            .iter()
            .filter(|invite| invite.status == InviteStatus::Pending && invite.invitee_email == email)
            .map(|invite| invite.value().clone())
            .collect();
        invites.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        invites
    }
}

impl RoomStore for MemoryRoomStore {
    fn insert_room(&self, room: RoomEntity) -> BoxFuture<'static, StorageResult<()>> {
        self.tables.rooms.insert(room.id, room);
        future::ready(Ok(())).boxed()
    }

    fn find_room(&self, id: Uuid) -> BoxFuture<'static, StorageResult<Option<RoomEntity>>> {
        let room = self.tables.rooms.get(&id).map(|room| room.value().clone());
        future::ready(Ok(room)).boxed()
    }

    fn list_rooms_for_user(
        &self,
        user_id: String,
    ) -> BoxFuture<'static, StorageResult<Vec<RoomEntity>>> {
        future::ready(Ok(self.rooms_for(&user_id))).boxed()
    }

    fn claim_partner(
        &self,
        room_id: Uuid,
        partner_id: String,
    ) -> BoxFuture<'static, StorageResult<Option<RoomEntity>>> {
        future::ready(Ok(self.claim(room_id, partner_id))).boxed()
    }

    fn transition_status(
        &self,
        room_id: Uuid,
        from: RoomStatus,
        to: RoomStatus,
    ) -> BoxFuture<'static, StorageResult<bool>> {
        future::ready(Ok(self.transition(room_id, from, to))).boxed()
    }

    fn insert_invite(&self, invite: InviteEntity) -> BoxFuture<'static, StorageResult<()>> {
        self.tables.invites.insert(invite.id, invite);
        future::ready(Ok(())).boxed()
    }

    fn list_room_invites(
        &self,
        room_id: Uuid,
    ) -> BoxFuture<'static, StorageResult<Vec<InviteEntity>>> {
        let invites = self
            .tables
            .invites
            .iter()
            .filter(|invite| invite.room_id == room_id)
            .map(|invite| invite.value().clone())
            .collect();
        future::ready(Ok(invites)).boxed()
    }

    fn list_pending_invites(
        &self,
        email: String,
    ) -> BoxFuture<'static, StorageResult<Vec<InviteEntity>>> {
        future::ready(Ok(self.pending_for(&email))).boxed()
    }

    fn mark_invite_accepted(&self, invite_id: Uuid) -> BoxFuture<'static, StorageResult<bool>> {
        future::ready(Ok(self.accept(invite_id))).boxed()
    }

    fn upsert_question_set(
        &self,
        set: QuestionSetEntity,
    ) -> BoxFuture<'static, StorageResult<()>> {
        self.tables
            .question_sets
            .insert((set.room_id, set.author_id.clone()), set);
        future::ready(Ok(())).boxed()
    }

    fn find_question_set(
        &self,
        room_id: Uuid,
        author_id: String,
    ) -> BoxFuture<'static, StorageResult<Option<QuestionSetEntity>>> {
        let set = self
            .tables
            .question_sets
            .get(&(room_id, author_id))
            .map(|set| set.value().clone());
        future::ready(Ok(set)).boxed()
    }

    fn list_question_sets(
        &self,
        room_id: Uuid,
    ) -> BoxFuture<'static, StorageResult<Vec<QuestionSetEntity>>> {
        let sets = self
            .tables
            .question_sets
            .iter()
            .filter(|set| set.room_id == room_id)
            .map(|set| set.value().clone())
            .collect();
        future::ready(Ok(sets)).boxed()
    }

    fn insert_answer(
        &self,
        answer: AnswerEntity,
    ) -> BoxFuture<'static, StorageResult<AnswerInsert>> {
        future::ready(Ok(self.append_answer(answer))).boxed()
    }

    fn list_answers(&self, room_id: Uuid) -> BoxFuture<'static, StorageResult<Vec<AnswerEntity>>> {
        let mut answers: Vec<AnswerEntity> = self
            .tables
            .answers
            .iter()
            .filter(|answer| answer.room_id == room_id)
            .map(|answer| answer.value().clone())
            .collect();
        answers.sort_by(|a, b| a.created_at.cmp(&b.created_at));
        future::ready(Ok(answers)).boxed()
    }

    fn count_answers(&self, room_id: Uuid) -> BoxFuture<'static, StorageResult<usize>> {
        let count = self
            .tables
            .answers
            .iter()
            .filter(|answer| answer.room_id == room_id)
            .count();
        future::ready(Ok(count)).boxed()
    }

    fn health_check(&self) -> BoxFuture<'static, StorageResult<()>> {
        future::ready(Ok(())).boxed()
    }

    fn try_reconnect(&self) -> BoxFuture<'static, StorageResult<()>> {
        future::ready(Ok(())).boxed()
    }
}
