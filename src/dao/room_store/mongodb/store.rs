use futures::{TryStreamExt, future::BoxFuture};
use mongodb::{
    Collection,
    bson::{DateTime, Document, doc},
    error::{Error as MongoError, ErrorKind, WriteFailure},
    options::ReturnDocument,
};
use tracing::debug;
use uuid::Uuid;

use super::{
    error::{MongoDaoError, MongoResult},
    manager::{self, ANSWERS, INVITES, MongoManager, QUESTION_SETS, ROOMS},
    models::{
        MongoAnswerDocument, MongoInviteDocument, MongoQuestionSetDocument, MongoRoomDocument,
        doc_id, room_filter,
    },
};
use crate::dao::{
    models::{
        AnswerEntity, AnswerInsert, InviteEntity, InviteStatus, QuestionSetEntity, RoomEntity,
        RoomStatus,
    },
    room_store::RoomStore,
    storage::{StorageError, StorageResult},
};

const DUPLICATE_KEY_CODE: i32 = 11000;

/// [`RoomStore`] persisting every record in its own MongoDB collection.
#[derive(Clone)]
pub struct MongoRoomStore {
    manager: MongoManager,
}

impl MongoRoomStore {
    /// Establish a connection to MongoDB and ensure indexes are present.
    pub async fn connect(uri: &str, db_name: Option<&str>) -> MongoResult<Self> {
        let manager = manager::connect(uri, db_name).await?;
        manager::ensure_indexes(&manager.database().await).await?;
        Ok(Self { manager })
    }

    async fn rooms(&self) -> Collection<MongoRoomDocument> {
        self.manager.database().await.collection(ROOMS)
    }

    async fn invites(&self) -> Collection<MongoInviteDocument> {
        self.manager.database().await.collection(INVITES)
    }

    async fn question_sets(&self) -> Collection<MongoQuestionSetDocument> {
        self.manager.database().await.collection(QUESTION_SETS)
    }

    async fn answers(&self) -> Collection<MongoAnswerDocument> {
        self.manager.database().await.collection(ANSWERS)
    }

    async fn insert_room(&self, room: RoomEntity) -> StorageResult<()> {
        let id = room.id;
        let document: MongoRoomDocument = room.into();
        self.rooms()
            .await
            .insert_one(&document)
            .await
            .map_err(|source| MongoDaoError::WriteRoom { id, source })?;
        Ok(())
    }

    async fn find_room(&self, id: Uuid) -> StorageResult<Option<RoomEntity>> {
        let document = self
            .rooms()
            .await
            .find_one(doc_id(id))
            .await
            .map_err(|source| MongoDaoError::LoadRoom { id, source })?;
        document.map(RoomEntity::try_from).transpose()
    }

    async fn list_rooms_for_user(&self, user_id: String) -> StorageResult<Vec<RoomEntity>> {
        let documents: Vec<MongoRoomDocument> = self
            .rooms()
            .await
            .find(doc! {"$or": [{"creator_id": user_id.as_str()}, {"partner_id": user_id.as_str()}]})
            .sort(doc! {"created_at": -1})
            .await
            .map_err(|source| MongoDaoError::QueryRooms { source })?
            .try_collect()
            .await
            .map_err(|source| MongoDaoError::QueryRooms { source })?;
        documents.into_iter().map(RoomEntity::try_from).collect()
    }

    async fn claim_partner(
        &self,
        room_id: Uuid,
        partner_id: String,
    ) -> StorageResult<Option<RoomEntity>> {
        let updated = self
            .rooms()
            .await
            .find_one_and_update(
                doc! {"_id": room_id.to_string(), "partner_id": null},
                doc! {"$set": {"partner_id": partner_id.as_str(), "updated_at": DateTime::now()}},
            )
            .return_document(ReturnDocument::After)
            .await
            .map_err(|source| MongoDaoError::WriteRoom { id: room_id, source })?;
        updated.map(RoomEntity::try_from).transpose()
    }

    async fn transition_status(
        &self,
        room_id: Uuid,
        from: RoomStatus,
        to: RoomStatus,
    ) -> StorageResult<bool> {
        let result = self
            .rooms()
            .await
            .update_one(
                doc! {"_id": room_id.to_string(), "status": from.as_str()},
                doc! {"$set": {"status": to.as_str(), "updated_at": DateTime::now()}},
            )
            .await
            .map_err(|source| MongoDaoError::WriteRoom { id: room_id, source })?;
        Ok(result.modified_count == 1)
    }

    async fn insert_invite(&self, invite: InviteEntity) -> StorageResult<()> {
        let id = invite.id;
        let document: MongoInviteDocument = invite.into();
        self.invites()
            .await
            .insert_one(&document)
            .await
            .map_err(|source| MongoDaoError::WriteInvite { id, source })?;
        Ok(())
    }

    async fn find_invites(&self, filter: Document) -> StorageResult<Vec<InviteEntity>> {
        let documents: Vec<MongoInviteDocument> = self
            .invites()
            .await
            .find(filter)
            .sort(doc! {"created_at": -1})
            .await
            .map_err(|source| MongoDaoError::QueryInvites { source })?
            .try_collect()
            .await
            .map_err(|source| MongoDaoError::QueryInvites { source })?;
        documents.into_iter().map(InviteEntity::try_from).collect()
    }

    async fn mark_invite_accepted(&self, invite_id: Uuid) -> StorageResult<bool> {
        let result = self
            .invites()
            .await
            .update_one(
                doc! {"_id": invite_id.to_string(), "status": InviteStatus::Pending.as_str()},
                doc! {"$set": {"status": InviteStatus::Accepted.as_str()}},
            )
            .await
            .map_err(|source| MongoDaoError::WriteInvite { id: invite_id, source })?;
        Ok(result.modified_count == 1)
    }

    async fn upsert_question_set(&self, set: QuestionSetEntity) -> StorageResult<()> {
        let room_id = set.room_id;
        let author_id = set.author_id.clone();
        let document: MongoQuestionSetDocument = set.into();
        self.question_sets()
            .await
            .replace_one(
                doc! {"room_id": room_id.to_string(), "author_id": author_id.as_str()},
                &document,
            )
            .upsert(true)
            .await
            .map_err(|source| MongoDaoError::WriteQuestions {
                room_id,
                author_id,
                source,
            })?;
        Ok(())
    }

    async fn find_question_set(
        &self,
        room_id: Uuid,
        author_id: String,
    ) -> StorageResult<Option<QuestionSetEntity>> {
        let document = self
            .question_sets()
            .await
            .find_one(doc! {"room_id": room_id.to_string(), "author_id": author_id.as_str()})
            .await
            .map_err(|source| MongoDaoError::LoadQuestions { room_id, source })?;
        document.map(QuestionSetEntity::try_from).transpose()
    }

    async fn list_question_sets(&self, room_id: Uuid) -> StorageResult<Vec<QuestionSetEntity>> {
        let documents: Vec<MongoQuestionSetDocument> = self
            .question_sets()
            .await
            .find(room_filter(room_id))
            .await
            .map_err(|source| MongoDaoError::LoadQuestions { room_id, source })?
            .try_collect()
            .await
            .map_err(|source| MongoDaoError::LoadQuestions { room_id, source })?;
        documents.into_iter().map(QuestionSetEntity::try_from).collect()
    }

    async fn insert_answer(&self, answer: AnswerEntity) -> StorageResult<AnswerInsert> {
        let room_id = answer.room_id;
        let document: MongoAnswerDocument = answer.into();
        match self.answers().await.insert_one(&document).await {
            Ok(_) => Ok(AnswerInsert::Inserted),
            Err(err) if is_duplicate_key(&err) => {
                debug!(%room_id, "answer rejected by unique index");
                Ok(AnswerInsert::Duplicate)
            }
            Err(source) => Err(MongoDaoError::WriteAnswer { room_id, source }.into()),
        }
    }

    async fn list_answers(&self, room_id: Uuid) -> StorageResult<Vec<AnswerEntity>> {
        let documents: Vec<MongoAnswerDocument> = self
            .answers()
            .await
            .find(room_filter(room_id))
            .sort(doc! {"created_at": 1})
            .await
            .map_err(|source| MongoDaoError::LoadAnswers { room_id, source })?
            .try_collect()
            .await
            .map_err(|source| MongoDaoError::LoadAnswers { room_id, source })?;
        documents.into_iter().map(AnswerEntity::try_from).collect()
    }

    async fn count_answers(&self, room_id: Uuid) -> StorageResult<usize> {
        let count = self
            .answers()
            .await
            .count_documents(room_filter(room_id))
            .await
            .map_err(|source| MongoDaoError::LoadAnswers { room_id, source })?;
        usize::try_from(count)
            .map_err(|_| StorageError::corrupted(ANSWERS, format!("answer count {count} overflows")))
    }
}

fn is_duplicate_key(err: &MongoError) -> bool {
    matches!(
        err.kind.as_ref(),
        ErrorKind::Write(WriteFailure::WriteError(write_error))
            if write_error.code == DUPLICATE_KEY_CODE
    )
}

impl RoomStore for MongoRoomStore {
    fn insert_room(&self, room: RoomEntity) -> BoxFuture<'static, StorageResult<()>> {
        let store = self.clone();
        Box::pin(async move { store.insert_room(room).await })
    }

    fn find_room(&self, id: Uuid) -> BoxFuture<'static, StorageResult<Option<RoomEntity>>> {
        let store = self.clone();
        Box::pin(async move { store.find_room(id).await })
    }

    fn list_rooms_for_user(
        &self,
        user_id: String,
    ) -> BoxFuture<'static, StorageResult<Vec<RoomEntity>>> {
        let store = self.clone();
        Box::pin(async move { store.list_rooms_for_user(user_id).await })
    }

    fn claim_partner(
        &self,
        room_id: Uuid,
        partner_id: String,
    ) -> BoxFuture<'static, StorageResult<Option<RoomEntity>>> {
        let store = self.clone();
        Box::pin(async move { store.claim_partner(room_id, partner_id).await })
    }

    fn transition_status(
        &self,
        room_id: Uuid,
        from: RoomStatus,
        to: RoomStatus,
    ) -> BoxFuture<'static, StorageResult<bool>> {
        let store = self.clone();
        Box::pin(async move { store.transition_status(room_id, from, to).await })
    }

    fn insert_invite(&self, invite: InviteEntity) -> BoxFuture<'static, StorageResult<()>> {
        let store = self.clone();
        Box::pin(async move { store.insert_invite(invite).await })
    }

    fn list_room_invites(
        &self,
        room_id: Uuid,
    ) -> BoxFuture<'static, StorageResult<Vec<InviteEntity>>> {
        let store = self.clone();
        Box::pin(async move { store.find_invites(room_filter(room_id)).await })
    }

    fn list_pending_invites(
        &self,
        email: String,
    ) -> BoxFuture<'static, StorageResult<Vec<InviteEntity>>> {
        let store = self.clone();
        Box::pin(async move {
            store
                .find_invites(
                    doc! {"invitee_email": email, "status": InviteStatus::Pending.as_str()},
                )
                .await
        })
    }

    fn mark_invite_accepted(&self, invite_id: Uuid) -> BoxFuture<'static, StorageResult<bool>> {
        let store = self.clone();
        Box::pin(async move { store.mark_invite_accepted(invite_id).await })
    }

    fn upsert_question_set(
        &self,
        set: QuestionSetEntity,
    ) -> BoxFuture<'static, StorageResult<()>> {
        let store = self.clone();
        Box::pin(async move { store.upsert_question_set(set).await })
    }

    fn find_question_set(
        &self,
        room_id: Uuid,
        author_id: String,
    ) -> BoxFuture<'static, StorageResult<Option<QuestionSetEntity>>> {
        let store = self.clone();
        Box::pin(async move { store.find_question_set(room_id, author_id).await })
    }

    fn list_question_sets(
        &self,
        room_id: Uuid,
    ) -> BoxFuture<'static, StorageResult<Vec<QuestionSetEntity>>> {
        let store = self.clone();
        Box::pin(async move { store.list_question_sets(room_id).await })
    }

    fn insert_answer(
        &self,
        answer: AnswerEntity,
    ) -> BoxFuture<'static, StorageResult<AnswerInsert>> {
        let store = self.clone();
        Box::pin(async move { store.insert_answer(answer).await })
    }

    fn list_answers(&self, room_id: Uuid) -> BoxFuture<'static, StorageResult<Vec<AnswerEntity>>> {
        let store = self.clone();
        Box::pin(async move { store.list_answers(room_id).await })
    }

    fn count_answers(&self, room_id: Uuid) -> BoxFuture<'static, StorageResult<usize>> {
        let store = self.clone();
        Box::pin(async move { store.count_answers(room_id).await })
    }

    fn health_check(&self) -> BoxFuture<'static, StorageResult<()>> {
        let store = self.clone();
        Box::pin(async move { store.manager.ping().await.map_err(Into::into) })
    }

    fn try_reconnect(&self) -> BoxFuture<'static, StorageResult<()>> {
        let store = self.clone();
        Box::pin(async move { store.manager.reconnect().await.map_err(Into::into) })
    }
}
