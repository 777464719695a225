#![allow(dead_code)]

use std::{
    io,
    sync::{
        Arc,
        atomic::{AtomicBool, AtomicUsize, Ordering},
    },
};

use axum::Router;
use axum::body::Body;
use axum::http::{Request, StatusCode};
use axum::response::Response;
use futures::future::BoxFuture;
use http_body_util::BodyExt;
use partner_quiz_back::{
    auth::{USER_EMAIL_HEADER, USER_ID_HEADER},
    build_app,
    config::AppConfig,
    dao::{
        models::{
            AnswerEntity, AnswerInsert, InviteEntity, QuestionSetEntity, RoomEntity, RoomStatus,
        },
        room_store::{RoomStore, memory::MemoryRoomStore},
        storage::{StorageError, StorageResult},
    },
    state::{AppState, SharedState},
};
use serde_json::{Value, json};
use tokio::sync::Barrier;
use uuid::Uuid;

pub struct User {
    pub id: &'static str,
    pub email: &'static str,
}

pub const ALICE: User = User {
    id: "alice",
    email: "alice@example.com",
};
pub const BOB: User = User {
    id: "bob",
    email: "bob@example.com",
};
pub const CAROL: User = User {
    id: "carol",
    email: "carol@example.com",
};

pub struct TestApp {
    pub router: Router,
    pub state: SharedState,
}

impl TestApp {
    pub async fn new() -> Self {
        Self::with_store(Arc::new(MemoryRoomStore::new())).await
    }

    pub async fn with_store(store: Arc<dyn RoomStore>) -> Self {
        let state = AppState::with_store(AppConfig::default(), store).await;
        Self::from_state(state)
    }

    /// App without any room store, as while storage is unreachable.
    pub fn degraded() -> Self {
        Self::from_state(AppState::new(AppConfig::default()))
    }

    fn from_state(state: SharedState) -> Self {
        let router = build_app(state.clone());
        Self { router, state }
    }

    /// Send a request through the app and return the response.
    pub async fn request(&self, req: Request<Body>) -> Response {
        tower::ServiceExt::oneshot(self.router.clone(), req)
            .await
            .unwrap()
    }

    /// Send a GET request, identified as `user` when given.
    pub async fn get(&self, uri: &str, user: Option<&User>) -> Response {
        let builder = with_identity(Request::builder().uri(uri), user);
        self.request(builder.body(Body::empty()).unwrap()).await
    }

    /// Send a JSON POST request, identified as `user` when given.
    pub async fn post_json(&self, uri: &str, body: Value, user: Option<&User>) -> Response {
        let builder = with_identity(
            Request::builder()
                .uri(uri)
                .method("POST")
                .header("content-type", "application/json"),
            user,
        );
        self.request(builder.body(Body::from(body.to_string())).unwrap())
            .await
    }

    /// Create a room as `creator` inviting `partner_email`, returning its id.
    pub async fn create_room(&self, creator: &User, partner_email: &str) -> Uuid {
        let resp = self
            .post_json(
                "/rooms",
                json!({ "creator_id": creator.id, "partner_email": partner_email }),
                Some(creator),
            )
            .await;
        assert_eq!(resp.status(), StatusCode::OK);
        let body = body_json(resp).await;
        body["room_id"].as_str().unwrap().parse().unwrap()
    }

    pub async fn accept(&self, user: &User, room_id: Uuid) -> Response {
        self.post_json("/invites/accept", json!({ "room_id": room_id }), Some(user))
            .await
    }

    pub async fn submit_questions(&self, user: &User, room_id: Uuid) -> Response {
        self.post_json("/questions", question_set(room_id, user.id), Some(user))
            .await
    }

    pub async fn start(&self, user: &User, room_id: Uuid) -> Response {
        self.post_json(&format!("/rooms/{room_id}/start"), json!({}), Some(user))
            .await
    }

    pub async fn answer(&self, user: &User, room_id: Uuid, question_id: usize, text: &str) -> Response {
        self.post_json(
            "/answers",
            json!({ "room_id": room_id, "question_id": question_id, "answer_text": text }),
            Some(user),
        )
        .await
    }

    /// Room with both participants joined and both question sets authored.
    pub async fn authored_room(&self) -> Uuid {
        let room_id = self.create_room(&ALICE, BOB.email).await;
        assert_eq!(self.accept(&BOB, room_id).await.status(), StatusCode::OK);
        assert_eq!(self.submit_questions(&ALICE, room_id).await.status(), StatusCode::OK);
        assert_eq!(self.submit_questions(&BOB, room_id).await.status(), StatusCode::OK);
        room_id
    }

    /// Room that has been started by its creator.
    pub async fn playing_room(&self) -> Uuid {
        let room_id = self.authored_room().await;
        assert_eq!(self.start(&ALICE, room_id).await.status(), StatusCode::OK);
        room_id
    }
}

fn with_identity(
    mut builder: axum::http::request::Builder,
    user: Option<&User>,
) -> axum::http::request::Builder {
    if let Some(user) = user {
        builder = builder
            .header(USER_ID_HEADER, user.id)
            .header(USER_EMAIL_HEADER, user.email);
    }
    builder
}

/// Correct answer of question `slot` in the set authored by `author`.
pub fn correct_answer(author: &str, slot: usize) -> String {
    format!("{author} answer {slot}")
}

/// Five questions whose correct choice is always `choice2`.
pub fn question_set(room_id: Uuid, author: &str) -> Value {
    let questions: Vec<Value> = (0..5)
        .map(|slot| {
            json!({
                "question": format!("What does {author} prefer ({slot})?"),
                "choice1": format!("{author} decoy {slot}"),
                "choice2": correct_answer(author, slot),
                "choice3": "Tea",
                "choice4": "Coffee",
                "correct_choice": "choice2",
            })
        })
        .collect();
    json!({ "room_id": room_id, "questions": questions })
}

/// Read the full response body as JSON.
pub async fn body_json(resp: Response) -> Value {
    let bytes = resp.into_body().collect().await.unwrap().to_bytes();
    serde_json::from_slice(&bytes).unwrap()
}

/// Memory store with switchable failures and an optional rendezvous on invite lookups.
#[derive(Clone, Default)]
pub struct FaultyStore {
    inner: MemoryRoomStore,
    fail_invite_inserts: bool,
    fail_answer_counts: Arc<AtomicBool>,
    invite_lookup_gate: Option<Arc<Barrier>>,
    gated_lookups: Arc<AtomicUsize>,
}

impl FaultyStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Store whose invite inserts always fail.
    pub fn failing_invite_inserts() -> Self {
        Self {
            fail_invite_inserts: true,
            ..Self::default()
        }
    }

    /// Store holding the first `callers` invite lookups until all of them arrived, so
    /// concurrent requests read the same room snapshot.
    pub fn gating_invite_lookups(callers: usize) -> Self {
        Self {
            invite_lookup_gate: Some(Arc::new(Barrier::new(callers))),
            gated_lookups: Arc::new(AtomicUsize::new(callers)),
            ..Self::default()
        }
    }

    pub fn set_answer_counts_failing(&self, failing: bool) {
        self.fail_answer_counts.store(failing, Ordering::SeqCst);
    }
}

fn offline(what: &str) -> StorageError {
    StorageError::unavailable(
        format!("{what} failed"),
        io::Error::other("collection offline"),
    )
}

impl RoomStore for FaultyStore {
    fn insert_room(&self, room: RoomEntity) -> BoxFuture<'static, StorageResult<()>> {
        self.inner.insert_room(room)
    }

    fn find_room(&self, id: Uuid) -> BoxFuture<'static, StorageResult<Option<RoomEntity>>> {
        self.inner.find_room(id)
    }

    fn list_rooms_for_user(
        &self,
        user_id: String,
    ) -> BoxFuture<'static, StorageResult<Vec<RoomEntity>>> {
        self.inner.list_rooms_for_user(user_id)
    }

    fn claim_partner(
        &self,
        room_id: Uuid,
        partner_id: String,
    ) -> BoxFuture<'static, StorageResult<Option<RoomEntity>>> {
        self.inner.claim_partner(room_id, partner_id)
    }

    fn transition_status(
        &self,
        room_id: Uuid,
        from: RoomStatus,
        to: RoomStatus,
    ) -> BoxFuture<'static, StorageResult<bool>> {
        self.inner.transition_status(room_id, from, to)
    }

    fn insert_invite(&self, invite: InviteEntity) -> BoxFuture<'static, StorageResult<()>> {
        if self.fail_invite_inserts {
            return Box::pin(async { Err(offline("invite insert")) });
        }
        self.inner.insert_invite(invite)
    }

    fn list_room_invites(
        &self,
        room_id: Uuid,
    ) -> BoxFuture<'static, StorageResult<Vec<InviteEntity>>> {
        let gate = self.invite_lookup_gate.clone().filter(|_| {
            self.gated_lookups
                .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |left| left.checked_sub(1))
                .is_ok()
        });
        let lookup = self.inner.list_room_invites(room_id);
        Box::pin(async move {
            let invites = lookup.await;
            if let Some(gate) = gate {
                gate.wait().await;
            }
            invites
        })
    }

    fn list_pending_invites(
        &self,
        email: String,
    ) -> BoxFuture<'static, StorageResult<Vec<InviteEntity>>> {
        self.inner.list_pending_invites(email)
    }

    fn mark_invite_accepted(&self, invite_id: Uuid) -> BoxFuture<'static, StorageResult<bool>> {
        self.inner.mark_invite_accepted(invite_id)
    }

    fn upsert_question_set(
        &self,
        set: QuestionSetEntity,
    ) -> BoxFuture<'static, StorageResult<()>> {
        self.inner.upsert_question_set(set)
    }

    fn find_question_set(
        &self,
        room_id: Uuid,
        author_id: String,
    ) -> BoxFuture<'static, StorageResult<Option<QuestionSetEntity>>> {
        self.inner.find_question_set(room_id, author_id)
    }

    fn list_question_sets(
        &self,
        room_id: Uuid,
    ) -> BoxFuture<'static, StorageResult<Vec<QuestionSetEntity>>> {
        self.inner.list_question_sets(room_id)
    }

    fn insert_answer(&self, answer: AnswerEntity) -> BoxFuture<'static, StorageResult<AnswerInsert>> {
        self.inner.insert_answer(answer)
    }

    fn list_answers(&self, room_id: Uuid) -> BoxFuture<'static, StorageResult<Vec<AnswerEntity>>> {
        self.inner.list_answers(room_id)
    }

    fn count_answers(&self, room_id: Uuid) -> BoxFuture<'static, StorageResult<usize>> {
        if self.fail_answer_counts.load(Ordering::SeqCst) {
            return Box::pin(async { Err(offline("answer count")) });
        }
        self.inner.count_answers(room_id)
    }

    fn health_check(&self) -> BoxFuture<'static, StorageResult<()>> {
        self.inner.health_check()
    }

    fn try_reconnect(&self) -> BoxFuture<'static, StorageResult<()>> {
        self.inner.try_reconnect()
    }
}
