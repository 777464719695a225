//! Typed HTTP client for the quiz API, used by front-ends and end-to-end tests.

use std::sync::Arc;

use futures::future::BoxFuture;
use reqwest::{Client, Method, RequestBuilder, StatusCode};
use serde::{Serialize, de::DeserializeOwned};
use thiserror::Error;
use uuid::Uuid;

use crate::{
    auth::{Identity, USER_EMAIL_HEADER, USER_ID_HEADER},
    dao::models::RoomStatus,
    dto::{
        answer::{SubmitAnswerRequest, SubmitAnswerResponse},
        dashboard::DashboardResponse,
        invite::{AcceptInviteRequest, AcceptInviteResponse},
        question::{OkResponse, QuestionsResponse, SubmitQuestionsRequest},
        readiness::ReadinessResponse,
        room::{CreateRoomRequest, CreateRoomResponse, RoomDetail, ScoresResponse},
    },
    error::ErrorBody,
    sync::{
        poller::Poller,
        updates::{RoomSignal, RoomSignalSource},
    },
};

/// Convenient result alias returning [`ClientError`] failures.
pub type ClientResult<T> = Result<T, ClientError>;

/// Failures raised while talking to the quiz API.
#[derive(Debug, Error)]
pub enum ClientError {
    /// Building the HTTP client failed (invalid TLS setup, etc).
    #[error("failed to build quiz API client")]
    ClientBuilder {
        /// Builder failure.
        #[source]
        source: reqwest::Error,
    },
    /// The request could not be sent or no response arrived.
    #[error("failed to send request to `{path}`")]
    RequestSend {
        /// API path requested.
        path: String,
        /// Transport failure.
        #[source]
        source: reqwest::Error,
    },
    /// The API answered with an error status.
    #[error("`{path}` answered {status}: {message}")]
    Status {
        /// API path requested.
        path: String,
        /// Status of the response.
        status: StatusCode,
        /// `error` field of the body, or the status text.
        message: String,
        /// Room left behind by a partial failure.
        room_id: Option<Uuid>,
    },
    /// Response payload did not match the expected model.
    #[error("failed to decode response from `{path}`")]
    DecodeResponse {
        /// API path requested.
        path: String,
        /// Decoding failure.
        #[source]
        source: reqwest::Error,
    },
}

impl ClientError {
    /// HTTP status of an error response, if the server answered at all.
    pub fn status(&self) -> Option<StatusCode> {
        match self {
            ClientError::Status { status, .. } => Some(*status),
            _ => None,
        }
    }
}

/// Client bound to one API base URL, optionally acting as one user.
#[derive(Clone)]
pub struct QuizClient {
    client: Client,
    base_url: Arc<str>,
    identity: Option<Identity>,
}

impl QuizClient {
    /// Anonymous client for the API rooted at `base_url`.
    pub fn new(base_url: &str) -> ClientResult<Self> {
        let client = Client::builder()
            .build()
            .map_err(|source| ClientError::ClientBuilder { source })?;
        Ok(Self {
            client,
            base_url: Arc::<str>::from(base_url.trim_end_matches('/')),
            identity: None,
        })
    }

    /// Same connection pool, sending the identity headers of `identity`.
    pub fn acting_as(&self, identity: Identity) -> Self {
        Self {
            identity: Some(identity),
            ..self.clone()
        }
    }

    fn request(&self, method: Method, path: &str) -> RequestBuilder {
        let url = format!("{}{}", self.base_url, path);
        let mut builder = self.client.request(method, url);
        if let Some(identity) = &self.identity {
            builder = builder.header(USER_ID_HEADER, identity.user_id.as_str());
            if let Some(email) = &identity.email {
                builder = builder.header(USER_EMAIL_HEADER, email.as_str());
            }
        }
        builder
    }

    async fn send<T>(&self, path: &str, builder: RequestBuilder) -> ClientResult<T>
    where
        T: DeserializeOwned,
    {
        let response = builder
            .send()
            .await
            .map_err(|source| ClientError::RequestSend {
                path: path.to_string(),
                source,
            })?;

        let status = response.status();
        if status.is_success() {
            return response
                .json::<T>()
                .await
                .map_err(|source| ClientError::DecodeResponse {
                    path: path.to_string(),
                    source,
                });
        }

        let (message, room_id) = match response.json::<ErrorBody>().await {
            Ok(body) => (body.error, body.room_id),
            Err(_) => (status.to_string(), None),
        };
        Err(ClientError::Status {
            path: path.to_string(),
            status,
            message,
            room_id,
        })
    }

    async fn get<T: DeserializeOwned>(&self, path: &str) -> ClientResult<T> {
        self.send(path, self.request(Method::GET, path)).await
    }

    async fn post<B, T>(&self, path: &str, body: &B) -> ClientResult<T>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        self.send(path, self.request(Method::POST, path).json(body))
            .await
    }

    /// `POST /rooms`.
    pub async fn create_room(&self, request: &CreateRoomRequest) -> ClientResult<CreateRoomResponse> {
        self.post("/rooms", request).await
    }

    /// `GET /rooms/{id}`.
    pub async fn room(&self, room_id: Uuid) -> ClientResult<RoomDetail> {
        self.get(&format!("/rooms/{room_id}")).await
    }

    /// `POST /rooms/{id}/start`.
    pub async fn start_game(&self, room_id: Uuid) -> ClientResult<RoomDetail> {
        self.post(&format!("/rooms/{room_id}/start"), &serde_json::json!({}))
            .await
    }

    /// `GET /rooms/{id}/scores`.
    pub async fn scores(&self, room_id: Uuid) -> ClientResult<ScoresResponse> {
        self.get(&format!("/rooms/{room_id}/scores")).await
    }

    /// `POST /invites/accept`.
    pub async fn accept_invite(&self, room_id: Uuid) -> ClientResult<AcceptInviteResponse> {
        self.post("/invites/accept", &AcceptInviteRequest { room_id })
            .await
    }

    /// `POST /questions`.
    pub async fn submit_questions(&self, request: &SubmitQuestionsRequest) -> ClientResult<OkResponse> {
        self.post("/questions", request).await
    }

    /// Questions of the participant opposing the client's identity.
    pub async fn partner_questions(&self, room_id: Uuid) -> ClientResult<QuestionsResponse> {
        let requester_id = self
            .identity
            .as_ref()
            .map(|identity| identity.user_id.clone())
            .unwrap_or_default();
        let path = "/questions";
        let builder = self.request(Method::GET, path).query(&[
            ("room_id", room_id.to_string()),
            ("requester_id", requester_id),
        ]);
        self.send(path, builder).await
    }

    /// `POST /answers`.
    pub async fn submit_answer(&self, request: &SubmitAnswerRequest) -> ClientResult<SubmitAnswerResponse> {
        self.post("/answers", request).await
    }

    /// `GET /readiness`, reporting the client's own readiness when it has an identity.
    pub async fn readiness(&self, room_id: Uuid) -> ClientResult<ReadinessResponse> {
        let path = "/readiness";
        let mut params = vec![("room_id", room_id.to_string())];
        if let Some(identity) = &self.identity {
            params.push(("player_id", identity.user_id.clone()));
        }
        let builder = self.request(Method::GET, path).query(&params);
        self.send(path, builder).await
    }

    /// `GET /dashboard`.
    pub async fn dashboard(&self) -> ClientResult<DashboardResponse> {
        self.get("/dashboard").await
    }

    /// Poll readiness until both participants have authored their questions.
    pub async fn wait_until_ready(&self, poller: &Poller, room_id: Uuid) -> ReadinessResponse {
        poller
            .until(
                "readiness",
                move || self.readiness(room_id),
                |readiness: &ReadinessResponse| readiness.ready,
            )
            .await
    }

    /// Poll the room until it reaches `status`.
    pub async fn wait_for_status(
        &self,
        poller: &Poller,
        room_id: Uuid,
        status: RoomStatus,
    ) -> RoomDetail {
        poller
            .until(
                "room status",
                move || self.room(room_id),
                |detail: &RoomDetail| detail.room.status == status,
            )
            .await
    }

    /// Poll the dashboard until an invite to `room_id` is waiting for the client's user.
    pub async fn wait_for_invite(&self, poller: &Poller, room_id: Uuid) -> DashboardResponse {
        poller
            .until(
                "dashboard",
                move || self.dashboard(),
                |dashboard: &DashboardResponse| {
                    dashboard.invites.iter().any(|invite| invite.room_id == room_id)
                },
            )
            .await
    }
}

impl RoomSignalSource for QuizClient {
    type Error = ClientError;

    fn room_signal(&self, room_id: Uuid) -> BoxFuture<'static, ClientResult<RoomSignal>> {
        let client = self.clone();
        Box::pin(async move {
            let detail = client.room(room_id).await?;
            Ok(RoomSignal::from(&detail))
        })
    }
}
