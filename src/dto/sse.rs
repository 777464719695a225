use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

use crate::{dao::models::RoomStatus, state::RoomPhase};

#[derive(Clone, Debug)]
/// Dispatched payload carried across SSE channels.
pub struct ServerEvent {
    /// SSE event name.
    pub event: Option<String>,
    /// Serialised JSON payload.
    pub data: String,
    /// Room the event belongs to; used to route it to that room's subscribers.
    pub room_id: Option<Uuid>,
}

impl ServerEvent {
    /// Convenience wrapper that serialises `payload` into the SSE data field.
    pub fn json<E, T>(event: E, room_id: Option<Uuid>, payload: &T) -> serde_json::Result<Self>
    where
        E: Into<Option<String>>,
        T: Serialize,
    {
        Ok(Self {
            event: event.into(),
            data: serde_json::to_string(payload)?,
            room_id,
        })
    }
}

#[derive(Debug, Serialize, ToSchema)]
/// Initial metadata sent to an SSE client when it connects.
pub struct Handshake {
    /// Room subscribed to.
    pub room_id: Uuid,
    /// Greeting.
    pub message: String,
    /// Whether the backend is running without a storage backend connection.
    pub degraded: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
/// Broadcast when the partner slot of a room is bound.
pub struct PartnerJoinedEvent {
    /// Room joined.
    pub room_id: Uuid,
    /// Partner now bound to the room.
    pub partner_id: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
/// Broadcast whenever a participant stores or replaces a question set.
pub struct QuestionsSubmittedEvent {
    /// Room of the set.
    pub room_id: Uuid,
    /// Author of the set.
    pub author_id: String,
    /// Participants with a stored set after the write.
    pub ready_count: usize,
    /// Whether both sets are now stored.
    pub ready: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
/// Broadcast whenever the persisted status of a room moves forward.
pub struct RoomStatusEvent {
    /// Room that moved.
    pub room_id: Uuid,
    /// New persisted status.
    pub status: RoomStatus,
    /// Derived phase.
    pub phase: RoomPhase,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
/// Broadcast when an answer has been recorded.
pub struct AnswerSubmittedEvent {
    /// Room being played.
    pub room_id: Uuid,
    /// Participant who answered.
    pub user_id: String,
    /// Slot answered.
    pub question_id: usize,
    /// Verdict.
    pub is_correct: bool,
}
