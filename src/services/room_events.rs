use serde::Serialize;
use tracing::warn;
use uuid::Uuid;

use crate::{
    dto::{
        readiness::ReadinessResponse,
        sse::{
            AnswerSubmittedEvent, PartnerJoinedEvent, QuestionsSubmittedEvent, RoomStatusEvent,
            ServerEvent,
        },
    },
    state::{RoomPhase, SharedState},
};

/// SSE event name for [`PartnerJoinedEvent`].
pub const EVENT_PARTNER_JOINED: &str = "room.partner_joined";
/// SSE event name for [`QuestionsSubmittedEvent`].
pub const EVENT_QUESTIONS_SUBMITTED: &str = "room.questions_submitted";
/// SSE event name for [`RoomStatusEvent`].
pub const EVENT_STATUS_CHANGED: &str = "room.status_changed";
/// SSE event name for [`AnswerSubmittedEvent`].
pub const EVENT_ANSWER_SUBMITTED: &str = "room.answer_submitted";

/// Broadcast that the partner slot of a room has been bound.
pub fn broadcast_partner_joined(state: &SharedState, room_id: Uuid, partner_id: &str) {
    let payload = PartnerJoinedEvent {
        room_id,
        partner_id: partner_id.to_owned(),
    };
    send_room_event(state, room_id, EVENT_PARTNER_JOINED, &payload);
}

/// Broadcast a stored question set together with the readiness it leads to.
pub fn broadcast_questions_submitted(
    state: &SharedState,
    room_id: Uuid,
    author_id: &str,
    readiness: &ReadinessResponse,
) {
    let payload = QuestionsSubmittedEvent {
        room_id,
        author_id: author_id.to_owned(),
        ready_count: readiness.ready_count,
        ready: readiness.ready,
    };
    send_room_event(state, room_id, EVENT_QUESTIONS_SUBMITTED, &payload);
}

/// Broadcast the phase a room has just reached.
pub fn broadcast_status_changed(state: &SharedState, room_id: Uuid, phase: RoomPhase) {
    let payload = RoomStatusEvent {
        room_id,
        status: phase.status(),
        phase,
    };
    send_room_event(state, room_id, EVENT_STATUS_CHANGED, &payload);
}

/// Broadcast a recorded answer and its verdict.
pub fn broadcast_answer_submitted(
    state: &SharedState,
    room_id: Uuid,
    user_id: &str,
    question_id: usize,
    is_correct: bool,
) {
    let payload = AnswerSubmittedEvent {
        room_id,
        user_id: user_id.to_owned(),
        question_id,
        is_correct,
    };
    send_room_event(state, room_id, EVENT_ANSWER_SUBMITTED, &payload);
}

fn send_room_event(state: &SharedState, room_id: Uuid, event: &str, payload: &impl Serialize) {
    match ServerEvent::json(Some(event.to_string()), Some(room_id), payload) {
        Ok(event) => state.events().broadcast(event),
        Err(err) => warn!(event, %room_id, error = %err, "failed to serialize room event payload"),
    }
}
