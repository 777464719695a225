//! Question sets: authoring, retrieval by the opposing participant and readiness.

use std::{sync::Arc, time::SystemTime};

use tracing::{debug, info};

use crate::{
    auth::Identity,
    dao::{
        models::{PARTICIPANTS_PER_ROOM, QuestionSetEntity, RoomEntity, RoomStatus},
        room_store::RoomStore,
    },
    dto::{
        question::{
            OkResponse, PartnerQuestion, PartnerQuestionsQuery, QuestionsResponse,
            SubmitQuestionsRequest,
        },
        readiness::{ReadinessQuery, ReadinessResponse},
    },
    error::ServiceError,
    services::{
        room_events,
        room_service::{ensure_participant, load_room},
    },
    state::SharedState,
};

/// Count the question sets authored by the room's distinct participants.
///
/// Sets written by anyone else (stale rows, former participants) are ignored.
pub(crate) async fn readiness_of(
    store: &Arc<dyn RoomStore>,
    room: &RoomEntity,
    player_id: Option<&str>,
) -> Result<ReadinessResponse, ServiceError> {
    let sets = store.list_question_sets(room.id).await?;
    let authored = |user_id: &str| sets.iter().any(|set| set.author_id == user_id);

    let participants = room.participants();
    let ready_count = participants
        .iter()
        .filter(|&&participant| authored(participant))
        .count();

    Ok(ReadinessResponse {
        ready: ready_count == PARTICIPANTS_PER_ROOM,
        ready_count,
        total_players: participants.len(),
        player_ready: player_id.map(authored),
    })
}

/// Store or replace the caller's question set for a room.
pub async fn submit_question_set(
    state: &SharedState,
    caller: &Identity,
    request: SubmitQuestionsRequest,
) -> Result<OkResponse, ServiceError> {
    let store = state.require_room_store().await?;
    let room = load_room(&store, request.room_id).await?;
    ensure_participant(&room, &caller.user_id)?;

    let questions = request.question_entities().ok_or_else(|| {
        ServiceError::InvalidInput("exactly 5 well-formed questions are required".into())
    })?;
    if room.status != RoomStatus::Waiting {
        return Err(ServiceError::Precondition(format!(
            "questions can no longer change once the room is {}",
            room.status
        )));
    }

    store
        .upsert_question_set(QuestionSetEntity {
            room_id: room.id,
            author_id: caller.user_id.clone(),
            questions,
            updated_at: SystemTime::now(),
        })
        .await?;

    let readiness = readiness_of(&store, &room, None).await?;
    info!(
        room_id = %room.id,
        author_id = %caller.user_id,
        ready_count = readiness.ready_count,
        "question set stored"
    );
    room_events::broadcast_questions_submitted(state, room.id, &caller.user_id, &readiness);

    Ok(OkResponse::ok())
}

/// Return the opposing participant's questions, or an empty list when not authored yet.
pub async fn fetch_partner_questions(
    state: &SharedState,
    caller: Option<&Identity>,
    query: PartnerQuestionsQuery,
) -> Result<QuestionsResponse, ServiceError> {
    let requester_id = query.requester_id.trim();
    if requester_id.is_empty() {
        return Err(ServiceError::InvalidInput("requester_id is required".into()));
    }
    if caller.is_some_and(|caller| caller.user_id != requester_id) {
        return Err(ServiceError::Forbidden(
            "requester_id does not match the authenticated user".into(),
        ));
    }

    let store = state.require_room_store().await?;
    let room = load_room(&store, query.room_id).await?;
    let opponent = room.opponent_of(requester_id).ok_or_else(|| {
        ServiceError::Forbidden("requester is not part of this room".into())
    })?;

    let Some(opponent) = opponent else {
        debug!(room_id = %room.id, "no partner yet; returning no questions");
        return Ok(QuestionsResponse { questions: vec![] });
    };

    let questions = store
        .find_question_set(room.id, opponent.to_owned())
        .await?
        .map(|set| {
            set.questions
                .iter()
                .enumerate()
                .map(|(slot, question)| PartnerQuestion::from_entity(slot, question))
                .collect()
        })
        .unwrap_or_default();

    Ok(QuestionsResponse { questions })
}

/// Report whether both participants have authored their question sets.
pub async fn check_readiness(
    state: &SharedState,
    query: ReadinessQuery,
) -> Result<ReadinessResponse, ServiceError> {
    let store = state.require_room_store().await?;
    let room = load_room(&store, query.room_id).await?;
    readiness_of(&store, &room, query.player_id.as_deref().map(str::trim)).await
}
