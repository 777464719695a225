//! Answer submission: judging a guess and checking the room for completion.

use std::time::SystemTime;

use tracing::info;
use uuid::Uuid;

use crate::{
    auth::Identity,
    dao::{
        models::{AnswerEntity, AnswerInsert, QUESTIONS_PER_SET, RoomStatus, answers_match},
        storage::StorageError,
    },
    dto::answer::{SubmitAnswerRequest, SubmitAnswerResponse},
    error::ServiceError,
    services::{room_events, room_service},
    state::SharedState,
};

/// Record the caller's guess at one of the opposing participant's questions.
///
/// Correctness is decided here and never recomputed. A second answer to the same question is
/// rejected. After every accepted answer, and before rejecting a duplicate, the room is
/// checked for completion.
pub async fn submit_answer(
    state: &SharedState,
    caller: &Identity,
    request: SubmitAnswerRequest,
) -> Result<SubmitAnswerResponse, ServiceError> {
    let store = state.require_room_store().await?;
    let room = room_service::load_room(&store, request.room_id).await?;
    let opponent = room
        .opponent_of(&caller.user_id)
        .ok_or_else(|| ServiceError::Forbidden("user is not a participant of this room".into()))?;

    if room.status != RoomStatus::Playing {
        return Err(ServiceError::Precondition(format!(
            "answers are only accepted while the room is playing (currently {})",
            room.status
        )));
    }
    if request.question_id >= QUESTIONS_PER_SET {
        return Err(ServiceError::InvalidInput(format!(
            "question_id must be between 0 and {}",
            QUESTIONS_PER_SET - 1
        )));
    }
    if request.answer_text.trim().is_empty() {
        return Err(ServiceError::InvalidInput("answer_text is required".into()));
    }

    let opponent = opponent
        .ok_or_else(|| ServiceError::Precondition("room has no partner yet".into()))?
        .to_owned();
    let set = store
        .find_question_set(room.id, opponent.clone())
        .await?
        .ok_or_else(|| ServiceError::NotFound("partner questions not found".into()))?;
    let question = set.questions.get(request.question_id).ok_or_else(|| {
        ServiceError::NotFound(format!("question {} not found", request.question_id))
    })?;
    let expected = question.correct_answer().ok_or_else(|| {
        ServiceError::Unavailable(StorageError::corrupted(
            "question_sets",
            format!(
                "correct choice {} out of range for question {}",
                question.correct_choice, request.question_id
            ),
        ))
    })?;

    let is_correct = answers_match(&request.answer_text, expected);
    let answer = AnswerEntity {
        id: Uuid::new_v4(),
        room_id: room.id,
        question_id: request.question_id,
        question_author_id: opponent,
        user_id: caller.user_id.clone(),
        answer_text: request.answer_text.trim().to_owned(),
        is_correct,
        created_at: SystemTime::now(),
    };

    if store.insert_answer(answer).await? == AnswerInsert::Duplicate {
        // The stored answer may come from an attempt that failed before the completion check.
        room_service::complete_game(state, room.id).await?;
        return Err(ServiceError::Conflict(format!(
            "question {} has already been answered",
            request.question_id
        )));
    }

    info!(
        room_id = %room.id,
        user_id = %caller.user_id,
        question_id = request.question_id,
        is_correct,
        "answer recorded"
    );
    room_events::broadcast_answer_submitted(
        state,
        room.id,
        &caller.user_id,
        request.question_id,
        is_correct,
    );

    let status = room_service::complete_game(state, room.id).await?;
    Ok(SubmitAnswerResponse { is_correct, status })
}
