//! Room lifecycle: creation with its invite, explicit start, completion and scoring.

use std::sync::Arc;

use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::{
    auth::Identity,
    dao::{
        models::{
            InviteEntity, PARTICIPANTS_PER_ROOM, QUESTIONS_PER_SET, RoomEntity, RoomStatus,
        },
        room_store::RoomStore,
    },
    dto::room::{CreateRoomRequest, CreateRoomResponse, ParticipantScore, RoomDetail, ScoresResponse},
    error::ServiceError,
    services::{question_service, room_events},
    state::{RoomEvent, RoomPhase, SharedState},
};

/// Message returned when the room was stored but its invite was not.
pub const PARTIAL_INVITE_FAILURE: &str = "room created but invite failed";

/// Fetch a room or fail with [`ServiceError::NotFound`].
pub(crate) async fn load_room(
    store: &Arc<dyn RoomStore>,
    room_id: Uuid,
) -> Result<RoomEntity, ServiceError> {
    store
        .find_room(room_id)
        .await?
        .ok_or_else(|| ServiceError::NotFound(format!("room `{room_id}` not found")))
}

/// Ensure `user_id` is the creator or the partner of `room`.
pub(crate) fn ensure_participant(room: &RoomEntity, user_id: &str) -> Result<(), ServiceError> {
    if room.is_participant(user_id) {
        Ok(())
    } else {
        Err(ServiceError::Forbidden(
            "user is not a participant of this room".into(),
        ))
    }
}

/// Create a waiting room and its pending invite.
///
/// The two inserts are not rolled back: when the invite fails the room stays and the error
/// carries its id so the creator can resend the invite.
pub async fn create_room(
    state: &SharedState,
    caller: Option<&Identity>,
    request: CreateRoomRequest,
) -> Result<CreateRoomResponse, ServiceError> {
    let creator_id = request.creator_id.trim().to_owned();
    if creator_id.is_empty() {
        return Err(ServiceError::InvalidInput("creator_id is required".into()));
    }
    if request.partner_email.trim().is_empty() {
        return Err(ServiceError::InvalidInput("partner_email is required".into()));
    }
    if caller.is_some_and(|caller| caller.user_id != creator_id) {
        return Err(ServiceError::Forbidden(
            "creator_id does not match the authenticated user".into(),
        ));
    }

    let store = state.require_room_store().await?;
    let name = request
        .name
        .as_deref()
        .map(str::trim)
        .filter(|name| !name.is_empty())
        .unwrap_or(state.config().default_room_name.as_str())
        .to_owned();

    let room = RoomEntity::new(name, creator_id.clone());
    let room_id = room.id;
    store.insert_room(room).await?;

    let invite = InviteEntity::new(room_id, creator_id.clone(), &request.partner_email);
    if let Err(source) = store.insert_invite(invite).await {
        warn!(%room_id, error = %source, "{PARTIAL_INVITE_FAILURE}");
        return Err(ServiceError::PartialFailure {
            room_id,
            message: PARTIAL_INVITE_FAILURE.into(),
            source,
        });
    }

    info!(%room_id, creator_id = %creator_id, "room created");
    Ok(CreateRoomResponse { room_id })
}

/// Return a room with its derived phase and readiness, for participants only.
pub async fn get_room(
    state: &SharedState,
    caller: &Identity,
    room_id: Uuid,
) -> Result<RoomDetail, ServiceError> {
    let store = state.require_room_store().await?;
    let room = load_room(&store, room_id).await?;
    ensure_participant(&room, &caller.user_id)?;
    room_detail(&store, room, Some(caller.user_id.clone())).await
}

pub(crate) async fn room_detail(
    store: &Arc<dyn RoomStore>,
    room: RoomEntity,
    player_id: Option<String>,
) -> Result<RoomDetail, ServiceError> {
    let readiness = question_service::readiness_of(store, &room, player_id.as_deref()).await?;
    let phase = RoomPhase::of(room.status, room.partner_id.is_some());
    Ok(RoomDetail {
        room: room.into(),
        phase,
        readiness,
    })
}

/// Move a room from authoring to playing.
///
/// Only the creator may start, and only once both participants have authored their sets.
pub async fn start_game(
    state: &SharedState,
    caller: &Identity,
    room_id: Uuid,
) -> Result<RoomDetail, ServiceError> {
    let store = state.require_room_store().await?;
    let room = load_room(&store, room_id).await?;
    if room.creator_id != caller.user_id {
        return Err(ServiceError::Forbidden(
            "only the room creator can start the game".into(),
        ));
    }

    let next = RoomPhase::of(room.status, room.partner_id.is_some()).next(RoomEvent::Start)?;
    let readiness = question_service::readiness_of(&store, &room, None).await?;
    if !readiness.ready {
        return Err(ServiceError::Precondition(format!(
            "both participants must submit their questions first ({}/{} ready)",
            readiness.ready_count, PARTICIPANTS_PER_ROOM
        )));
    }

    if !store
        .transition_status(room_id, RoomStatus::Waiting, next.status())
        .await?
    {
        return Err(ServiceError::Conflict(
            "room status changed concurrently".into(),
        ));
    }

    info!(%room_id, "game started");
    room_events::broadcast_status_changed(state, room_id, next);

    let room = load_room(&store, room_id).await?;
    room_detail(&store, room, Some(caller.user_id.clone())).await
}

/// Finish the room once every owed answer has been recorded.
///
/// Repeated calls on a finished room are no-ops. Returns the status after the check.
pub async fn complete_game(state: &SharedState, room_id: Uuid) -> Result<RoomStatus, ServiceError> {
    let store = state.require_room_store().await?;
    let room = load_room(&store, room_id).await?;
    match room.status {
        RoomStatus::Finished => return Ok(RoomStatus::Finished),
        RoomStatus::Waiting => return Ok(RoomStatus::Waiting),
        RoomStatus::Playing => {}
    }

    let expected = PARTICIPANTS_PER_ROOM * QUESTIONS_PER_SET;
    let answered = store.count_answers(room_id).await?;
    if answered < expected {
        debug!(%room_id, answered, expected, "room not complete yet");
        return Ok(RoomStatus::Playing);
    }

    let next = RoomPhase::Playing.next(RoomEvent::Complete)?;
    if store
        .transition_status(room_id, RoomStatus::Playing, next.status())
        .await?
    {
        info!(%room_id, answered, "game finished");
        room_events::broadcast_status_changed(state, room_id, next);
    }
    Ok(RoomStatus::Finished)
}

/// Per-participant tally of correct guesses.
pub async fn scores(
    state: &SharedState,
    caller: &Identity,
    room_id: Uuid,
) -> Result<ScoresResponse, ServiceError> {
    let store = state.require_room_store().await?;
    let room = load_room(&store, room_id).await?;
    ensure_participant(&room, &caller.user_id)?;

    let answers = store.list_answers(room_id).await?;
    let scores = room
        .participants()
        .into_iter()
        .map(|user_id| {
            let own = answers.iter().filter(|answer| answer.user_id == user_id);
            ParticipantScore {
                user_id: user_id.to_owned(),
                correct: own.clone().filter(|answer| answer.is_correct).count(),
                answered: own.count(),
                total: QUESTIONS_PER_SET,
            }
        })
        .collect();

    Ok(ScoresResponse {
        room_id,
        status: room.status,
        scores,
    })
}
