use serde::{Deserialize, Serialize};
use thiserror::Error;
use utoipa::ToSchema;

use crate::dao::models::RoomStatus;

/// Position of a room in its lifecycle, derived from the persisted status and partner slot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum RoomPhase {
    /// Room exists, the invite is pending and the partner slot is empty.
    AwaitingPartner,
    /// Both participants are bound and may author their question sets.
    Authoring,
    /// Participants answer each other's questions.
    Playing,
    /// Every answer has been recorded; terminal.
    Finished,
}

/// Events that move a room forward.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RoomEvent {
    /// The invite was accepted and the partner slot is now bound.
    PartnerJoined,
    /// The creator started the game once both question sets exist.
    Start,
    /// The expected number of answers has been recorded.
    Complete,
}

/// Error returned when an event cannot be applied from the current phase.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("invalid transition: {event:?} cannot be applied while in {from:?}")]
pub struct InvalidTransition {
    /// Phase the room was in.
    pub from: RoomPhase,
    /// Rejected event.
    pub event: RoomEvent,
}

impl RoomPhase {
    /// Derive the phase from what is persisted for the room.
    pub fn of(status: RoomStatus, has_partner: bool) -> Self {
        match status {
            RoomStatus::Waiting if has_partner => RoomPhase::Authoring,
            RoomStatus::Waiting => RoomPhase::AwaitingPartner,
            RoomStatus::Playing => RoomPhase::Playing,
            RoomStatus::Finished => RoomPhase::Finished,
        }
    }

    /// Persisted status backing this phase.
    pub fn status(self) -> RoomStatus {
        match self {
            RoomPhase::AwaitingPartner | RoomPhase::Authoring => RoomStatus::Waiting,
            RoomPhase::Playing => RoomStatus::Playing,
            RoomPhase::Finished => RoomStatus::Finished,
        }
    }

    /// Compute the phase reached by applying `event`.
    ///
    /// Completing a finished room is accepted and leaves it finished.
    pub fn next(self, event: RoomEvent) -> Result<RoomPhase, InvalidTransition> {
        match (self, event) {
            (RoomPhase::AwaitingPartner, RoomEvent::PartnerJoined) => Ok(RoomPhase::Authoring),
            (RoomPhase::Authoring, RoomEvent::Start) => Ok(RoomPhase::Playing),
            (RoomPhase::Playing, RoomEvent::Complete) => Ok(RoomPhase::Finished),
            (RoomPhase::Finished, RoomEvent::Complete) => Ok(RoomPhase::Finished),
            (from, event) => Err(InvalidTransition { from, event }),
        }
    }
}
