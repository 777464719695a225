use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;
use validator::{Validate, ValidationErrors};

use crate::{
    dao::models::{RoomEntity, RoomStatus},
    dto::{
        format_system_time,
        readiness::ReadinessResponse,
        validation::{validate_email_address, validate_not_blank},
    },
    state::RoomPhase,
};

/// Payload used to open a new room and invite the partner.
#[derive(Debug, Clone, Deserialize, Serialize, ToSchema)]
pub struct CreateRoomRequest {
    /// Display name; the configured default is used when absent or blank.
    #[serde(default)]
    pub name: Option<String>,
    /// Must match the caller when an identity is attached.
    #[serde(default)]
    pub creator_id: String,
    /// Email the invite is addressed to.
    #[serde(default)]
    pub partner_email: String,
}

impl Validate for CreateRoomRequest {
    fn validate(&self) -> Result<(), ValidationErrors> {
        let mut errors = ValidationErrors::new();

        if let Err(e) = validate_not_blank(&self.creator_id) {
            errors.add("creator_id", e);
        }
        if let Err(e) = validate_email_address(&self.partner_email) {
            errors.add("partner_email", e);
        }

        if errors.is_empty() {
            Ok(())
        } else {
            Err(errors)
        }
    }
}

/// Id of the created room.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct CreateRoomResponse {
    /// New room.
    pub room_id: Uuid,
}

/// Payload used to send the invite again after a partial failure.
#[derive(Debug, Clone, Deserialize, Serialize, ToSchema)]
pub struct ResendInviteRequest {
    /// Email the invite is addressed to.
    #[serde(default)]
    pub partner_email: String,
}

impl Validate for ResendInviteRequest {
    fn validate(&self) -> Result<(), ValidationErrors> {
        let mut errors = ValidationErrors::new();
        if let Err(e) = validate_email_address(&self.partner_email) {
            errors.add("partner_email", e);
        }
        if errors.is_empty() {
            Ok(())
        } else {
            Err(errors)
        }
    }
}

/// Public projection of a room.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct RoomSummary {
    /// Room id.
    pub id: Uuid,
    /// Display name.
    pub name: String,
    /// Creator.
    pub creator_id: String,
    /// Partner, once the invite is accepted.
    pub partner_id: Option<String>,
    /// Persisted status.
    pub status: RoomStatus,
    /// RFC 3339 creation time.
    pub created_at: String,
    /// RFC 3339 time of the last change.
    pub updated_at: String,
}

impl From<RoomEntity> for RoomSummary {
    fn from(room: RoomEntity) -> Self {
        Self {
            id: room.id,
            name: room.name,
            creator_id: room.creator_id,
            partner_id: room.partner_id,
            status: room.status,
            created_at: format_system_time(room.created_at),
            updated_at: format_system_time(room.updated_at),
        }
    }
}

/// Room with its derived lifecycle position, returned to participants.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct RoomDetail {
    /// The room.
    pub room: RoomSummary,
    /// Phase derived from status and partner.
    pub phase: RoomPhase,
    /// Question authoring progress.
    pub readiness: ReadinessResponse,
}

/// Score of one participant, counting guesses made about the other participant.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema, PartialEq, Eq)]
pub struct ParticipantScore {
    /// Participant.
    pub user_id: String,
    /// Correct guesses.
    pub correct: usize,
    /// Questions answered so far.
    pub answered: usize,
    /// Questions available to answer.
    pub total: usize,
}

/// Scores of every participant of a room.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct ScoresResponse {
    /// Room scored.
    pub room_id: Uuid,
    /// Status at read time; scores are final once `finished`.
    pub status: RoomStatus,
    /// Creator first, then partner.
    pub scores: Vec<ParticipantScore>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn create_room_requires_creator_and_email() {
        let request: CreateRoomRequest =
            serde_json::from_str(r#"{"partner_email": "nope"}"#).unwrap();
        let errors = request.validate().unwrap_err();
        let fields = errors.field_errors();
        assert!(fields.contains_key("creator_id"));
        assert!(fields.contains_key("partner_email"));

        let request: CreateRoomRequest =
            serde_json::from_str(r#"{"creator_id": "u1", "partner_email": "P@X.com"}"#).unwrap();
        assert!(request.validate().is_ok());
        assert!(request.name.is_none());
    }
}
