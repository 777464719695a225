use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

use crate::{
    dao::models::{InviteEntity, InviteStatus},
    dto::{format_system_time, room::RoomSummary},
};

/// Claim the partner slot of a room with the caller's email.
#[derive(Debug, Clone, Deserialize, Serialize, ToSchema, Validate)]
pub struct AcceptInviteRequest {
    /// Room named in the invite.
    pub room_id: Uuid,
}

/// Room the caller joined.
#[derive(Debug, Clone, Deserialize, Serialize, ToSchema)]
pub struct AcceptInviteResponse {
    /// Joined room.
    pub room_id: Uuid,
}

/// Invite as exposed to its inviter and invitee, joined with its room when known.
#[derive(Debug, Clone, Deserialize, Serialize, ToSchema)]
pub struct InviteSummary {
    /// Invite id.
    pub id: Uuid,
    /// Room the invite offers.
    pub room_id: Uuid,
    /// Creator of the room.
    pub inviter_id: String,
    /// Normalised email of the invitee.
    pub invitee_email: String,
    /// Pending or accepted.
    pub status: InviteStatus,
    /// RFC 3339 creation time.
    pub created_at: String,
    /// The room itself, absent when it could not be loaded.
    pub room: Option<RoomSummary>,
}

impl InviteSummary {
    /// Summarise `invite`, attaching its room when known.
    pub fn new(invite: InviteEntity, room: Option<RoomSummary>) -> Self {
        Self {
            id: invite.id,
            room_id: invite.room_id,
            inviter_id: invite.inviter_id,
            invitee_email: invite.invitee_email,
            status: invite.status,
            created_at: format_system_time(invite.created_at),
            room,
        }
    }
}
