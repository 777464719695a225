use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::dto::{invite::InviteSummary, room::RoomSummary};

/// Rooms the caller takes part in and invites waiting for them.
#[derive(Debug, Clone, Default, Deserialize, Serialize, ToSchema)]
pub struct DashboardResponse {
    /// Rooms created or joined by the caller, newest first.
    pub rooms: Vec<RoomSummary>,
    /// Pending invites addressed to the caller's email.
    pub invites: Vec<InviteSummary>,
}
