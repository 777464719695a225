//! Invite protocol: binding the partner exactly once, resending, and the caller's dashboard.

use tracing::{info, warn};
use uuid::Uuid;

use crate::{
    auth::Identity,
    dao::models::{InviteEntity, InviteStatus, normalize_email},
    dto::{
        dashboard::DashboardResponse,
        invite::{AcceptInviteRequest, AcceptInviteResponse, InviteSummary},
        room::ResendInviteRequest,
    },
    error::ServiceError,
    services::{room_events, room_service::load_room},
    state::{RoomEvent, RoomPhase, SharedState},
};

const PARTNER_TAKEN: &str = "room already has a partner";

/// Accept the invite addressed to the caller's email and bind them as the room's partner.
///
/// The partner slot is claimed with a conditional write, so when two acceptances race only
/// one of them binds and the other gets [`ServiceError::Conflict`]. The room stays `waiting`
/// until the creator starts the game.
pub async fn accept_invite(
    state: &SharedState,
    caller: &Identity,
    request: AcceptInviteRequest,
) -> Result<AcceptInviteResponse, ServiceError> {
    let email = caller
        .email
        .as_deref()
        .map(normalize_email)
        .filter(|email| !email.is_empty())
        .ok_or_else(|| {
            ServiceError::Unauthenticated("an email is required to accept an invite".into())
        })?;

    let store = state.require_room_store().await?;
    let room = load_room(&store, request.room_id).await?;
    let invite = store
        .list_room_invites(room.id)
        .await?
        .into_iter()
        .find(|invite| invite.invitee_email == email)
        .ok_or_else(|| ServiceError::NotFound("no invite for this room".into()))?;

    if room.creator_id == caller.user_id {
        return Err(ServiceError::Conflict(
            "the room creator cannot accept their own invite".into(),
        ));
    }
    if invite.status == InviteStatus::Accepted || room.partner_id.is_some() {
        return Err(ServiceError::Conflict(PARTNER_TAKEN.into()));
    }
    let next = RoomPhase::of(room.status, false).next(RoomEvent::PartnerJoined)?;

    let Some(room) = store
        .claim_partner(room.id, caller.user_id.clone())
        .await?
    else {
        return Err(ServiceError::Conflict(PARTNER_TAKEN.into()));
    };

    match store.mark_invite_accepted(invite.id).await {
        Ok(true) => {}
        Ok(false) => warn!(
            room_id = %room.id,
            invite_id = %invite.id,
            "invite was no longer pending after the partner slot was claimed"
        ),
        Err(source) => {
            return Err(ServiceError::PartialFailure {
                room_id: room.id,
                message: "partner joined but invite update failed".into(),
                source,
            });
        }
    }

    info!(room_id = %room.id, partner_id = %caller.user_id, "invite accepted");
    room_events::broadcast_partner_joined(state, room.id, &caller.user_id);
    room_events::broadcast_status_changed(state, room.id, next);

    Ok(AcceptInviteResponse { room_id: room.id })
}

/// Ensure a pending invite exists for `partner_email`, creating it if needed.
///
/// This is the retry for a room whose invite insert failed at creation time.
pub async fn resend_invite(
    state: &SharedState,
    caller: &Identity,
    room_id: Uuid,
    request: ResendInviteRequest,
) -> Result<InviteSummary, ServiceError> {
    let store = state.require_room_store().await?;
    let room = load_room(&store, room_id).await?;
    if room.creator_id != caller.user_id {
        return Err(ServiceError::Forbidden(
            "only the room creator can send its invite".into(),
        ));
    }
    if room.partner_id.is_some() {
        return Err(ServiceError::Conflict(PARTNER_TAKEN.into()));
    }

    let email = normalize_email(&request.partner_email);
    let existing = store
        .list_room_invites(room_id)
        .await?
        .into_iter()
        .find(|invite| invite.status == InviteStatus::Pending && invite.invitee_email == email);

    let invite = match existing {
        Some(invite) => invite,
        None => {
            let invite = InviteEntity::new(room_id, caller.user_id.clone(), &email);
            store.insert_invite(invite.clone()).await?;
            info!(%room_id, invite_id = %invite.id, "invite sent");
            invite
        }
    };

    Ok(InviteSummary::new(invite, Some(room.into())))
}

/// Rooms the caller takes part in, newest first, and the invites waiting for them.
pub async fn dashboard(
    state: &SharedState,
    caller: &Identity,
) -> Result<DashboardResponse, ServiceError> {
    let store = state.require_room_store().await?;
    let rooms = store
        .list_rooms_for_user(caller.user_id.clone())
        .await?
        .into_iter()
        .map(Into::into)
        .collect();

    let pending = match caller.email.as_deref().map(normalize_email) {
        Some(email) if !email.is_empty() => store.list_pending_invites(email).await?,
        _ => Vec::new(),
    };

    let mut invites = Vec::with_capacity(pending.len());
    for invite in pending {
        let room = store.find_room(invite.room_id).await?.map(Into::into);
        invites.push(InviteSummary::new(invite, room));
    }

    Ok(DashboardResponse { rooms, invites })
}
