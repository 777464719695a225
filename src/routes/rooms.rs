use axum::{
    Json, Router,
    extract::{Path, State},
    routing::{get, post},
};
use uuid::Uuid;

use crate::{
    auth::Identity,
    dto::{
        invite::InviteSummary,
        room::{CreateRoomRequest, CreateRoomResponse, ResendInviteRequest, RoomDetail, ScoresResponse},
    },
    error::AppError,
    routes::extract::ValidJson,
    services::{invite_service, room_service},
    state::SharedState,
};

/// Routes driving the room lifecycle.
pub fn router() -> Router<SharedState> {
    Router::new()
        .route("/rooms", post(create_room))
        .route("/rooms/{id}", get(get_room))
        .route("/rooms/{id}/start", post(start_game))
        .route("/rooms/{id}/invite", post(resend_invite))
        .route("/rooms/{id}/scores", get(scores))
}

/// Create a room and invite the partner by email.
#[utoipa::path(
    post,
    path = "/rooms",
    tag = "rooms",
    request_body = CreateRoomRequest,
    params(
        ("x-user-id" = Option<String>, Header, description = "Authenticated user; must match creator_id when present")
    ),
    responses(
        (status = 200, description = "Room and invite created", body = CreateRoomResponse),
        (status = 400, description = "Missing creator or malformed email"),
        (status = 403, description = "creator_id does not match the caller"),
        (status = 500, description = "Room created but invite failed; body carries room_id")
    )
)]
pub async fn create_room(
    State(state): State<SharedState>,
    caller: Option<Identity>,
    ValidJson(payload): ValidJson<CreateRoomRequest>,
) -> Result<Json<CreateRoomResponse>, AppError> {
    let created = room_service::create_room(&state, caller.as_ref(), payload).await?;
    Ok(Json(created))
}

/// Fetch a room with its phase and readiness.
#[utoipa::path(
    get,
    path = "/rooms/{id}",
    tag = "rooms",
    params(
        ("id" = Uuid, Path, description = "Identifier of the room"),
        ("x-user-id" = String, Header, description = "Authenticated user")
    ),
    responses(
        (status = 200, description = "Room detail", body = RoomDetail),
        (status = 401, description = "Missing identity"),
        (status = 403, description = "Caller is not a participant"),
        (status = 404, description = "Room not found")
    )
)]
pub async fn get_room(
    State(state): State<SharedState>,
    caller: Identity,
    Path(id): Path<Uuid>,
) -> Result<Json<RoomDetail>, AppError> {
    let detail = room_service::get_room(&state, &caller, id).await?;
    Ok(Json(detail))
}

/// Start the game once both participants have authored their questions.
#[utoipa::path(
    post,
    path = "/rooms/{id}/start",
    tag = "rooms",
    params(
        ("id" = Uuid, Path, description = "Identifier of the room"),
        ("x-user-id" = String, Header, description = "Authenticated user, must be the creator")
    ),
    responses(
        (status = 200, description = "Room is now playing", body = RoomDetail),
        (status = 400, description = "Partner missing or questions not authored"),
        (status = 401, description = "Missing identity"),
        (status = 403, description = "Caller is not the creator"),
        (status = 404, description = "Room not found")
    )
)]
pub async fn start_game(
    State(state): State<SharedState>,
    caller: Identity,
    Path(id): Path<Uuid>,
) -> Result<Json<RoomDetail>, AppError> {
    let detail = room_service::start_game(&state, &caller, id).await?;
    Ok(Json(detail))
}

/// Send the room's invite again, creating it if the first attempt failed.
#[utoipa::path(
    post,
    path = "/rooms/{id}/invite",
    tag = "invites",
    request_body = ResendInviteRequest,
    params(
        ("id" = Uuid, Path, description = "Identifier of the room"),
        ("x-user-id" = String, Header, description = "Authenticated user, must be the creator")
    ),
    responses(
        (status = 200, description = "Pending invite", body = InviteSummary),
        (status = 400, description = "Malformed email or partner already joined"),
        (status = 401, description = "Missing identity"),
        (status = 403, description = "Caller is not the creator"),
        (status = 404, description = "Room not found")
    )
)]
pub async fn resend_invite(
    State(state): State<SharedState>,
    caller: Identity,
    Path(id): Path<Uuid>,
    ValidJson(payload): ValidJson<ResendInviteRequest>,
) -> Result<Json<InviteSummary>, AppError> {
    let invite = invite_service::resend_invite(&state, &caller, id, payload).await?;
    Ok(Json(invite))
}

/// Per-participant scores.
#[utoipa::path(
    get,
    path = "/rooms/{id}/scores",
    tag = "rooms",
    params(
        ("id" = Uuid, Path, description = "Identifier of the room"),
        ("x-user-id" = String, Header, description = "Authenticated user")
    ),
    responses(
        (status = 200, description = "Scores", body = ScoresResponse),
        (status = 401, description = "Missing identity"),
        (status = 403, description = "Caller is not a participant"),
        (status = 404, description = "Room not found")
    )
)]
pub async fn scores(
    State(state): State<SharedState>,
    caller: Identity,
    Path(id): Path<Uuid>,
) -> Result<Json<ScoresResponse>, AppError> {
    let scores = room_service::scores(&state, &caller, id).await?;
    Ok(Json(scores))
}
