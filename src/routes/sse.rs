use std::convert::Infallible;

use axum::{
    Router,
    extract::{Path, State},
    response::sse::{Event, Sse},
    routing::get,
};
use futures::Stream;
use tracing::info;
use uuid::Uuid;

use crate::{auth::Identity, error::AppError, services::sse_service, state::SharedState};

#[utoipa::path(
    get,
    path = "/sse/rooms/{id}",
    tag = "sse",
    params(
        ("id" = Uuid, Path, description = "Identifier of the room"),
        ("x-user-id" = String, Header, description = "Authenticated participant")
    ),
    responses(
        (status = 200, description = "Room update stream", content_type = "text/event-stream", body = String),
        (status = 401, description = "Missing identity"),
        (status = 403, description = "Caller is not a participant"),
        (status = 404, description = "Room not found")
    )
)]
/// Stream the updates of one room to its participants.
pub async fn room_stream(
    State(state): State<SharedState>,
    caller: Identity,
    Path(id): Path<Uuid>,
) -> Result<Sse<impl Stream<Item = Result<Event, Infallible>>>, AppError> {
    let receiver = sse_service::subscribe_room(&state, &caller, id).await?;
    info!(room_id = %id, user_id = %caller.user_id, "New room SSE connection");
    let handshake = sse_service::handshake(&state, id).await;
    Ok(sse_service::to_sse_stream(receiver, id, handshake))
}

/// Configure the SSE endpoints.
pub fn router() -> Router<SharedState> {
    Router::<SharedState>::new().route("/sse/rooms/{id}", get(room_stream))
}
