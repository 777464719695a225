use axum::{Json, Router, extract::State, routing::post};

use crate::{
    auth::Identity,
    dto::invite::{AcceptInviteRequest, AcceptInviteResponse},
    error::AppError,
    routes::extract::ValidJson,
    services::invite_service,
    state::SharedState,
};

/// Configure the invite endpoints.
pub fn router() -> Router<SharedState> {
    Router::<SharedState>::new().route("/invites/accept", post(accept_invite))
}

#[utoipa::path(
    post,
    path = "/invites/accept",
    tag = "invites",
    request_body = AcceptInviteRequest,
    params(
        ("x-user-id" = String, Header, description = "Authenticated user"),
        ("x-user-email" = String, Header, description = "Email the invite was sent to")
    ),
    responses(
        (status = 200, description = "Caller is now the room's partner", body = AcceptInviteResponse),
        (status = 400, description = "Room already has a partner or caller is the creator"),
        (status = 401, description = "Missing identity or email"),
        (status = 404, description = "No invite for this email in the room")
    )
)]
/// Accept the invite addressed to the caller and join the room as its partner.
pub async fn accept_invite(
    State(state): State<SharedState>,
    caller: Identity,
    ValidJson(payload): ValidJson<AcceptInviteRequest>,
) -> Result<Json<AcceptInviteResponse>, AppError> {
    let accepted = invite_service::accept_invite(&state, &caller, payload).await?;
    Ok(Json(accepted))
}
