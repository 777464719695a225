use axum::{Json, Router, extract::State, routing::get};

use crate::{
    auth::Identity, dto::dashboard::DashboardResponse, error::AppError, services::invite_service,
    state::SharedState,
};

/// Dashboard route.
pub fn router() -> Router<SharedState> {
    Router::<SharedState>::new().route("/dashboard", get(dashboard))
}

#[utoipa::path(
    get,
    path = "/dashboard",
    tag = "dashboard",
    params(
        ("x-user-id" = String, Header, description = "Authenticated user"),
        ("x-user-email" = Option<String>, Header, description = "Email used to look up pending invites")
    ),
    responses(
        (status = 200, description = "Rooms and pending invites of the caller", body = DashboardResponse),
        (status = 401, description = "Missing identity")
    )
)]
/// List the caller's rooms and the invites waiting for them.
pub async fn dashboard(
    State(state): State<SharedState>,
    caller: Identity,
) -> Result<Json<DashboardResponse>, AppError> {
    let dashboard = invite_service::dashboard(&state, &caller).await?;
    Ok(Json(dashboard))
}
