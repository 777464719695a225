use axum::{Json, Router, extract::State, routing::post};

use crate::{
    auth::Identity,
    dto::answer::{SubmitAnswerRequest, SubmitAnswerResponse},
    error::AppError,
    routes::extract::ValidJson,
    services::answer_service,
    state::SharedState,
};

/// Answer routes.
pub fn router() -> Router<SharedState> {
    Router::<SharedState>::new().route("/answers", post(submit_answer))
}

#[utoipa::path(
    post,
    path = "/answers",
    tag = "answers",
    request_body = SubmitAnswerRequest,
    params(("x-user-id" = String, Header, description = "Authenticated guesser")),
    responses(
        (status = 200, description = "Answer recorded", body = SubmitAnswerResponse),
        (status = 400, description = "Room not playing, invalid question or already answered"),
        (status = 401, description = "Missing identity"),
        (status = 403, description = "Caller is not a participant"),
        (status = 404, description = "Room or question not found")
    )
)]
/// Record a guess at one of the partner's questions.
pub async fn submit_answer(
    State(state): State<SharedState>,
    caller: Identity,
    ValidJson(payload): ValidJson<SubmitAnswerRequest>,
) -> Result<Json<SubmitAnswerResponse>, AppError> {
    let answered = answer_service::submit_answer(&state, &caller, payload).await?;
    Ok(Json(answered))
}
