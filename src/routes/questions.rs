use axum::{
    Json, Router,
    extract::State,
    routing::{get, post},
};

use crate::{
    auth::Identity,
    dto::{
        question::{OkResponse, PartnerQuestionsQuery, QuestionsResponse, SubmitQuestionsRequest},
        readiness::{ReadinessQuery, ReadinessResponse},
    },
    error::AppError,
    routes::extract::{ApiQuery, ValidJson},
    services::question_service,
    state::SharedState,
};

/// Configure question authoring, partner question retrieval and readiness.
pub fn router() -> Router<SharedState> {
    Router::<SharedState>::new()
        .route("/questions", post(submit_questions).get(partner_questions))
        .route("/readiness", get(readiness))
}

#[utoipa::path(
    post,
    path = "/questions",
    tag = "questions",
    request_body = SubmitQuestionsRequest,
    params(("x-user-id" = String, Header, description = "Authenticated author")),
    responses(
        (status = 200, description = "Question set stored", body = OkResponse),
        (status = 400, description = "Set is malformed or the room is no longer authoring"),
        (status = 401, description = "Missing identity"),
        (status = 403, description = "Caller is not a participant"),
        (status = 404, description = "Room not found")
    )
)]
/// Store or replace the caller's five questions for a room.
pub async fn submit_questions(
    State(state): State<SharedState>,
    caller: Identity,
    ValidJson(payload): ValidJson<SubmitQuestionsRequest>,
) -> Result<Json<OkResponse>, AppError> {
    let ok = question_service::submit_question_set(&state, &caller, payload).await?;
    Ok(Json(ok))
}

#[utoipa::path(
    get,
    path = "/questions",
    tag = "questions",
    params(
        PartnerQuestionsQuery,
        ("x-user-id" = Option<String>, Header, description = "Authenticated user; must match requester_id when present")
    ),
    responses(
        (status = 200, description = "Questions of the opposing participant", body = QuestionsResponse),
        (status = 400, description = "requester_id missing"),
        (status = 403, description = "Requester is not a participant"),
        (status = 404, description = "Room not found")
    )
)]
/// Return the questions the opposing participant authored, without their answers.
pub async fn partner_questions(
    State(state): State<SharedState>,
    caller: Option<Identity>,
    ApiQuery(query): ApiQuery<PartnerQuestionsQuery>,
) -> Result<Json<QuestionsResponse>, AppError> {
    let questions =
        question_service::fetch_partner_questions(&state, caller.as_ref(), query).await?;
    Ok(Json(questions))
}

#[utoipa::path(
    get,
    path = "/readiness",
    tag = "questions",
    params(ReadinessQuery),
    responses(
        (status = 200, description = "Readiness of the room", body = ReadinessResponse),
        (status = 404, description = "Room not found")
    )
)]
/// Report how many participants have authored their question sets.
pub async fn readiness(
    State(state): State<SharedState>,
    ApiQuery(query): ApiQuery<ReadinessQuery>,
) -> Result<Json<ReadinessResponse>, AppError> {
    let readiness = question_service::check_readiness(&state, query).await?;
    Ok(Json(readiness))
}
