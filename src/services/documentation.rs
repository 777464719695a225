use utoipa::OpenApi;

#[derive(OpenApi)]
/// Aggregated OpenAPI specification for the partner quiz backend.
#[openapi(
    paths(
        crate::routes::health::healthcheck,
        crate::routes::rooms::create_room,
        crate::routes::rooms::get_room,
        crate::routes::rooms::start_game,
        crate::routes::rooms::resend_invite,
        crate::routes::rooms::scores,
        crate::routes::invites::accept_invite,
        crate::routes::questions::submit_questions,
        crate::routes::questions::partner_questions,
        crate::routes::questions::readiness,
        crate::routes::answers::submit_answer,
        crate::routes::dashboard::dashboard,
        crate::routes::sse::room_stream,
    ),
    components(
        schemas(
            crate::dto::health::HealthResponse,
            crate::dto::room::CreateRoomRequest,
            crate::dto::room::CreateRoomResponse,
            crate::dto::room::ResendInviteRequest,
            crate::dto::room::RoomSummary,
            crate::dto::room::RoomDetail,
            crate::dto::room::ParticipantScore,
            crate::dto::room::ScoresResponse,
            crate::dto::invite::AcceptInviteRequest,
            crate::dto::invite::AcceptInviteResponse,
            crate::dto::invite::InviteSummary,
            crate::dto::question::QuestionInput,
            crate::dto::question::SubmitQuestionsRequest,
            crate::dto::question::PartnerQuestion,
            crate::dto::question::QuestionsResponse,
            crate::dto::question::OkResponse,
            crate::dto::readiness::ReadinessResponse,
            crate::dto::answer::SubmitAnswerRequest,
            crate::dto::answer::SubmitAnswerResponse,
            crate::dto::dashboard::DashboardResponse,
            crate::dto::sse::Handshake,
            crate::dto::sse::PartnerJoinedEvent,
            crate::dto::sse::QuestionsSubmittedEvent,
            crate::dto::sse::RoomStatusEvent,
            crate::dto::sse::AnswerSubmittedEvent,
            crate::dao::models::RoomStatus,
            crate::dao::models::InviteStatus,
            crate::state::RoomPhase,
        )
    ),
    tags(
        (name = "health", description = "Health check endpoints"),
        (name = "rooms", description = "Room lifecycle"),
        (name = "invites", description = "Partner invitation"),
        (name = "questions", description = "Question authoring and readiness"),
        (name = "answers", description = "Guessing the partner's answers"),
        (name = "dashboard", description = "Rooms and invites of the caller"),
        (name = "sse", description = "Server-sent events streams"),
    )
)]
pub struct ApiDoc;
