/// Answer submission and correctness.
pub mod answer_service;
/// OpenAPI documentation generation.
pub mod documentation;
/// Health check service.
pub mod health_service;
/// Invite acceptance, resend and the per-user dashboard.
pub mod invite_service;
/// Question authoring, partner question retrieval and readiness.
pub mod question_service;
/// Room events published on the SSE hub.
pub mod room_events;
/// Room creation, start, completion and scores.
pub mod room_service;
/// Server-Sent Events subscription service.
pub mod sse_service;
/// Storage connection supervisor driving degraded mode.
pub mod storage_supervisor;
