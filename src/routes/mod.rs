use axum::Router;

use crate::state::SharedState;

/// Answer submission.
pub mod answers;
/// Per-user dashboard.
pub mod dashboard;
/// Swagger UI and the OpenAPI document.
pub mod docs;
pub mod extract;
/// Health check.
pub mod health;
/// Invite acceptance.
pub mod invites;
/// Question sets and readiness.
pub mod questions;
/// Room lifecycle.
pub mod rooms;
/// Per-room event stream.
pub mod sse;

/// Compose all route trees, wiring in shared state and documentation routes.
pub fn router(state: SharedState) -> Router<()> {
    let api_router = health::router()
        .merge(rooms::router())
        .merge(invites::router())
        .merge(questions::router())
        .merge(answers::router())
        .merge(dashboard::router())
        .merge(sse::router());

    let docs_router = docs::router(state.clone());

    api_router.merge(docs_router).with_state(state)
}
