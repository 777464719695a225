//! Library crate for partner-quiz-back, exposing modules for binaries and integration tests.

use axum::Router;
use tower_http::{cors::CorsLayer, trace::TraceLayer};

pub mod auth;
pub mod config;
/// Persistence: entities, the room store trait and its backends.
pub mod dao;
/// Request and response bodies of the HTTP API.
pub mod dto;
/// Service and HTTP error types.
pub mod error;
/// HTTP routes.
pub mod routes;
/// Operations behind the routes.
pub mod services;
/// Shared application state and the room phase machine.
pub mod state;
pub mod sync;

/// Build the top-level router and attach cross-cutting middleware layers.
pub fn build_app(state: state::SharedState) -> Router<()> {
    routes::router(state)
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
}
