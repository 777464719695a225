use std::time::SystemTime;
use time::{OffsetDateTime, format_description::well_known::Rfc3339};

/// Answer submission bodies.
pub mod answer;
/// Per-user dashboard.
pub mod dashboard;
/// Health check payload.
pub mod health;
/// Invite acceptance and invite summaries.
pub mod invite;
/// Question set authoring and partner question views.
pub mod question;
/// Readiness query and report.
pub mod readiness;
/// Room creation, detail and scores.
pub mod room;
/// Payloads pushed on the room event stream.
pub mod sse;
/// Field validators shared by the request bodies.
pub mod validation;

fn format_system_time(time: SystemTime) -> String {
    OffsetDateTime::from(time)
        .format(&Rfc3339)
        .unwrap_or_else(|_| "invalid-timestamp".into())
}
