use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Overall service state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum HealthStatus {
    /// Storage is connected.
    Ok,
    /// Running without storage.
    Degraded,
}

/// Health payload returned by the `/healthcheck` route.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct HealthResponse {
    /// Current state.
    pub status: HealthStatus,
}

impl HealthResponse {
    /// Storage is installed and healthy.
    pub fn ok() -> Self {
        Self {
            status: HealthStatus::Ok,
        }
    }

    /// No storage backend is installed or it failed its last health check.
    pub fn degraded() -> Self {
        Self {
            status: HealthStatus::Degraded,
        }
    }
}
