use serde::{Deserialize, Serialize};
use serde_with::skip_serializing_none;
use utoipa::{IntoParams, ToSchema};
use uuid::Uuid;

/// Query string of the readiness route.
#[derive(Debug, Clone, Deserialize, Serialize, IntoParams)]
pub struct ReadinessQuery {
    /// Room to inspect.
    pub room_id: Uuid,
    /// When present, the response also reports whether this participant has authored a set.
    #[serde(default)]
    pub player_id: Option<String>,
}

/// Whether both participants have authored their question sets.
#[skip_serializing_none]
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ReadinessResponse {
    /// Both participants have authored a set.
    pub ready: bool,
    /// Participants with a stored set.
    pub ready_count: usize,
    /// Always two.
    pub total_players: usize,
    /// Whether the requested player has authored a set.
    #[serde(default)]
    pub player_ready: Option<bool>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn serialises_camel_case_without_absent_player() {
        let body = serde_json::to_value(ReadinessResponse {
            ready: false,
            ready_count: 1,
            total_players: 2,
            player_ready: None,
        })
        .unwrap();
        assert_eq!(
            body,
            serde_json::json!({"ready": false, "readyCount": 1, "totalPlayers": 2})
        );
    }
}
