use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;
use validator::{Validate, ValidationErrors};

use crate::{
    dao::models::{QUESTIONS_PER_SET, RoomStatus},
    dto::validation::validate_not_blank,
};

/// Guess of the caller at one of the opposing participant's questions.
#[derive(Debug, Clone, Deserialize, Serialize, ToSchema)]
pub struct SubmitAnswerRequest {
    /// Room being played.
    pub room_id: Uuid,
    /// Slot of the question in the opposing participant's set (0 to 4).
    pub question_id: usize,
    /// Text of the chosen answer; compared trimmed and case-insensitively.
    #[serde(default)]
    pub answer_text: String,
}

impl Validate for SubmitAnswerRequest {
    fn validate(&self) -> Result<(), ValidationErrors> {
        let mut errors = ValidationErrors::new();

        if self.question_id >= QUESTIONS_PER_SET {
            let mut err = validator::ValidationError::new("question_id");
            err.message = Some(
                format!("must be between 0 and {}", QUESTIONS_PER_SET - 1).into(),
            );
            errors.add("question_id", err);
        }
        if let Err(e) = validate_not_blank(&self.answer_text) {
            errors.add("answer_text", e);
        }

        if errors.is_empty() {
            Ok(())
        } else {
            Err(errors)
        }
    }
}

/// Verdict on a recorded answer.
#[derive(Debug, Clone, Deserialize, Serialize, ToSchema)]
pub struct SubmitAnswerResponse {
    /// Whether the answer matched the correct choice.
    pub is_correct: bool,
    /// Room status once the answer has been recorded.
    pub status: RoomStatus,
}
