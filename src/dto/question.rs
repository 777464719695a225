use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};
use uuid::Uuid;
use validator::{Validate, ValidationErrors};

use crate::dao::models::{QUESTIONS_PER_SET, QuestionEntity};
use crate::dto::validation::{choice_index, validate_choice_marker, validate_not_blank};

/// One multiple-choice block as authored by a participant.
#[derive(Debug, Clone, Deserialize, Serialize, ToSchema)]
pub struct QuestionInput {
    /// Question wording.
    #[serde(default)]
    pub question: String,
    /// First choice.
    #[serde(default)]
    pub choice1: String,
    /// Second choice.
    #[serde(default)]
    pub choice2: String,
    /// Third choice.
    #[serde(default)]
    pub choice3: String,
    /// Fourth choice.
    #[serde(default)]
    pub choice4: String,
    /// Marker of the correct choice: `choice1` to `choice4`.
    #[serde(default)]
    pub correct_choice: String,
}

impl QuestionInput {
    fn choices(&self) -> [(&'static str, &str); 4] {
        [
            ("choice1", self.choice1.as_str()),
            ("choice2", self.choice2.as_str()),
            ("choice3", self.choice3.as_str()),
            ("choice4", self.choice4.as_str()),
        ]
    }

    /// Convert a block into its stored form, trimming every text.
    ///
    /// Returns `None` when the correct choice marker is invalid.
    pub fn to_entity(&self) -> Option<QuestionEntity> {
        let correct_choice = choice_index(&self.correct_choice)?;
        Some(QuestionEntity {
            text: self.question.trim().to_owned(),
            choices: self
                .choices()
                .iter()
                .map(|(_, text)| text.trim().to_owned())
                .collect(),
            correct_choice,
        })
    }
}

impl Validate for QuestionInput {
    fn validate(&self) -> Result<(), ValidationErrors> {
        let mut errors = ValidationErrors::new();

        if let Err(e) = validate_not_blank(&self.question) {
            errors.add("question", e);
        }
        for (field, text) in self.choices() {
            if let Err(e) = validate_not_blank(text) {
                errors.add(field, e);
            }
        }
        if let Err(e) = validate_choice_marker(&self.correct_choice) {
            errors.add("correct_choice", e);
        }

        if errors.is_empty() {
            Ok(())
        } else {
            Err(errors)
        }
    }
}

/// Full question set of the caller for one room.
#[derive(Debug, Clone, Deserialize, Serialize, ToSchema, Validate)]
pub struct SubmitQuestionsRequest {
    /// Room the set is authored for.
    pub room_id: Uuid,
    #[validate(
        length(equal = 5, message = "exactly 5 questions are required"),
        nested
    )]
    /// Exactly five blocks.
    pub questions: Vec<QuestionInput>,
}

impl SubmitQuestionsRequest {
    /// Stored form of every block, or `None` when the set is malformed.
    pub fn question_entities(&self) -> Option<Vec<QuestionEntity>> {
        if self.questions.len() != QUESTIONS_PER_SET {
            return None;
        }
        self.questions.iter().map(QuestionInput::to_entity).collect()
    }
}

/// Query string of the partner questions route.
#[derive(Debug, Clone, Deserialize, Serialize, IntoParams)]
pub struct PartnerQuestionsQuery {
    /// Room being played.
    pub room_id: Uuid,
    /// Participant asking; must match the caller.
    pub requester_id: String,
}

/// Question of the opposing participant as shown to the guesser.
///
/// The correct choice is withheld; correctness is decided when the answer is submitted.
#[derive(Debug, Clone, Deserialize, Serialize, ToSchema, PartialEq, Eq)]
pub struct PartnerQuestion {
    /// Slot of the question, passed back as `question_id` when answering.
    pub question_id: usize,
    /// Question wording.
    pub question: String,
    /// First choice.
    pub choice1: String,
    /// Second choice.
    pub choice2: String,
    /// Third choice.
    pub choice3: String,
    /// Fourth choice.
    pub choice4: String,
}

impl PartnerQuestion {
    /// Guesser view of the stored question in slot `question_id`.
    pub fn from_entity(question_id: usize, entity: &QuestionEntity) -> Self {
        let choice = |index: usize| entity.choices.get(index).cloned().unwrap_or_default();
        Self {
            question_id,
            question: entity.text.clone(),
            choice1: choice(0),
            choice2: choice(1),
            choice3: choice(2),
            choice4: choice(3),
        }
    }
}

/// Questions of the opposing participant, in slot order.
#[derive(Debug, Clone, Deserialize, Serialize, ToSchema)]
pub struct QuestionsResponse {
    /// One entry per slot.
    pub questions: Vec<PartnerQuestion>,
}

/// Bare acknowledgement.
#[derive(Debug, Clone, Deserialize, Serialize, ToSchema)]
pub struct OkResponse {
    /// Always `true`.
    pub ok: bool,
}

impl OkResponse {
    /// Successful acknowledgement.
    pub fn ok() -> Self {
        Self { ok: true }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn block(correct: &str) -> QuestionInput {
        QuestionInput {
            question: "Favourite colour?".into(),
            choice1: "Red".into(),
            choice2: " Blue ".into(),
            choice3: "Green".into(),
            choice4: "Black".into(),
            correct_choice: correct.into(),
        }
    }

    #[test]
    fn converts_marker_to_index() {
        let entity = block("choice2").to_entity().unwrap();
        assert_eq!(entity.correct_choice, 1);
        assert_eq!(entity.correct_answer(), Some("Blue"));
        assert!(block("choice7").to_entity().is_none());
    }

    #[test]
    fn rejects_blank_choice_and_bad_marker() {
        let mut input = block("choice5");
        input.choice3 = "  ".into();
        let errors = input.validate().unwrap_err();
        let fields = errors.field_errors();
        assert!(fields.contains_key("choice3"));
        assert!(fields.contains_key("correct_choice"));
    }

    #[test]
    fn set_requires_exactly_five_blocks() {
        let request = SubmitQuestionsRequest {
            room_id: Uuid::new_v4(),
            questions: vec![block("choice1"); 4],
        };
        assert!(request.validate().is_err());
        assert!(request.question_entities().is_none());

        let request = SubmitQuestionsRequest {
            room_id: Uuid::new_v4(),
            questions: vec![block("choice1"); 5],
        };
        assert!(request.validate().is_ok());
        assert_eq!(request.question_entities().unwrap().len(), 5);
    }
}
