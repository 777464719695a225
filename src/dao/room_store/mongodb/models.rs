use mongodb::bson::{DateTime, Document, doc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::dao::{
    models::{
        AnswerEntity, InviteEntity, InviteStatus, QuestionEntity, QuestionSetEntity, RoomEntity,
        RoomStatus,
    },
    storage::StorageError,
};

// Identifiers are stored as their hyphenated string form so filters written by hand match
// the documents written through serde.

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MongoRoomDocument {
    #[serde(rename = "_id")]
    id: String,
    name: String,
    creator_id: String,
    partner_id: Option<String>,
    status: RoomStatus,
    created_at: DateTime,
    updated_at: DateTime,
}

impl From<RoomEntity> for MongoRoomDocument {
    fn from(value: RoomEntity) -> Self {
        Self {
            id: value.id.to_string(),
            name: value.name,
            creator_id: value.creator_id,
            partner_id: value.partner_id,
            status: value.status,
            created_at: DateTime::from_system_time(value.created_at),
            updated_at: DateTime::from_system_time(value.updated_at),
        }
    }
}

impl TryFrom<MongoRoomDocument> for RoomEntity {
    type Error = StorageError;

    fn try_from(value: MongoRoomDocument) -> Result<Self, Self::Error> {
        Ok(Self {
            id: parse_id("rooms", &value.id)?,
            name: value.name,
            creator_id: value.creator_id,
            partner_id: value.partner_id,
            status: value.status,
            created_at: value.created_at.to_system_time(),
            updated_at: value.updated_at.to_system_time(),
        })
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MongoInviteDocument {
    #[serde(rename = "_id")]
    id: String,
    room_id: String,
    inviter_id: String,
    invitee_email: String,
    status: InviteStatus,
    created_at: DateTime,
}

impl From<InviteEntity> for MongoInviteDocument {
    fn from(value: InviteEntity) -> Self {
        Self {
            id: value.id.to_string(),
            room_id: value.room_id.to_string(),
            inviter_id: value.inviter_id,
            invitee_email: value.invitee_email,
            status: value.status,
            created_at: DateTime::from_system_time(value.created_at),
        }
    }
}

impl TryFrom<MongoInviteDocument> for InviteEntity {
    type Error = StorageError;

    fn try_from(value: MongoInviteDocument) -> Result<Self, Self::Error> {
        Ok(Self {
            id: parse_id("invites", &value.id)?,
            room_id: parse_id("invites", &value.room_id)?,
            inviter_id: value.inviter_id,
            invitee_email: value.invitee_email,
            status: value.status,
            created_at: value.created_at.to_system_time(),
        })
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MongoQuestionDocument {
    text: String,
    choices: Vec<String>,
    correct_choice: i32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MongoQuestionSetDocument {
    room_id: String,
    author_id: String,
    questions: Vec<MongoQuestionDocument>,
    updated_at: DateTime,
}

impl From<QuestionSetEntity> for MongoQuestionSetDocument {
    fn from(value: QuestionSetEntity) -> Self {
        Self {
            room_id: value.room_id.to_string(),
            author_id: value.author_id,
            questions: value
                .questions
                .into_iter()
                .map(|question| MongoQuestionDocument {
                    text: question.text,
                    choices: question.choices,
                    correct_choice: question.correct_choice as i32,
                })
                .collect(),
            updated_at: DateTime::from_system_time(value.updated_at),
        }
    }
}

impl TryFrom<MongoQuestionSetDocument> for QuestionSetEntity {
    type Error = StorageError;

    fn try_from(value: MongoQuestionSetDocument) -> Result<Self, Self::Error> {
        let questions = value
            .questions
            .into_iter()
            .map(|question| {
                let correct_choice = usize::try_from(question.correct_choice).map_err(|_| {
                    StorageError::corrupted(
                        "question_sets",
                        format!("negative correct choice {}", question.correct_choice),
                    )
                })?;
                Ok(QuestionEntity {
                    text: question.text,
                    choices: question.choices,
                    correct_choice,
                })
            })
            .collect::<Result<Vec<_>, StorageError>>()?;

        Ok(Self {
            room_id: parse_id("question_sets", &value.room_id)?,
            author_id: value.author_id,
            questions,
            updated_at: value.updated_at.to_system_time(),
        })
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MongoAnswerDocument {
    #[serde(rename = "_id")]
    id: String,
    room_id: String,
    question_id: i64,
    question_author_id: String,
    user_id: String,
    answer_text: String,
    is_correct: bool,
    created_at: DateTime,
}

impl From<AnswerEntity> for MongoAnswerDocument {
    fn from(value: AnswerEntity) -> Self {
        Self {
            id: value.id.to_string(),
            room_id: value.room_id.to_string(),
            question_id: value.question_id as i64,
            question_author_id: value.question_author_id,
            user_id: value.user_id,
            answer_text: value.answer_text,
            is_correct: value.is_correct,
            created_at: DateTime::from_system_time(value.created_at),
        }
    }
}

impl TryFrom<MongoAnswerDocument> for AnswerEntity {
    type Error = StorageError;

    fn try_from(value: MongoAnswerDocument) -> Result<Self, Self::Error> {
        let question_id = usize::try_from(value.question_id).map_err(|_| {
            StorageError::corrupted("answers", format!("negative question id {}", value.question_id))
        })?;
        Ok(Self {
            id: parse_id("answers", &value.id)?,
            room_id: parse_id("answers", &value.room_id)?,
            question_id,
            question_author_id: value.question_author_id,
            user_id: value.user_id,
            answer_text: value.answer_text,
            is_correct: value.is_correct,
            created_at: value.created_at.to_system_time(),
        })
    }
}

fn parse_id(collection: &'static str, raw: &str) -> Result<Uuid, StorageError> {
    Uuid::parse_str(raw)
        .map_err(|err| StorageError::corrupted(collection, format!("invalid id `{raw}`: {err}")))
}

pub fn doc_id(id: Uuid) -> Document {
    doc! {"_id": id.to_string()}
}

pub fn room_filter(room_id: Uuid) -> Document {
    doc! {"room_id": room_id.to_string()}
}
