use std::{fmt, time::SystemTime};

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

/// Number of question blocks every participant authors.
pub const QUESTIONS_PER_SET: usize = 5;
/// Number of answer choices offered by every question block.
pub const CHOICES_PER_QUESTION: usize = 4;
/// Number of participants in a room once the invite has been accepted.
pub const PARTICIPANTS_PER_ROOM: usize = 2;

/// Persisted lifecycle status of a room. Only ever moves forward.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum RoomStatus {
    /// Created, waiting for the partner and both question sets.
    Waiting,
    /// Started; participants answer each other's questions.
    Playing,
    /// Every answer has been recorded.
    Finished,
}

impl RoomStatus {
    /// Stable lowercase name used on the wire and in the database.
    pub fn as_str(self) -> &'static str {
        match self {
            RoomStatus::Waiting => "waiting",
            RoomStatus::Playing => "playing",
            RoomStatus::Finished => "finished",
        }
    }
}

impl fmt::Display for RoomStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Status of an invite. `Pending` moves to `Accepted` once and never back.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum InviteStatus {
    /// Not accepted yet.
    Pending,
    /// Accepted by the partner now bound to the room.
    Accepted,
}

impl InviteStatus {
    /// Stable lowercase name used on the wire and in the database.
    pub fn as_str(self) -> &'static str {
        match self {
            InviteStatus::Pending => "pending",
            InviteStatus::Accepted => "accepted",
        }
    }
}

/// A paired game session between a creator and (eventually) a partner.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct RoomEntity {
    /// Primary key of the room.
    pub id: Uuid,
    /// Display name chosen by the creator.
    pub name: String,
    /// Identity of the user who created the room.
    pub creator_id: String,
    /// Identity of the partner, bound once when the invite is accepted.
    pub partner_id: Option<String>,
    /// Lifecycle status.
    pub status: RoomStatus,
    /// Creation time.
    pub created_at: SystemTime,
    /// Time of the last status or partner change.
    pub updated_at: SystemTime,
}

impl RoomEntity {
    /// Build a fresh room in the `waiting` status without a partner.
    pub fn new(name: String, creator_id: String) -> Self {
        let now = SystemTime::now();
        Self {
            id: Uuid::new_v4(),
            name,
            creator_id,
            partner_id: None,
            status: RoomStatus::Waiting,
            created_at: now,
            updated_at: now,
        }
    }

    /// Whether `user_id` is the creator or the bound partner of the room.
    pub fn is_participant(&self, user_id: &str) -> bool {
        self.creator_id == user_id || self.partner_id.as_deref() == Some(user_id)
    }

    /// Resolve the opposing participant of `user_id`.
    ///
    /// Returns `None` when `user_id` does not belong to the room, `Some(None)` when the
    /// caller is the creator and no partner has joined yet.
    pub fn opponent_of(&self, user_id: &str) -> Option<Option<&str>> {
        if self.creator_id == user_id {
            Some(self.partner_id.as_deref())
        } else if self.partner_id.as_deref() == Some(user_id) {
            Some(Some(self.creator_id.as_str()))
        } else {
            None
        }
    }

    /// Identities of every participant currently bound to the room.
    pub fn participants(&self) -> Vec<&str> {
        let mut ids = vec![self.creator_id.as_str()];
        if let Some(partner) = self.partner_id.as_deref() {
            ids.push(partner);
        }
        ids
    }
}

/// A pending claim on the partner slot of a room, addressed to an email.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct InviteEntity {
    /// Primary key of the invite.
    pub id: Uuid,
    /// Room whose partner slot the invite offers.
    pub room_id: Uuid,
    /// Creator of the room.
    pub inviter_id: String,
    /// Always stored trimmed and lower-cased.
    pub invitee_email: String,
    /// Pending until accepted.
    pub status: InviteStatus,
    /// Creation time.
    pub created_at: SystemTime,
}

impl InviteEntity {
    /// Build a pending invite, normalising the invitee email.
    pub fn new(room_id: Uuid, inviter_id: String, invitee_email: &str) -> Self {
        Self {
            id: Uuid::new_v4(),
            room_id,
            inviter_id,
            invitee_email: normalize_email(invitee_email),
            status: InviteStatus::Pending,
            created_at: SystemTime::now(),
        }
    }
}

/// One multiple-choice question authored about oneself.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct QuestionEntity {
    /// Question wording.
    pub text: String,
    /// Exactly [`CHOICES_PER_QUESTION`] answer choices.
    pub choices: Vec<String>,
    /// Index into `choices` of the correct answer.
    pub correct_choice: usize,
}

impl QuestionEntity {
    /// Text of the correct choice, if the index is in range.
    pub fn correct_answer(&self) -> Option<&str> {
        self.choices.get(self.correct_choice).map(String::as_str)
    }
}

/// The full question set of one author for one room, keyed by `(room_id, author_id)`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct QuestionSetEntity {
    /// Room the set belongs to.
    pub room_id: Uuid,
    /// Participant who wrote the questions about themselves.
    pub author_id: String,
    /// Exactly [`QUESTIONS_PER_SET`] blocks.
    pub questions: Vec<QuestionEntity>,
    /// Time of the last upsert.
    pub updated_at: SystemTime,
}

/// A participant's guess at one of the opposing participant's questions.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct AnswerEntity {
    /// Primary key of the answer.
    pub id: Uuid,
    /// Room the answer belongs to.
    pub room_id: Uuid,
    /// Slot (0-based) of the question inside the author's set.
    pub question_id: usize,
    /// Author of the question being answered.
    pub question_author_id: String,
    /// Participant who answered.
    pub user_id: String,
    /// Submitted text, trimmed.
    pub answer_text: String,
    /// Computed once at submission time.
    pub is_correct: bool,
    /// Submission time.
    pub created_at: SystemTime,
}

/// Outcome of a conditional answer insertion.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AnswerInsert {
    /// The answer was stored.
    Inserted,
    /// An answer for the same `(room, user, question)` already exists.
    Duplicate,
}

/// Lower-case and trim an email so lookups are case-insensitive.
pub fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}

/// Compare a guess against the stored correct answer ignoring case and surrounding whitespace.
pub fn answers_match(given: &str, expected: &str) -> bool {
    given.trim().to_lowercase() == expected.trim().to_lowercase()
}
