//! Realtime events pushed to every connected client.
//!
//! The wire form is a JSON object tagged by `type`:
//!
//! | `type` | body |
//! |--------|------|
//! | `new_question` | `question: {id, content, timestamp, status}` |
//! | `new_answer` | `answer: {id, content, timestamp, username, question_id}` |
//! | `question_updated` | `question: {id, content, timestamp, status}` |
//!
//! Events are built from persisted records, so ids and timestamps are the
//! store's. They are never stored themselves.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::{Answer, Question, QuestionStatus};

/// Question projection carried by `new_question` and `question_updated`.
///
/// Answers and the owner id are left out; clients refetch the list when
/// they need them.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QuestionPayload {
    pub id: i64,
    pub content: String,
    pub timestamp: DateTime<Utc>,
    pub status: QuestionStatus,
}

impl From<&Question> for QuestionPayload {
    fn from(q: &Question) -> Self {
        Self {
            id: q.id,
            content: q.content.clone(),
            timestamp: q.timestamp,
            status: q.status,
        }
    }
}

/// Answer projection carried by `new_answer`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnswerPayload {
    pub id: i64,
    pub content: String,
    pub timestamp: DateTime<Utc>,
    pub username: Option<String>,
    pub question_id: i64,
}

impl From<&Answer> for AnswerPayload {
    fn from(a: &Answer) -> Self {
        Self {
            id: a.id,
            content: a.content.clone(),
            timestamp: a.timestamp,
            username: a.username.clone(),
            question_id: a.question_id,
        }
    }
}

/// A state change fanned out to all live channels.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum LiveEvent {
    /// A question was created.
    NewQuestion { question: QuestionPayload },
    /// An answer was attached to `answer.question_id`.
    NewAnswer { answer: AnswerPayload },
    /// A question's status changed.
    #[serde(rename = "question_updated")]
    QuestionStatusChanged { question: QuestionPayload },
}

impl LiveEvent {
    pub fn new_question(question: &Question) -> Self {
        Self::NewQuestion {
            question: question.into(),
        }
    }

    pub fn new_answer(answer: &Answer) -> Self {
        Self::NewAnswer {
            answer: answer.into(),
        }
    }

    pub fn question_updated(question: &Question) -> Self {
        Self::QuestionStatusChanged {
            question: question.into(),
        }
    }

    /// The `type` tag this event serializes with.
    pub fn event_type(&self) -> &'static str {
        match self {
            Self::NewQuestion { .. } => "new_question",
            Self::NewAnswer { .. } => "new_answer",
            Self::QuestionStatusChanged { .. } => "question_updated",
        }
    }
}
