//! Shared types, error definitions, and constants for the Askline forum.
//!
//! This crate holds the domain records every other crate passes around:
//! questions, answers, users, LLM suggestions, and the [`LiveEvent`] union
//! that is pushed to connected clients. It also owns the input-validation
//! rules (non-blank content, the closed set of question statuses) so the
//! HTTP layer and the store reject bad input the same way.
//!
//! Nothing in here touches the database or the network.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

mod event;
pub use event::{AnswerPayload, LiveEvent, QuestionPayload};

/// Rejected input. Surfaced to the requester as a 400, never persisted.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    /// Content was empty or whitespace-only.
    #[error("{0} cannot be empty")]
    EmptyContent(&'static str),

    /// A status string outside the enumerated set.
    #[error("invalid status: {0}")]
    InvalidStatus(String),
}

/// Checks that `content` has at least one non-whitespace character.
///
/// `field` names the input in the error message ("Question", "Answer", ...).
pub fn validate_content(field: &'static str, content: &str) -> Result<(), ValidationError> {
    if content.trim().is_empty() {
        return Err(ValidationError::EmptyContent(field));
    }
    Ok(())
}

/// Lifecycle state of a question.
///
/// Serialized with the exact labels the clients expect (`"Pending"`,
/// `"Escalated"`, `"Answered"`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum QuestionStatus {
    /// Newly asked, not yet handled.
    #[default]
    Pending,
    /// Flagged by an admin as needing priority attention.
    Escalated,
    /// Marked resolved by an admin.
    Answered,
}

impl QuestionStatus {
    /// Every status, in declaration order.
    pub const ALL: [QuestionStatus; 3] = [Self::Pending, Self::Escalated, Self::Answered];

    /// Returns the canonical label for this status.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Pending => "Pending",
            Self::Escalated => "Escalated",
            Self::Answered => "Answered",
        }
    }
}

impl std::fmt::Display for QuestionStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for QuestionStatus {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "Pending" => Ok(Self::Pending),
            "Escalated" => Ok(Self::Escalated),
            "Answered" => Ok(Self::Answered),
            _ => Err(ValidationError::InvalidStatus(s.to_string())),
        }
    }
}

/// A question and the answers attached to it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Question {
    /// Store-assigned identifier.
    pub id: i64,
    /// Question text.
    pub content: String,
    /// Creation instant (UTC).
    pub timestamp: DateTime<Utc>,
    /// Current lifecycle state.
    pub status: QuestionStatus,
    /// Owning user, if the asker was signed in.
    pub user_id: Option<i64>,
    /// Answers in insertion order.
    #[serde(default)]
    pub answers: Vec<Answer>,
}

/// An answer to a question.
///
/// `username` is joined in from the author's account when the answer is
/// read; it is not stored on the answer row.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Answer {
    /// Store-assigned identifier.
    pub id: i64,
    /// Parent question.
    pub question_id: i64,
    /// Answer text.
    pub content: String,
    /// Creation instant (UTC).
    pub timestamp: DateTime<Utc>,
    /// Author, if the answer was posted while signed in.
    pub user_id: Option<i64>,
    /// Author display name.
    pub username: Option<String>,
}

/// A registered account.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    /// Store-assigned identifier.
    pub id: i64,
    /// Unique display name.
    pub username: String,
    /// Unique login email.
    pub email: String,
    /// Whether the account may change question status.
    pub is_admin: bool,
}

/// A candidate answer proposed by the suggester.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Suggestion {
    /// Proposed answer text.
    pub answer: String,
    /// How relevant the suggester believes this answer is (0.0..=1.0).
    pub relevance_score: f64,
    /// Short description of the angle this answer takes.
    pub approach: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_round_trip() {
        for status in QuestionStatus::ALL {
            let parsed: QuestionStatus = status.as_str().parse().unwrap();
            assert_eq!(parsed, status);
        }
    }

    #[test]
    fn status_rejects_unknown_and_wrong_case() {
        for bad in ["", "pending", "ESCALATED", "Closed", " Answered"] {
            let err = bad.parse::<QuestionStatus>().unwrap_err();
            assert_eq!(err, ValidationError::InvalidStatus(bad.to_string()));
        }
    }

    #[test]
    fn status_serializes_as_label() {
        let json = serde_json::to_string(&QuestionStatus::Escalated).unwrap();
        assert_eq!(json, "\"Escalated\"");
        assert_eq!(QuestionStatus::default(), QuestionStatus::Pending);
    }

    #[test]
    fn blank_content_is_rejected() {
        assert!(validate_content("Question", "What is Rust?").is_ok());
        assert!(validate_content("Question", "  x  ").is_ok());
        for blank in ["", "   ", "\n\t "] {
            assert_eq!(
                validate_content("Answer", blank),
                Err(ValidationError::EmptyContent("Answer"))
            );
        }
    }

    #[test]
    fn validation_messages() {
        assert_eq!(
            ValidationError::EmptyContent("Question").to_string(),
            "Question cannot be empty"
        );
        assert_eq!(
            ValidationError::InvalidStatus("Closed".into()).to_string(),
            "invalid status: Closed"
        );
    }
}
