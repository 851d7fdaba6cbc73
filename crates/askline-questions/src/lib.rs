//! Question and answer persistence for the Askline forum.
//!
//! Every function takes a borrowed [`rusqlite::Connection`] and performs one
//! atomic statement (or a read-back after one), so callers can run it inside
//! `spawn_blocking` with a pooled connection. Records are always returned as
//! re-read from the database: ids and timestamps are the stored ones.
//!
//! The display order of questions is not a storage concern; see
//! [`ranking::rank`].

pub mod ranking;


use std::collections::HashMap;

use askline_types::{validate_content, Answer, Question, QuestionStatus, ValidationError};
use chrono::{DateTime, SecondsFormat, SubsecRound, Utc};
use rusqlite::{params, Connection, OptionalExtension, Row};
use thiserror::Error;

pub use ranking::rank;

/// Errors that can occur during question and answer operations.
#[derive(Debug, Error)]
pub enum QuestionError {
    #[error("database error: {0}")]
    Database(#[from] rusqlite::Error),
    #[error("question not found: {0}")]
    NotFound(i64),
    #[error(transparent)]
    Validation(#[from] ValidationError),
}

const QUESTION_COLUMNS: &str = "id, content, timestamp, status, user_id";

const ANSWER_SELECT: &str = "SELECT a.id, a.question_id, a.content, a.timestamp, a.user_id, u.username
    FROM answers a LEFT JOIN users u ON u.id = a.user_id";

/// Creates a question in `Pending` state and returns the stored record.
pub fn create_question(
    conn: &Connection,
    content: &str,
    user_id: Option<i64>,
) -> Result<Question, QuestionError> {
    validate_content("Question", content)?;

    conn.execute(
        "INSERT INTO questions (content, timestamp, status, user_id) VALUES (?1, ?2, ?3, ?4)",
        params![
            content,
            encode_timestamp(now()),
            QuestionStatus::Pending.as_str(),
            user_id
        ],
    )?;
    let id = conn.last_insert_rowid();
    tracing::debug!(question_id = id, "question created");

    get_question(conn, id)
}

/// Retrieves one question with its answers.
pub fn get_question(conn: &Connection, id: i64) -> Result<Question, QuestionError> {
    let mut question = conn
        .query_row(
            &format!("SELECT {QUESTION_COLUMNS} FROM questions WHERE id = ?1"),
            [id],
            map_row_to_question,
        )
        .optional()?
        .ok_or(QuestionError::NotFound(id))?;

    let mut stmt = conn.prepare(&format!(
        "{ANSWER_SELECT} WHERE a.question_id = ?1 ORDER BY a.id ASC"
    ))?;
    let rows = stmt.query_map([id], map_row_to_answer)?;
    for row in rows {
        question.answers.push(row?);
    }
    Ok(question)
}

/// Lists every question with its answers, in creation order.
///
/// Callers that display the list should pass it through [`rank`].
pub fn list_questions(conn: &Connection) -> Result<Vec<Question>, QuestionError> {
    let mut stmt = conn.prepare(&format!(
        "SELECT {QUESTION_COLUMNS} FROM questions ORDER BY id ASC"
    ))?;
    let rows = stmt.query_map([], map_row_to_question)?;
    let mut questions = Vec::new();
    for row in rows {
        questions.push(row?);
    }

    let index: HashMap<i64, usize> = questions
        .iter()
        .enumerate()
        .map(|(pos, q)| (q.id, pos))
        .collect();

    let mut stmt = conn.prepare(&format!("{ANSWER_SELECT} ORDER BY a.id ASC"))?;
    let rows = stmt.query_map([], map_row_to_answer)?;
    for row in rows {
        let answer = row?;
        if let Some(&pos) = index.get(&answer.question_id) {
            questions[pos].answers.push(answer);
        }
    }

    Ok(questions)
}

/// Attaches an answer to an existing question.
///
/// Fails with [`QuestionError::NotFound`] when the question does not exist,
/// before anything is written.
pub fn create_answer(
    conn: &Connection,
    question_id: i64,
    content: &str,
    user_id: Option<i64>,
) -> Result<Answer, QuestionError> {
    validate_content("Answer", content)?;

    if !question_exists(conn, question_id)? {
        return Err(QuestionError::NotFound(question_id));
    }

    conn.execute(
        "INSERT INTO answers (question_id, content, timestamp, user_id) VALUES (?1, ?2, ?3, ?4)",
        params![question_id, content, encode_timestamp(now()), user_id],
    )?;
    let id = conn.last_insert_rowid();
    tracing::debug!(question_id, answer_id = id, "answer created");

    let answer = conn.query_row(
        &format!("{ANSWER_SELECT} WHERE a.id = ?1"),
        [id],
        map_row_to_answer,
    )?;
    Ok(answer)
}

/// Moves a question to `status` and returns the updated record.
pub fn set_status(
    conn: &Connection,
    question_id: i64,
    status: QuestionStatus,
) -> Result<Question, QuestionError> {
    let count = conn.execute(
        "UPDATE questions SET status = ?1 WHERE id = ?2",
        params![status.as_str(), question_id],
    )?;
    if count == 0 {
        return Err(QuestionError::NotFound(question_id));
    }
    tracing::debug!(question_id, status = %status, "question status updated");

    get_question(conn, question_id)
}

fn question_exists(conn: &Connection, id: i64) -> Result<bool, QuestionError> {
    let exists = conn.query_row(
        "SELECT EXISTS(SELECT 1 FROM questions WHERE id = ?1)",
        [id],
        |row| row.get(0),
    )?;
    Ok(exists)
}

/// Current instant at the precision the database stores.
fn now() -> DateTime<Utc> {
    Utc::now().trunc_subsecs(6)
}

fn encode_timestamp(ts: DateTime<Utc>) -> String {
    ts.to_rfc3339_opts(SecondsFormat::Micros, true)
}

fn decode_timestamp(row: &Row, idx: usize) -> rusqlite::Result<DateTime<Utc>> {
    let raw: String = row.get(idx)?;
    DateTime::parse_from_rfc3339(&raw)
        .map(|ts| ts.with_timezone(&Utc))
        .map_err(|e| {
            rusqlite::Error::FromSqlConversionFailure(idx, rusqlite::types::Type::Text, Box::new(e))
        })
}

fn map_row_to_question(row: &Row) -> rusqlite::Result<Question> {
    let status_str: String = row.get(3)?;
    let status: QuestionStatus = status_str.parse().map_err(|e| {
        rusqlite::Error::FromSqlConversionFailure(3, rusqlite::types::Type::Text, Box::new(e))
    })?;

    Ok(Question {
        id: row.get(0)?,
        content: row.get(1)?,
        timestamp: decode_timestamp(row, 2)?,
        status,
        user_id: row.get(4)?,
        answers: Vec::new(),
    })
}

fn map_row_to_answer(row: &Row) -> rusqlite::Result<Answer> {
    Ok(Answer {
        id: row.get(0)?,
        question_id: row.get(1)?,
        content: row.get(2)?,
        timestamp: decode_timestamp(row, 3)?,
        user_id: row.get(4)?,
        username: row.get(5)?,
    })
}
