//! Question, answer, status, and suggestion handlers.
//!
//! Every mutating handler validates first, persists through the store, and
//! only then broadcasts an event built from the stored record. A failed
//! request never reaches the broadcaster.

use askline_questions::{
    create_answer, create_question, get_question, list_questions, rank, set_status,
};
use askline_types::{validate_content, Answer, LiveEvent, Question, QuestionStatus, Suggestion};
use axum::extract::{Extension, Json, Path};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::sync::Arc;

use crate::api::{with_conn, ApiError};
use crate::middleware::IdentityContext;
use crate::AppState;

/// Request body for `POST /questions` and `POST /questions/{id}/answers`.
#[derive(Debug, Deserialize)]
pub struct ContentRequest {
    pub content: String,
}

/// Request body for `PUT /questions/{id}/status`.
///
/// `status` is kept as raw JSON so that a missing, `null`, or non-string
/// value is answered with the same 400 as an unknown label.
#[derive(Debug, Deserialize)]
pub struct StatusUpdateRequest {
    #[serde(default)]
    pub status: Option<Value>,
}

impl StatusUpdateRequest {
    fn parse_status(&self) -> Option<QuestionStatus> {
        match &self.status {
            Some(Value::String(label)) => label.parse().ok(),
            _ => None,
        }
    }
}

#[derive(Debug, Serialize, Deserialize)]
pub struct SuggestionsResponse {
    pub suggestions: Vec<Suggestion>,
}

fn user_id(identity: &Option<Extension<IdentityContext>>) -> Option<i64> {
    identity.as_ref().map(|Extension(IdentityContext(user))| user.id)
}

/// Handler for `POST /questions`.
pub async fn create_question_handler(
    Extension(state): Extension<Arc<AppState>>,
    identity: Option<Extension<IdentityContext>>,
    Json(payload): Json<ContentRequest>,
) -> Result<Json<Question>, ApiError> {
    validate_content("Question", &payload.content)
        .map_err(|e| ApiError::BadRequest(e.to_string()))?;

    let owner = user_id(&identity);
    let question =
        with_conn(&state, move |conn| create_question(conn, &payload.content, owner)).await?;

    state
        .broadcaster
        .broadcast(&LiveEvent::new_question(&question), None)
        .await;

    Ok(Json(question))
}

/// Handler for `GET /questions`. Returns the list in display order.
pub async fn list_questions_handler(
    Extension(state): Extension<Arc<AppState>>,
) -> Result<Json<Vec<Question>>, ApiError> {
    let questions = with_conn(&state, list_questions).await?;
    Ok(Json(rank(questions)))
}

/// Handler for `GET /questions/{id}`.
pub async fn get_question_handler(
    Extension(state): Extension<Arc<AppState>>,
    Path(question_id): Path<i64>,
) -> Result<Json<Question>, ApiError> {
    let question = with_conn(&state, move |conn| get_question(conn, question_id)).await?;
    Ok(Json(question))
}

/// Handler for `POST /questions/{id}/answers`.
pub async fn create_answer_handler(
    Extension(state): Extension<Arc<AppState>>,
    identity: Option<Extension<IdentityContext>>,
    Path(question_id): Path<i64>,
    Json(payload): Json<ContentRequest>,
) -> Result<Json<Answer>, ApiError> {
    validate_content("Answer", &payload.content)
        .map_err(|e| ApiError::BadRequest(e.to_string()))?;

    let author = user_id(&identity);
    let answer = with_conn(&state, move |conn| {
        create_answer(conn, question_id, &payload.content, author)
    })
    .await?;

    state
        .broadcaster
        .broadcast(&LiveEvent::new_answer(&answer), None)
        .await;

    Ok(Json(answer))
}

/// Handler for `PUT /questions/{id}/status`. Admins only.
///
/// Checks run in order: credentials (401), admin flag (403), status value
/// (400), then existence (404) as part of the update itself.
pub async fn update_status_handler(
    Extension(state): Extension<Arc<AppState>>,
    identity: Option<Extension<IdentityContext>>,
    Path(question_id): Path<i64>,
    Json(payload): Json<StatusUpdateRequest>,
) -> Result<Json<Question>, ApiError> {
    let Some(Extension(IdentityContext(user))) = identity else {
        return Err(ApiError::Unauthorized("Not authenticated".to_string()));
    };
    if !user.is_admin {
        tracing::warn!(user_id = user.id, question_id, "non-admin status update rejected");
        return Err(ApiError::Forbidden(
            "Only admins can update question status".to_string(),
        ));
    }

    let status = payload
        .parse_status()
        .ok_or_else(|| ApiError::BadRequest("Invalid status".to_string()))?;

    let question = with_conn(&state, move |conn| set_status(conn, question_id, status)).await?;

    state
        .broadcaster
        .broadcast(&LiveEvent::question_updated(&question), None)
        .await;

    Ok(Json(question))
}

/// Handler for `GET /questions/{id}/suggestions`.
pub async fn suggestions_handler(
    Extension(state): Extension<Arc<AppState>>,
    Path(question_id): Path<i64>,
) -> Result<Json<SuggestionsResponse>, ApiError> {
    let question = with_conn(&state, move |conn| get_question(conn, question_id)).await?;
    let suggestions = state.suggester.suggest(&question.content).await;
    Ok(Json(SuggestionsResponse { suggestions }))
}
