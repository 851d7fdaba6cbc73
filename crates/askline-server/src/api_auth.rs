//! Account handlers: `POST /signup` and `POST /token`.

use askline_types::User;
use axum::extract::{Extension, Form, Json};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

use crate::api::{with_conn, ApiError};
use crate::AppState;

/// Request body for `POST /signup`.
#[derive(Debug, Deserialize)]
pub struct SignupRequest {
    pub email: String,
    pub username: String,
    pub password: String,
}

/// Form body for `POST /token`. `username` carries the account email.
#[derive(Debug, Deserialize)]
pub struct TokenRequest {
    pub username: String,
    pub password: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct TokenResponse {
    pub access_token: String,
    pub token_type: String,
}

/// Handler for `POST /signup`.
pub async fn signup_handler(
    Extension(state): Extension<Arc<AppState>>,
    Json(payload): Json<SignupRequest>,
) -> Result<Json<User>, ApiError> {
    let grant_admin = state.signup_grants_admin;
    let user = with_conn(&state, move |conn| {
        askline_identity::create_user(
            conn,
            &payload.username,
            &payload.email,
            &payload.password,
            grant_admin,
        )
    })
    .await?;

    Ok(Json(user))
}

/// Handler for `POST /token`.
pub async fn token_handler(
    Extension(state): Extension<Arc<AppState>>,
    Form(form): Form<TokenRequest>,
) -> Result<Json<TokenResponse>, ApiError> {
    let user = with_conn(&state, move |conn| {
        askline_identity::authenticate(conn, &form.username, &form.password)
    })
    .await?;

    tracing::info!(user_id = user.id, "issued access token");
    Ok(Json(TokenResponse {
        access_token: state.tokens.issue(user.id),
        token_type: "bearer".to_string(),
    }))
}
