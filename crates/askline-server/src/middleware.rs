//! Bearer-token identity resolution.

use askline_types::User;
use axum::{
    body::Body,
    http::{header, Request},
    middleware::Next,
    response::Response,
};
use std::sync::Arc;

use crate::api::{with_conn, ApiError};
use crate::AppState;

/// The signed-in account, stored in request extensions.
#[derive(Clone, Debug)]
pub struct IdentityContext(pub User);

/// Resolves `Authorization: Bearer <token>` into an [`IdentityContext`].
///
/// Requests without the header pass through anonymously; handlers decide
/// whether they need an account. A header that is present but malformed,
/// tampered, expired, or names a deleted account is rejected with 401.
pub async fn identity_middleware(
    mut req: Request<Body>,
    next: Next,
) -> Result<Response, ApiError> {
    let Some(value) = req.headers().get(header::AUTHORIZATION) else {
        return Ok(next.run(req).await);
    };

    let token = value
        .to_str()
        .ok()
        .and_then(|v| v.strip_prefix("Bearer "))
        .map(str::to_string)
        .ok_or_else(|| ApiError::Unauthorized("expected a bearer token".to_string()))?;

    let state = req
        .extensions()
        .get::<Arc<AppState>>()
        .ok_or_else(|| ApiError::InternalServerError("app state missing".to_string()))?
        .clone();

    let user_id = state.tokens.verify(&token)?;
    let user = with_conn(&state, move |conn| askline_identity::get_user(conn, user_id)).await?;

    tracing::debug!(user_id = user.id, "request authenticated");
    req.extensions_mut().insert(IdentityContext(user));

    Ok(next.run(req).await)
}
