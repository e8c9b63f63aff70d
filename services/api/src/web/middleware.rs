//! services/api/src/web/middleware.rs
//!
//! Authentication middleware for protecting routes.

use axum::{
    extract::{Request, State},
    middleware::Next,
    response::Response,
};
use repo_bulletin_core::UserId;
use std::sync::Arc;

use crate::web::cookies::cookie_header;
use crate::web::error::AppError;
use crate::web::state::AppState;

/// The authenticated caller, placed in request extensions by [`require_auth`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AuthUser(pub UserId);

/// Middleware that verifies the `jwt` session cookie.
///
/// If valid, inserts an [`AuthUser`] into request extensions for handlers to use.
/// If invalid or missing, returns 401 Unauthorized.
pub async fn require_auth(
    State(state): State<Arc<AppState>>,
    mut req: Request,
    next: Next,
) -> Result<Response, AppError> {
    let cookies = cookie_header(req.headers());
    let user_id = state.sessions.resolve(cookies.as_deref())?;

    req.extensions_mut().insert(AuthUser(user_id));
    Ok(next.run(req).await)
}
