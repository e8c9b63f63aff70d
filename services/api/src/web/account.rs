//! services/api/src/web/account.rs
//!
//! The signed-in user's account.

use axum::{
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Json},
    Extension,
};
use axum_extra::extract::cookie::CookieJar;
use serde::Serialize;
use std::sync::Arc;
use utoipa::ToSchema;

use crate::web::cookies::clear_session_cookie;
use crate::web::error::AppError;
use crate::web::middleware::AuthUser;
use crate::web::state::AppState;

#[derive(Serialize, ToSchema)]
pub struct AccountResponse {
    /// GitHub user id, as a string.
    pub id: String,
    /// Current GitHub handle.
    pub name: String,
}

/// GET /api/account - Who am I
#[utoipa::path(
    get,
    path = "/api/account",
    responses(
        (status = 200, description = "The signed-in account", body = AccountResponse),
        (status = 401, description = "Unauthenticated"),
        (status = 500, description = "Internal server error")
    )
)]
pub async fn account_handler(
    State(state): State<Arc<AppState>>,
    Extension(AuthUser(user_id)): Extension<AuthUser>,
) -> Result<Json<AccountResponse>, AppError> {
    let profile = state.accounts.account(user_id).await?;
    Ok(Json(AccountResponse {
        id: profile.id.to_string(),
        name: profile.handle,
    }))
}

/// DELETE /api/delete-account - Delete the account and its bulletin
#[utoipa::path(
    delete,
    path = "/api/delete-account",
    responses(
        (status = 204, description = "Account deleted; the session cookie is cleared"),
        (status = 401, description = "Unauthenticated"),
        (status = 500, description = "Internal server error")
    )
)]
pub async fn delete_account_handler(
    State(state): State<Arc<AppState>>,
    Extension(AuthUser(user_id)): Extension<AuthUser>,
) -> Result<impl IntoResponse, AppError> {
    state.accounts.delete(user_id).await?;
    let jar = CookieJar::new().add(clear_session_cookie());
    Ok((StatusCode::NO_CONTENT, jar))
}
