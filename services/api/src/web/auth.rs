//! services/api/src/web/auth.rs
//!
//! Endpoints of the OAuth handshake, plus logout.

use axum::{
    extract::{Query, State},
    http::{HeaderMap, Method, StatusCode},
    response::{IntoResponse, Redirect},
};
use axum_extra::extract::cookie::CookieJar;
use repo_bulletin_core::handshake::STATE_COOKIE;
use repo_bulletin_core::session::cookie_value;
use serde::Deserialize;
use std::sync::Arc;
use utoipa::IntoParams;

use crate::web::cookies::{
    clear_session_cookie, clear_state_cookie, cookie_header, session_cookie, state_cookie,
};
use crate::web::error::AppError;
use crate::web::state::AppState;

//=========================================================================================
// Request Types
//=========================================================================================

#[derive(Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct CallbackParams {
    /// Authorization code issued by GitHub.
    pub code: Option<String>,
    /// The state value echoed back by GitHub.
    pub state: Option<String>,
}

//=========================================================================================
// Handlers
//=========================================================================================

/// GET /api/redirect - Start the GitHub login
#[utoipa::path(
    get,
    path = "/api/redirect",
    responses(
        (status = 307, description = "Redirect to GitHub; sets the `state` cookie"),
        (status = 500, description = "Internal server error")
    )
)]
pub async fn redirect_handler(
    State(state): State<Arc<AppState>>,
) -> Result<impl IntoResponse, AppError> {
    let redirect = state.handshake.begin()?;
    let jar = CookieJar::new().add(state_cookie(redirect.state.as_str()));
    Ok((jar, Redirect::temporary(&redirect.url)))
}

/// GET /api/callback - Finish the GitHub login
#[utoipa::path(
    get,
    path = "/api/callback",
    params(CallbackParams),
    responses(
        (status = 307, description = "Logged in; sets the `jwt` cookie and redirects to the user's page"),
        (status = 400, description = "Could not get token"),
        (status = 403, description = "Invalid state"),
        (status = 502, description = "Failed to request user data"),
        (status = 500, description = "Internal server error")
    )
)]
pub async fn callback_handler(
    State(state): State<Arc<AppState>>,
    Query(params): Query<CallbackParams>,
    headers: HeaderMap,
) -> Result<impl IntoResponse, AppError> {
    let cookies = cookie_header(&headers);
    let cookie_state = cookies
        .as_deref()
        .and_then(|header| cookie_value(header, STATE_COOKIE));

    let login = state
        .handshake
        .complete(
            params.code.as_deref().unwrap_or_default(),
            params.state.as_deref(),
            cookie_state,
        )
        .await?;

    let jar = CookieJar::new()
        .add(session_cookie(&login.session_token))
        .add(clear_state_cookie());
    let landing = format!("{}/{}", state.config.app_url, login.profile.handle);
    Ok((jar, Redirect::temporary(&landing)))
}

/// POST /api/logout - Clear the session cookie
#[utoipa::path(
    post,
    path = "/api/logout",
    responses(
        (status = 204, description = "Logged out"),
        (status = 405, description = "Method not allowed")
    )
)]
pub async fn logout_handler(method: Method) -> Result<impl IntoResponse, AppError> {
    if method != Method::POST {
        return Err(AppError::MethodNotAllowed);
    }
    let jar = CookieJar::new().add(clear_session_cookie());
    Ok((StatusCode::NO_CONTENT, jar))
}
