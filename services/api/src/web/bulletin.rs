//! services/api/src/web/bulletin.rs
//!
//! Saving a bulletin and reading a user's public bulletin.

use axum::{
    extract::{Query, State},
    http::StatusCode,
    response::{IntoResponse, Json},
    Extension,
};
use chrono::{DateTime, Utc};
use repo_bulletin_core::Bulletin;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use utoipa::{IntoParams, ToSchema};

use crate::web::error::AppError;
use crate::web::middleware::AuthUser;
use crate::web::state::AppState;

#[derive(Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct SaveParams {
    /// The bulletin as JSON, percent-encoded.
    pub x: Option<String>,
}

#[derive(Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct BulletinParams {
    /// GitHub handle of the bulletin's owner.
    pub user: Option<String>,
}

/// A user's public bulletin; `data` is null until they save one.
#[derive(Serialize, ToSchema)]
pub struct BulletinResponse {
    #[schema(value_type = Option<Object>)]
    pub data: Option<Bulletin>,
    pub updated_at: Option<DateTime<Utc>>,
}

/// Replace the caller's bulletin.
///
/// The payload is validated, then every referenced repository is checked
/// against the caller's live GitHub repository list before anything is written.
#[utoipa::path(
    post,
    path = "/api/save",
    params(SaveParams),
    responses(
        (status = 204, description = "Bulletin saved"),
        (status = 400, description = "Missing or invalid payload"),
        (status = 401, description = "Unauthenticated"),
        (status = 422, description = "Payload references repositories the caller does not own"),
        (status = 500, description = "Internal server error")
    )
)]
pub async fn save_handler(
    State(state): State<Arc<AppState>>,
    Extension(AuthUser(user_id)): Extension<AuthUser>,
    Query(params): Query<SaveParams>,
) -> Result<impl IntoResponse, AppError> {
    let raw = params.x.ok_or(AppError::MissingPayload)?;
    state.bulletins.save(user_id, &raw).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// Read the bulletin of a GitHub user.
#[utoipa::path(
    get,
    path = "/api/bulletin",
    params(BulletinParams),
    responses(
        (status = 200, description = "The user's bulletin, or null", body = BulletinResponse),
        (status = 400, description = "No user provided"),
        (status = 404, description = "User does not have a bulletin"),
        (status = 500, description = "Internal server error")
    )
)]
pub async fn get_bulletin_handler(
    State(state): State<Arc<AppState>>,
    Query(params): Query<BulletinParams>,
) -> Result<Json<BulletinResponse>, AppError> {
    let handle = params
        .user
        .filter(|user| !user.is_empty())
        .ok_or(AppError::MissingUser)?;

    let stored = state.bulletins.load_public(&handle).await?;
    Ok(Json(match stored {
        Some(stored) => BulletinResponse {
            data: Some(stored.bulletin),
            updated_at: Some(stored.updated_at),
        },
        None => BulletinResponse {
            data: None,
            updated_at: None,
        },
    }))
}
