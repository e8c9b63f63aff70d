//! services/api/src/web/rest.rs
//!
//! The master definition for the OpenAPI specification, plus the liveness probe.

use axum::response::Json;
use serde::Serialize;
use utoipa::{OpenApi, ToSchema};

use crate::web::account::{self, AccountResponse};
use crate::web::auth;
use crate::web::bulletin::{self, BulletinResponse};

//=========================================================================================
// OpenAPI Master Definition
//=========================================================================================

#[derive(OpenApi)]
#[openapi(
    paths(
        auth::redirect_handler,
        auth::callback_handler,
        auth::logout_handler,
        account::account_handler,
        account::delete_account_handler,
        bulletin::save_handler,
        bulletin::get_bulletin_handler,
        hello_handler,
    ),
    components(
        schemas(AccountResponse, BulletinResponse, StatusResponse)
    ),
    tags(
        (name = "Repo Bulletin API", description = "GitHub login and bulletin storage.")
    )
)]
pub struct ApiDoc;

//=========================================================================================
// API Response Structs
//=========================================================================================

/// The body of every error response, and of the liveness probe.
#[derive(Serialize, ToSchema)]
pub struct StatusResponse {
    pub status: String,
}

//=========================================================================================
// REST API Handlers
//=========================================================================================

/// Liveness probe.
#[utoipa::path(
    get,
    path = "/api/hello",
    responses(
        (status = 200, description = "The service is up", body = StatusResponse)
    )
)]
pub async fn hello_handler() -> Json<StatusResponse> {
    Json(StatusResponse {
        status: "ok".to_string(),
    })
}
