//! services/api/src/web/error.rs
//!
//! Maps every request failure onto a status code and a `{"status": "..."}` body.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use repo_bulletin_core::{HandshakeError, ServiceError, SessionError};
use serde_json::json;
use tracing::{error, warn};

#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error(transparent)]
    Handshake(#[from] HandshakeError),
    #[error(transparent)]
    Session(#[from] SessionError),
    #[error(transparent)]
    Service(#[from] ServiceError),
    #[error("No data provided.")]
    MissingPayload,
    #[error("No user provided.")]
    MissingUser,
    #[error("Method not allowed.")]
    MethodNotAllowed,
}

impl AppError {
    /// The status code and the client-facing message.
    fn status_and_message(&self) -> (StatusCode, String) {
        match self {
            AppError::Handshake(e) => match e {
                HandshakeError::InvalidState => (StatusCode::FORBIDDEN, "Invalid state.".into()),
                HandshakeError::TokenExchangeFailed(_) => {
                    (StatusCode::BAD_REQUEST, "Could not get token.".into())
                }
                HandshakeError::ProfileFetchFailed(_) => {
                    (StatusCode::BAD_GATEWAY, "Failed to request user data.".into())
                }
                HandshakeError::State(_) => {
                    (StatusCode::INTERNAL_SERVER_ERROR, "Failed to generate state.".into())
                }
                HandshakeError::Persistence(_) => {
                    (StatusCode::INTERNAL_SERVER_ERROR, "Error saving user in DB.".into())
                }
                HandshakeError::Session(_) => {
                    (StatusCode::INTERNAL_SERVER_ERROR, "Error creating JWT token.".into())
                }
            },
            AppError::Session(e) if e.is_unauthenticated() => {
                (StatusCode::UNAUTHORIZED, "Unauthenticated".into())
            }
            AppError::Session(_) => {
                (StatusCode::INTERNAL_SERVER_ERROR, "Error creating JWT token.".into())
            }
            AppError::Service(e) => match e {
                ServiceError::Invalid(v) => (StatusCode::BAD_REQUEST, v.to_string()),
                ServiceError::Unauthorized(r) => (StatusCode::UNPROCESSABLE_ENTITY, r.to_string()),
                ServiceError::UnknownUser => (StatusCode::UNAUTHORIZED, "Unauthenticated".into()),
                ServiceError::NoBulletin => (StatusCode::NOT_FOUND, e.to_string()),
                ServiceError::Provider(_) => {
                    (StatusCode::INTERNAL_SERVER_ERROR, "Failed to request user data.".into())
                }
                ServiceError::Storage(_) => {
                    (StatusCode::INTERNAL_SERVER_ERROR, "Error accessing DB.".into())
                }
            },
            AppError::MissingPayload | AppError::MissingUser => {
                (StatusCode::BAD_REQUEST, self.to_string())
            }
            AppError::MethodNotAllowed => (StatusCode::METHOD_NOT_ALLOWED, self.to_string()),
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, message) = self.status_and_message();
        if status.is_server_error() {
            error!(error = %self, "Request failed");
        } else {
            warn!(error = %self, status = status.as_u16(), "Request rejected");
        }
        (status, Json(json!({ "status": message }))).into_response()
    }
}
