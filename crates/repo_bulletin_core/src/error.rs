//! crates/repo_bulletin_core/src/error.rs
//!
//! Failures of the bulletin and account flows.

use crate::authorize::UnauthorizedReference;
use crate::ports::PortError;
use crate::validate::ValidationError;

#[derive(Debug, thiserror::Error)]
pub enum ServiceError {
    #[error(transparent)]
    Invalid(#[from] ValidationError),

    #[error(transparent)]
    Unauthorized(#[from] UnauthorizedReference),

    /// The session is valid but the user record is gone (e.g. account deleted).
    #[error("User does not exist in DB.")]
    UnknownUser,

    /// A public bulletin was requested for a handle with no account here.
    #[error("User does not have a bulletin.")]
    NoBulletin,

    #[error("Identity provider request failed: {0}")]
    Provider(PortError),

    #[error("Storage failure: {0}")]
    Storage(PortError),
}
