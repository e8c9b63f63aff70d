//! crates/repo_bulletin_core/src/ports.rs
//!
//! Defines the service contracts (traits) for the application's core logic.
//! These traits form the boundary of the hexagonal architecture, allowing the core
//! to be independent of specific external implementations like databases or APIs.

use async_trait::async_trait;

#[cfg(any(test, feature = "test-mocks"))]
use mockall::automock;

use crate::domain::{Bulletin, ProviderProfile, RepoId, StoredBulletin, User, UserId};

//=========================================================================================
// Generic Port Error and Result Types
//=========================================================================================

/// A generic error type for all port operations.
/// This abstracts away the specific errors from external services (e.g., database, network).
#[derive(Debug, thiserror::Error)]
pub enum PortError {
    #[error("Item not found: {0}")]
    NotFound(String),
    /// A write collided with a uniqueness constraint.
    #[error("Conflict: {0}")]
    Conflict(String),
    #[error("An unexpected error occurred: {0}")]
    Unexpected(String),
}

/// A convenience type alias for `Result<T, PortError>`.
pub type PortResult<T> = Result<T, PortError>;

//=========================================================================================
// Service Ports (Traits)
//=========================================================================================

#[cfg_attr(any(test, feature = "test-mocks"), automock)]
#[async_trait]
pub trait DatabaseService: Send + Sync {
    // --- User Management ---
    async fn get_user(&self, id: UserId) -> PortResult<User>;

    /// Fails with `PortError::Conflict` if a user with the same id exists.
    async fn insert_user(&self, user: &User) -> PortResult<()>;

    async fn update_user_token(&self, id: UserId, access_token: &str) -> PortResult<()>;

    /// Removes the user together with their bulletin.
    async fn delete_user(&self, id: UserId) -> PortResult<()>;

    // --- Bulletin Management ---
    async fn get_bulletin(&self, user_id: UserId) -> PortResult<StoredBulletin>;

    /// Fails with `PortError::Conflict` if the user already has a bulletin.
    async fn insert_bulletin(&self, user_id: UserId, bulletin: &Bulletin) -> PortResult<()>;

    async fn update_bulletin(&self, user_id: UserId, bulletin: &Bulletin) -> PortResult<()>;
}

/// The OAuth identity provider and its REST API.
#[cfg_attr(any(test, feature = "test-mocks"), automock)]
#[async_trait]
pub trait IdentityProvider: Send + Sync {
    /// Builds the authorization URL the browser is redirected to, embedding `state`.
    fn authorize_url(&self, state: &str) -> String;

    /// Exchanges an authorization code for an access token.
    async fn exchange_code(&self, code: &str) -> PortResult<String>;

    /// Fetches the profile of the user owning `access_token`.
    async fn fetch_profile(&self, access_token: &str) -> PortResult<ProviderProfile>;

    /// Lists the ids of every repository owned by `handle`.
    async fn list_repos(&self, handle: &str, access_token: &str) -> PortResult<Vec<RepoId>>;

    /// Resolves a public handle to its user id.
    async fn lookup_user(&self, handle: &str) -> PortResult<UserId>;
}
