//! crates/repo_bulletin_core/src/account.rs
//!
//! Account lookup and deletion for an authenticated user.

use std::sync::Arc;

use tracing::info;

use crate::bulletin::load_user;
use crate::domain::{ProviderProfile, UserId};
use crate::error::ServiceError;
use crate::ports::{DatabaseService, IdentityProvider};

#[derive(Clone)]
pub struct AccountService {
    identity: Arc<dyn IdentityProvider>,
    db: Arc<dyn DatabaseService>,
}

impl AccountService {
    pub fn new(identity: Arc<dyn IdentityProvider>, db: Arc<dyn DatabaseService>) -> Self {
        Self { identity, db }
    }

    /// Returns the stored id together with the provider's current handle.
    pub async fn account(&self, user_id: UserId) -> Result<ProviderProfile, ServiceError> {
        let user = load_user(self.db.as_ref(), user_id).await?;
        let profile = self
            .identity
            .fetch_profile(&user.access_token)
            .await
            .map_err(ServiceError::Provider)?;
        Ok(ProviderProfile {
            id: user.id,
            handle: profile.handle,
        })
    }

    /// Deletes the user and, through the store, their bulletin.
    pub async fn delete(&self, user_id: UserId) -> Result<(), ServiceError> {
        self.db
            .delete_user(user_id)
            .await
            .map_err(ServiceError::Storage)?;
        info!(user_id, "Account deleted");
        Ok(())
    }
}
