//! crates/repo_bulletin_core/src/bulletin.rs
//!
//! Saving and reading bulletins.

use std::sync::Arc;

use tracing::{debug, info};

use crate::authorize::authorize;
use crate::domain::{Bulletin, StoredBulletin, User, UserId};
use crate::error::ServiceError;
use crate::ports::{DatabaseService, IdentityProvider, PortError, PortResult};
use crate::validate::validate;

#[derive(Clone)]
pub struct BulletinService {
    identity: Arc<dyn IdentityProvider>,
    db: Arc<dyn DatabaseService>,
}

impl BulletinService {
    pub fn new(identity: Arc<dyn IdentityProvider>, db: Arc<dyn DatabaseService>) -> Self {
        Self { identity, db }
    }

    /// Validates `raw`, checks the user owns every referenced repository, then
    /// replaces the user's bulletin. Nothing is written unless every check passes.
    pub async fn save(&self, user_id: UserId, raw: &str) -> Result<Bulletin, ServiceError> {
        let bulletin = validate(raw)?;

        let user = load_user(self.db.as_ref(), user_id).await?;
        let profile = self
            .identity
            .fetch_profile(&user.access_token)
            .await
            .map_err(ServiceError::Provider)?;
        let owned = self
            .identity
            .list_repos(&profile.handle, &user.access_token)
            .await
            .map_err(ServiceError::Provider)?;
        debug!(user_id, owned = owned.len(), "Fetched repository listing");

        authorize(&bulletin, &owned)?;

        self.persist(user_id, &bulletin)
            .await
            .map_err(ServiceError::Storage)?;

        info!(user_id, sections = bulletin.sections.len(), "Bulletin saved");
        Ok(bulletin)
    }

    /// Last-write-wins upsert of the whole document.
    pub async fn persist(&self, user_id: UserId, bulletin: &Bulletin) -> PortResult<()> {
        match self.db.get_bulletin(user_id).await {
            Ok(_) => self.db.update_bulletin(user_id, bulletin).await,
            Err(PortError::NotFound(_)) => match self.db.insert_bulletin(user_id, bulletin).await {
                Err(PortError::Conflict(_)) => self.db.update_bulletin(user_id, bulletin).await,
                other => other,
            },
            Err(e) => Err(e),
        }
    }

    /// Reads the bulletin of the user known to the provider as `handle`.
    /// `Ok(None)` means the user exists but has not saved anything yet.
    pub async fn load_public(&self, handle: &str) -> Result<Option<StoredBulletin>, ServiceError> {
        let user_id = match self.identity.lookup_user(handle).await {
            Ok(id) => id,
            Err(PortError::NotFound(_)) => return Err(ServiceError::NoBulletin),
            Err(e) => return Err(ServiceError::Provider(e)),
        };

        match self.db.get_user(user_id).await {
            Ok(_) => {}
            Err(PortError::NotFound(_)) => return Err(ServiceError::NoBulletin),
            Err(e) => return Err(ServiceError::Storage(e)),
        }

        match self.db.get_bulletin(user_id).await {
            Ok(stored) => Ok(Some(stored)),
            Err(PortError::NotFound(_)) => Ok(None),
            Err(e) => Err(ServiceError::Storage(e)),
        }
    }
}

pub(crate) async fn load_user(db: &dyn DatabaseService, user_id: UserId) -> Result<User, ServiceError> {
    db.get_user(user_id).await.map_err(|e| match e {
        PortError::NotFound(_) => ServiceError::UnknownUser,
        other => ServiceError::Storage(other),
    })
}
