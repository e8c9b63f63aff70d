//! services/api/src/web/state.rs
//!
//! Defines the application's shared state.

use crate::config::Config;
use repo_bulletin_core::ports::{DatabaseService, IdentityProvider};
use repo_bulletin_core::{AccountService, BulletinService, Handshake, SessionCodec};
use std::sync::Arc;

//=========================================================================================
// AppState (Shared Across All Requests)
//=========================================================================================

/// The shared application state, created once at startup and passed to all handlers.
/// Everything in it is immutable after construction.
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<Config>,
    pub sessions: Arc<SessionCodec>,
    pub handshake: Handshake,
    pub bulletins: BulletinService,
    pub accounts: AccountService,
}

impl AppState {
    /// Wires the core services onto the given adapters.
    pub fn new(
        config: Arc<Config>,
        db: Arc<dyn DatabaseService>,
        identity: Arc<dyn IdentityProvider>,
    ) -> Self {
        let sessions = Arc::new(SessionCodec::new(config.jwt_secret.as_bytes()));
        Self {
            handshake: Handshake::new(identity.clone(), db.clone(), sessions.clone()),
            bulletins: BulletinService::new(identity.clone(), db.clone()),
            accounts: AccountService::new(identity, db),
            sessions,
            config,
        }
    }
}
