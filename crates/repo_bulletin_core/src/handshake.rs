//! crates/repo_bulletin_core/src/handshake.rs
//!
//! The OAuth login flow: redirect with a CSRF state, then verify the state on
//! callback, exchange the code, upsert the user and mint a session credential.
//! All state between the two steps lives in the browser's cookies.

use std::sync::Arc;

use tracing::{debug, info, warn};

use crate::csrf::{self, CsrfError, CsrfState, STATE_LENGTH};
use crate::domain::{ProviderProfile, User, UserId};
use crate::ports::{DatabaseService, IdentityProvider, PortError, PortResult};
use crate::session::{SessionCodec, SessionError};

/// Name of the cookie carrying the CSRF state during a handshake.
pub const STATE_COOKIE: &str = "state";

/// Lifetime of the state cookie, in seconds.
pub const STATE_MAX_AGE_SECS: i64 = 600;

#[derive(Debug, thiserror::Error)]
pub enum HandshakeError {
    #[error("Invalid state.")]
    InvalidState,
    #[error("Could not get token: {0}")]
    TokenExchangeFailed(PortError),
    #[error("Failed to fetch user profile: {0}")]
    ProfileFetchFailed(PortError),
    #[error("Failed to generate state: {0}")]
    State(#[from] CsrfError),
    #[error("Failed to store user: {0}")]
    Persistence(PortError),
    #[error("Failed to issue session: {0}")]
    Session(#[from] SessionError),
}

/// The outcome of the redirect step.
#[derive(Debug)]
pub struct AuthorizationRedirect {
    pub url: String,
    pub state: CsrfState,
}

/// The outcome of a successful callback.
#[derive(Debug)]
pub struct Login {
    pub profile: ProviderProfile,
    pub session_token: String,
}

#[derive(Clone)]
pub struct Handshake {
    identity: Arc<dyn IdentityProvider>,
    db: Arc<dyn DatabaseService>,
    sessions: Arc<SessionCodec>,
}

impl Handshake {
    pub fn new(
        identity: Arc<dyn IdentityProvider>,
        db: Arc<dyn DatabaseService>,
        sessions: Arc<SessionCodec>,
    ) -> Self {
        Self {
            identity,
            db,
            sessions,
        }
    }

    /// Starts a handshake: a fresh state and the provider URL embedding it.
    pub fn begin(&self) -> Result<AuthorizationRedirect, HandshakeError> {
        let state = csrf::generate(STATE_LENGTH)?;
        let url = self.identity.authorize_url(state.as_str());
        Ok(AuthorizationRedirect { url, state })
    }

    /// Finishes a handshake. Each step runs only after the previous one succeeded.
    pub async fn complete(
        &self,
        code: &str,
        query_state: Option<&str>,
        cookie_state: Option<&str>,
    ) -> Result<Login, HandshakeError> {
        // 1. The state echoed by the provider must match the browser's cookie.
        let expected = cookie_state
            .filter(|state| !state.is_empty())
            .ok_or(HandshakeError::InvalidState)?;
        if !csrf::verify(expected, query_state.unwrap_or_default()) {
            warn!("OAuth callback state does not match the state cookie");
            return Err(HandshakeError::InvalidState);
        }

        // 2. Exchange the code for an access token.
        let access_token = self
            .identity
            .exchange_code(code)
            .await
            .map_err(HandshakeError::TokenExchangeFailed)?;

        // 3. Learn who the token belongs to.
        let profile = self
            .identity
            .fetch_profile(&access_token)
            .await
            .map_err(HandshakeError::ProfileFetchFailed)?;

        // 4. Create the user, or refresh their access token.
        self.upsert_user(profile.id, &access_token)
            .await
            .map_err(HandshakeError::Persistence)?;

        // 5. Mint the session credential.
        let session_token = self.sessions.issue(profile.id)?;

        info!(user_id = profile.id, handle = %profile.handle, "User logged in");
        Ok(Login {
            profile,
            session_token,
        })
    }

    async fn upsert_user(&self, id: UserId, access_token: &str) -> PortResult<()> {
        match self.db.get_user(id).await {
            Ok(_) => self.db.update_user_token(id, access_token).await,
            Err(PortError::NotFound(_)) => {
                let user = User {
                    id,
                    access_token: access_token.to_string(),
                };
                match self.db.insert_user(&user).await {
                    Err(PortError::Conflict(_)) => {
                        debug!(user_id = id, "Concurrent login created the user first, updating");
                        self.db.update_user_token(id, access_token).await
                    }
                    other => other,
                }
            }
            Err(e) => Err(e),
        }
    }
}
