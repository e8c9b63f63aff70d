//! crates/repo_bulletin_core/src/session.rs
//!
//! Stateless session credentials. A signed JWT carrying the user id is the
//! only proof of identity; there is no server-side session table. Expiry is
//! enforced by the cookie's max-age only.

use std::fmt;

use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};

use crate::domain::UserId;

/// Name of the cookie carrying the session credential.
pub const SESSION_COOKIE: &str = "jwt";

/// Lifetime of the session cookie, in seconds.
pub const SESSION_MAX_AGE_SECS: i64 = 86_400;

#[derive(Debug, thiserror::Error)]
pub enum SessionError {
    #[error("No session credential present")]
    Missing,
    /// Bad signature, disallowed algorithm, or claims of the wrong shape.
    #[error("Invalid session credential: {0}")]
    Invalid(#[from] jsonwebtoken::errors::Error),
    #[error("Session subject is not a user id: {0}")]
    BadSubject(String),
    #[error("Failed to sign session credential: {0}")]
    Signing(String),
}

impl SessionError {
    /// Every failure except signing means the caller is not authenticated.
    pub fn is_unauthenticated(&self) -> bool {
        !matches!(self, SessionError::Signing(_))
    }
}

#[derive(Debug, Serialize, Deserialize)]
struct SessionClaims {
    id: String,
}

/// Signs and verifies session credentials with a single HMAC secret.
pub struct SessionCodec {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    validation: Validation,
}

impl SessionCodec {
    pub fn new(secret: &[u8]) -> Self {
        let mut validation = Validation::new(Algorithm::HS256);
        // Any HMAC variant is accepted; everything else is refused before the
        // signature is checked.
        validation.algorithms = vec![Algorithm::HS256, Algorithm::HS384, Algorithm::HS512];
        validation.validate_exp = false;
        validation.required_spec_claims.clear();

        Self {
            encoding_key: EncodingKey::from_secret(secret),
            decoding_key: DecodingKey::from_secret(secret),
            validation,
        }
    }

    /// Mints a credential vouching for `subject`.
    pub fn issue(&self, subject: UserId) -> Result<String, SessionError> {
        let claims = SessionClaims {
            id: subject.to_string(),
        };
        encode(&Header::new(Algorithm::HS256), &claims, &self.encoding_key)
            .map_err(|e| SessionError::Signing(e.to_string()))
    }

    /// Verifies a credential and returns the user id it vouches for.
    pub fn verify(&self, token: &str) -> Result<UserId, SessionError> {
        let data = decode::<SessionClaims>(token, &self.decoding_key, &self.validation)?;
        data.claims
            .id
            .parse::<UserId>()
            .map_err(|_| SessionError::BadSubject(data.claims.id))
    }

    /// Finds the session cookie in a raw `Cookie` header and verifies it.
    pub fn resolve(&self, cookie_header: Option<&str>) -> Result<UserId, SessionError> {
        let token = cookie_header
            .and_then(|header| cookie_value(header, SESSION_COOKIE))
            .filter(|token| !token.is_empty())
            .ok_or(SessionError::Missing)?;
        self.verify(token)
    }
}

impl fmt::Debug for SessionCodec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SessionCodec").finish_non_exhaustive()
    }
}

/// Looks up `name` in a `Cookie` header of `;`-separated `key=value` pairs.
pub fn cookie_value<'a>(cookie_header: &'a str, name: &str) -> Option<&'a str> {
    cookie_header.split(';').find_map(|pair| {
        let (key, value) = pair.trim().split_once('=')?;
        (key == name).then_some(value)
    })
}
