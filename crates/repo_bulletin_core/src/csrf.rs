//! crates/repo_bulletin_core/src/csrf.rs
//!
//! Single-use `state` values binding an OAuth redirect to the browser that
//! started it. The value lives only in a short-lived cookie; nothing is stored
//! server-side.

use std::fmt;

use rand::{rngs::OsRng, TryRngCore};

/// Length of the state value issued by the handshake.
pub const STATE_LENGTH: usize = 24;

// 64 symbols, so `byte % 64` maps every byte without bias.
const ALPHABET: &[u8; 64] = b"abcdefghijklmnopqrstuvwxyzABCDEFGHIJKLMNOPQRSTUVWXYZ1234567890-_";

#[derive(Debug, thiserror::Error)]
pub enum CsrfError {
    #[error("Failed to obtain randomness: {0}")]
    Entropy(String),
}

/// A freshly generated state value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CsrfState(String);

impl CsrfState {
    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn into_string(self) -> String {
        self.0
    }
}

impl fmt::Display for CsrfState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Draws `length` bytes from the operating system's CSPRNG and maps each one
/// onto the URL-safe alphabet.
pub fn generate(length: usize) -> Result<CsrfState, CsrfError> {
    let mut bytes = vec![0u8; length];
    OsRng
        .try_fill_bytes(&mut bytes)
        .map_err(|e| CsrfError::Entropy(e.to_string()))?;

    let value = bytes
        .iter()
        .map(|b| char::from(ALPHABET[usize::from(*b) % ALPHABET.len()]))
        .collect();

    Ok(CsrfState(value))
}

/// Returns true iff both values are byte-identical.
///
/// The comparison does not short-circuit on the first differing byte.
pub fn verify(expected: &str, observed: &str) -> bool {
    if expected.len() != observed.len() {
        return false;
    }
    expected
        .bytes()
        .zip(observed.bytes())
        .fold(0u8, |acc, (a, b)| acc | (a ^ b))
        == 0
}
