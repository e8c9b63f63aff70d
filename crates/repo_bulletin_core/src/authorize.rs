//! crates/repo_bulletin_core/src/authorize.rs
//!
//! Cross-checks a validated bulletin against the repositories the user owns.

use std::collections::HashSet;

use crate::domain::{Bulletin, RepoId};

/// A bulletin referenced a repository outside the user's live listing.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("Unauthorized repos in payload.")]
pub struct UnauthorizedReference {
    pub repo_id: RepoId,
}

/// Requires every repository referenced anywhere in `bulletin` to be in `owned`.
/// A single stray reference rejects the whole bulletin.
pub fn authorize(bulletin: &Bulletin, owned: &[RepoId]) -> Result<(), UnauthorizedReference> {
    let owned: HashSet<RepoId> = owned.iter().copied().collect();
    match bulletin.repo_ids().find(|id| !owned.contains(id)) {
        Some(repo_id) => Err(UnauthorizedReference { repo_id }),
        None => Ok(()),
    }
}
