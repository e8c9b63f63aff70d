//! crates/repo_bulletin_core/src/domain.rs
//!
//! Defines the core data structures for the application.
//! The bulletin types carry serde derives because their JSON shape is the
//! contract with the browser client and with the stored document.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Identifier of a user. Equal to the identity provider's numeric user id.
pub type UserId = i64;

/// Numeric id the identity provider assigns to a repository.
pub type RepoId = i64;

// Represents a user - used throughout app
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct User {
    pub id: UserId,
    /// Provider access token; overwritten on every successful login.
    pub access_token: String,
}

/// The subset of the provider's profile this system relies on.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProviderProfile {
    pub id: UserId,
    pub handle: String,
}

/// A user's saved bulletin: an ordered list of named sections.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Bulletin {
    #[serde(default)]
    pub sections: Vec<Section>,
}

/// One named group of repositories, in display order.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Section {
    #[serde(default)]
    pub id: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub repos: Vec<RepoRef>,
}

/// A reference to an external repository inside a section.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct RepoRef {
    /// Client-generated id of this entry, unique across the bulletin.
    #[serde(default)]
    pub id: String,
    /// Provider-issued repository id. Zero means "missing".
    #[serde(rename = "repoID", default)]
    pub repo_id: RepoId,
}

impl Bulletin {
    /// Iterates every referenced repository id, across all sections, in order.
    pub fn repo_ids(&self) -> impl Iterator<Item = RepoId> + '_ {
        self.sections
            .iter()
            .flat_map(|section| section.repos.iter().map(|repo| repo.repo_id))
    }
}

/// A bulletin as read back from storage.
#[derive(Debug, Clone, PartialEq)]
pub struct StoredBulletin {
    pub user_id: UserId,
    pub bulletin: Bulletin,
    pub updated_at: DateTime<Utc>,
}
