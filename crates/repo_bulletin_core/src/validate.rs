//! crates/repo_bulletin_core/src/validate.rs
//!
//! Structural validation of a submitted bulletin. Pure: no I/O, and the first
//! violation found in document order is the one reported.

use std::collections::HashSet;

use crate::domain::{Bulletin, RepoId};

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ValidationError {
    #[error("Bad payload.")]
    Malformed,
    #[error("Bad payload: No Sections")]
    NoSections,
    #[error("Bad payload: Empty Section Name")]
    EmptySectionName,
    #[error("Bad payload: Duplicate Section IDs")]
    DuplicateSectionId,
    #[error("Bad payload: Section without Repos")]
    SectionWithoutRepos,
    #[error("Bad payload: All Repos must have a repoID")]
    MissingRepoId,
    #[error("Bad payload: Duplicate Repo UUIDs")]
    DuplicateRepoRefId,
    #[error("Bad payload: A section can not have duplicate Repo IDs")]
    DuplicateRepoIdInSection,
}

/// Decodes `raw` JSON into a bulletin and checks its invariants.
pub fn validate(raw: &str) -> Result<Bulletin, ValidationError> {
    let bulletin: Bulletin = serde_json::from_str(raw).map_err(|_| ValidationError::Malformed)?;
    check(&bulletin)?;
    Ok(bulletin)
}

/// Checks the invariants of an already decoded bulletin.
pub fn check(bulletin: &Bulletin) -> Result<(), ValidationError> {
    if bulletin.sections.is_empty() {
        return Err(ValidationError::NoSections);
    }

    let mut section_ids: HashSet<&str> = HashSet::new();
    let mut entry_ids: HashSet<&str> = HashSet::new();

    for section in &bulletin.sections {
        if section.name.trim().is_empty() {
            return Err(ValidationError::EmptySectionName);
        }
        if !section_ids.insert(section.id.as_str()) {
            return Err(ValidationError::DuplicateSectionId);
        }
        if section.repos.is_empty() {
            return Err(ValidationError::SectionWithoutRepos);
        }

        // The same repository may appear in several sections, but only once per section.
        let mut repo_ids: HashSet<RepoId> = HashSet::new();
        for repo in &section.repos {
            if repo.repo_id == 0 {
                return Err(ValidationError::MissingRepoId);
            }
            if !entry_ids.insert(repo.id.as_str()) {
                return Err(ValidationError::DuplicateRepoRefId);
            }
            if !repo_ids.insert(repo.repo_id) {
                return Err(ValidationError::DuplicateRepoIdInSection);
            }
        }
    }

    Ok(())
}
