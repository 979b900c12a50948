//! Source-ID → target-ID maps built while a run progresses.

use std::collections::HashMap;

/// Where a source user ended up on the target.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UserMapping {
    Resolved(String),
    /// No target account exists for the email (the invite failed).
    Unresolved,
}

/// Team and user ID maps. Lives for one process run only.
#[derive(Debug, Default)]
pub struct IdentityMap {
    teams: HashMap<String, String>,
    users: HashMap<String, UserMapping>,
}

impl IdentityMap {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn map_team(&mut self, source_id: impl Into<String>, target_id: impl Into<String>) {
        self.teams.insert(source_id.into(), target_id.into());
    }

    #[must_use]
    pub fn team(&self, source_id: &str) -> Option<&str> {
        self.teams.get(source_id).map(String::as_str)
    }

    pub fn map_user(&mut self, source_id: impl Into<String>, mapping: UserMapping) {
        self.users.insert(source_id.into(), mapping);
    }

    #[must_use]
    pub fn user(&self, source_id: &str) -> Option<&UserMapping> {
        self.users.get(source_id)
    }

    #[must_use]
    pub fn team_count(&self) -> usize {
        self.teams.len()
    }

    #[must_use]
    pub fn unresolved_users(&self) -> usize {
        self.users
            .values()
            .filter(|mapping| **mapping == UserMapping::Unresolved)
            .count()
    }
}
