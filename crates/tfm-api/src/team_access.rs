//! Team access grants on workspaces (`team-workspaces`).

use serde::{Deserialize, Serialize};

use crate::jsonapi::{Document, NewResource, Relationship, Resource, ResourceRef, with_filter};
use crate::{Result, TfcClient};

pub type TeamAccess = Resource<TeamAccessAttributes, TeamAccessRelationships>;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AccessLevel {
    #[default]
    Read,
    Plan,
    Write,
    Admin,
    Custom,
}

/// The granular permissions that only matter for [`AccessLevel::Custom`].
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct CustomPermissions {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub runs: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub variables: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub state_versions: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sentinel_mocks: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub workspace_locking: Option<bool>,
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Deserialize)]
pub struct TeamAccessAttributes {
    pub access: AccessLevel,
    #[serde(flatten)]
    pub permissions: CustomPermissions,
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Deserialize)]
pub struct TeamAccessRelationships {
    #[serde(default)]
    pub team: Relationship<Option<ResourceRef>>,
    #[serde(default)]
    pub workspace: Relationship<Option<ResourceRef>>,
}

impl TeamAccess {
    #[must_use]
    pub fn team_id(&self) -> Option<&str> {
        self.relationships.team.data.as_ref().map(|team| team.id.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TeamAccessCreateAttributes {
    pub access: AccessLevel,
    #[serde(flatten)]
    pub permissions: CustomPermissions,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TeamAccessCreateRelationships {
    pub workspace: Relationship<ResourceRef>,
    pub team: Relationship<ResourceRef>,
}

/// Body for `POST /team-workspaces`.
pub type TeamAccessCreate = NewResource<TeamAccessCreateAttributes, TeamAccessCreateRelationships>;

impl TeamAccessCreate {
    /// Grant `team_id` access to `workspace_id`. Granular permissions are
    /// only sent for [`AccessLevel::Custom`].
    #[must_use]
    pub fn grant(
        workspace_id: &str,
        team_id: &str,
        access: AccessLevel,
        permissions: &CustomPermissions,
    ) -> Self {
        let permissions = if access == AccessLevel::Custom {
            permissions.clone()
        } else {
            CustomPermissions::default()
        };
        Self::with_relationships(
            "team-workspaces",
            TeamAccessCreateAttributes {
                access,
                permissions,
            },
            TeamAccessCreateRelationships {
                workspace: Relationship::new(ResourceRef::new("workspaces", workspace_id)),
                team: Relationship::new(ResourceRef::new("teams", team_id)),
            },
        )
    }
}

impl TfcClient {
    /// List the team access entries of one workspace.
    ///
    /// # Errors
    ///
    /// Returns [`crate::ApiError`] if any page request fails.
    pub async fn list_team_access(&self, workspace_id: &str) -> Result<Vec<TeamAccess>> {
        self.list_all(&with_filter("/team-workspaces", &["workspace", "id"], workspace_id))
            .await
    }

    /// Add a team access entry.
    ///
    /// # Errors
    ///
    /// Returns [`crate::ApiError`] if the request fails.
    pub async fn add_team_access(&self, grant: &TeamAccessCreate) -> Result<TeamAccess> {
        let doc: Document<TeamAccess> = self
            .post_json("/team-workspaces", &Document::new(grant))
            .await?;
        Ok(doc.data)
    }
}
