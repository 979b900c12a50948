//! Teams and their organization-level access flags.

use serde::{Deserialize, Serialize};

use crate::jsonapi::{Document, NewResource, Resource, null_as_default};
use crate::{Result, TfcClient};

pub type Team = Resource<TeamAttributes>;

/// Name of the built-in team every organization has exactly one of.
pub const OWNERS_TEAM: &str = "owners";

#[derive(Debug, Clone, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct TeamAttributes {
    pub name: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub organization_access: OrganizationAccess,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct OrganizationAccess {
    #[serde(default)]
    pub manage_workspaces: bool,
    #[serde(default)]
    pub manage_policies: bool,
    #[serde(default)]
    pub manage_vcs_settings: bool,
}

/// Attributes for `POST /organizations/{org}/teams`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub struct TeamCreate {
    pub name: String,
    pub organization_access: OrganizationAccess,
}

impl TfcClient {
    /// List every team in the organization.
    ///
    /// # Errors
    ///
    /// Returns [`crate::ApiError`] if any page request fails.
    pub async fn list_teams(&self) -> Result<Vec<Team>> {
        self.list_all(&format!("{}/teams", self.org_path())).await
    }

    /// Create a team.
    ///
    /// # Errors
    ///
    /// Returns [`crate::ApiError`] if the request fails.
    pub async fn create_team(&self, attributes: &TeamCreate) -> Result<Team> {
        let path = format!("{}/teams", self.org_path());
        let body = Document::new(NewResource::new("teams", attributes));
        let doc: Document<Team> = self.post_json(&path, &body).await?;
        Ok(doc.data)
    }
}
