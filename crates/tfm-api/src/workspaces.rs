//! Workspaces: list, show by name, create, update, and the lock actions.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::jsonapi::{Document, NewResource, Resource, null_as_default};
use crate::{Result, TfcClient};

pub type Workspace = Resource<WorkspaceAttributes>;

/// Where runs for a workspace execute.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ExecutionMode {
    Remote,
    Local,
    Agent,
}

impl ExecutionMode {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Remote => "remote",
            Self::Local => "local",
            Self::Agent => "agent",
        }
    }
}

impl fmt::Display for ExecutionMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ExecutionMode {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "remote" => Ok(Self::Remote),
            "local" => Ok(Self::Local),
            "agent" => Ok(Self::Agent),
            other => Err(format!("unknown execution mode '{other}'")),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct WorkspaceAttributes {
    pub name: String,
    #[serde(default)]
    pub terraform_version: Option<String>,
    #[serde(default)]
    pub working_directory: Option<String>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub file_triggers_enabled: bool,
    #[serde(default, deserialize_with = "null_as_default")]
    pub allow_destroy_plan: bool,
    #[serde(default, deserialize_with = "null_as_default")]
    pub auto_apply: bool,
    #[serde(default)]
    pub execution_mode: Option<ExecutionMode>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub source_name: Option<String>,
    #[serde(default)]
    pub source_url: Option<String>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub queue_all_runs: bool,
    #[serde(default, deserialize_with = "null_as_default")]
    pub speculative_enabled: bool,
    #[serde(default, deserialize_with = "null_as_default")]
    pub trigger_prefixes: Vec<String>,
    #[serde(default)]
    pub vcs_repo: Option<VcsRepo>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub locked: bool,
}

/// VCS binding of a workspace or registry module, as returned by the API.
#[derive(Debug, Clone, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct VcsRepo {
    pub identifier: String,
    #[serde(default)]
    pub oauth_token_id: Option<String>,
    #[serde(default)]
    pub branch: Option<String>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub ingress_submodules: bool,
    #[serde(default)]
    pub display_identifier: Option<String>,
}

/// VCS binding sent when creating a workspace.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub struct VcsRepoCreate {
    pub identifier: String,
    pub oauth_token_id: String,
    pub branch: String,
    pub default_branch: bool,
    pub ingress_submodules: bool,
}

/// Attributes for `POST /organizations/{org}/workspaces`.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "kebab-case")]
pub struct WorkspaceCreate {
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub terraform_version: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub working_directory: Option<String>,
    pub file_triggers_enabled: bool,
    pub allow_destroy_plan: bool,
    pub auto_apply: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub execution_mode: Option<ExecutionMode>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub source_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub source_url: Option<String>,
    pub queue_all_runs: bool,
    pub speculative_enabled: bool,
    pub trigger_prefixes: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub vcs_repo: Option<VcsRepoCreate>,
}

/// Attributes for `PATCH /organizations/{org}/workspaces/{name}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub struct WorkspaceUpdate {
    pub execution_mode: ExecutionMode,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub agent_pool_id: Option<String>,
}

#[derive(Serialize)]
struct LockRequest<'a> {
    reason: &'a str,
}

impl TfcClient {
    /// List every workspace in the organization.
    ///
    /// # Errors
    ///
    /// Returns [`crate::ApiError`] if any page request fails.
    pub async fn list_workspaces(&self) -> Result<Vec<Workspace>> {
        self.list_all(&format!("{}/workspaces", self.org_path())).await
    }

    /// Show a workspace by name.
    ///
    /// # Errors
    ///
    /// Returns [`crate::ApiError::NotFound`] if no workspace has that name.
    pub async fn show_workspace(&self, name: &str) -> Result<Workspace> {
        let path = format!("{}/workspaces/{}", self.org_path(), urlencoding::encode(name));
        let doc: Document<Workspace> = self.get_json(&path).await?;
        Ok(doc.data)
    }

    /// Create a workspace.
    ///
    /// # Errors
    ///
    /// Returns [`crate::ApiError::BadRequest`] when the payload is rejected.
    pub async fn create_workspace(&self, attributes: &WorkspaceCreate) -> Result<Workspace> {
        let path = format!("{}/workspaces", self.org_path());
        let body = Document::new(NewResource::new("workspaces", attributes));
        let doc: Document<Workspace> = self.post_json(&path, &body).await?;
        Ok(doc.data)
    }

    /// Update a workspace by name.
    ///
    /// # Errors
    ///
    /// Returns [`crate::ApiError`] if the request fails.
    pub async fn update_workspace(&self, name: &str, attributes: &WorkspaceUpdate) -> Result<Workspace> {
        let path = format!("{}/workspaces/{}", self.org_path(), urlencoding::encode(name));
        let body = Document::new(NewResource::new("workspaces", attributes));
        let doc: Document<Workspace> = self.patch_json(&path, &body).await?;
        Ok(doc.data)
    }

    /// Lock a workspace.
    ///
    /// # Errors
    ///
    /// Returns [`crate::ApiError::Conflict`] if it is already locked.
    pub async fn lock_workspace(&self, workspace_id: &str, reason: &str) -> Result<()> {
        let path = format!("/workspaces/{workspace_id}/actions/lock");
        self.post_empty(&path, Some(&LockRequest { reason })).await
    }

    /// Unlock a workspace locked by this token.
    ///
    /// # Errors
    ///
    /// Returns [`crate::ApiError`] if the request fails.
    pub async fn unlock_workspace(&self, workspace_id: &str) -> Result<()> {
        let path = format!("/workspaces/{workspace_id}/actions/unlock");
        self.post_empty(&path, None::<&()>).await
    }

    /// Unlock a workspace regardless of who holds the lock.
    ///
    /// # Errors
    ///
    /// Returns [`crate::ApiError`] if the request fails.
    pub async fn force_unlock_workspace(&self, workspace_id: &str) -> Result<()> {
        let path = format!("/workspaces/{workspace_id}/actions/force-unlock");
        self.post_empty(&path, None::<&()>).await
    }
}
