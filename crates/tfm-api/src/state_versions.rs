//! State versions: current version lookup, listing, upload and raw download.

use serde::{Deserialize, Serialize};

use crate::jsonapi::{Document, NewResource, Resource, with_filter};
use crate::{Result, TfcClient};

pub type StateVersion = Resource<StateVersionAttributes>;

#[derive(Debug, Clone, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct StateVersionAttributes {
    pub serial: u64,
    #[serde(default)]
    pub hosted_state_download_url: Option<String>,
}

/// Attributes for `POST /workspaces/{id}/state-versions`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StateVersionCreate {
    pub serial: u64,
    /// Hex MD5 of the raw state file.
    pub md5: String,
    pub lineage: String,
    /// Base64 of the raw state file.
    pub state: String,
}

impl TfcClient {
    /// The current state version of a workspace.
    ///
    /// # Errors
    ///
    /// Returns [`crate::ApiError::NotFound`] when the workspace has no state.
    pub async fn current_state_version(&self, workspace_id: &str) -> Result<StateVersion> {
        let doc: Document<StateVersion> = self
            .get_json(&format!("/workspaces/{workspace_id}/current-state-version"))
            .await?;
        Ok(doc.data)
    }

    /// All state versions of the named workspace in this organization.
    ///
    /// # Errors
    ///
    /// Returns [`crate::ApiError`] if any page request fails.
    pub async fn list_state_versions(&self, workspace_name: &str) -> Result<Vec<StateVersion>> {
        let path = with_filter("/state-versions", &["workspace", "name"], workspace_name);
        let path = with_filter(&path, &["organization", "name"], self.organization());
        self.list_all(&path).await
    }

    /// Upload a state version. The workspace must be locked by this token.
    ///
    /// # Errors
    ///
    /// Returns [`crate::ApiError::Conflict`] when the workspace is not locked
    /// or the serial is stale.
    pub async fn create_state_version(&self, workspace_id: &str, attributes: &StateVersionCreate) -> Result<StateVersion> {
        let body = Document::new(NewResource::new("state-versions", attributes));
        let doc: Document<StateVersion> = self
            .post_json(&format!("/workspaces/{workspace_id}/state-versions"), &body)
            .await?;
        Ok(doc.data)
    }

    /// Download a raw state file from a hosted download URL.
    ///
    /// # Errors
    ///
    /// Returns [`crate::ApiError`] if the download fails.
    pub async fn download_state(&self, url: &str) -> Result<Vec<u8>> {
        self.download(url).await
    }
}
