//! Variable set → workspace associations.

use crate::jsonapi::{Document, ResourceRef};
use crate::{Result, TfcClient};

impl TfcClient {
    /// Attach a variable set to the given workspaces.
    ///
    /// # Errors
    ///
    /// Returns [`crate::ApiError`] if the request fails.
    pub async fn apply_variable_set(&self, varset_id: &str, workspace_ids: &[String]) -> Result<()> {
        let body = Document::new(
            workspace_ids
                .iter()
                .map(|id| ResourceRef::new("workspaces", id.clone()))
                .collect::<Vec<_>>(),
        );
        self.post_empty(&format!("/varsets/{varset_id}/relationships/workspaces"), Some(&body))
            .await
    }
}
