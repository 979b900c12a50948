//! Private registry modules.

use serde::{Deserialize, Serialize};

use crate::jsonapi::{Document, NewResource, Resource};
use crate::workspaces::VcsRepo;
use crate::{Result, TfcClient};

pub type RegistryModule = Resource<RegistryModuleAttributes>;

#[derive(Debug, Clone, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct RegistryModuleAttributes {
    pub name: String,
    pub provider: String,
    #[serde(default)]
    pub namespace: String,
    #[serde(default)]
    pub registry_name: Option<String>,
    #[serde(default)]
    pub vcs_repo: Option<VcsRepo>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub struct ModuleVcsRepo {
    pub identifier: String,
    pub oauth_token_id: String,
    pub display_identifier: String,
}

/// Attributes for `POST /organizations/{org}/registry-modules/vcs`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub struct ModuleVcsPublish {
    pub vcs_repo: ModuleVcsRepo,
}

impl TfcClient {
    /// List the organization's registry modules.
    ///
    /// # Errors
    ///
    /// Returns [`crate::ApiError`] if any page request fails.
    pub async fn list_registry_modules(&self) -> Result<Vec<RegistryModule>> {
        self.list_all(&format!("{}/registry-modules", self.org_path()))
            .await
    }

    /// Show a private module owned by this organization.
    ///
    /// # Errors
    ///
    /// Returns [`crate::ApiError::NotFound`] if it does not exist.
    pub async fn show_registry_module(&self, name: &str, provider: &str) -> Result<RegistryModule> {
        let path = format!(
            "{org_path}/registry-modules/private/{namespace}/{name}/{provider}",
            org_path = self.org_path(),
            namespace = urlencoding::encode(self.organization()),
            name = urlencoding::encode(name),
            provider = urlencoding::encode(provider),
        );
        let doc: Document<RegistryModule> = self.get_json(&path).await?;
        Ok(doc.data)
    }

    /// Publish a module from a VCS repository; the target builds versions
    /// from the repository's tags.
    ///
    /// # Errors
    ///
    /// Returns [`crate::ApiError`] if the request fails.
    pub async fn publish_module_from_vcs(&self, publish: &ModuleVcsPublish) -> Result<RegistryModule> {
        let path = format!("{}/registry-modules/vcs", self.org_path());
        let body = Document::new(NewResource::new("registry-modules", publish));
        let doc: Document<RegistryModule> = self.post_json(&path, &body).await?;
        Ok(doc.data)
    }
}
