//! Per-organization connection settings (one for the source, one for the target).

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::ConfigError;

/// Hostname of the hosted Terraform Cloud service.
pub const TERRAFORM_CLOUD_HOST: &str = "app.terraform.io";

fn default_url() -> String {
    format!("https://{TERRAFORM_CLOUD_HOST}")
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct OrganizationConfig {
    /// Base URL of the Terraform Cloud/Enterprise instance (no `/api/v2`).
    #[serde(default = "default_url")]
    pub url: String,

    /// Owners-team or user API token.
    #[serde(default)]
    pub token: String,

    /// Organization name.
    #[serde(default)]
    pub organization: String,

    /// Verify TLS certificates. Off by default; self-hosted Enterprise
    /// installs frequently run on private CAs.
    #[serde(default)]
    pub verify_tls: bool,

    /// VCS provider name (e.g. `github`, `devops`) → OAuth token ID (`ot-…`)
    /// of that provider's connection inside this organization.
    #[serde(default)]
    pub vcs_tokens: BTreeMap<String, String>,
}

impl Default for OrganizationConfig {
    fn default() -> Self {
        Self {
            url: default_url(),
            token: String::new(),
            organization: String::new(),
            verify_tls: false,
            vcs_tokens: BTreeMap::new(),
        }
    }
}

impl OrganizationConfig {
    /// Check if the minimum fields for API access are present.
    pub fn is_configured(&self) -> bool {
        !self.url.is_empty() && !self.token.is_empty() && !self.organization.is_empty()
    }

    /// Fail with [`ConfigError::NotConfigured`] naming every missing field.
    pub fn require(&self, section: &str) -> Result<(), ConfigError> {
        let missing: Vec<&str> = [
            ("url", self.url.is_empty()),
            ("token", self.token.is_empty()),
            ("organization", self.organization.is_empty()),
        ]
        .into_iter()
        .filter_map(|(field, empty)| empty.then_some(field))
        .collect();

        if missing.is_empty() {
            return Ok(());
        }
        Err(ConfigError::NotConfigured {
            section: section.to_string(),
            missing: missing.join(", "),
        })
    }

    /// Base URL without a trailing slash.
    pub fn base_url(&self) -> &str {
        self.url.trim_end_matches('/')
    }

    /// Hostname portion of the base URL.
    ///
    /// `https://tfe.example.com:8443/` → `tfe.example.com`.
    pub fn hostname(&self) -> &str {
        let rest = self
            .url
            .split_once("://")
            .map_or(self.url.as_str(), |(_, rest)| rest);
        let authority = rest.split('/').next().unwrap_or(rest);
        authority.split(':').next().unwrap_or(authority)
    }

    /// Whether this organization lives on the hosted Terraform Cloud service.
    pub fn is_terraform_cloud(&self) -> bool {
        self.hostname().eq_ignore_ascii_case(TERRAFORM_CLOUD_HOST)
    }

    /// Reverse lookup: which provider owns this OAuth token ID.
    pub fn vcs_provider_for_token(&self, token_id: &str) -> Option<&str> {
        self.vcs_tokens
            .iter()
            .find(|(_, id)| !id.is_empty() && id.as_str() == token_id)
            .map(|(provider, _)| provider.as_str())
    }

    /// Forward lookup: the OAuth token ID configured for a provider.
    pub fn vcs_token_for_provider(&self, provider: &str) -> Option<&str> {
        self.vcs_tokens
            .get(provider)
            .map(String::as_str)
            .filter(|id| !id.is_empty())
    }
}
