//! # tfm-api
//!
//! Typed HTTP client for one Terraform Cloud/Enterprise organization.
//!
//! Every resource the migration touches has its own module holding the
//! response schema, the request payloads and the `TfcClient` methods:
//! - workspaces (including lock / unlock / force-unlock)
//! - teams, organization memberships, team access
//! - workspace variables and variable sets
//! - state versions
//! - private registry modules
//! - agent pools
//!
//! Migration code talks to the [`TfcApi`] trait rather than to the client
//! directly so steps can be exercised against an in-memory organization.

pub mod account;
pub mod agent_pools;
pub mod jsonapi;
pub mod memberships;
pub mod registry_modules;
pub mod state_versions;
pub mod team_access;
pub mod teams;
pub mod variable_sets;
pub mod variables;
pub mod workspaces;

mod api;
mod error;
mod http;

pub use account::Account;
pub use agent_pools::AgentPool;
pub use api::TfcApi;
pub use error::ApiError;
pub use memberships::{Membership, MembershipInvite, MembershipStatus};
pub use registry_modules::{ModuleVcsPublish, RegistryModule};
pub use state_versions::{StateVersion, StateVersionCreate};
pub use team_access::{AccessLevel, TeamAccess, TeamAccessCreate};
pub use teams::{OrganizationAccess, Team, TeamCreate};
pub use variables::{Variable, VariableCategory, VariableCreate};
pub use workspaces::{ExecutionMode, VcsRepo, VcsRepoCreate, Workspace, WorkspaceCreate, WorkspaceUpdate};

use std::time::Duration;

use reqwest::Method;
use reqwest::header::{ACCEPT, CONTENT_TYPE};
use serde::Serialize;
use serde::de::DeserializeOwned;
use tfm_config::{HttpConfig, OrganizationConfig};

use crate::http::check_response;
use crate::jsonapi::{ListDocument, MEDIA_TYPE, with_page};

/// Result alias used throughout the client.
pub type Result<T> = std::result::Result<T, ApiError>;

// ── Client ─────────────────────────────────────────────────────────

/// HTTP client bound to one organization on one Terraform instance.
pub struct TfcClient {
    http: reqwest::Client,
    base_url: String,
    hostname: String,
    organization: String,
    token: String,
    terraform_cloud: bool,
    max_rate_limit_retries: u32,
}

impl TfcClient {
    /// Create a client for the organization described by `org`.
    ///
    /// TLS certificate verification follows `org.verify_tls`.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError::Http`] if the underlying `reqwest::Client` fails
    /// to build.
    pub fn new(org: &OrganizationConfig, http: &HttpConfig) -> Result<Self> {
        let client = reqwest::Client::builder()
            .user_agent(concat!("tfmigrate/", env!("CARGO_PKG_VERSION")))
            .timeout(http.timeout())
            .danger_accept_invalid_certs(!org.verify_tls)
            .build()?;

        Ok(Self {
            http: client,
            base_url: org.base_url().to_string(),
            hostname: org.hostname().to_string(),
            organization: org.organization.clone(),
            token: org.token.clone(),
            terraform_cloud: org.is_terraform_cloud(),
            max_rate_limit_retries: http.max_rate_limit_retries,
        })
    }

    /// Organization name this client is bound to.
    #[must_use]
    pub fn organization(&self) -> &str {
        &self.organization
    }

    /// Instance base URL (no trailing slash).
    #[must_use]
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Instance hostname.
    #[must_use]
    pub fn hostname(&self) -> &str {
        &self.hostname
    }

    /// Whether this is the hosted Terraform Cloud service.
    #[must_use]
    pub const fn is_terraform_cloud(&self) -> bool {
        self.terraform_cloud
    }

    /// `/organizations/{org}` prefix with the name URL-encoded.
    fn org_path(&self) -> String {
        format!("/organizations/{}", urlencoding::encode(&self.organization))
    }

    fn url(&self, path: &str) -> String {
        format!("{}/api/v2{path}", self.base_url)
    }

    /// Send one API request, retrying 429 responses after their
    /// `Retry-After` delay.
    async fn send(&self, method: Method, path: &str, body: Option<Vec<u8>>) -> Result<reqwest::Response> {
        let url = self.url(path);
        let mut rate_limited = 0;
        loop {
            tracing::debug!(%method, %url, "api request");
            let mut request = self
                .http
                .request(method.clone(), &url)
                .bearer_auth(&self.token)
                .header(ACCEPT, MEDIA_TYPE);
            if let Some(body) = &body {
                request = request.header(CONTENT_TYPE, MEDIA_TYPE).body(body.clone());
            }

            match check_response(request.send().await?).await {
                Err(ApiError::RateLimited { retry_after_secs })
                    if rate_limited < self.max_rate_limit_retries =>
                {
                    rate_limited += 1;
                    tracing::warn!(%url, retry_after_secs, attempt = rate_limited, "rate limited; backing off");
                    tokio::time::sleep(Duration::from_secs(retry_after_secs)).await;
                }
                other => return other,
            }
        }
    }

    fn encode<B: Serialize>(body: &B) -> Result<Vec<u8>> {
        serde_json::to_vec(body).map_err(|e| ApiError::Parse(format!("encode request body: {e}")))
    }

    async fn decode<T: DeserializeOwned>(path: &str, resp: reqwest::Response) -> Result<T> {
        let bytes = resp.bytes().await?;
        serde_json::from_slice(&bytes).map_err(|e| ApiError::Parse(format!("{path}: {e}")))
    }

    pub(crate) async fn get_json<T: DeserializeOwned>(&self, path: &str) -> Result<T> {
        let resp = self.send(Method::GET, path, None).await?;
        Self::decode(path, resp).await
    }

    pub(crate) async fn post_json<B: Serialize, T: DeserializeOwned>(&self, path: &str, body: &B) -> Result<T> {
        let resp = self.send(Method::POST, path, Some(Self::encode(body)?)).await?;
        Self::decode(path, resp).await
    }

    pub(crate) async fn patch_json<B: Serialize, T: DeserializeOwned>(&self, path: &str, body: &B) -> Result<T> {
        let resp = self.send(Method::PATCH, path, Some(Self::encode(body)?)).await?;
        Self::decode(path, resp).await
    }

    /// POST whose response body is ignored (204s and action endpoints).
    pub(crate) async fn post_empty<B: Serialize>(&self, path: &str, body: Option<&B>) -> Result<()> {
        let body = body.map(Self::encode).transpose()?;
        self.send(Method::POST, path, body).await?;
        Ok(())
    }

    pub(crate) async fn delete(&self, path: &str) -> Result<()> {
        self.send(Method::DELETE, path, None).await?;
        Ok(())
    }

    /// Fetch every page of a list endpoint.
    pub(crate) async fn list_all<T: DeserializeOwned>(&self, path: &str) -> Result<Vec<T>> {
        let mut items = Vec::new();
        let mut page = 1;
        loop {
            let doc: ListDocument<T> = self.get_json(&with_page(path, page)).await?;
            let next_page = doc.next_page();
            items.extend(doc.data);
            match next_page {
                Some(next) if next > page => page = next,
                _ => break,
            }
        }
        Ok(items)
    }

    /// Download an absolute URL without API credentials (signed state URLs).
    pub(crate) async fn download(&self, url: &str) -> Result<Vec<u8>> {
        tracing::debug!(%url, "download");
        let resp = check_response(self.http.get(url).send().await?).await?;
        Ok(resp.bytes().await?.to_vec())
    }
}
