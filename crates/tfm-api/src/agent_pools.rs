//! Agent pools (Terraform Cloud only).

use serde::Deserialize;

use crate::jsonapi::Resource;
use crate::{Result, TfcClient};

pub type AgentPool = Resource<AgentPoolAttributes>;

#[derive(Debug, Clone, PartialEq, Eq, Default, Deserialize)]
pub struct AgentPoolAttributes {
    pub name: String,
}

impl TfcClient {
    /// List every agent pool in the organization.
    ///
    /// # Errors
    ///
    /// Returns [`crate::ApiError`] if any page request fails.
    pub async fn list_agent_pools(&self) -> Result<Vec<AgentPool>> {
        self.list_all(&format!("{}/agent-pools", self.org_path())).await
    }
}
