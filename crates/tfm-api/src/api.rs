//! The organization-level API surface the migration steps depend on.
//!
//! [`TfcClient`] is the production implementation; tests provide an
//! in-memory organization instead.

use async_trait::async_trait;

use crate::memberships::{Membership, MembershipInvite, MembershipStatus};
use crate::registry_modules::{ModuleVcsPublish, RegistryModule};
use crate::state_versions::{StateVersion, StateVersionCreate};
use crate::team_access::{TeamAccess, TeamAccessCreate};
use crate::teams::{Team, TeamCreate};
use crate::variables::{Variable, VariableCreate};
use crate::workspaces::{Workspace, WorkspaceCreate, WorkspaceUpdate};
use crate::{Account, AgentPool, Result, TfcClient};

/// One organization on one Terraform Cloud/Enterprise instance.
#[async_trait]
pub trait TfcApi: Send + Sync {
    /// Organization name.
    fn organization(&self) -> &str;

    /// Instance base URL (no trailing slash).
    fn base_url(&self) -> &str;

    /// Whether the instance is the hosted Terraform Cloud service.
    fn is_terraform_cloud(&self) -> bool;

    async fn account_details(&self) -> Result<Account>;

    async fn list_workspaces(&self) -> Result<Vec<Workspace>>;
    async fn show_workspace(&self, name: &str) -> Result<Workspace>;
    async fn create_workspace(&self, attributes: &WorkspaceCreate) -> Result<Workspace>;
    async fn update_workspace(&self, name: &str, attributes: &WorkspaceUpdate) -> Result<Workspace>;
    async fn lock_workspace(&self, workspace_id: &str, reason: &str) -> Result<()>;
    async fn unlock_workspace(&self, workspace_id: &str) -> Result<()>;
    async fn force_unlock_workspace(&self, workspace_id: &str) -> Result<()>;

    async fn list_teams(&self) -> Result<Vec<Team>>;
    async fn create_team(&self, attributes: &TeamCreate) -> Result<Team>;

    async fn list_memberships(&self, status: Option<MembershipStatus>) -> Result<Vec<Membership>>;
    async fn invite_member(&self, invite: &MembershipInvite) -> Result<Membership>;

    async fn list_team_access(&self, workspace_id: &str) -> Result<Vec<TeamAccess>>;
    async fn add_team_access(&self, grant: &TeamAccessCreate) -> Result<TeamAccess>;

    async fn list_workspace_vars(&self, workspace_id: &str) -> Result<Vec<Variable>>;
    async fn create_workspace_var(&self, workspace_id: &str, attributes: &VariableCreate) -> Result<Variable>;
    async fn delete_workspace_var(&self, workspace_id: &str, variable_id: &str) -> Result<()>;

    async fn apply_variable_set(&self, varset_id: &str, workspace_ids: &[String]) -> Result<()>;

    async fn current_state_version(&self, workspace_id: &str) -> Result<StateVersion>;
    async fn list_state_versions(&self, workspace_name: &str) -> Result<Vec<StateVersion>>;
    async fn create_state_version(&self, workspace_id: &str, attributes: &StateVersionCreate) -> Result<StateVersion>;
    async fn download_state(&self, url: &str) -> Result<Vec<u8>>;

    async fn list_registry_modules(&self) -> Result<Vec<RegistryModule>>;
    async fn show_registry_module(&self, name: &str, provider: &str) -> Result<RegistryModule>;
    async fn publish_module_from_vcs(&self, publish: &ModuleVcsPublish) -> Result<RegistryModule>;

    async fn list_agent_pools(&self) -> Result<Vec<AgentPool>>;
}

#[async_trait]
impl TfcApi for TfcClient {
    fn organization(&self) -> &str {
        Self::organization(self)
    }

    fn base_url(&self) -> &str {
        Self::base_url(self)
    }

    fn is_terraform_cloud(&self) -> bool {
        Self::is_terraform_cloud(self)
    }

    async fn account_details(&self) -> Result<Account> {
        Self::account_details(self).await
    }

    async fn list_workspaces(&self) -> Result<Vec<Workspace>> {
        Self::list_workspaces(self).await
    }

    async fn show_workspace(&self, name: &str) -> Result<Workspace> {
        Self::show_workspace(self, name).await
    }

    async fn create_workspace(&self, attributes: &WorkspaceCreate) -> Result<Workspace> {
        Self::create_workspace(self, attributes).await
    }

    async fn update_workspace(&self, name: &str, attributes: &WorkspaceUpdate) -> Result<Workspace> {
        Self::update_workspace(self, name, attributes).await
    }

    async fn lock_workspace(&self, workspace_id: &str, reason: &str) -> Result<()> {
        Self::lock_workspace(self, workspace_id, reason).await
    }

    async fn unlock_workspace(&self, workspace_id: &str) -> Result<()> {
        Self::unlock_workspace(self, workspace_id).await
    }

    async fn force_unlock_workspace(&self, workspace_id: &str) -> Result<()> {
        Self::force_unlock_workspace(self, workspace_id).await
    }

    async fn list_teams(&self) -> Result<Vec<Team>> {
        Self::list_teams(self).await
    }

    async fn create_team(&self, attributes: &TeamCreate) -> Result<Team> {
        Self::create_team(self, attributes).await
    }

    async fn list_memberships(&self, status: Option<MembershipStatus>) -> Result<Vec<Membership>> {
        Self::list_memberships(self, status).await
    }

    async fn invite_member(&self, invite: &MembershipInvite) -> Result<Membership> {
        Self::invite_member(self, invite).await
    }

    async fn list_team_access(&self, workspace_id: &str) -> Result<Vec<TeamAccess>> {
        Self::list_team_access(self, workspace_id).await
    }

    async fn add_team_access(&self, grant: &TeamAccessCreate) -> Result<TeamAccess> {
        Self::add_team_access(self, grant).await
    }

    async fn list_workspace_vars(&self, workspace_id: &str) -> Result<Vec<Variable>> {
        Self::list_workspace_vars(self, workspace_id).await
    }

    async fn create_workspace_var(&self, workspace_id: &str, attributes: &VariableCreate) -> Result<Variable> {
        Self::create_workspace_var(self, workspace_id, attributes).await
    }

    async fn delete_workspace_var(&self, workspace_id: &str, variable_id: &str) -> Result<()> {
        Self::delete_workspace_var(self, workspace_id, variable_id).await
    }

    async fn apply_variable_set(&self, varset_id: &str, workspace_ids: &[String]) -> Result<()> {
        Self::apply_variable_set(self, varset_id, workspace_ids).await
    }

    async fn current_state_version(&self, workspace_id: &str) -> Result<StateVersion> {
        Self::current_state_version(self, workspace_id).await
    }

    async fn list_state_versions(&self, workspace_name: &str) -> Result<Vec<StateVersion>> {
        Self::list_state_versions(self, workspace_name).await
    }

    async fn create_state_version(&self, workspace_id: &str, attributes: &StateVersionCreate) -> Result<StateVersion> {
        Self::create_state_version(self, workspace_id, attributes).await
    }

    async fn download_state(&self, url: &str) -> Result<Vec<u8>> {
        Self::download_state(self, url).await
    }

    async fn list_registry_modules(&self) -> Result<Vec<RegistryModule>> {
        Self::list_registry_modules(self).await
    }

    async fn show_registry_module(&self, name: &str, provider: &str) -> Result<RegistryModule> {
        Self::show_registry_module(self, name, provider).await
    }

    async fn publish_module_from_vcs(&self, publish: &ModuleVcsPublish) -> Result<RegistryModule> {
        Self::publish_module_from_vcs(self, publish).await
    }

    async fn list_agent_pools(&self) -> Result<Vec<AgentPool>> {
        Self::list_agent_pools(self).await
    }
}
