//! In-memory organization for step tests.

use std::collections::{HashMap, HashSet};
use std::sync::{Mutex, MutexGuard};

use async_trait::async_trait;
use tfm_api::account::AccountAttributes;
use tfm_api::agent_pools::AgentPoolAttributes;
use tfm_api::jsonapi::{Relationship, Resource, ResourceRef};
use tfm_api::memberships::{MembershipAttributes, MembershipRelationships};
use tfm_api::registry_modules::RegistryModuleAttributes;
use tfm_api::state_versions::StateVersionAttributes;
use tfm_api::team_access::{CustomPermissions, TeamAccessAttributes, TeamAccessRelationships};
use tfm_api::teams::TeamAttributes;
use tfm_api::variables::VariableAttributes;
use tfm_api::workspaces::WorkspaceAttributes;
use tfm_api::{
    AccessLevel, Account, AgentPool, ApiError, Membership, MembershipInvite, MembershipStatus,
    ModuleVcsPublish, OrganizationAccess, RegistryModule, StateVersion, StateVersionCreate,
    TeamAccess, TeamAccessCreate, Team, TeamCreate, TfcApi, Variable, VariableCategory,
    VariableCreate, VcsRepo, Workspace, WorkspaceCreate, WorkspaceUpdate,
};

type ApiResult<T> = Result<T, ApiError>;

fn not_found(what: &str) -> ApiError {
    ApiError::NotFound {
        message: format!("{what} not found"),
    }
}

/// Error class an injected failure answers with.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Failure {
    /// 503, handled per item.
    Server,
    /// 401, aborts the run.
    Unauthorized,
}

impl Failure {
    fn error(self) -> ApiError {
        match self {
            Self::Server => ApiError::Server {
                status: 503,
                message: "service unavailable".into(),
            },
            Self::Unauthorized => ApiError::Unauthorized {
                status: 401,
                message: "token revoked".into(),
            },
        }
    }
}

#[derive(Default)]
pub struct FakeState {
    next_id: u32,
    pub workspaces: Vec<Workspace>,
    pub teams: Vec<Team>,
    pub memberships: Vec<Membership>,
    /// Emails that have a user account and can therefore be invited.
    pub accounts: HashMap<String, String>,
    pub team_access: Vec<TeamAccess>,
    /// Workspace ID → variables.
    pub variables: HashMap<String, Vec<Variable>>,
    /// Workspace name → state versions.
    pub state_versions: HashMap<String, Vec<StateVersion>>,
    /// Download URL → raw state file.
    pub state_files: HashMap<String, Vec<u8>>,
    pub modules: Vec<RegistryModule>,
    pub agent_pools: Vec<AgentPool>,
    pub locked: HashSet<String>,
    /// How many upcoming workspace creates answer 422.
    pub failing_workspace_creates: u32,
    /// How many upcoming state uploads answer 503.
    pub failing_state_uploads: u32,
    /// Variable key → failure returned when creating it.
    pub failing_var_creates: HashMap<String, Failure>,

    // Recorded writes.
    pub created_workspaces: Vec<WorkspaceCreate>,
    pub created_teams: Vec<TeamCreate>,
    pub invites: Vec<String>,
    pub access_grants: Vec<TeamAccessCreate>,
    pub created_variables: Vec<(String, VariableCreate)>,
    pub deleted_variables: Vec<(String, String)>,
    pub varset_links: Vec<(String, Vec<String>)>,
    pub updates: Vec<(String, WorkspaceUpdate)>,
    pub uploads: Vec<(String, StateVersionCreate)>,
    pub publishes: Vec<ModuleVcsPublish>,
    /// Lock / unlock / upload sequence, one entry per call.
    pub lock_log: Vec<String>,
}

impl FakeState {
    fn id(&mut self, prefix: &str) -> String {
        self.next_id += 1;
        format!("{prefix}-{}", self.next_id)
    }

    fn workspace_name(&self, workspace_id: &str) -> ApiResult<String> {
        self.workspaces
            .iter()
            .find(|ws| ws.id == workspace_id)
            .map(|ws| ws.attributes.name.clone())
            .ok_or_else(|| not_found("workspace"))
    }
}

fn resource<A, R: Default>(id: String, kind: &str, attributes: A) -> Resource<A, R> {
    Resource {
        id,
        kind: kind.to_string(),
        attributes,
        relationships: R::default(),
    }
}

pub struct FakeOrg {
    organization: String,
    base_url: String,
    terraform_cloud: bool,
    state: Mutex<FakeState>,
}

impl FakeOrg {
    pub fn new(organization: &str) -> Self {
        Self {
            organization: organization.to_string(),
            base_url: "https://tfe.example.com".into(),
            terraform_cloud: false,
            state: Mutex::new(FakeState::default()),
        }
    }

    pub fn terraform_cloud(organization: &str) -> Self {
        Self {
            base_url: "https://app.terraform.io".into(),
            terraform_cloud: true,
            ..Self::new(organization)
        }
    }

    pub fn state(&self) -> MutexGuard<'_, FakeState> {
        self.state.lock().unwrap()
    }

    pub fn add_workspace(&self, attributes: WorkspaceAttributes) -> String {
        let mut state = self.state();
        let id = state.id("ws");
        state.workspaces.push(resource(id.clone(), "workspaces", attributes));
        id
    }

    pub fn add_named_workspace(&self, name: &str) -> String {
        self.add_workspace(WorkspaceAttributes {
            name: name.into(),
            ..WorkspaceAttributes::default()
        })
    }

    pub fn add_team(&self, name: &str, access: OrganizationAccess) -> String {
        let mut state = self.state();
        let id = state.id("team");
        state.teams.push(resource(
            id.clone(),
            "teams",
            TeamAttributes {
                name: name.into(),
                organization_access: access,
            },
        ));
        id
    }

    pub fn add_member(&self, email: &str, status: MembershipStatus, team_ids: &[&str]) -> String {
        let mut state = self.state();
        let user_id = state.id("user");
        let membership_id = state.id("ou");
        state.accounts.insert(email.into(), user_id.clone());
        state.memberships.push(Resource {
            id: membership_id,
            kind: "organization-memberships".into(),
            attributes: MembershipAttributes {
                email: email.into(),
                status,
            },
            relationships: MembershipRelationships {
                user: Relationship::new(Some(ResourceRef::new("users", user_id.clone()))),
                teams: Relationship::new(
                    team_ids
                        .iter()
                        .map(|id| ResourceRef::new("teams", *id))
                        .collect(),
                ),
            },
        });
        user_id
    }

    /// Register a user account that is not yet a member.
    pub fn add_account(&self, email: &str) -> String {
        let mut state = self.state();
        let user_id = state.id("user");
        state.accounts.insert(email.into(), user_id.clone());
        user_id
    }

    pub fn add_team_access(&self, workspace_id: &str, team_id: &str, access: AccessLevel, permissions: CustomPermissions) {
        let mut state = self.state();
        let id = state.id("tws");
        state.team_access.push(Resource {
            id,
            kind: "team-workspaces".into(),
            attributes: TeamAccessAttributes { access, permissions },
            relationships: TeamAccessRelationships {
                team: Relationship::new(Some(ResourceRef::new("teams", team_id))),
                workspace: Relationship::new(Some(ResourceRef::new("workspaces", workspace_id))),
            },
        });
    }

    pub fn add_variable(&self, workspace_id: &str, attributes: VariableAttributes) -> String {
        let mut state = self.state();
        let id = state.id("var");
        state
            .variables
            .entry(workspace_id.to_string())
            .or_default()
            .push(resource(id.clone(), "vars", attributes));
        id
    }

    /// Add a state version whose raw file is served at a download URL.
    pub fn add_state(&self, workspace_name: &str, serial: u64, file: Option<Vec<u8>>) {
        let mut state = self.state();
        let id = state.id("sv");
        let url = file.map(|bytes| {
            let url = format!("https://archivist.example.com/{id}");
            state.state_files.insert(url.clone(), bytes);
            url
        });
        state
            .state_versions
            .entry(workspace_name.to_string())
            .or_default()
            .push(resource(
                id,
                "state-versions",
                StateVersionAttributes {
                    serial,
                    hosted_state_download_url: url,
                },
            ));
    }

    pub fn add_module(&self, name: &str, provider: &str, vcs_repo: Option<VcsRepo>) {
        let mut state = self.state();
        let id = state.id("mod");
        let namespace = self.organization.clone();
        state.modules.push(resource(
            id,
            "registry-modules",
            RegistryModuleAttributes {
                name: name.into(),
                provider: provider.into(),
                namespace,
                registry_name: Some("private".into()),
                vcs_repo,
            },
        ));
    }

    pub fn add_agent_pool(&self, name: &str) -> String {
        let mut state = self.state();
        let id = state.id("apool");
        state
            .agent_pools
            .push(resource(id.clone(), "agent-pools", AgentPoolAttributes { name: name.into() }));
        id
    }

    pub fn workspace_id(&self, name: &str) -> Option<String> {
        self.state()
            .workspaces
            .iter()
            .find(|ws| ws.attributes.name == name)
            .map(|ws| ws.id.clone())
    }

    pub fn team_id(&self, name: &str) -> Option<String> {
        self.state()
            .teams
            .iter()
            .find(|team| team.attributes.name == name)
            .map(|team| team.id.clone())
    }
}

/// Split `owner/terraform-<provider>-<name>` the way the registry names modules.
fn module_name_from_repo(identifier: &str) -> (String, String) {
    let repo = identifier.rsplit('/').next().unwrap_or(identifier);
    let repo = repo.strip_prefix("terraform-").unwrap_or(repo);
    match repo.split_once('-') {
        Some((provider, name)) => (name.to_string(), provider.to_string()),
        None => (repo.to_string(), String::new()),
    }
}

#[async_trait]
impl TfcApi for FakeOrg {
    fn organization(&self) -> &str {
        &self.organization
    }

    fn base_url(&self) -> &str {
        &self.base_url
    }

    fn is_terraform_cloud(&self) -> bool {
        self.terraform_cloud
    }

    async fn account_details(&self) -> ApiResult<Account> {
        Ok(resource(
            "user-migrator".into(),
            "users",
            AccountAttributes {
                username: "migrator".into(),
                email: None,
            },
        ))
    }

    async fn list_workspaces(&self) -> ApiResult<Vec<Workspace>> {
        Ok(self.state().workspaces.clone())
    }

    async fn show_workspace(&self, name: &str) -> ApiResult<Workspace> {
        self.state()
            .workspaces
            .iter()
            .find(|ws| ws.attributes.name == name)
            .cloned()
            .ok_or_else(|| not_found("workspace"))
    }

    async fn create_workspace(&self, attributes: &WorkspaceCreate) -> ApiResult<Workspace> {
        let mut state = self.state();
        if state.failing_workspace_creates > 0 {
            state.failing_workspace_creates -= 1;
            return Err(ApiError::BadRequest {
                status: 422,
                message: "invalid attribute: VCS repository unavailable".into(),
            });
        }
        if state.workspaces.iter().any(|ws| ws.attributes.name == attributes.name) {
            return Err(ApiError::BadRequest {
                status: 422,
                message: "invalid attribute: Name has already been taken".into(),
            });
        }
        state.created_workspaces.push(attributes.clone());
        let id = state.id("ws");
        let workspace: Workspace = resource(
            id,
            "workspaces",
            WorkspaceAttributes {
                name: attributes.name.clone(),
                terraform_version: attributes.terraform_version.clone(),
                working_directory: attributes.working_directory.clone(),
                execution_mode: attributes.execution_mode,
                auto_apply: attributes.auto_apply,
                vcs_repo: attributes.vcs_repo.as_ref().map(|repo| VcsRepo {
                    identifier: repo.identifier.clone(),
                    oauth_token_id: Some(repo.oauth_token_id.clone()),
                    branch: Some(repo.branch.clone()),
                    ingress_submodules: repo.ingress_submodules,
                    display_identifier: Some(repo.identifier.clone()),
                }),
                ..WorkspaceAttributes::default()
            },
        );
        state.workspaces.push(workspace.clone());
        Ok(workspace)
    }

    async fn update_workspace(&self, name: &str, attributes: &WorkspaceUpdate) -> ApiResult<Workspace> {
        let mut state = self.state();
        state.updates.push((name.to_string(), attributes.clone()));
        let workspace = state
            .workspaces
            .iter_mut()
            .find(|ws| ws.attributes.name == name)
            .ok_or_else(|| not_found("workspace"))?;
        workspace.attributes.execution_mode = Some(attributes.execution_mode);
        Ok(workspace.clone())
    }

    async fn lock_workspace(&self, workspace_id: &str, reason: &str) -> ApiResult<()> {
        let mut state = self.state();
        state.lock_log.push(format!("lock {workspace_id} ({reason})"));
        if !state.locked.insert(workspace_id.to_string()) {
            return Err(ApiError::Conflict {
                message: "workspace already locked".into(),
            });
        }
        Ok(())
    }

    async fn unlock_workspace(&self, workspace_id: &str) -> ApiResult<()> {
        let mut state = self.state();
        state.lock_log.push(format!("unlock {workspace_id}"));
        state.locked.remove(workspace_id);
        Ok(())
    }

    async fn force_unlock_workspace(&self, workspace_id: &str) -> ApiResult<()> {
        let mut state = self.state();
        state.lock_log.push(format!("force-unlock {workspace_id}"));
        state.locked.remove(workspace_id);
        Ok(())
    }

    async fn list_teams(&self) -> ApiResult<Vec<Team>> {
        Ok(self.state().teams.clone())
    }

    async fn create_team(&self, attributes: &TeamCreate) -> ApiResult<Team> {
        let mut state = self.state();
        state.created_teams.push(attributes.clone());
        let id = state.id("team");
        let team: Team = resource(
            id,
            "teams",
            TeamAttributes {
                name: attributes.name.clone(),
                organization_access: attributes.organization_access,
            },
        );
        state.teams.push(team.clone());
        Ok(team)
    }

    async fn list_memberships(&self, status: Option<MembershipStatus>) -> ApiResult<Vec<Membership>> {
        Ok(self
            .state()
            .memberships
            .iter()
            .filter(|m| status.is_none_or(|status| m.attributes.status == status))
            .cloned()
            .collect())
    }

    async fn invite_member(&self, invite: &MembershipInvite) -> ApiResult<Membership> {
        let mut state = self.state();
        let email = invite.attributes.email.clone();
        let Some(user_id) = state.accounts.get(&email).cloned() else {
            return Err(not_found("user account"));
        };
        state.invites.push(email.clone());
        let id = state.id("ou");
        let teams = invite
            .relationships
            .as_ref()
            .map(|rel| rel.teams.data.clone())
            .unwrap_or_default();
        let membership = Resource {
            id,
            kind: "organization-memberships".into(),
            attributes: MembershipAttributes {
                email,
                status: MembershipStatus::Invited,
            },
            relationships: MembershipRelationships {
                user: Relationship::new(Some(ResourceRef::new("users", user_id))),
                teams: Relationship::new(teams),
            },
        };
        state.memberships.push(membership.clone());
        Ok(membership)
    }

    async fn list_team_access(&self, workspace_id: &str) -> ApiResult<Vec<TeamAccess>> {
        Ok(self
            .state()
            .team_access
            .iter()
            .filter(|access| {
                access
                    .relationships
                    .workspace
                    .data
                    .as_ref()
                    .is_some_and(|ws| ws.id == workspace_id)
            })
            .cloned()
            .collect())
    }

    async fn add_team_access(&self, grant: &TeamAccessCreate) -> ApiResult<TeamAccess> {
        let mut state = self.state();
        state.access_grants.push(grant.clone());
        let Some(relationships) = grant.relationships.as_ref() else {
            return Err(ApiError::BadRequest {
                status: 422,
                message: "missing relationships".into(),
            });
        };
        let id = state.id("tws");
        let access = Resource {
            id,
            kind: "team-workspaces".into(),
            attributes: TeamAccessAttributes {
                access: grant.attributes.access,
                permissions: grant.attributes.permissions.clone(),
            },
            relationships: TeamAccessRelationships {
                team: Relationship::new(Some(relationships.team.data.clone())),
                workspace: Relationship::new(Some(relationships.workspace.data.clone())),
            },
        };
        state.team_access.push(access.clone());
        Ok(access)
    }

    async fn list_workspace_vars(&self, workspace_id: &str) -> ApiResult<Vec<Variable>> {
        Ok(self
            .state()
            .variables
            .get(workspace_id)
            .cloned()
            .unwrap_or_default())
    }

    async fn create_workspace_var(&self, workspace_id: &str, attributes: &VariableCreate) -> ApiResult<Variable> {
        let mut state = self.state();
        if let Some(failure) = state.failing_var_creates.get(&attributes.key) {
            return Err(failure.error());
        }
        state
            .created_variables
            .push((workspace_id.to_string(), attributes.clone()));
        let id = state.id("var");
        let variable: Variable = resource(
            id,
            "vars",
            VariableAttributes {
                key: attributes.key.clone(),
                value: if attributes.sensitive {
                    None
                } else {
                    attributes.value.clone()
                },
                description: attributes.description.clone(),
                category: attributes.category,
                hcl: attributes.hcl,
                sensitive: attributes.sensitive,
            },
        );
        state
            .variables
            .entry(workspace_id.to_string())
            .or_default()
            .push(variable.clone());
        Ok(variable)
    }

    async fn delete_workspace_var(&self, workspace_id: &str, variable_id: &str) -> ApiResult<()> {
        let mut state = self.state();
        state
            .deleted_variables
            .push((workspace_id.to_string(), variable_id.to_string()));
        let vars = state
            .variables
            .get_mut(workspace_id)
            .ok_or_else(|| not_found("variable"))?;
        vars.retain(|var| var.id != variable_id);
        Ok(())
    }

    async fn apply_variable_set(&self, varset_id: &str, workspace_ids: &[String]) -> ApiResult<()> {
        self.state()
            .varset_links
            .push((varset_id.to_string(), workspace_ids.to_vec()));
        Ok(())
    }

    async fn current_state_version(&self, workspace_id: &str) -> ApiResult<StateVersion> {
        let state = self.state();
        let name = state.workspace_name(workspace_id)?;
        state
            .state_versions
            .get(&name)
            .and_then(|versions| versions.iter().max_by_key(|sv| sv.attributes.serial))
            .cloned()
            .ok_or_else(|| not_found("state version"))
    }

    async fn list_state_versions(&self, workspace_name: &str) -> ApiResult<Vec<StateVersion>> {
        Ok(self
            .state()
            .state_versions
            .get(workspace_name)
            .cloned()
            .unwrap_or_default())
    }

    async fn create_state_version(&self, workspace_id: &str, attributes: &StateVersionCreate) -> ApiResult<StateVersion> {
        let mut state = self.state();
        state.lock_log.push(format!("upload {workspace_id} serial {}", attributes.serial));
        if !state.locked.contains(workspace_id) {
            return Err(ApiError::Conflict {
                message: "workspace must be locked".into(),
            });
        }
        if state.failing_state_uploads > 0 {
            state.failing_state_uploads -= 1;
            return Err(Failure::Server.error());
        }
        let name = state.workspace_name(workspace_id)?;
        state
            .uploads
            .push((workspace_id.to_string(), attributes.clone()));
        let id = state.id("sv");
        let version: StateVersion = resource(
            id,
            "state-versions",
            StateVersionAttributes {
                serial: attributes.serial,
                hosted_state_download_url: None,
            },
        );
        state
            .state_versions
            .entry(name)
            .or_default()
            .push(version.clone());
        Ok(version)
    }

    async fn download_state(&self, url: &str) -> ApiResult<Vec<u8>> {
        self.state()
            .state_files
            .get(url)
            .cloned()
            .ok_or_else(|| not_found("state file"))
    }

    async fn list_registry_modules(&self) -> ApiResult<Vec<RegistryModule>> {
        Ok(self.state().modules.clone())
    }

    async fn show_registry_module(&self, name: &str, provider: &str) -> ApiResult<RegistryModule> {
        self.state()
            .modules
            .iter()
            .find(|module| module.attributes.name == name && module.attributes.provider == provider)
            .cloned()
            .ok_or_else(|| not_found("registry module"))
    }

    async fn publish_module_from_vcs(&self, publish: &ModuleVcsPublish) -> ApiResult<RegistryModule> {
        let mut state = self.state();
        state.publishes.push(publish.clone());
        let (name, provider) = module_name_from_repo(&publish.vcs_repo.identifier);
        let id = state.id("mod");
        let module: RegistryModule = resource(
            id,
            "registry-modules",
            RegistryModuleAttributes {
                name,
                provider,
                namespace: self.organization.clone(),
                registry_name: Some("private".into()),
                vcs_repo: Some(VcsRepo {
                    identifier: publish.vcs_repo.identifier.clone(),
                    oauth_token_id: Some(publish.vcs_repo.oauth_token_id.clone()),
                    display_identifier: Some(publish.vcs_repo.display_identifier.clone()),
                    ..VcsRepo::default()
                }),
            },
        );
        state.modules.push(module.clone());
        Ok(module)
    }

    async fn list_agent_pools(&self) -> ApiResult<Vec<AgentPool>> {
        Ok(self.state().agent_pools.clone())
    }
}

/// Variable attributes with the given key and value.
pub fn variable(key: &str, value: &str, category: VariableCategory) -> VariableAttributes {
    VariableAttributes {
        key: key.into(),
        value: Some(value.into()),
        category,
        ..VariableAttributes::default()
    }
}
