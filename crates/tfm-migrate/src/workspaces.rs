//! Workspace creation on the target.

use tfm_api::workspaces::WorkspaceAttributes;
use tfm_api::{TfcApi, VcsRepoCreate, WorkspaceCreate};
use tfm_config::{MigrateConfig, RetryConfig};

use crate::error::non_fatal;
use crate::vcs::workspace_provider;
use crate::{MigrateError, Result, StepReport};

/// Creation payload copying the migrated attributes of a source workspace.
#[must_use]
pub fn creation_payload(source: &WorkspaceAttributes, vcs_repo: Option<VcsRepoCreate>) -> WorkspaceCreate {
    WorkspaceCreate {
        name: source.name.clone(),
        terraform_version: source.terraform_version.clone(),
        working_directory: source.working_directory.clone(),
        file_triggers_enabled: source.file_triggers_enabled,
        allow_destroy_plan: source.allow_destroy_plan,
        auto_apply: source.auto_apply,
        execution_mode: source.execution_mode,
        description: source.description.clone(),
        source_name: source.source_name.clone(),
        source_url: source.source_url.clone(),
        queue_all_runs: source.queue_all_runs,
        speculative_enabled: source.speculative_enabled,
        trigger_prefixes: source.trigger_prefixes.clone(),
        vcs_repo,
    }
}

/// Create every source workspace that is missing on the target.
///
/// VCS-backed workspaces are rebound to the target's token for the same
/// provider, or skipped when the target has none.
///
/// # Errors
///
/// Fails on an unknown source VCS token, when the source workspace list
/// cannot be fetched, or on a fatal API error.
pub async fn migrate_workspaces(source: &dyn TfcApi, target: &dyn TfcApi, config: &MigrateConfig) -> Result<StepReport> {
    let mut report = StepReport::new("workspaces");
    let workspaces = source
        .list_workspaces()
        .await
        .map_err(|e| MigrateError::api("list source workspaces", e))?;

    let total = workspaces.len();
    for (index, workspace) in workspaces.iter().enumerate() {
        let attributes = &workspace.attributes;
        let name = &attributes.name;
        let position = format!("{}/{total}", index + 1);

        match target.show_workspace(name).await {
            Ok(_) => {
                tracing::info!(%position, workspace = %name, "workspace already exists on target");
                report.skipped += 1;
                continue;
            }
            Err(e) if e.is_not_found() => {}
            Err(e) => {
                let e = non_fatal(format!("show target workspace '{name}'"), e)?;
                tracing::error!(workspace = %name, error = %e, "failed to look up target workspace");
                report.failed += 1;
                continue;
            }
        }

        let mut vcs_repo = None;
        if let Some(repo) = &attributes.vcs_repo {
            match workspace_provider(config, name, repo)? {
                None => tracing::debug!(workspace = %name, "VCS binding has no OAuth token"),
                Some(provider) => {
                    let Some(token) = config.target.vcs_token_for_provider(provider) else {
                        tracing::warn!(workspace = %name, provider, "no target VCS token for provider, skipped");
                        report.skipped += 1;
                        continue;
                    };
                    let branch = repo.branch.clone().unwrap_or_default();
                    vcs_repo = Some(VcsRepoCreate {
                        identifier: repo.identifier.clone(),
                        oauth_token_id: token.to_string(),
                        default_branch: branch.is_empty(),
                        branch,
                        ingress_submodules: repo.ingress_submodules,
                    });
                }
            }
        }

        tracing::info!(%position, workspace = %name, "creating workspace on target");
        let payload = creation_payload(attributes, vcs_repo);
        if create_with_retry(target, &payload, &config.workspace_retry).await? {
            tracing::info!(workspace = %name, "workspace created");
            report.created += 1;
        } else {
            report.failed += 1;
        }
    }

    report.log();
    Ok(report)
}

/// Create a workspace, retrying bad-request answers with a fixed delay.
/// Returns whether the workspace was created.
async fn create_with_retry(target: &dyn TfcApi, payload: &WorkspaceCreate, retry: &RetryConfig) -> Result<bool> {
    let name = &payload.name;
    let mut retries = 0;
    loop {
        match target.create_workspace(payload).await {
            Ok(_) => return Ok(true),
            Err(e) if e.is_bad_request() && retries < retry.attempts => {
                retries += 1;
                tracing::warn!(workspace = %name, error = %e, delay_secs = retry.delay_secs, "failed to create workspace; retrying");
                tracing::debug!(workspace = %name, payload = ?payload, "rejected payload");
                tokio::time::sleep(retry.delay()).await;
                tracing::warn!(workspace = %name, attempt = retries, max = retry.attempts, "retrying workspace create");
            }
            Err(e) => {
                let e = non_fatal(format!("create workspace '{name}'"), e)?;
                tracing::error!(workspace = %name, error = %e, "workspace create abandoned");
                return Ok(false);
            }
        }
    }
}
