//! Execution-mode updates on the target.

use tfm_api::{ExecutionMode, TfcApi, WorkspaceUpdate};

use crate::error::non_fatal;
use crate::{MigrateError, Result, StepReport};

/// Set `mode` on every target workspace whose lower-cased name contains
/// `identifier`. Agent mode also binds the first agent pool whose name
/// contains the identifier.
///
/// # Errors
///
/// Returns [`MigrateError::NoAgentPool`] when agent mode finds no pool, and
/// fails when a listing cannot be fetched or on a fatal API error.
pub async fn update_execution_mode(target: &dyn TfcApi, mode: ExecutionMode, identifier: &str) -> Result<StepReport> {
    let mut report = StepReport::new("execution mode");
    let identifier = identifier.to_lowercase();
    tracing::info!(%identifier, %mode, "updating workspace execution mode");

    let agent_pool_id = if mode == ExecutionMode::Agent {
        if !target.is_terraform_cloud() {
            tracing::warn!(url = target.base_url(), "execution mode 'agent' is only available on Terraform Cloud; nothing changed");
            report.log();
            return Ok(report);
        }
        let pools = target
            .list_agent_pools()
            .await
            .map_err(|e| MigrateError::api("list agent pools", e))?;
        let pool = pools
            .into_iter()
            .find(|pool| pool.attributes.name.to_lowercase().contains(&identifier))
            .ok_or_else(|| MigrateError::NoAgentPool {
                identifier: identifier.clone(),
            })?;
        tracing::info!(pool = %pool.attributes.name, id = %pool.id, "using agent pool");
        Some(pool.id)
    } else {
        None
    };

    let workspaces = target
        .list_workspaces()
        .await
        .map_err(|e| MigrateError::api("list target workspaces", e))?;
    let update = WorkspaceUpdate {
        execution_mode: mode,
        agent_pool_id,
    };

    let total = workspaces.len();
    for (index, workspace) in workspaces.iter().enumerate() {
        let name = &workspace.attributes.name;
        let position = format!("{}/{total}", index + 1);
        if !name.to_lowercase().contains(&identifier) {
            tracing::info!(%position, workspace = %name, %identifier, "workspace does not match identifier, skipped");
            report.skipped += 1;
            continue;
        }

        tracing::info!(%position, workspace = %name, %mode, "updating execution mode");
        match target.update_workspace(name, &update).await {
            Ok(_) => report.updated += 1,
            Err(e) => {
                let e = non_fatal(format!("update workspace '{name}'"), e)?;
                tracing::error!(workspace = %name, error = %e, "failed to update execution mode");
                report.failed += 1;
            }
        }
    }

    report.log();
    Ok(report)
}
