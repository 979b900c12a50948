//! Runs the requested steps in their fixed order.

use std::io;

use anyhow::Context;
use tfm_api::TfcApi;
use tfm_config::MigrateConfig;
use tfm_migrate::{IdentityMap, StepReport};

use crate::cli::Cli;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Step {
    Teams,
    RegistryModules,
    Workspaces,
    DeleteVariables,
    ExportVariables,
    ImportVariables,
    ExecutionMode,
    VariableSets,
    CurrentState,
}

impl Step {
    pub const ORDER: [Self; 9] = [
        Self::Teams,
        Self::RegistryModules,
        Self::Workspaces,
        Self::DeleteVariables,
        Self::ExportVariables,
        Self::ImportVariables,
        Self::ExecutionMode,
        Self::VariableSets,
        Self::CurrentState,
    ];

    pub const fn flag(self) -> &'static str {
        match self {
            Self::Teams => "--migrate-teams",
            Self::RegistryModules => "--migrate-registry-modules",
            Self::Workspaces => "--migrate-workspaces",
            Self::DeleteVariables => "--delete-workspace-vars",
            Self::ExportVariables => "--create-workspace-vars-csv",
            Self::ImportVariables => "--create-workspace-vars",
            Self::ExecutionMode => "--update-workspace-execution",
            Self::VariableSets => "--update-workspace-varsets",
            Self::CurrentState => "--migrate-current-state",
        }
    }

    pub const fn requested(self, cli: &Cli) -> bool {
        match self {
            Self::Teams => cli.migrate_teams,
            Self::RegistryModules => cli.migrate_registry_modules,
            Self::Workspaces => cli.migrate_workspaces,
            Self::DeleteVariables => cli.delete_workspace_vars,
            Self::ExportVariables => cli.create_workspace_vars_csv,
            Self::ImportVariables => cli.create_workspace_vars,
            Self::ExecutionMode => cli.update_workspace_execution,
            Self::VariableSets => cli.update_workspace_varsets,
            Self::CurrentState => cli.migrate_current_state,
        }
    }
}

/// Steps the flags ask for, in execution order.
pub fn plan(cli: &Cli) -> Vec<Step> {
    Step::ORDER
        .into_iter()
        .filter(|step| step.requested(cli))
        .collect()
}

pub async fn run(cli: &Cli, config: &MigrateConfig, source: &dyn TfcApi, target: &dyn TfcApi) -> anyhow::Result<()> {
    let mut identity = IdentityMap::new();
    let mut reports = Vec::new();

    for step in Step::ORDER.into_iter().filter(|step| !step.requested(cli)) {
        tracing::info!(flag = step.flag(), "argument not provided, skipped");
    }

    for step in plan(cli) {
        let report = match step {
            Step::Teams => {
                reports.push(tfm_migrate::migrate_teams(source, target, &mut identity).await?);
                reports.push(tfm_migrate::migrate_memberships(source, target, &mut identity).await?);
                tfm_migrate::migrate_team_access(source, target, &identity).await?
            }
            Step::RegistryModules => tfm_migrate::migrate_registry_modules(source, target, config).await?,
            Step::Workspaces => tfm_migrate::migrate_workspaces(source, target, config).await?,
            Step::DeleteVariables => {
                let confirmed = tfm_migrate::confirm_deletion(target, io::stdin().lock(), io::stdout())
                    .context("failed to read confirmation")?;
                if !confirmed {
                    tracing::info!("deletion not confirmed; workspace variables kept");
                    continue;
                }
                tfm_migrate::delete_variables(target).await?
            }
            Step::ExportVariables => {
                tfm_migrate::export_variables(source, &config.variables, &cli.output_file_path)
                    .await
                    .with_context(|| format!("failed to export variables to {}", cli.output_file_path.display()))?
            }
            Step::ImportVariables => {
                tfm_migrate::import_variables(target, &cli.var_file_path)
                    .await
                    .with_context(|| format!("failed to import variables from {}", cli.var_file_path.display()))?
            }
            Step::ExecutionMode => {
                tfm_migrate::update_execution_mode(target, cli.execution_mode.into(), &cli.workspace_identifier).await?
            }
            Step::VariableSets => tfm_migrate::apply_variable_sets(target, &config.variable_sets).await?,
            Step::CurrentState => tfm_migrate::migrate_current_state(source, target).await?,
        };
        reports.push(report);
    }

    summarize(&reports);
    Ok(())
}

fn summarize(reports: &[StepReport]) {
    if reports.is_empty() {
        tracing::info!("no migration steps requested");
        return;
    }
    for report in reports {
        tracing::info!("{report}");
    }
    let failed: usize = reports.iter().map(|report| report.failed).sum();
    if failed > 0 {
        tracing::warn!(failed, "some items failed; re-run to retry them");
    }
}
