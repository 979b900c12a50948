//! Variable-set associations on the target.

use tfm_api::TfcApi;
use tfm_config::VariableSetBinding;

use crate::error::non_fatal;
use crate::{MigrateError, Result, StepReport};

/// Bindings whose identifier occurs in the lower-cased workspace name, in
/// table order.
pub fn matching_bindings<'b>(bindings: &'b [VariableSetBinding], workspace: &str) -> impl Iterator<Item = &'b VariableSetBinding> {
    let name = workspace.to_lowercase();
    bindings
        .iter()
        .filter(move |binding| name.contains(binding.identifier.as_str()))
}

/// Attach the configured variable sets to every matching target workspace.
///
/// # Errors
///
/// Fails when the target workspace list cannot be fetched or on a fatal API
/// error.
pub async fn apply_variable_sets(target: &dyn TfcApi, bindings: &[VariableSetBinding]) -> Result<StepReport> {
    let mut report = StepReport::new("variable sets");
    if bindings.is_empty() {
        tracing::warn!("no variable sets configured; nothing to apply");
        report.log();
        return Ok(report);
    }
    let workspaces = target
        .list_workspaces()
        .await
        .map_err(|e| MigrateError::api("list target workspaces", e))?;

    let total = workspaces.len();
    for (index, workspace) in workspaces.iter().enumerate() {
        let name = &workspace.attributes.name;
        tracing::info!(position = %format!("{}/{total}", index + 1), workspace = %name, "applying variable sets");
        let mut matched = false;
        for binding in matching_bindings(bindings, name) {
            matched = true;
            match target
                .apply_variable_set(&binding.id, std::slice::from_ref(&workspace.id))
                .await
            {
                Ok(()) => {
                    tracing::info!(workspace = %name, varset = %binding.id, identifier = %binding.identifier, "applied variable set");
                    report.updated += 1;
                }
                Err(e) => {
                    let e = non_fatal(format!("apply variable set '{}' to '{name}'", binding.id), e)?;
                    tracing::error!(workspace = %name, varset = %binding.id, error = %e, "failed to apply variable set");
                    report.failed += 1;
                }
            }
        }
        if !matched {
            report.skipped += 1;
        }
    }

    report.log();
    Ok(report)
}
