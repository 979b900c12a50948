//! Workspace variables: CSV export from the source, import into the target,
//! and bulk deletion on the target.

use std::collections::{HashMap, HashSet};
use std::io::{self, BufRead, Write};
use std::path::Path;

use tfm_api::{TfcApi, VariableCreate};
use tfm_config::VariablesConfig;

use crate::error::non_fatal;
use crate::variable_file::VariableRow;
use crate::{MigrateError, Result, StepReport};

/// Keys treated as secrets on import regardless of the row's flag.
const SECRET_MARKER: &str = "pass";

/// Export every source workspace variable to a CSV file at `path`.
///
/// # Errors
///
/// Fails when the file cannot be written, the source workspace list cannot
/// be fetched, or on a fatal API error.
pub async fn export_variables(source: &dyn TfcApi, variables: &VariablesConfig, path: &Path) -> Result<StepReport> {
    let file = std::fs::File::create(path)?;
    let report = export_to(source, variables, file).await?;
    tracing::info!(path = %path.display(), rows = report.created, "variables file written");
    Ok(report)
}

/// Export every source workspace variable as CSV into `writer`.
/// `created` counts the rows written.
///
/// # Errors
///
/// See [`export_variables`].
pub async fn export_to<W: Write>(source: &dyn TfcApi, variables: &VariablesConfig, writer: W) -> Result<StepReport> {
    let mut report = StepReport::new("export variables");
    let mut csv = csv::Writer::from_writer(writer);
    let workspaces = source
        .list_workspaces()
        .await
        .map_err(|e| MigrateError::api("list source workspaces", e))?;

    for workspace in &workspaces {
        let name = &workspace.attributes.name;
        tracing::info!(workspace = %name, "reading workspace variables");
        let vars = match source.list_workspace_vars(&workspace.id).await {
            Ok(vars) => vars,
            Err(e) => {
                let e = non_fatal(format!("list variables of '{name}'"), e)?;
                tracing::error!(workspace = %name, error = %e, "failed to read variables");
                report.failed += 1;
                continue;
            }
        };

        for var in vars {
            let key = var.attributes.key;
            if variables.is_ignored(&key) {
                tracing::debug!(workspace = %name, %key, "ignored variable key");
                report.skipped += 1;
                continue;
            }
            let value = variables
                .overwrite_for(&key)
                .map(String::from)
                .or(var.attributes.value);
            csv.serialize(VariableRow {
                workspace_name: name.clone(),
                workspace_id: workspace.id.clone(),
                variable_id: var.id,
                variable_key: key,
                variable_value: value,
                variable_description: var.attributes.description,
                variable_category: var.attributes.category,
                variable_hcl: var.attributes.hcl,
                variable_sensitive: var.attributes.sensitive,
            })?;
            report.created += 1;
        }
    }
    csv.flush()?;

    report.log();
    Ok(report)
}

/// Payload for one imported row. Empty cells are left out.
#[must_use]
pub fn import_payload(row: &VariableRow) -> VariableCreate {
    let present = |cell: &Option<String>| cell.clone().filter(|text| !text.is_empty());
    VariableCreate {
        key: row.variable_key.clone(),
        value: present(&row.variable_value),
        description: present(&row.variable_description),
        category: row.variable_category,
        hcl: row.variable_hcl,
        sensitive: row.variable_sensitive
            || row.variable_key.to_ascii_lowercase().contains(SECRET_MARKER),
    }
}

/// Create the variables listed in the CSV file at `path` on the target.
///
/// # Errors
///
/// Fails when the file cannot be opened or on a fatal API error.
pub async fn import_variables(target: &dyn TfcApi, path: &Path) -> Result<StepReport> {
    let file = std::fs::File::open(path)?;
    import_from(target, file).await
}

struct TargetWorkspace {
    id: String,
    keys: HashSet<String>,
}

/// Create the variables read as CSV from `reader` on the target. Rows whose
/// key already exists on the workspace are skipped.
///
/// # Errors
///
/// See [`import_variables`].
pub async fn import_from<R: io::Read>(target: &dyn TfcApi, reader: R) -> Result<StepReport> {
    let mut report = StepReport::new("import variables");
    let mut csv = csv::Reader::from_reader(reader);
    let mut workspaces: HashMap<String, Option<TargetWorkspace>> = HashMap::new();

    for (index, row) in csv.deserialize::<VariableRow>().enumerate() {
        let line = index + 2;
        let row = match row {
            Ok(row) => row,
            Err(e) => {
                tracing::error!(line, error = %e, "unreadable variables row, skipped");
                report.failed += 1;
                continue;
            }
        };
        let key = &row.variable_key;
        let name = &row.workspace_name;
        tracing::info!(line, %key, workspace = %name, "adding workspace variable");

        if !workspaces.contains_key(name) {
            let resolved = resolve_workspace(target, name).await?;
            workspaces.insert(name.clone(), resolved);
        }
        let Some(workspace) = workspaces.get_mut(name).and_then(Option::as_mut) else {
            report.skipped += 1;
            continue;
        };

        if workspace.keys.contains(key) {
            tracing::info!(%key, workspace = %name, "variable already exists, skipped");
            report.skipped += 1;
            continue;
        }

        match target.create_workspace_var(&workspace.id, &import_payload(&row)).await {
            Ok(_) => {
                workspace.keys.insert(key.clone());
                report.created += 1;
            }
            Err(e) => {
                let e = non_fatal(format!("create variable '{key}' on '{name}'"), e)?;
                tracing::error!(%key, workspace = %name, error = %e, "failed to create variable");
                report.failed += 1;
            }
        }
    }

    report.log();
    Ok(report)
}

/// Target workspace ID and existing variable keys, or `None` when the
/// workspace cannot be used.
async fn resolve_workspace(target: &dyn TfcApi, name: &str) -> Result<Option<TargetWorkspace>> {
    let workspace = match target.show_workspace(name).await {
        Ok(ws) => ws,
        Err(e) if e.is_not_found() => {
            tracing::warn!(workspace = %name, "workspace does not exist on target; its rows are skipped");
            return Ok(None);
        }
        Err(e) => {
            let e = non_fatal(format!("show target workspace '{name}'"), e)?;
            tracing::error!(workspace = %name, error = %e, "failed to look up target workspace");
            return Ok(None);
        }
    };
    match target.list_workspace_vars(&workspace.id).await {
        Ok(vars) => Ok(Some(TargetWorkspace {
            id: workspace.id,
            keys: vars.into_iter().map(|var| var.attributes.key).collect(),
        })),
        Err(e) => {
            let e = non_fatal(format!("list variables of '{name}'"), e)?;
            tracing::error!(workspace = %name, error = %e, "failed to read target variables");
            Ok(None)
        }
    }
}

/// Ask on `output` whether to delete every target workspace variable; only
/// `y` or `Y` confirms.
///
/// # Errors
///
/// Returns the I/O error if the prompt cannot be written or read.
pub fn confirm_deletion<R: BufRead, W: Write>(target: &dyn TfcApi, mut input: R, mut output: W) -> io::Result<bool> {
    write!(
        output,
        "Are you sure you want to delete all workspace variables for the '{}' organization at '{}'? [Y/N]: ",
        target.organization(),
        target.base_url()
    )?;
    output.flush()?;
    let mut answer = String::new();
    input.read_line(&mut answer)?;
    Ok(answer.trim().eq_ignore_ascii_case("y"))
}

/// Delete every variable of every target workspace.
///
/// # Errors
///
/// Fails when the target workspace list cannot be fetched or on a fatal API
/// error.
pub async fn delete_variables(target: &dyn TfcApi) -> Result<StepReport> {
    let mut report = StepReport::new("delete variables");
    let workspaces = target
        .list_workspaces()
        .await
        .map_err(|e| MigrateError::api("list target workspaces", e))?;

    for workspace in &workspaces {
        let name = &workspace.attributes.name;
        let vars = match target.list_workspace_vars(&workspace.id).await {
            Ok(vars) => vars,
            Err(e) => {
                let e = non_fatal(format!("list variables of '{name}'"), e)?;
                tracing::error!(workspace = %name, error = %e, "failed to read variables");
                report.failed += 1;
                continue;
            }
        };
        let total = vars.len();
        for (index, var) in vars.iter().enumerate() {
            let key = &var.attributes.key;
            match target.delete_workspace_var(&workspace.id, &var.id).await {
                Ok(()) => {
                    tracing::info!(position = %format!("{}/{total}", index + 1), %key, workspace = %name, "variable deleted");
                    report.deleted += 1;
                }
                Err(e) => {
                    let e = non_fatal(format!("delete variable '{key}' on '{name}'"), e)?;
                    tracing::error!(%key, workspace = %name, error = %e, "failed to delete variable");
                    report.failed += 1;
                }
            }
        }
    }

    report.log();
    Ok(report)
}
