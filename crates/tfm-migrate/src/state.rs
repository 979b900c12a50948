//! Current state version migration.
//!
//! Only the newest state of each workspace moves. The target workspace is
//! locked around the upload and always unlocked afterwards.

use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use md5::{Digest, Md5};
use serde::Deserialize;
use tfm_api::{ApiError, StateVersionCreate, TfcApi};

use crate::error::non_fatal;
use crate::{MigrateError, Result, StepReport};

/// Reason recorded on the target workspace lock.
pub const LOCK_REASON: &str = "migration script";

/// The fields of a raw state file the upload needs.
#[derive(Debug, Deserialize)]
struct StateHeader {
    serial: u64,
    lineage: String,
}

/// Upload payload for a raw state file.
///
/// # Errors
///
/// Returns the JSON error when the file has no readable `serial`/`lineage`.
pub fn upload_payload(raw: &[u8]) -> std::result::Result<StateVersionCreate, serde_json::Error> {
    let header: StateHeader = serde_json::from_slice(raw)?;
    let md5 = Md5::digest(raw)
        .iter()
        .map(|byte| format!("{byte:02x}"))
        .collect();
    Ok(StateVersionCreate {
        serial: header.serial,
        md5,
        lineage: header.lineage,
        state: STANDARD.encode(raw),
    })
}

enum Outcome {
    Uploaded,
    Skipped,
    Failed,
}

/// Copy each source workspace's current state version to the same-named
/// target workspace when the target does not already have that serial.
///
/// # Errors
///
/// Fails when the source workspace list cannot be fetched or on a fatal API
/// error.
pub async fn migrate_current_state(source: &dyn TfcApi, target: &dyn TfcApi) -> Result<StepReport> {
    let mut report = StepReport::new("current state");
    let workspaces = source
        .list_workspaces()
        .await
        .map_err(|e| MigrateError::api("list source workspaces", e))?;

    let total = workspaces.len();
    for (index, workspace) in workspaces.iter().enumerate() {
        let name = &workspace.attributes.name;
        tracing::info!(position = %format!("{}/{total}", index + 1), workspace = %name, "migrating current state version");
        match migrate_workspace_state(source, target, &workspace.id, name).await? {
            Outcome::Uploaded => report.created += 1,
            Outcome::Skipped => report.skipped += 1,
            Outcome::Failed => report.failed += 1,
        }
    }

    report.log();
    Ok(report)
}

async fn migrate_workspace_state(source: &dyn TfcApi, target: &dyn TfcApi, source_id: &str, name: &str) -> Result<Outcome> {
    let current = match source.current_state_version(source_id).await {
        Ok(current) => current,
        Err(e) if e.is_not_found() => {
            tracing::info!(workspace = %name, "no current state version, skipped");
            return Ok(Outcome::Skipped);
        }
        Err(e) => return failed(format!("read current state of '{name}'"), e),
    };
    let source_serial = current.attributes.serial;

    let target_serial = match target.list_state_versions(name).await {
        Ok(versions) => versions.iter().map(|sv| sv.attributes.serial).max(),
        Err(e) => return failed(format!("list target state versions of '{name}'"), e),
    };
    if target_serial.is_some_and(|serial| serial >= source_serial) {
        tracing::info!(workspace = %name, serial = source_serial, "state version exists or is older than the target's, skipped");
        return Ok(Outcome::Skipped);
    }

    let Some(url) = current.attributes.hosted_state_download_url.as_deref() else {
        tracing::error!(workspace = %name, "current state version has no download URL");
        return Ok(Outcome::Failed);
    };
    let raw = match source.download_state(url).await {
        Ok(raw) => raw,
        Err(e) => return failed(format!("download state of '{name}'"), e),
    };
    let payload = match upload_payload(&raw) {
        Ok(payload) => payload,
        Err(e) => {
            tracing::error!(workspace = %name, error = %e, "downloaded state is not a valid state file");
            return Ok(Outcome::Failed);
        }
    };

    let target_ws = match target.show_workspace(name).await {
        Ok(ws) => ws,
        Err(e) if e.is_not_found() => {
            tracing::warn!(workspace = %name, "target workspace not found; run --migrate-workspaces first, skipped");
            return Ok(Outcome::Skipped);
        }
        Err(e) => return failed(format!("show target workspace '{name}'"), e),
    };

    if let Err(e) = lock(target, &target_ws.id).await {
        return failed(format!("lock target workspace '{name}'"), e);
    }
    let uploaded = target.create_state_version(&target_ws.id, &payload).await;
    if let Err(e) = target.unlock_workspace(&target_ws.id).await {
        let e = non_fatal(format!("unlock target workspace '{name}'"), e)?;
        tracing::error!(workspace = %name, error = %e, "failed to unlock target workspace");
    }
    match uploaded {
        Ok(_) => {
            tracing::info!(workspace = %name, serial = payload.serial, "current state version created");
            Ok(Outcome::Uploaded)
        }
        Err(e) => failed(format!("upload state of '{name}'"), e),
    }
}

/// Lock, breaking a foreign lock once if the workspace is already held.
async fn lock(target: &dyn TfcApi, workspace_id: &str) -> std::result::Result<(), ApiError> {
    match target.lock_workspace(workspace_id, LOCK_REASON).await {
        Err(e) if e.is_conflict() => {
            tracing::warn!(workspace_id, "workspace already locked; force-unlocking");
            target.force_unlock_workspace(workspace_id).await?;
            target.lock_workspace(workspace_id, LOCK_REASON).await
        }
        other => other,
    }
}

fn failed(context: String, error: ApiError) -> Result<Outcome> {
    let error = non_fatal(context.as_str(), error)?;
    tracing::error!(error = %error, "{context}");
    Ok(Outcome::Failed)
}
