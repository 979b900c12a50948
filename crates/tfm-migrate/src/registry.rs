//! Private registry modules, republished on the target from their VCS
//! repositories.

use tfm_api::TfcApi;
use tfm_api::registry_modules::{ModuleVcsPublish, ModuleVcsRepo};
use tfm_config::MigrateConfig;

use crate::error::non_fatal;
use crate::vcs::module_provider;
use crate::{MigrateError, Result, StepReport};

/// Publish every source module that the target does not have yet.
///
/// # Errors
///
/// Fails when the source module list cannot be fetched or on a fatal API
/// error.
pub async fn migrate_registry_modules(source: &dyn TfcApi, target: &dyn TfcApi, config: &MigrateConfig) -> Result<StepReport> {
    let mut report = StepReport::new("registry modules");
    let modules = source
        .list_registry_modules()
        .await
        .map_err(|e| MigrateError::api("list source registry modules", e))?;

    let total = modules.len();
    for (index, module) in modules.iter().enumerate() {
        let name = &module.attributes.name;
        let provider = &module.attributes.provider;
        let position = format!("{}/{total}", index + 1);

        if module.attributes.registry_name.as_deref() == Some("public") {
            tracing::debug!(%position, module = %name, "public registry module, skipped");
            report.skipped += 1;
            continue;
        }

        match target.show_registry_module(name, provider).await {
            Ok(_) => {
                tracing::info!(%position, module = %name, %provider, "registry module already exists on target");
                report.skipped += 1;
                continue;
            }
            Err(e) if e.is_not_found() => {}
            Err(e) => {
                let e = non_fatal(format!("show target module '{name}'"), e)?;
                tracing::error!(module = %name, error = %e, "failed to look up target module");
                report.failed += 1;
                continue;
            }
        }

        tracing::info!(%position, module = %name, %provider, "creating registry module on target");
        let details = match source.show_registry_module(name, provider).await {
            Ok(details) => details,
            Err(e) => {
                let e = non_fatal(format!("show source module '{name}'"), e)?;
                tracing::error!(module = %name, error = %e, "failed to read source module");
                report.failed += 1;
                continue;
            }
        };
        let Some(repo) = details.attributes.vcs_repo.as_ref().or(module.attributes.vcs_repo.as_ref()) else {
            tracing::warn!(module = %name, "module is not backed by a VCS repository, skipped");
            report.skipped += 1;
            continue;
        };

        let vcs_provider = module_provider(config, name, repo);
        let Some(token) = config.target.vcs_token_for_provider(vcs_provider) else {
            tracing::warn!(module = %name, provider = vcs_provider, "no target VCS token for provider, skipped");
            report.skipped += 1;
            continue;
        };

        let publish = ModuleVcsPublish {
            vcs_repo: ModuleVcsRepo {
                identifier: repo.identifier.clone(),
                oauth_token_id: token.to_string(),
                display_identifier: repo
                    .display_identifier
                    .clone()
                    .unwrap_or_else(|| repo.identifier.clone()),
            },
        };
        match target.publish_module_from_vcs(&publish).await {
            Ok(_) => report.created += 1,
            Err(e) => {
                let e = non_fatal(format!("publish module '{name}'"), e)?;
                tracing::error!(module = %name, error = %e, "failed to publish module");
                report.failed += 1;
            }
        }
    }

    report.log();
    Ok(report)
}
