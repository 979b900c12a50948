//! VCS provider resolution.
//!
//! OAuth token IDs differ between organizations, so a source binding is
//! translated by provider name: source token ID → provider (reverse lookup
//! in `[source.vcs_tokens]`) → target token ID (`[target.vcs_tokens]`).

use tfm_api::VcsRepo;
use tfm_config::MigrateConfig;

use crate::MigrateError;

/// Provider of a workspace's VCS binding. `Ok(None)` means the binding
/// carries no token ID at all.
///
/// # Errors
///
/// Returns [`MigrateError::UnknownVcsToken`] when the token ID is not in the
/// source table.
pub fn workspace_provider<'c>(
    config: &'c MigrateConfig,
    workspace: &str,
    repo: &VcsRepo,
) -> Result<Option<&'c str>, MigrateError> {
    let Some(token_id) = repo.oauth_token_id.as_deref().filter(|id| !id.is_empty()) else {
        return Ok(None);
    };
    config
        .source
        .vcs_provider_for_token(token_id)
        .map(Some)
        .ok_or_else(|| MigrateError::UnknownVcsToken {
            workspace: workspace.to_string(),
            token_id: token_id.to_string(),
        })
}

/// Provider of a registry module's VCS binding, falling back to
/// `modules.default_vcs_provider` when the token is absent or unknown.
#[must_use]
pub fn module_provider<'c>(config: &'c MigrateConfig, module: &str, repo: &VcsRepo) -> &'c str {
    let known = repo
        .oauth_token_id
        .as_deref()
        .and_then(|token_id| config.source.vcs_provider_for_token(token_id));
    known.unwrap_or_else(|| {
        tracing::warn!(
            module,
            provider = %config.modules.default_vcs_provider,
            "could not identify the module's VCS provider; using the default"
        );
        &config.modules.default_vcs_provider
    })
}
