//! Error types for the migration steps.
//!
//! Only errors that must stop the whole run surface here. Per-item failures
//! are logged and counted in the step's [`crate::StepReport`].

use thiserror::Error;
use tfm_api::ApiError;

#[derive(Debug, Error)]
pub enum MigrateError {
    /// A fatal API error (bad credentials, unexpected status) or a failed
    /// listing the step cannot continue without.
    #[error("{context}: {source}")]
    Api {
        context: String,
        #[source]
        source: ApiError,
    },

    /// A source OAuth token ID that is not in the configured source VCS table.
    #[error(
        "workspace '{workspace}' uses VCS token '{token_id}', which is not listed under [source.vcs_tokens]"
    )]
    UnknownVcsToken { workspace: String, token_id: String },

    /// Agent execution mode requested but no agent pool name contains the identifier.
    #[error("no agent pool on the target matches workspace identifier '{identifier}'")]
    NoAgentPool { identifier: String },

    /// Reading or writing the variables CSV failed.
    #[error("variables CSV: {0}")]
    Csv(#[from] csv::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl MigrateError {
    pub fn api(context: impl Into<String>, source: ApiError) -> Self {
        Self::Api {
            context: context.into(),
            source,
        }
    }
}

/// Hand back non-fatal API errors for per-item handling; turn fatal ones
/// into a [`MigrateError`] that aborts the run.
pub(crate) fn non_fatal(context: impl Into<String>, error: ApiError) -> Result<ApiError, MigrateError> {
    if error.is_fatal() {
        Err(MigrateError::api(context, error))
    } else {
        Ok(error)
    }
}
