//! # tfm-config
//!
//! Layered configuration loading for tfmigrate using figment.
//!
//! Configuration sources (in priority order, highest wins):
//! 1. Legacy environment variables (`TFE_SOURCE_TOKEN`, `TFC_TARGET_ORG`, ...)
//! 2. Environment variables (`TFMIGRATE_*` prefix, `__` as separator)
//! 3. An explicit file passed with `--config`
//! 4. Project-level `./tfmigrate.toml`
//! 5. User-level `~/.config/tfmigrate/config.toml`
//! 6. Built-in defaults
//!
//! # Environment Variable Mapping
//!
//! Figment maps `TFMIGRATE_SOURCE__TOKEN` -> `source.token`,
//! `TFMIGRATE_WORKSPACE_RETRY__DELAY_SECS` -> `workspace_retry.delay_secs`, etc.
//!
//! Tables that cannot be expressed as flat variables (VCS token maps,
//! variable sets, ignored keys, overwrites) belong in the TOML file:
//!
//! ```toml
//! [source]
//! url = "https://tfe.example.com"
//! organization = "acme"
//!
//! [source.vcs_tokens]
//! github = "ot-AAAA"
//!
//! [[variable_sets]]
//! identifier = "aws"
//! id = "varset-BBBB"
//! ```
//!
//! The loaded [`MigrateConfig`] is never mutated; steps receive it by reference.

mod error;
mod migration;
mod organization;

pub use error::ConfigError;
pub use migration::{HttpConfig, ModulesConfig, RetryConfig, VariableSetBinding, VariablesConfig};
pub use organization::{OrganizationConfig, TERRAFORM_CLOUD_HOST};

use figment::{
    Figment,
    providers::{Env, Format, Serialized, Toml},
};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Project-local config file name.
pub const LOCAL_CONFIG_FILE: &str = "tfmigrate.toml";

/// Variable names used by earlier releases of the migration script, kept so existing
/// `.env` files keep working.
const LEGACY_ENV_KEYS: [(&str, &str); 8] = [
    ("TFE_SOURCE_TOKEN", "source.token"),
    ("TFE_SOURCE_URL", "source.url"),
    ("TFE_SOURCE_ORG", "source.organization"),
    ("TFE_SOURCE_VERIFY", "source.verify_tls"),
    ("TFC_TARGET_TOKEN", "target.token"),
    ("TFC_TARGET_URL", "target.url"),
    ("TFC_TARGET_ORG", "target.organization"),
    ("TFC_TARGET_VERIFY", "target.verify_tls"),
];

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct MigrateConfig {
    #[serde(default)]
    pub source: OrganizationConfig,
    #[serde(default)]
    pub target: OrganizationConfig,
    #[serde(default)]
    pub modules: ModulesConfig,
    #[serde(default)]
    pub variables: VariablesConfig,
    #[serde(default)]
    pub variable_sets: Vec<VariableSetBinding>,
    #[serde(default)]
    pub workspace_retry: RetryConfig,
    #[serde(default)]
    pub http: HttpConfig,
}

impl MigrateConfig {
    /// Load configuration from all sources (TOML files + environment variables).
    ///
    /// Does NOT read `.env` files; the binary loads those before calling this.
    pub fn load(explicit: Option<&Path>) -> Result<Self, ConfigError> {
        if let Some(path) = explicit {
            if !path.exists() {
                return Err(ConfigError::MissingFile {
                    path: path.to_path_buf(),
                });
            }
        }
        let config: Self = Self::figment(explicit).extract()?;
        config.validate()?;
        Ok(config)
    }

    /// Build the figment provider chain.
    ///
    /// This is public so tests can inspect the figment directly or add
    /// additional providers on top.
    pub fn figment(explicit: Option<&Path>) -> Figment {
        let mut figment = Figment::from(Serialized::defaults(Self::default()));

        // Layer 1: User-global config
        if let Some(global_path) = Self::global_config_path() {
            if global_path.exists() {
                figment = figment.merge(Toml::file(global_path));
            }
        }

        // Layer 2: Project-local config
        let local_path = PathBuf::from(LOCAL_CONFIG_FILE);
        if local_path.exists() {
            figment = figment.merge(Toml::file(local_path));
        }

        // Layer 3: Explicit --config file
        if let Some(path) = explicit {
            figment = figment.merge(Toml::file(path));
        }

        // Layer 4: Environment variables
        figment = figment.merge(Env::prefixed("TFMIGRATE_").split("__"));

        // Layer 5: Legacy variable names (highest priority)
        let legacy_names: Vec<&str> = LEGACY_ENV_KEYS.iter().map(|(name, _)| *name).collect();
        figment.merge(
            Env::raw()
                .only(&legacy_names)
                .map(|key| legacy_key_path(key.as_str()).into()),
        )
    }

    /// Cross-field checks that serde defaults cannot express.
    pub fn validate(&self) -> Result<(), ConfigError> {
        for binding in &self.variable_sets {
            if binding.identifier.is_empty() {
                return Err(ConfigError::InvalidValue {
                    field: "variable_sets.identifier".into(),
                    reason: format!("empty identifier for variable set '{}'", binding.id),
                });
            }
            if binding.identifier != binding.identifier.to_lowercase() {
                return Err(ConfigError::InvalidValue {
                    field: "variable_sets.identifier".into(),
                    reason: format!(
                        "'{}' must be lower-case; workspace names are lower-cased before matching",
                        binding.identifier
                    ),
                });
            }
        }
        Ok(())
    }

    /// Path to the user-global config file.
    fn global_config_path() -> Option<PathBuf> {
        dirs::config_dir().map(|p| p.join("tfmigrate").join("config.toml"))
    }
}

fn legacy_key_path(name: &str) -> &'static str {
    LEGACY_ENV_KEYS
        .iter()
        .find(|(legacy, _)| legacy.eq_ignore_ascii_case(name))
        .map_or("legacy", |(_, path)| path)
}
