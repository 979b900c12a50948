//! Migration tables: module defaults, variable handling, variable sets,
//! retry and HTTP tuning.

use std::collections::BTreeMap;
use std::time::Duration;

use serde::{Deserialize, Serialize};

fn default_module_provider() -> String {
    String::from("devops")
}

const fn default_attempts() -> u32 {
    5
}

const fn default_delay_secs() -> u64 {
    30
}

const fn default_timeout_secs() -> u64 {
    60
}

const fn default_rate_limit_retries() -> u32 {
    3
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ModulesConfig {
    /// Provider assumed for registry modules whose VCS token cannot be resolved.
    #[serde(default = "default_module_provider")]
    pub default_vcs_provider: String,
}

impl Default for ModulesConfig {
    fn default() -> Self {
        Self {
            default_vcs_provider: default_module_provider(),
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct VariablesConfig {
    /// Variable keys left out of the CSV export (superseded by variable sets).
    #[serde(default)]
    pub ignored_keys: Vec<String>,

    /// Key → replacement value written to the CSV instead of the source value.
    #[serde(default)]
    pub overwrites: BTreeMap<String, String>,
}

impl VariablesConfig {
    pub fn is_ignored(&self, key: &str) -> bool {
        self.ignored_keys.iter().any(|ignored| ignored == key)
    }

    pub fn overwrite_for(&self, key: &str) -> Option<&str> {
        self.overwrites.get(key).map(String::as_str)
    }
}

/// One row of the variable-set table. Order matters: bindings are applied
/// in the order they appear.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct VariableSetBinding {
    /// Lower-case substring matched against workspace names (e.g. `aws`).
    pub identifier: String,
    /// Variable set ID on the target (`varset-…`).
    pub id: String,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct RetryConfig {
    /// Retries after the initial failed workspace create.
    #[serde(default = "default_attempts")]
    pub attempts: u32,

    /// Fixed delay between attempts, in seconds.
    #[serde(default = "default_delay_secs")]
    pub delay_secs: u64,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            attempts: default_attempts(),
            delay_secs: default_delay_secs(),
        }
    }
}

impl RetryConfig {
    pub const fn delay(&self) -> Duration {
        Duration::from_secs(self.delay_secs)
    }
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct HttpConfig {
    /// Per-request timeout in seconds.
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,

    /// How many times a 429 response is retried after its `Retry-After` delay.
    #[serde(default = "default_rate_limit_retries")]
    pub max_rate_limit_retries: u32,
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self {
            timeout_secs: default_timeout_secs(),
            max_rate_limit_retries: default_rate_limit_retries(),
        }
    }
}

impl HttpConfig {
    pub const fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}
