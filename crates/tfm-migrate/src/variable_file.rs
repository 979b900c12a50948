//! Row format of the workspace variables file.
//!
//! One row per variable with a header line. Sensitive values cannot be
//! read back from the API, so operators fill them in by hand before import.

use serde::{Deserialize, Deserializer, Serialize};
use tfm_api::VariableCategory;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VariableRow {
    pub workspace_name: String,
    #[serde(default)]
    pub workspace_id: String,
    #[serde(default)]
    pub variable_id: String,
    pub variable_key: String,
    #[serde(default)]
    pub variable_value: Option<String>,
    #[serde(default)]
    pub variable_description: Option<String>,
    #[serde(deserialize_with = "parse_category")]
    pub variable_category: VariableCategory,
    #[serde(default, deserialize_with = "parse_bool")]
    pub variable_hcl: bool,
    #[serde(default, deserialize_with = "parse_bool")]
    pub variable_sensitive: bool,
}

fn parse_category<'de, D: Deserializer<'de>>(deserializer: D) -> Result<VariableCategory, D::Error> {
    let raw = String::deserialize(deserializer)?;
    raw.parse().map_err(serde::de::Error::custom)
}

/// Booleans as spreadsheets write them: `true`, `True`, `TRUE`, `1`, or empty.
fn parse_bool<'de, D: Deserializer<'de>>(deserializer: D) -> Result<bool, D::Error> {
    let raw = String::deserialize(deserializer)?;
    match raw.trim().to_ascii_lowercase().as_str() {
        "true" | "1" | "yes" => Ok(true),
        "false" | "0" | "no" | "" => Ok(false),
        other => Err(serde::de::Error::custom(format!("invalid boolean '{other}'"))),
    }
}
