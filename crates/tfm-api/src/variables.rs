//! Workspace variables.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::jsonapi::{Document, ListDocument, NewResource, Resource, null_as_default};
use crate::{Result, TfcClient};

pub type Variable = Resource<VariableAttributes>;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum VariableCategory {
    #[default]
    Terraform,
    Env,
}

impl VariableCategory {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Terraform => "terraform",
            Self::Env => "env",
        }
    }
}

impl fmt::Display for VariableCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for VariableCategory {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "terraform" => Ok(Self::Terraform),
            "env" => Ok(Self::Env),
            other => Err(format!("unknown variable category '{other}'")),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Deserialize)]
pub struct VariableAttributes {
    pub key: String,
    /// Always `None` for sensitive variables.
    #[serde(default)]
    pub value: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub category: VariableCategory,
    #[serde(default, deserialize_with = "null_as_default")]
    pub hcl: bool,
    #[serde(default, deserialize_with = "null_as_default")]
    pub sensitive: bool,
}

/// Attributes for `POST /workspaces/{id}/vars`.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize)]
pub struct VariableCreate {
    pub key: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub value: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub category: VariableCategory,
    pub hcl: bool,
    pub sensitive: bool,
}

impl TfcClient {
    /// List the variables of one workspace.
    ///
    /// # Errors
    ///
    /// Returns [`crate::ApiError`] if the request fails.
    pub async fn list_workspace_vars(&self, workspace_id: &str) -> Result<Vec<Variable>> {
        let doc: ListDocument<Variable> = self
            .get_json(&format!("/workspaces/{workspace_id}/vars"))
            .await?;
        Ok(doc.data)
    }

    /// Create a variable on a workspace.
    ///
    /// # Errors
    ///
    /// Returns [`crate::ApiError`] if the request fails.
    pub async fn create_workspace_var(&self, workspace_id: &str, attributes: &VariableCreate) -> Result<Variable> {
        let body = Document::new(NewResource::new("vars", attributes));
        let doc: Document<Variable> = self
            .post_json(&format!("/workspaces/{workspace_id}/vars"), &body)
            .await?;
        Ok(doc.data)
    }

    /// Delete a variable from a workspace.
    ///
    /// # Errors
    ///
    /// Returns [`crate::ApiError`] if the request fails.
    pub async fn delete_workspace_var(&self, workspace_id: &str, variable_id: &str) -> Result<()> {
        self.delete(&format!("/workspaces/{workspace_id}/vars/{variable_id}"))
            .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    const FIXTURE: &str = r#"{
        "data": [
            {
                "id": "var-AD4pibb9nxo1468E",
                "type": "vars",
                "attributes": {
                    "key": "region",
                    "value": "us-east-1",
                    "description": null,
                    "sensitive": false,
                    "category": "terraform",
                    "hcl": false
                }
            },
            {
                "id": "var-secret",
                "type": "vars",
                "attributes": {
                    "key": "DB_PASSWORD",
                    "value": null,
                    "description": "rotated quarterly",
                    "sensitive": true,
                    "category": "env",
                    "hcl": false
                }
            }
        ]
    }"#;

    #[test]
    fn parse_variables() {
        let doc: ListDocument<Variable> = serde_json::from_str(FIXTURE).unwrap();
        assert_eq!(doc.data[0].attributes.value.as_deref(), Some("us-east-1"));
        assert_eq!(doc.data[1].attributes.category, VariableCategory::Env);
        assert!(doc.data[1].attributes.sensitive);
        assert_eq!(doc.data[1].attributes.value, None);
    }

    #[test]
    fn create_payload_omits_empty_fields() {
        let create = VariableCreate {
            key: "db_password".into(),
            category: VariableCategory::Env,
            sensitive: true,
            ..Default::default()
        };
        let body = serde_json::to_value(Document::new(NewResource::new("vars", &create))).unwrap();
        assert_eq!(
            body,
            serde_json::json!({
                "data": {
                    "type": "vars",
                    "attributes": {
                        "key": "db_password",
                        "category": "env",
                        "hcl": false,
                        "sensitive": true
                    }
                }
            })
        );
    }

    #[test]
    fn category_from_str() {
        assert_eq!(" ENV ".parse::<VariableCategory>(), Ok(VariableCategory::Env));
        assert!("policy".parse::<VariableCategory>().is_err());
    }
}
