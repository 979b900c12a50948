//! Details of the account that owns the API token.

use serde::Deserialize;

use crate::jsonapi::{Document, Resource};
use crate::{Result, TfcClient};

pub type Account = Resource<AccountAttributes>;

#[derive(Debug, Clone, PartialEq, Eq, Default, Deserialize)]
pub struct AccountAttributes {
    #[serde(default)]
    pub username: String,
    #[serde(default)]
    pub email: Option<String>,
}

impl TfcClient {
    /// Fetch the account behind the configured token. Used as the start-up
    /// authentication check.
    ///
    /// # Errors
    ///
    /// Returns [`crate::ApiError::Unauthorized`] for a bad token.
    pub async fn account_details(&self) -> Result<Account> {
        let doc: Document<Account> = self.get_json("/account/details").await?;
        Ok(doc.data)
    }
}
