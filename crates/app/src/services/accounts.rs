use std::sync::Arc;

use serde::Serialize;

use crate::accounts::AccountResolver;
use crate::error::Result;
use crate::services::SharedConfig;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AccountList {
    pub user: Option<String>,
    pub accounts: Vec<String>,
    pub default_account: Option<String>,
}

#[derive(Clone)]
pub struct AccountsService {
    config: SharedConfig,
    resolver: Arc<dyn AccountResolver>,
}

impl AccountsService {
    pub(super) fn new(config: SharedConfig, resolver: Arc<dyn AccountResolver>) -> Self {
        Self { config, resolver }
    }

    /// Accounts for `user`, or for the configured viewer. An unknown viewer
    /// yields an empty list rather than an error.
    pub fn list(&self, user: Option<&str>) -> Result<AccountList> {
        let user = user
            .map(str::trim)
            .filter(|user| !user.is_empty())
            .map(str::to_string)
            .or_else(|| self.config.accounts.viewer());
        let Some(user) = user else {
            return Ok(AccountList {
                user: None,
                accounts: Vec::new(),
                default_account: None,
            });
        };
        let accounts = self.resolver.accounts_for(&user).inspect_err(|err| {
            tracing::warn!(user = %user, error = %err, "account lookup failed");
        })?;
        Ok(AccountList {
            default_account: accounts.first().cloned(),
            user: Some(user),
            accounts,
        })
    }
}
