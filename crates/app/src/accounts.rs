use std::path::PathBuf;
use std::process::Command;
use std::sync::Arc;

use crate::config::{AccountsConfig, AccountsMode};
use crate::error::{AppError, Result};

/// Resolves which accounts a viewer may select.
pub trait AccountResolver: Send + Sync {
    fn accounts_for(&self, user: &str) -> Result<Vec<String>>;
}

/// Asks Slurm for the user's default account.
#[derive(Debug, Clone)]
pub struct SacctmgrResolver {
    program: PathBuf,
}

impl SacctmgrResolver {
    pub fn new(program: impl Into<PathBuf>) -> Self {
        Self {
            program: program.into(),
        }
    }
}

impl AccountResolver for SacctmgrResolver {
    fn accounts_for(&self, user: &str) -> Result<Vec<String>> {
        let output = Command::new(&self.program)
            .args(["-P", "-n", "show", "user", user, "format=DefaultAccount"])
            .output()
            .map_err(|err| {
                AppError::AccountLookup(format!("run {}: {}", self.program.display(), err))
            })?;
        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(AppError::AccountLookup(format!(
                "{} exited with {}: {}",
                self.program.display(),
                output.status,
                stderr.trim()
            )));
        }
        Ok(parse_account_lines(&String::from_utf8_lossy(&output.stdout)))
    }
}

#[derive(Debug, Clone, Default)]
pub struct StaticResolver {
    accounts: Vec<String>,
}

impl StaticResolver {
    pub fn new(accounts: Vec<String>) -> Self {
        Self { accounts }
    }
}

impl AccountResolver for StaticResolver {
    fn accounts_for(&self, _user: &str) -> Result<Vec<String>> {
        Ok(dedupe(self.accounts.iter().map(String::as_str)))
    }
}

pub fn resolver_from_config(config: &AccountsConfig) -> Arc<dyn AccountResolver> {
    match config.mode {
        AccountsMode::Sacctmgr => Arc::new(SacctmgrResolver::new(config.sacctmgr_path.clone())),
        AccountsMode::Static => Arc::new(StaticResolver::new(config.list.clone())),
    }
}

/// One account per line; `-P` output may carry `|`-separated columns, the
/// first of which is the account.
pub fn parse_account_lines(output: &str) -> Vec<String> {
    dedupe(
        output
            .lines()
            .map(|line| line.split('|').next().unwrap_or_default()),
    )
}

fn dedupe<'a, I>(accounts: I) -> Vec<String>
where
    I: IntoIterator<Item = &'a str>,
{
    let mut seen = Vec::new();
    for account in accounts.into_iter().map(str::trim) {
        if !account.is_empty() && !seen.iter().any(|known: &String| known == account) {
            seen.push(account.to_string());
        }
    }
    seen
}
