mod accounts;
mod refresh;
mod usage;

use std::sync::Arc;

use ingest::UsageSource;
use usage_engine::{DatasetSnapshot, SnapshotStore};

use crate::accounts::AccountResolver;
use crate::config::AppConfig;
use crate::error::{AppError, Result};

pub use accounts::{AccountList, AccountsService};
pub use refresh::{RefreshReport, RefreshService};
pub use usage::{ExportArtifact, UsageService};

type SharedConfig = Arc<AppConfig>;

/// Service registry for app-level operations.
#[derive(Clone)]
pub struct AppServices {
    pub usage: UsageService,
    pub refresh: RefreshService,
    pub accounts: AccountsService,
}

impl AppServices {
    pub fn new(
        config: SharedConfig,
        snapshots: Arc<SnapshotStore>,
        source: Arc<dyn UsageSource>,
        resolver: Arc<dyn AccountResolver>,
    ) -> Self {
        Self {
            usage: UsageService::new(snapshots.clone()),
            refresh: RefreshService::new(config.clone(), snapshots, source),
            accounts: AccountsService::new(config, resolver),
        }
    }
}

fn require_snapshot(snapshots: &SnapshotStore) -> Result<Arc<DatasetSnapshot>> {
    snapshots.current().ok_or_else(missing_snapshot)
}

fn missing_snapshot() -> AppError {
    AppError::Unavailable("usage data has not been loaded yet".to_string())
}
