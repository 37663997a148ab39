use std::sync::Arc;

use ingest::{FileSource, UsageSource};
use usage_engine::SnapshotStore;

use crate::accounts::{AccountResolver, resolver_from_config};
use crate::config::AppConfig;
use crate::error::Result;
use crate::services::{AppServices, RefreshReport};

/// Application state shared by the HTTP server and the CLI.
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<AppConfig>,
    pub snapshots: Arc<SnapshotStore>,
    pub services: AppServices,
}

impl AppState {
    /// Wires the file source and account resolver named by `config`. No data
    /// is loaded until [`AppState::refresh_data`] runs.
    pub fn new(config: AppConfig) -> Self {
        let source: Arc<dyn UsageSource> = Arc::new(FileSource::new(config.source.path.clone()));
        let resolver = resolver_from_config(&config.accounts);
        Self::with_parts(config, source, resolver)
    }

    pub fn with_parts(
        config: AppConfig,
        source: Arc<dyn UsageSource>,
        resolver: Arc<dyn AccountResolver>,
    ) -> Self {
        let config = Arc::new(config);
        let snapshots = Arc::new(SnapshotStore::new());
        let services = AppServices::new(config.clone(), snapshots.clone(), source, resolver);
        Self {
            config,
            snapshots,
            services,
        }
    }

    pub fn refresh_data(&self) -> Result<RefreshReport> {
        self.services.refresh.run()
    }

    pub fn is_loaded(&self) -> bool {
        self.snapshots.current().is_some()
    }
}
