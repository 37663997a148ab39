pub mod accounts;
pub mod app;
pub mod config;
pub mod error;
pub mod selection;
pub mod services;
pub mod util;

pub use accounts::{AccountResolver, SacctmgrResolver, StaticResolver, resolver_from_config};
pub use app::AppState;
pub use config::{AppConfig, ConfigLoad, RangeParams, default_config_path};
pub use error::{ApiError, AppError, Result};
pub use selection::{Selection, ViewState};
pub use services::{AccountList, AppServices, ExportArtifact, RefreshReport};
pub use util::time::{parse_date, resolve_range};
