use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use usage_engine::ClassifierConfig;

use crate::error::{AppError, Result};

const DEFAULT_SACCTMGR: &str = "/opt/slurm/current/bin/sacctmgr";
const DEFAULT_HOST: &str = "127.0.0.1";
const DEFAULT_PORT: u16 = 8080;
const DEFAULT_PATH_PREFIX: &str = "/pun/sys/ood-getusage/";

/// Everything read from `config.toml`. Missing sections take defaults.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub source: SourceConfig,
    pub accounts: AccountsConfig,
    pub server: ServerConfig,
    pub classifier: ClassifierConfig,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SourceConfig {
    pub path: PathBuf,
}

impl Default for SourceConfig {
    fn default() -> Self {
        Self {
            path: ingest::default_source_path(),
        }
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AccountsMode {
    #[default]
    Sacctmgr,
    Static,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AccountsConfig {
    pub mode: AccountsMode,
    pub sacctmgr_path: PathBuf,
    /// Accounts offered when `mode = "static"`.
    pub list: Vec<String>,
    /// Viewer to resolve accounts for; falls back to `$USER`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub user: Option<String>,
}

impl Default for AccountsConfig {
    fn default() -> Self {
        Self {
            mode: AccountsMode::default(),
            sacctmgr_path: PathBuf::from(DEFAULT_SACCTMGR),
            list: Vec::new(),
            user: None,
        }
    }
}

impl AccountsConfig {
    pub fn viewer(&self) -> Option<String> {
        self.user
            .clone()
            .or_else(|| std::env::var("USER").ok())
            .map(|user| user.trim().to_string())
            .filter(|user| !user.is_empty())
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    pub path_prefix: String,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: DEFAULT_HOST.to_string(),
            port: DEFAULT_PORT,
            path_prefix: DEFAULT_PATH_PREFIX.to_string(),
        }
    }
}

impl ServerConfig {
    /// Prefix normalized to `/segment/...` without a trailing slash; empty
    /// for the root.
    pub fn normalized_prefix(&self) -> String {
        let trimmed = self.path_prefix.trim().trim_matches('/');
        if trimmed.is_empty() {
            String::new()
        } else {
            format!("/{}", trimmed)
        }
    }
}

#[derive(Clone, Debug)]
pub struct ConfigLoad {
    pub config: AppConfig,
    pub path: PathBuf,
    pub created: bool,
}

impl AppConfig {
    pub fn from_toml(contents: &str) -> Result<Self> {
        toml::from_str(contents).map_err(|err| AppError::Config(err.to_string()))
    }

    pub fn to_toml(&self) -> Result<String> {
        toml::to_string_pretty(self).map_err(|err| AppError::Config(err.to_string()))
    }

    pub fn load(path: &Path) -> Result<Self> {
        let contents = fs::read_to_string(path)
            .map_err(|err| AppError::Config(format!("read config {}: {}", path.display(), err)))?;
        Self::from_toml(&contents)
            .map_err(|err| AppError::Config(format!("parse config {}: {}", path.display(), err)))
    }

    /// Reads `path`, writing a default config there first if it is missing.
    pub fn load_or_create(path: &Path) -> Result<ConfigLoad> {
        if path.exists() {
            return Ok(ConfigLoad {
                config: Self::load(path)?,
                path: path.to_path_buf(),
                created: false,
            });
        }
        if let Some(dir) = path.parent() {
            fs::create_dir_all(dir).map_err(|err| {
                AppError::Config(format!("create config dir {}: {}", dir.display(), err))
            })?;
        }
        let config = Self::default();
        fs::write(path, config.to_toml()?)
            .map_err(|err| AppError::Config(format!("write config {}: {}", path.display(), err)))?;
        Ok(ConfigLoad {
            config,
            path: path.to_path_buf(),
            created: true,
        })
    }
}

pub fn default_config_path() -> PathBuf {
    if let Ok(path) = std::env::var("GETUSAGE_CONFIG") {
        return PathBuf::from(path);
    }
    let base = std::env::var("XDG_CONFIG_HOME")
        .map(PathBuf::from)
        .or_else(|_| std::env::var("HOME").map(|home| PathBuf::from(home).join(".config")))
        .unwrap_or_else(|_| PathBuf::from("."));
    base.join("getusage").join("config.toml")
}

#[derive(Clone, Debug, Default, Deserialize, Serialize)]
pub struct RangeParams {
    pub range: Option<String>,
    pub start: Option<String>,
    pub end: Option<String>,
}
