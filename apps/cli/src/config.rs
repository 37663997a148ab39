use std::path::PathBuf;

use usage_app::{AppConfig, ConfigLoad, Result, default_config_path};

use crate::args::ServeArgs;

/// Loads `explicit` or the default config path, writing defaults on first
/// run.
pub fn load_or_create(explicit: Option<PathBuf>) -> Result<ConfigLoad> {
    let path = explicit.unwrap_or_else(default_config_path);
    let load = AppConfig::load_or_create(&path)?;
    if load.created {
        tracing::info!(path = %load.path.display(), "created default config");
    } else {
        tracing::debug!(path = %load.path.display(), "loaded config");
    }
    Ok(load)
}

pub fn apply_serve_overrides(config: &mut AppConfig, args: &ServeArgs) {
    if let Some(port) = args.port {
        config.server.port = port;
    }
    if let Some(host) = args.host.as_deref().map(str::trim).filter(|host| !host.is_empty()) {
        config.server.host = host.to_string();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn overrides_apply_for_one_run() {
        let mut config = AppConfig::default();
        apply_serve_overrides(
            &mut config,
            &ServeArgs {
                port: Some(9100),
                host: Some(" ".to_string()),
            },
        );
        assert_eq!(config.server.port, 9100);
        assert_eq!(config.server.host, "127.0.0.1");
    }
}
