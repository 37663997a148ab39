use std::path::PathBuf;

use usage_app::AppState;

#[derive(Clone)]
pub struct AppContext {
    pub app_state: AppState,
    /// Where the loaded config lives, when it came from disk.
    pub config_path: Option<PathBuf>,
}

impl AppContext {
    pub fn new(app_state: AppState) -> Self {
        Self {
            app_state,
            config_path: None,
        }
    }

    pub fn with_config_path(mut self, path: PathBuf) -> Self {
        self.config_path = Some(path);
        self
    }
}
