use serde::Serialize;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum AppError {
    #[error("fetch usage data: {0}")]
    Fetch(#[from] ingest::IngestError),
    #[error("engine error: {0}")]
    Engine(#[from] usage_engine::EngineError),
    #[error("account lookup failed: {0}")]
    AccountLookup(String),
    #[error("config error: {0}")]
    Config(String),
    #[error("{0}")]
    InvalidInput(String),
    #[error("{0}")]
    Unavailable(String),
}

pub type Result<T> = std::result::Result<T, AppError>;

#[derive(Debug, Serialize)]
pub struct ApiError {
    pub status: u16,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub code: Option<String>,
}

impl From<AppError> for ApiError {
    fn from(err: AppError) -> Self {
        let (status, code) = match &err {
            AppError::InvalidInput(_)
            | AppError::Engine(usage_engine::EngineError::InvalidGrouping(_)) => {
                (400, Some("invalid_input".to_string()))
            }
            AppError::Unavailable(_) => (503, Some("snapshot_unavailable".to_string())),
            AppError::Fetch(_) => (503, Some("fetch_failed".to_string())),
            AppError::AccountLookup(_) => (502, Some("account_lookup_failed".to_string())),
            AppError::Engine(_) | AppError::Config(_) => (500, None),
        };
        Self {
            status,
            message: err.to_string(),
            code,
        }
    }
}
