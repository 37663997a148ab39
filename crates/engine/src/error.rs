#[derive(Debug, thiserror::Error)]
pub enum EngineError {
    #[error("invalid grouping: {0}")]
    InvalidGrouping(String),
    #[error("csv error: {0}")]
    Csv(#[from] csv::Error),
    #[error("export error: {0}")]
    Export(String),
}

pub type Result<T> = std::result::Result<T, EngineError>;
