use thiserror::Error;

#[derive(Debug, Error)]
pub enum KisetsuError {
    #[error("search unavailable: {0}")]
    SearchUnavailable(String),

    #[error("invalid quarter: {0:?}")]
    InvalidQuarter(String),

    #[error("{0}")]
    SyncFailure(String),

    #[error("storage error: {0}")]
    Storage(#[from] rusqlite::Error),

    #[error("config error: {0}")]
    Config(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}
