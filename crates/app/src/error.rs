use feed_sync::{FeedError, SyncError};
use serde::Serialize;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum AppError {
    #[error("db error: {0}")]
    Db(#[from] points_db::DbError),
    #[error("sync error: {0}")]
    Sync(#[from] SyncError),
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
    #[error("{0}")]
    InvalidInput(String),
    #[error("{0}")]
    NotFound(String),
    #[error("{0}")]
    Message(String),
}

impl From<FeedError> for AppError {
    fn from(err: FeedError) -> Self {
        Self::Sync(SyncError::Feed(err))
    }
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
            AppError::InvalidInput(_) => (400, Some("invalid_input")),
            AppError::NotFound(_) => (404, Some("not_found")),
            AppError::Sync(SyncError::Feed(feed)) if feed.is_parse() => (502, Some("feed_parse")),
            AppError::Sync(SyncError::Feed(_)) => (502, Some("feed_unavailable")),
            AppError::Db(_)
            | AppError::Sync(SyncError::Db(_))
            | AppError::Io(_)
            | AppError::Message(_) => (500, None),
        };
        Self {
            status,
            message: err.to_string(),
            code: code.map(str::to_string),
        }
    }
}
