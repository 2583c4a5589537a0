use std::time::Duration;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum AnalyticsError {
    /// The caller sent an incomplete tracking request; nothing was written
    #[error("{0}")]
    Validation(String),
    #[error("analytics queries exceeded {0:?}")]
    Timeout(Duration),
    #[error(transparent)]
    Storage(#[from] anyhow::Error),
}

pub type AnalyticsResult<T> = Result<T, AnalyticsError>;
