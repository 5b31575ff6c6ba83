use thiserror::Error;

/// Errors surfaced by the library.
///
/// Most failures in this application are soft (see [`crate::storage`]), so
/// this enum only covers what a caller can meaningfully react to.
#[derive(Debug, Error)]
pub enum MomentumError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("invalid date '{0}', use YYYY-MM-DD or a phrase like 'tomorrow'")]
    InvalidDate(String),

    #[error("invalid time '{0}', use HH:MM")]
    InvalidTime(String),

    #[error("unknown priority '{0}', supported: high, medium, low")]
    InvalidPriority(String),

    #[error("unknown recurrence '{0}', supported: daily, weekly, monthly, custom")]
    InvalidRecurrence(String),

    #[error("unknown date range '{0}', supported: 7d, 1m, 6m, 12m, all")]
    InvalidRange(String),

    #[error("{kind} '{query}' not found")]
    NotFound { kind: &'static str, query: String },

    #[error("invalid backup: {0}")]
    InvalidBackup(String),

    #[error("{0}")]
    Rejected(String),
}

pub type Result<T> = std::result::Result<T, MomentumError>;
