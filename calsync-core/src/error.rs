//! Error types for calsync.

use std::fmt;

use thiserror::Error;

/// Which side of a sync a calendar reference belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Side {
    Source,
    Target,
}

impl fmt::Display for Side {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Side::Source => write!(f, "Source"),
            Side::Target => write!(f, "Target"),
        }
    }
}

/// Errors that can occur in calsync operations.
///
/// The first group is fatal for a run. `EventCreation` and `EventDeletion`
/// are per-item failures that are reported and skipped.
#[derive(Error, Debug)]
pub enum CalSyncError {
    #[error("Usage: calsync \"source_account→source_calendar\" \"target_account→target_calendar\" [--dry-run]")]
    InvalidArguments,

    #[error("{side} calendar \"{spec}\" not found.")]
    CalendarNotFound { side: Side, spec: String },

    #[error("Access to calendar was denied.")]
    AuthorizationDenied,

    #[error("No answer to calendar access request after {0}s.")]
    AuthorizationTimeout(u64),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Invalid date window: {0}")]
    DateWindow(String),

    #[error("Failed to create event: {0}")]
    EventCreation(#[source] Box<CalSyncError>),

    #[error("Failed to delete event: {0}")]
    EventDeletion(#[source] Box<CalSyncError>),

    #[error("Store error: {0}")]
    Store(String),

    #[error("Event '{0}' not found in calendar")]
    EventNotFound(String),

    #[error("ICS parse error: {0}")]
    IcsParse(String),

    #[error("ICS generation error: {0}")]
    IcsGenerate(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl CalSyncError {
    /// Whether this error ends the run. Per-item failures never do.
    pub fn is_fatal(&self) -> bool {
        matches!(
            self,
            CalSyncError::InvalidArguments
                | CalSyncError::CalendarNotFound { .. }
                | CalSyncError::AuthorizationDenied
                | CalSyncError::AuthorizationTimeout(_)
                | CalSyncError::Config(_)
                | CalSyncError::DateWindow(_)
        )
    }
}

/// Result type alias for calsync operations.
pub type CalSyncResult<T> = Result<T, CalSyncError>;
