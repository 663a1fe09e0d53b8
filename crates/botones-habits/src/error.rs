use thiserror::Error;

/// Errors that can occur within the habit registry.
#[derive(Debug, Error)]
pub enum HabitError {
    /// Intervals below one minute are rejected before any task is spawned.
    #[error("interval must be at least 1 minute (got {minutes})")]
    BadInterval { minutes: i64 },

    /// No habit with the given key exists in the registry.
    #[error("no habit registered under: {key}")]
    NotFound { key: String },
}

pub type Result<T> = std::result::Result<T, HabitError>;
