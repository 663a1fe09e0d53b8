//! Error types for the botones-exec crate.

use thiserror::Error;

/// All errors that can originate from one-shot command execution.
#[derive(Debug, Error)]
pub enum ExecError {
    /// The tool is not installed or not on PATH.
    #[error("required tool not found on PATH: {tool}")]
    ToolMissing { tool: String },

    /// Child-process spawn failed.
    #[error("spawn error: {0}")]
    Spawn(String),

    /// The child exceeded its time budget and was killed.
    #[error("command timed out after {ms}ms")]
    Timeout { ms: u64 },

    /// The child ran to completion but exited non-zero.
    #[error("command exited with status {code}: {detail}")]
    NonZero { code: i32, detail: String },

    /// Underlying I/O failure while waiting on the child.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Convenience alias used throughout this crate.
pub type Result<T> = std::result::Result<T, ExecError>;
