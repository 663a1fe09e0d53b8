//! Error types for the botones-media crate.

use thiserror::Error;

/// All errors that can originate from merge and archive jobs.
#[derive(Debug, Error)]
pub enum MediaError {
    /// Wrong number of attachments; checked before any download.
    #[error("expected between {min} and {max} attachments, got {got}")]
    BadInputCount { got: usize, min: usize, max: usize },

    /// An attachment's declared type does not fit the job.
    #[error("attachment '{name}' is not a {expected} file")]
    WrongType { name: String, expected: &'static str },

    /// Fetching one input failed; the whole job is abandoned.
    #[error("download of '{name}' failed: {detail}")]
    Download { name: String, detail: String },

    /// The document stayed locked after the empty-password attempt.
    #[error("'{name}' is password-protected and cannot be merged")]
    PdfLocked { name: String },

    /// The bytes are not a readable PDF.
    #[error("'{name}' could not be read as a PDF: {detail}")]
    PdfParse { name: String, detail: String },

    /// Assembling or serializing the merged document failed.
    #[error("PDF assembly failed: {detail}")]
    PdfAssemble { detail: String },

    /// Both the stream-copy fast path and the re-encode fallback failed.
    /// Carries a bounded tail of the re-encode's stderr.
    #[error("video merge failed: {diagnostic}")]
    MergeFailed { diagnostic: String },

    /// The zip tool rejected the inputs.
    #[error("archive failed: {detail}")]
    ArchiveFailed { detail: String },

    /// Tool probing, spawning, or timeout from the command runner.
    #[error(transparent)]
    Exec(#[from] botones_exec::ExecError),

    /// Artifact persistence failed hard (persistence is normally
    /// non-fatal; this only surfaces from direct storage calls).
    #[error(transparent)]
    Storage(#[from] botones_storage::StorageError),

    /// Scratch-directory or artifact I/O failure.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl MediaError {
    /// True for errors the caller should have screened before deferring:
    /// bad counts, wrong types, missing tools. These reply privately and
    /// consume no resources.
    pub fn is_precondition(&self) -> bool {
        matches!(
            self,
            MediaError::BadInputCount { .. }
                | MediaError::WrongType { .. }
                | MediaError::Exec(botones_exec::ExecError::ToolMissing { .. })
        )
    }
}

/// Convenience alias used throughout this crate.
pub type Result<T> = std::result::Result<T, MediaError>;
