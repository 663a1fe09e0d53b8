//! The finished product of a merge job and how it leaves the pipeline.

use std::path::PathBuf;

use tracing::warn;

use botones_core::config::INLINE_ATTACHMENT_CEILING_BYTES;
use botones_storage::{OutputKind, StorageResolver};

/// Result of a completed job: bytes to hand back, and where they landed on
/// disk if the job persists its outputs.
#[derive(Debug)]
pub struct MergeOutcome {
    pub file_name: String,
    pub bytes: Vec<u8>,
    pub saved_to: Option<PathBuf>,
}

impl MergeOutcome {
    /// Whether the artifact fits under the platform's upload ceiling.
    pub fn inline(&self) -> bool {
        self.bytes.len() <= INLINE_ATTACHMENT_CEILING_BYTES
    }
}

/// Best-effort copy to durable storage. The merged bytes are already in
/// hand, so a full disk or bad permissions must not fail the job.
pub(crate) fn persist(
    storage: &StorageResolver,
    kind: OutputKind,
    name: &str,
    bytes: &[u8],
) -> Option<PathBuf> {
    match storage.save(kind, name, bytes) {
        Ok(path) => Some(path),
        Err(err) => {
            warn!(%name, %err, "could not persist merged output");
            None
        }
    }
}

pub(crate) fn timestamp_name(prefix: &str, ext: &str) -> String {
    format!(
        "{prefix}_{}.{ext}",
        chrono::Local::now().format("%Y%m%d_%H%M%S")
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn small_artifacts_are_inline() {
        let outcome = MergeOutcome {
            file_name: "merged.pdf".to_string(),
            bytes: vec![0u8; 512],
            saved_to: None,
        };
        assert!(outcome.inline());
    }

    #[test]
    fn the_ceiling_is_inclusive() {
        let at_limit = MergeOutcome {
            file_name: "merged.mp4".to_string(),
            bytes: vec![0u8; INLINE_ATTACHMENT_CEILING_BYTES],
            saved_to: None,
        };
        assert!(at_limit.inline());

        let over = MergeOutcome {
            file_name: "merged.mp4".to_string(),
            bytes: vec![0u8; INLINE_ATTACHMENT_CEILING_BYTES + 1],
            saved_to: None,
        };
        assert!(!over.inline());
    }

    #[test]
    fn timestamp_names_carry_prefix_and_extension() {
        let name = timestamp_name("merged", "mp4");
        assert!(name.starts_with("merged_"));
        assert!(name.ends_with(".mp4"));
    }
}
