//! Per-job scratch directories under the system temp dir.
//!
//! Every merge job works inside its own directory so concurrent jobs never
//! collide, and the whole tree is removed in one call once the job settles.

use std::path::{Path, PathBuf};

use tracing::warn;

use crate::error::Result;

/// A freshly created directory that the job owns outright.
pub struct ScratchDir {
    path: PathBuf,
}

impl ScratchDir {
    /// Create `$TMPDIR/botones-<label>-<pid>-<nonce>`.
    pub async fn create(label: &str) -> Result<Self> {
        let path = std::env::temp_dir().join(format!(
            "botones-{label}-{}-{}",
            std::process::id(),
            uuid::Uuid::new_v4().simple()
        ));
        tokio::fs::create_dir_all(&path).await?;
        Ok(Self { path })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn file(&self, name: &str) -> PathBuf {
        self.path.join(name)
    }

    /// Remove the directory and everything in it. Failures are logged and
    /// swallowed; cleanup must never mask the job's own result.
    pub async fn cleanup(self) {
        if let Err(err) = tokio::fs::remove_dir_all(&self.path).await {
            warn!(path = %self.path.display(), %err, "failed to remove scratch dir");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn create_and_cleanup_round_trip() {
        let scratch = ScratchDir::create("test").await.unwrap();
        let path = scratch.path().to_path_buf();
        assert!(path.exists());

        tokio::fs::write(scratch.file("probe.txt"), b"hello")
            .await
            .unwrap();

        scratch.cleanup().await;
        assert!(!path.exists());
    }

    #[tokio::test]
    async fn concurrent_jobs_get_distinct_dirs() {
        let a = ScratchDir::create("test").await.unwrap();
        let b = ScratchDir::create("test").await.unwrap();
        assert_ne!(a.path(), b.path());
        a.cleanup().await;
        b.cleanup().await;
    }
}
