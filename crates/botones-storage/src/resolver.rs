//! Output directory resolution and collision-free naming.

use crate::error::Result;
use std::path::{Path, PathBuf};
use tracing::{info, warn};

/// The artifact families that get persisted, each under its own
/// subdirectory of the resolved base.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputKind {
    Screenshots,
    MergedPdfs,
    MergedVideos,
}

impl OutputKind {
    /// Directory name under the base. These names are part of the bot's
    /// on-disk contract and must not change between releases.
    pub fn dir_name(&self) -> &'static str {
        match self {
            OutputKind::Screenshots => "Screenshots",
            OutputKind::MergedPdfs => "Merged pdfs",
            OutputKind::MergedVideos => "Merged videos",
        }
    }
}

/// Resolves the base output directory and persists artifacts under it.
#[derive(Debug, Clone)]
pub struct StorageResolver {
    base_override: Option<PathBuf>,
}

impl StorageResolver {
    /// `base_override` comes from `storage.base_dir` in the config (or the
    /// matching `BOTONES_STORAGE__BASE_DIR` env var) and wins unconditionally
    /// when set.
    pub fn new(base_override: Option<PathBuf>) -> Self {
        Self { base_override }
    }

    /// Resolve the base directory for this invocation.
    ///
    /// The result is not cached: directories can appear or vanish while the
    /// bot runs (mounts, reinstalls), so each operation re-resolves.
    pub fn resolve_base(&self) -> PathBuf {
        if let Some(dir) = &self.base_override {
            return dir.clone();
        }
        for candidate in well_known_candidates() {
            if candidate.is_dir() {
                return candidate;
            }
        }
        std::env::current_dir().unwrap_or_else(|_| PathBuf::from("."))
    }

    /// Return `base/<kind>`, creating it if absent. If the resolved base is
    /// not writable the kind directory is created under the cwd instead.
    pub fn output_dir(&self, kind: OutputKind) -> Result<PathBuf> {
        let dir = self.resolve_base().join(kind.dir_name());
        if let Err(e) = std::fs::create_dir_all(&dir) {
            warn!(
                "cannot create {}: {e}; falling back to the working directory",
                dir.display()
            );
            let fallback = std::env::current_dir()?.join(kind.dir_name());
            std::fs::create_dir_all(&fallback)?;
            return Ok(fallback);
        }
        Ok(dir)
    }

    /// Persist `bytes` under `kind` with a collision-free variant of
    /// `desired_name`. Returns the path actually written.
    pub fn save(&self, kind: OutputKind, desired_name: &str, bytes: &[u8]) -> Result<PathBuf> {
        let dir = self.output_dir(kind)?;
        let path = unique_name(&dir, desired_name);
        std::fs::write(&path, bytes)?;
        info!(
            "saved {} ({} bytes) to {}",
            desired_name,
            bytes.len(),
            path.display()
        );
        Ok(path)
    }
}

/// Pick a path under `dir` that does not exist yet.
///
/// Tries `filename` as-is, then `stem_01.ext` … `stem_99.ext`, then a
/// unix-timestamp suffix as the unconditional fallback.
pub fn unique_name(dir: &Path, filename: &str) -> PathBuf {
    let direct = dir.join(filename);
    if !direct.exists() {
        return direct;
    }

    let (stem, ext) = split_name(filename);
    for n in 1..=99u32 {
        let candidate = dir.join(format!("{stem}_{n:02}{ext}"));
        if !candidate.exists() {
            return candidate;
        }
    }

    let ts = chrono::Utc::now().timestamp();
    dir.join(format!("{stem}_{ts}{ext}"))
}

/// Split "video.mp4" into ("video", ".mp4"); extensionless names keep an
/// empty suffix.
fn split_name(filename: &str) -> (&str, String) {
    match filename.rsplit_once('.') {
        Some((stem, ext)) if !stem.is_empty() => (stem, format!(".{ext}")),
        _ => (filename, String::new()),
    }
}

fn well_known_candidates() -> Vec<PathBuf> {
    let mut candidates = vec![
        PathBuf::from("/srv/botones"),
        PathBuf::from("/var/lib/botones"),
    ];
    if let Ok(home) = std::env::var("HOME") {
        candidates.push(PathBuf::from(home).join("botones"));
    }
    candidates
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn free_name_is_used_directly() {
        let tmp = tempfile::tempdir().unwrap();
        let path = unique_name(tmp.path(), "shot.png");
        assert_eq!(path, tmp.path().join("shot.png"));
    }

    #[test]
    fn taken_name_gets_zero_padded_suffix() {
        let tmp = tempfile::tempdir().unwrap();
        std::fs::write(tmp.path().join("shot.png"), b"x").unwrap();

        let path = unique_name(tmp.path(), "shot.png");
        assert_eq!(path, tmp.path().join("shot_01.png"));

        std::fs::write(&path, b"x").unwrap();
        let next = unique_name(tmp.path(), "shot.png");
        assert_eq!(next, tmp.path().join("shot_02.png"));
    }

    #[test]
    fn exhausted_suffixes_fall_back_to_timestamp() {
        let tmp = tempfile::tempdir().unwrap();
        std::fs::write(tmp.path().join("a.pdf"), b"x").unwrap();
        for n in 1..=99 {
            std::fs::write(tmp.path().join(format!("a_{n:02}.pdf")), b"x").unwrap();
        }

        let path = unique_name(tmp.path(), "a.pdf");
        let name = path.file_name().unwrap().to_str().unwrap();
        let ts = name
            .strip_prefix("a_")
            .and_then(|s| s.strip_suffix(".pdf"))
            .unwrap();
        assert!(ts.parse::<i64>().is_ok());
        assert!(!path.exists());
    }

    #[test]
    fn extensionless_names_are_suffixed_whole() {
        let tmp = tempfile::tempdir().unwrap();
        std::fs::write(tmp.path().join("README"), b"x").unwrap();
        let path = unique_name(tmp.path(), "README");
        assert_eq!(path, tmp.path().join("README_01"));
    }

    #[test]
    fn override_wins_and_kind_dir_is_created() {
        let tmp = tempfile::tempdir().unwrap();
        let resolver = StorageResolver::new(Some(tmp.path().to_path_buf()));

        assert_eq!(resolver.resolve_base(), tmp.path());

        let dir = resolver.output_dir(OutputKind::MergedPdfs).unwrap();
        assert_eq!(dir, tmp.path().join("Merged pdfs"));
        assert!(dir.is_dir());
    }

    #[test]
    fn save_writes_and_never_overwrites() {
        let tmp = tempfile::tempdir().unwrap();
        let resolver = StorageResolver::new(Some(tmp.path().to_path_buf()));

        let first = resolver
            .save(OutputKind::Screenshots, "page.png", b"one")
            .unwrap();
        let second = resolver
            .save(OutputKind::Screenshots, "page.png", b"two")
            .unwrap();

        assert_ne!(first, second);
        assert_eq!(std::fs::read(&first).unwrap(), b"one");
        assert_eq!(std::fs::read(&second).unwrap(), b"two");
    }

    #[test]
    fn kind_dir_names_are_stable() {
        assert_eq!(OutputKind::Screenshots.dir_name(), "Screenshots");
        assert_eq!(OutputKind::MergedPdfs.dir_name(), "Merged pdfs");
        assert_eq!(OutputKind::MergedVideos.dir_name(), "Merged videos");
    }
}
