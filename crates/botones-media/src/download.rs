//! Concurrent attachment downloads into a job's scratch directory.

use std::collections::HashSet;
use std::path::PathBuf;
use std::time::Duration;

use futures_util::future::try_join_all;
use tracing::debug;

use crate::error::{MediaError, Result};
use crate::scratch::ScratchDir;
use crate::validate::MediaSource;

/// Attachments can be large; the shared client's default timeout is tuned
/// for small API calls, so downloads get their own generous deadline.
const DOWNLOAD_TIMEOUT_SECS: u64 = 120;

/// Download every source into `scratch`, preserving input order. Files are
/// named `input_00.ext`, `input_01.ext`, ... so downstream tooling never
/// trips over user-supplied names.
pub async fn fetch_all(
    client: &reqwest::Client,
    scratch: &ScratchDir,
    sources: &[MediaSource],
) -> Result<Vec<PathBuf>> {
    let jobs = sources.iter().enumerate().map(|(i, source)| {
        let file_name = match extension_of(&source.name) {
            Some(ext) => format!("input_{i:02}.{ext}"),
            None => format!("input_{i:02}"),
        };
        fetch_one(client, source, scratch.file(&file_name))
    });
    try_join_all(jobs).await
}

/// Download every source keeping (sanitized) original names, deduplicating
/// collisions. Used by jobs where the name survives into the output.
pub async fn fetch_all_keeping_names(
    client: &reqwest::Client,
    scratch: &ScratchDir,
    sources: &[MediaSource],
) -> Result<Vec<PathBuf>> {
    let names = assign_names(sources);
    let jobs = sources
        .iter()
        .zip(names)
        .map(|(source, name)| fetch_one(client, source, scratch.file(&name)));
    try_join_all(jobs).await
}

async fn fetch_one(
    client: &reqwest::Client,
    source: &MediaSource,
    dest: PathBuf,
) -> Result<PathBuf> {
    let response = client
        .get(&source.url)
        .timeout(Duration::from_secs(DOWNLOAD_TIMEOUT_SECS))
        .send()
        .await
        .map_err(|err| MediaError::Download {
            name: source.name.clone(),
            detail: err.to_string(),
        })?;
    if !response.status().is_success() {
        return Err(MediaError::Download {
            name: source.name.clone(),
            detail: format!("HTTP {}", response.status().as_u16()),
        });
    }
    let bytes = response.bytes().await.map_err(|err| MediaError::Download {
        name: source.name.clone(),
        detail: err.to_string(),
    })?;
    debug!(name = %source.name, bytes = bytes.len(), "fetched attachment");
    tokio::fs::write(&dest, &bytes).await?;
    Ok(dest)
}

fn extension_of(filename: &str) -> Option<String> {
    let (_, ext) = filename.rsplit_once('.')?;
    if ext.is_empty() || ext.contains('/') {
        return None;
    }
    Some(ext.to_lowercase())
}

/// Sanitize and deduplicate the original names, in input order.
fn assign_names(sources: &[MediaSource]) -> Vec<String> {
    let mut taken = HashSet::new();
    sources
        .iter()
        .enumerate()
        .map(|(i, source)| {
            let base = sanitize_name(&source.name, i);
            let mut candidate = base.clone();
            let mut n = 1;
            while !taken.insert(candidate.clone()) {
                n += 1;
                candidate = format!("{n}_{base}");
            }
            candidate
        })
        .collect()
}

fn sanitize_name(name: &str, index: usize) -> String {
    let cleaned: String = name
        .chars()
        .map(|c| {
            if c.is_control() || c == '/' || c == '\\' {
                '_'
            } else {
                c
            }
        })
        .collect();
    let trimmed = cleaned.trim_start_matches('.');
    if trimmed.is_empty() {
        format!("file_{index:02}")
    } else {
        trimmed.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn source(name: &str) -> MediaSource {
        MediaSource {
            name: name.to_string(),
            content_type: None,
            url: String::new(),
            size: 0,
        }
    }

    #[test]
    fn extensions_are_lowercased() {
        assert_eq!(extension_of("CLIP.MP4"), Some("mp4".to_string()));
        assert_eq!(extension_of("noext"), None);
        assert_eq!(extension_of("trailing."), None);
    }

    #[test]
    fn sanitize_strips_separators_and_leading_dots() {
        assert_eq!(sanitize_name("../../etc/passwd", 0), ".._.._etc_passwd");
        assert_eq!(sanitize_name("..hidden", 3), "hidden");
        assert_eq!(sanitize_name("...", 7), "file_07");
        assert_eq!(sanitize_name("report.pdf", 0), "report.pdf");
    }

    #[test]
    fn duplicate_names_get_numbered() {
        let sources = vec![source("a.txt"), source("a.txt"), source("a.txt")];
        let names = assign_names(&sources);
        assert_eq!(names, vec!["a.txt", "2_a.txt", "3_a.txt"]);
    }
}
