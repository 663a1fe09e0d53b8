//! Zip archiving of attachments via the `zip` utility.

use std::ffi::OsString;

use tracing::info;

use botones_core::config::{DIAGNOSTIC_TAIL_CHARS, MERGE_MAX_INPUTS};
use botones_exec::{probe, run, tail_chars, RunOptions};

use crate::artifact::{timestamp_name, MergeOutcome};
use crate::download::fetch_all_keeping_names;
use crate::error::{MediaError, Result};
use crate::scratch::ScratchDir;
use crate::validate::{validate_inputs, InputKind, MediaSource};

/// A single attachment is a legitimate archive job, unlike the merges.
const ARCHIVE_MIN_INPUTS: usize = 1;
const ZIP_TIMEOUT_SECS: u64 = 120;

/// Bundle 1 to 5 attachments of any type into a zip. Archives are handed
/// back inline only and never persisted to the output directories.
pub async fn archive_files(
    client: &reqwest::Client,
    sources: &[MediaSource],
) -> Result<MergeOutcome> {
    validate_inputs(InputKind::Any, sources, ARCHIVE_MIN_INPUTS, MERGE_MAX_INPUTS)?;
    probe("zip")?;

    let scratch = ScratchDir::create("archive").await?;
    let zipped = run_archive(client, &scratch, sources).await;
    scratch.cleanup().await;
    let bytes = zipped?;

    info!(inputs = sources.len(), bytes = bytes.len(), "archive built");
    Ok(MergeOutcome {
        file_name: timestamp_name("archive", "zip"),
        bytes,
        saved_to: None,
    })
}

async fn run_archive(
    client: &reqwest::Client,
    scratch: &ScratchDir,
    sources: &[MediaSource],
) -> Result<Vec<u8>> {
    // Original names survive into the archive listing, so keep them.
    let inputs = fetch_all_keeping_names(client, scratch, sources).await?;
    let out = scratch.file("bundle.zip");

    // -j junks directory components, -q keeps stderr to real errors.
    let mut args: Vec<OsString> = vec![
        OsString::from("-j"),
        OsString::from("-q"),
        out.as_os_str().to_os_string(),
    ];
    for input in &inputs {
        args.push(input.as_os_str().to_os_string());
    }

    let options = RunOptions {
        timeout_secs: ZIP_TIMEOUT_SECS,
        ..RunOptions::default()
    };
    let output = run("zip", args, options).await?;
    if !output.success() {
        let stream = if output.stderr.trim().is_empty() {
            &output.stdout
        } else {
            &output.stderr
        };
        return Err(MediaError::ArchiveFailed {
            detail: tail_chars(stream.trim(), DIAGNOSTIC_TAIL_CHARS),
        });
    }
    Ok(tokio::fs::read(&out).await?)
}
