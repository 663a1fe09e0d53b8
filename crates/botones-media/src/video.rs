//! Video concatenation via ffmpeg.
//!
//! Two-stage strategy: first try the concat demuxer with stream copy, which
//! finishes in seconds when the inputs share codecs and parameters. When
//! ffmpeg rejects that (or produces nothing), fall back to a full re-encode
//! through the concat filter, normalizing every input to a common canvas.

use std::ffi::{OsStr, OsString};
use std::path::{Path, PathBuf};

use tracing::{info, warn};

use botones_core::config::{DIAGNOSTIC_TAIL_CHARS, MERGE_MAX_INPUTS, MERGE_MIN_INPUTS};
use botones_exec::{probe, run, tail_chars, RunOptions};
use botones_storage::{OutputKind, StorageResolver};

use crate::artifact::{persist, timestamp_name, MergeOutcome};
use crate::download::fetch_all;
use crate::error::{MediaError, Result};
use crate::scratch::ScratchDir;
use crate::validate::{validate_inputs, InputKind, MediaSource};

const FFMPEG_TIMEOUT_SECS: u64 = 300;
const FFPROBE_TIMEOUT_SECS: u64 = 30;

fn ffmpeg_options() -> RunOptions {
    RunOptions {
        timeout_secs: FFMPEG_TIMEOUT_SECS,
        max_output_chars: 8_000,
    }
}

/// Merge 2 to 5 videos into one mp4. Validates inputs and tool presence
/// before touching the network, so early failures have no side effects.
pub async fn merge_videos(
    client: &reqwest::Client,
    storage: &StorageResolver,
    sources: &[MediaSource],
) -> Result<MergeOutcome> {
    validate_inputs(InputKind::Video, sources, MERGE_MIN_INPUTS, MERGE_MAX_INPUTS)?;
    probe("ffmpeg")?;
    probe("ffprobe")?;

    let scratch = ScratchDir::create("merge-videos").await?;
    let merged = run_merge(client, &scratch, sources).await;
    scratch.cleanup().await;
    let bytes = merged?;

    let file_name = timestamp_name("merged", "mp4");
    let saved_to = persist(storage, OutputKind::MergedVideos, &file_name, &bytes);
    info!(
        inputs = sources.len(),
        bytes = bytes.len(),
        "videos merged"
    );
    Ok(MergeOutcome {
        file_name,
        bytes,
        saved_to,
    })
}

async fn run_merge(
    client: &reqwest::Client,
    scratch: &ScratchDir,
    sources: &[MediaSource],
) -> Result<Vec<u8>> {
    let inputs = fetch_all(client, scratch, sources).await?;

    match stream_copy(scratch, &inputs).await? {
        FastPath::Merged(bytes) => Ok(bytes),
        FastPath::Rejected { diagnostic } => {
            warn!(%diagnostic, "stream copy rejected, re-encoding");
            reencode(scratch, &inputs).await
        }
    }
}

enum FastPath {
    Merged(Vec<u8>),
    Rejected { diagnostic: String },
}

/// Concat demuxer with `-c copy`. Accepted only when ffmpeg exits zero AND
/// left a non-empty file; ffmpeg sometimes exits zero after writing a
/// header-only output for mismatched streams.
async fn stream_copy(scratch: &ScratchDir, inputs: &[PathBuf]) -> Result<FastPath> {
    let list_path = scratch.file("concat.txt");
    let mut list = String::new();
    for input in inputs {
        list.push_str(&format!("file '{}'\n", input.display()));
    }
    tokio::fs::write(&list_path, list).await?;

    let out = scratch.file("fast.mp4");
    let args: Vec<&OsStr> = vec![
        OsStr::new("-y"),
        OsStr::new("-f"),
        OsStr::new("concat"),
        OsStr::new("-safe"),
        OsStr::new("0"),
        OsStr::new("-i"),
        list_path.as_os_str(),
        OsStr::new("-c"),
        OsStr::new("copy"),
        out.as_os_str(),
    ];
    let output = run("ffmpeg", args, ffmpeg_options()).await?;

    if output.success() && file_nonempty(&out).await {
        return Ok(FastPath::Merged(tokio::fs::read(&out).await?));
    }
    Ok(FastPath::Rejected {
        diagnostic: tail_chars(output.stderr.trim(), DIAGNOSTIC_TAIL_CHARS),
    })
}

/// Full re-encode through the concat filter. Audio is mapped only when
/// every input has an audio stream; mixing silent and sounded inputs makes
/// the filter graph fail outright.
async fn reencode(scratch: &ScratchDir, inputs: &[PathBuf]) -> Result<Vec<u8>> {
    let with_audio = all_have_audio(inputs).await;
    let filter = concat_filter(inputs.len(), with_audio);
    let out = scratch.file("merged.mp4");

    let mut args: Vec<OsString> = vec![OsString::from("-y")];
    for input in inputs {
        args.push(OsString::from("-i"));
        args.push(input.as_os_str().to_os_string());
    }
    args.push(OsString::from("-filter_complex"));
    args.push(OsString::from(&filter));
    args.push(OsString::from("-map"));
    args.push(OsString::from("[v]"));
    if with_audio {
        args.push(OsString::from("-map"));
        args.push(OsString::from("[a]"));
    }
    args.push(OsString::from("-c:v"));
    args.push(OsString::from("libx264"));
    args.push(OsString::from("-crf"));
    args.push(OsString::from("23"));
    args.push(OsString::from("-preset"));
    args.push(OsString::from("veryfast"));
    if with_audio {
        args.push(OsString::from("-c:a"));
        args.push(OsString::from("aac"));
    } else {
        args.push(OsString::from("-an"));
    }
    args.push(out.as_os_str().to_os_string());

    let output = run("ffmpeg", args, ffmpeg_options()).await?;
    if !output.success() || !file_nonempty(&out).await {
        return Err(MediaError::MergeFailed {
            diagnostic: tail_chars(output.stderr.trim(), DIAGNOSTIC_TAIL_CHARS),
        });
    }
    Ok(tokio::fs::read(&out).await?)
}

/// ffprobe each input for an audio stream. Any probe failure counts as "no
/// audio" so the merge degrades to video-only instead of erroring.
async fn all_have_audio(inputs: &[PathBuf]) -> bool {
    for input in inputs {
        let args: Vec<&OsStr> = vec![
            OsStr::new("-v"),
            OsStr::new("error"),
            OsStr::new("-select_streams"),
            OsStr::new("a"),
            OsStr::new("-show_entries"),
            OsStr::new("stream=codec_type"),
            OsStr::new("-of"),
            OsStr::new("csv=p=0"),
            input.as_os_str(),
        ];
        let options = RunOptions {
            timeout_secs: FFPROBE_TIMEOUT_SECS,
            ..RunOptions::default()
        };
        match run("ffprobe", args, options).await {
            Ok(output) if output.success() && !output.stdout.trim().is_empty() => {}
            _ => return false,
        }
    }
    true
}

/// Build the concat filter graph: normalize each input to 1280x720 at 30fps
/// (padded, aspect preserved), then concatenate.
fn concat_filter(n: usize, with_audio: bool) -> String {
    let mut filter = String::new();
    for i in 0..n {
        filter.push_str(&format!(
            "[{i}:v]scale=1280:720:force_original_aspect_ratio=decrease,\
             pad=1280:720:(ow-iw)/2:(oh-ih)/2,setsar=1,fps=30[v{i}];"
        ));
    }
    for i in 0..n {
        filter.push_str(&format!("[v{i}]"));
        if with_audio {
            filter.push_str(&format!("[{i}:a]"));
        }
    }
    if with_audio {
        filter.push_str(&format!("concat=n={n}:v=1:a=1[v][a]"));
    } else {
        filter.push_str(&format!("concat=n={n}:v=1:a=0[v]"));
    }
    filter
}

async fn file_nonempty(path: &Path) -> bool {
    match tokio::fs::metadata(path).await {
        Ok(meta) => meta.len() > 0,
        Err(_) => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn filter_graph_with_audio() {
        let filter = concat_filter(2, true);
        assert!(filter.starts_with(
            "[0:v]scale=1280:720:force_original_aspect_ratio=decrease,\
             pad=1280:720:(ow-iw)/2:(oh-ih)/2,setsar=1,fps=30[v0];"
        ));
        assert!(filter.contains("[v0][0:a][v1][1:a]"));
        assert!(filter.ends_with("concat=n=2:v=1:a=1[v][a]"));
    }

    #[test]
    fn filter_graph_without_audio() {
        let filter = concat_filter(3, false);
        assert!(filter.contains("[v0][v1][v2]"));
        assert!(!filter.contains(":a]"));
        assert!(filter.ends_with("concat=n=3:v=1:a=0[v]"));
    }

    #[test]
    fn wrong_attachment_type_fails_before_any_work() {
        let sources = vec![
            MediaSource {
                name: "a.mp4".to_string(),
                content_type: Some("video/mp4".to_string()),
                url: String::new(),
                size: 0,
            },
            MediaSource {
                name: "slides.pdf".to_string(),
                content_type: Some("application/pdf".to_string()),
                url: String::new(),
                size: 0,
            },
        ];
        let err =
            validate_inputs(InputKind::Video, &sources, MERGE_MIN_INPUTS, MERGE_MAX_INPUTS)
                .unwrap_err();
        assert!(matches!(err, MediaError::WrongType { .. }));
    }
}
