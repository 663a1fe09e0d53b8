//! Attachment jobs: `/mergevideos`, `/mergepdfs`, `/zip`.
//!
//! Counts, declared types, and external tools are all checked before the
//! response is deferred, so precondition failures are private and cost
//! nothing. The pipeline re-validates internally.

use std::sync::Arc;

use serenity::model::application::CommandInteraction;
use serenity::prelude::Context;

use botones_core::config::{MERGE_MAX_INPUTS, MERGE_MIN_INPUTS};
use botones_exec::probe;
use botones_media::{
    archive_files, merge_pdfs, merge_videos, validate_inputs, InputKind, MediaError, MergeOutcome,
};

use crate::context::BotContext;
use crate::reply::{attachment_sources, defer, edit_chunked, followup_file, respond_ephemeral};

pub async fn handle_merge_videos(
    app: &Arc<BotContext>,
    ctx: &Context,
    command: &CommandInteraction,
) -> Result<(), serenity::Error> {
    let sources = attachment_sources(command, "video");
    if let Err(e) = validate_inputs(InputKind::Video, &sources, MERGE_MIN_INPUTS, MERGE_MAX_INPUTS)
    {
        respond_ephemeral(ctx, command, &e.to_string()).await;
        return Ok(());
    }
    if let Err(e) = probe("ffmpeg").and_then(|_| probe("ffprobe")) {
        respond_ephemeral(ctx, command, &e.to_string()).await;
        return Ok(());
    }

    defer(ctx, command, false).await?;

    match merge_videos(app.api.http(), &app.storage, &sources).await {
        Ok(outcome) => deliver(ctx, command, outcome).await,
        Err(e) => edit_chunked(ctx, command, &failure_text("Video merge", &e)).await,
    }
}

pub async fn handle_merge_pdfs(
    app: &Arc<BotContext>,
    ctx: &Context,
    command: &CommandInteraction,
) -> Result<(), serenity::Error> {
    let sources = attachment_sources(command, "pdf");
    if let Err(e) = validate_inputs(InputKind::Pdf, &sources, MERGE_MIN_INPUTS, MERGE_MAX_INPUTS) {
        respond_ephemeral(ctx, command, &e.to_string()).await;
        return Ok(());
    }

    defer(ctx, command, false).await?;

    match merge_pdfs(app.api.http(), &app.storage, &sources).await {
        Ok(outcome) => deliver(ctx, command, outcome).await,
        Err(e) => edit_chunked(ctx, command, &failure_text("PDF merge", &e)).await,
    }
}

pub async fn handle_zip(
    app: &Arc<BotContext>,
    ctx: &Context,
    command: &CommandInteraction,
) -> Result<(), serenity::Error> {
    let sources = attachment_sources(command, "file");
    if let Err(e) = validate_inputs(InputKind::Any, &sources, 1, MERGE_MAX_INPUTS) {
        respond_ephemeral(ctx, command, &e.to_string()).await;
        return Ok(());
    }
    if let Err(e) = probe("zip") {
        respond_ephemeral(ctx, command, &e.to_string()).await;
        return Ok(());
    }

    defer(ctx, command, false).await?;

    match archive_files(app.api.http(), &sources).await {
        Ok(outcome) => deliver(ctx, command, outcome).await,
        Err(e) => edit_chunked(ctx, command, &failure_text("Archiving", &e)).await,
    }
}

/// Attach the artifact when it fits the ceiling; otherwise report where it
/// landed on disk (if anywhere).
async fn deliver(
    ctx: &Context,
    command: &CommandInteraction,
    outcome: MergeOutcome,
) -> Result<(), serenity::Error> {
    if outcome.inline() {
        let mut note = format!("Done: `{}`", outcome.file_name);
        if let Some(ref path) = outcome.saved_to {
            note.push_str(&format!(" (saved to `{}`)", path.display()));
        }
        return followup_file(ctx, command, &note, &outcome.file_name, outcome.bytes).await;
    }

    let size_mib = outcome.bytes.len() / (1024 * 1024);
    let text = match outcome.saved_to {
        Some(path) => format!(
            "The result is {size_mib} MiB, too large to attach. Saved to `{}`.",
            path.display()
        ),
        None => format!(
            "The result is {size_mib} MiB, too large to attach, and it was not persisted."
        ),
    };
    edit_chunked(ctx, command, &text).await
}

fn failure_text(job: &str, err: &MediaError) -> String {
    match err {
        MediaError::MergeFailed { diagnostic } => {
            format!("\u{26a0}\u{fe0f} {job} failed. ffmpeg said:\n```\n{diagnostic}\n```")
        }
        other => format!("\u{26a0}\u{fe0f} {job} failed: {other}"),
    }
}
