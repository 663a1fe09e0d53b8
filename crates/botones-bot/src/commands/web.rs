//! Web utilities: `/shorten`, `/qr`, `/screenshot`.

use std::sync::Arc;

use serenity::model::application::CommandInteraction;
use serenity::prelude::Context;
use tracing::warn;

use botones_core::config::INLINE_ATTACHMENT_CEILING_BYTES;
use botones_storage::OutputKind;

use crate::context::BotContext;
use crate::reply::{defer, edit_chunked, followup_file, opt_str, respond_ephemeral};

fn looks_like_url(url: &str) -> bool {
    url.starts_with("http://") || url.starts_with("https://")
}

pub async fn handle_shorten(
    app: &Arc<BotContext>,
    ctx: &Context,
    command: &CommandInteraction,
) -> Result<(), serenity::Error> {
    let url = opt_str(command, "url").unwrap_or("").trim().to_string();
    if !looks_like_url(&url) {
        respond_ephemeral(ctx, command, "The URL must start with http:// or https://.").await;
        return Ok(());
    }

    defer(ctx, command, false).await?;

    let text = match app.api.shorten(&url).await {
        Ok(short) => format!("<{short}>"),
        Err(e) => format!("\u{26a0}\u{fe0f} shortening failed: {e}"),
    };

    edit_chunked(ctx, command, &text).await
}

pub async fn handle_qr(
    app: &Arc<BotContext>,
    ctx: &Context,
    command: &CommandInteraction,
) -> Result<(), serenity::Error> {
    let text = opt_str(command, "text").unwrap_or("").trim().to_string();
    if text.is_empty() {
        respond_ephemeral(ctx, command, "Give me some text to encode.").await;
        return Ok(());
    }

    defer(ctx, command, false).await?;

    match app.api.qr_png(&text).await {
        Ok(bytes) => followup_file(ctx, command, "Here you go:", "qr.png", bytes).await,
        Err(e) => {
            edit_chunked(ctx, command, &format!("\u{26a0}\u{fe0f} QR generation failed: {e}"))
                .await
        }
    }
}

pub async fn handle_screenshot(
    app: &Arc<BotContext>,
    ctx: &Context,
    command: &CommandInteraction,
) -> Result<(), serenity::Error> {
    let url = opt_str(command, "url").unwrap_or("").trim().to_string();
    if !looks_like_url(&url) {
        respond_ephemeral(ctx, command, "The URL must start with http:// or https://.").await;
        return Ok(());
    }

    defer(ctx, command, false).await?;

    let bytes = match app.api.screenshot_png(&url).await {
        Ok(bytes) => bytes,
        Err(e) => {
            return edit_chunked(ctx, command, &format!("\u{26a0}\u{fe0f} screenshot failed: {e}"))
                .await;
        }
    };

    let file_name = format!(
        "screenshot_{}.png",
        chrono::Local::now().format("%Y%m%d_%H%M%S")
    );

    // Keep a copy on disk; losing it only costs the local archive.
    let saved_to = match app
        .storage
        .save(OutputKind::Screenshots, &file_name, &bytes)
    {
        Ok(path) => Some(path),
        Err(e) => {
            warn!(%file_name, error = %e, "could not persist screenshot");
            None
        }
    };

    if bytes.len() <= INLINE_ATTACHMENT_CEILING_BYTES {
        followup_file(ctx, command, &format!("<{url}>"), &file_name, bytes).await
    } else {
        let text = match saved_to {
            Some(path) => format!(
                "The screenshot is too large to attach; saved to `{}`.",
                path.display()
            ),
            None => "The screenshot is too large to attach and could not be saved.".to_string(),
        };
        edit_chunked(ctx, command, &text).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn url_guard_requires_a_scheme() {
        assert!(looks_like_url("https://example.com"));
        assert!(looks_like_url("http://example.com/path?q=1"));
        assert!(!looks_like_url("example.com"));
        assert!(!looks_like_url("ftp://example.com"));
        assert!(!looks_like_url(""));
    }
}
