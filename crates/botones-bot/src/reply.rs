//! Reply plumbing shared by every command handler: message chunking, the
//! respond/defer/edit helpers, and typed option extraction.

use serenity::builder::{
    CreateAttachment, CreateInteractionResponse, CreateInteractionResponseFollowup,
    CreateInteractionResponseMessage, EditInteractionResponse,
};
use serenity::model::application::{CommandDataOption, CommandDataOptionValue, CommandInteraction};
use serenity::model::id::ChannelId;
use serenity::prelude::Context;

use botones_media::MediaSource;

/// Maximum characters per Discord message (2000 is the limit; we use 1950
/// for safety).
const CHUNK_MAX: usize = 1950;

/// Split `text` into chunks of at most [`CHUNK_MAX`] bytes, preferring
/// splits on whitespace/newline boundaries to avoid cutting words mid-way.
///
/// Splits always land on character boundaries, and no chunk is ever empty
/// (Discord rejects empty messages).
pub fn split_chunks(text: &str) -> Vec<String> {
    if text.len() <= CHUNK_MAX {
        return vec![text.to_string()];
    }

    let mut chunks = Vec::new();
    let mut remaining = text;

    while remaining.len() > CHUNK_MAX {
        // Largest char boundary that keeps the window within CHUNK_MAX.
        let mut boundary = CHUNK_MAX;
        while !remaining.is_char_boundary(boundary) {
            boundary -= 1;
        }

        let window = &remaining[..boundary];
        let split_at = window
            .rfind('\n')
            .or_else(|| window.rfind(' '))
            .filter(|&at| at > 0)
            .unwrap_or(boundary);

        chunks.push(remaining[..split_at].to_string());
        remaining = remaining[split_at..].trim_start();
    }

    if !remaining.is_empty() {
        chunks.push(remaining.to_string());
    }

    chunks
}

/// Send `text` to `channel_id` in chunk-sized messages.
pub async fn send_chunked(
    http: &serenity::http::Http,
    channel_id: ChannelId,
    text: &str,
) -> Result<(), serenity::Error> {
    for chunk in split_chunks(text) {
        channel_id.say(http, &chunk).await?;
    }
    Ok(())
}

/// Immediate public response, chunked into followups if long.
pub async fn respond_text(
    ctx: &Context,
    command: &CommandInteraction,
    content: &str,
) -> Result<(), serenity::Error> {
    let chunks = split_chunks(content);
    let first = chunks.first().map(String::as_str).unwrap_or("(empty)");

    command
        .create_response(
            &ctx.http,
            CreateInteractionResponse::Message(
                CreateInteractionResponseMessage::new().content(first),
            ),
        )
        .await?;

    for chunk in chunks.iter().skip(1) {
        command
            .create_followup(
                &ctx.http,
                CreateInteractionResponseFollowup::new().content(chunk),
            )
            .await?;
    }
    Ok(())
}

/// Immediate response visible only to the invoker. Used for validation and
/// dependency errors, so failures to deliver it are logged and swallowed.
pub async fn respond_ephemeral(ctx: &Context, command: &CommandInteraction, content: &str) {
    let content: String = content.chars().take(CHUNK_MAX).collect();
    if let Err(e) = command
        .create_response(
            &ctx.http,
            CreateInteractionResponse::Message(
                CreateInteractionResponseMessage::new()
                    .content(content)
                    .ephemeral(true),
            ),
        )
        .await
    {
        tracing::warn!(command = %command.data.name, error = %e, "ephemeral response failed");
    }
}

/// Acknowledge now, answer later. Must precede any slow work; Discord
/// abandons interactions that stay silent for 3 seconds.
pub async fn defer(
    ctx: &Context,
    command: &CommandInteraction,
    ephemeral: bool,
) -> Result<(), serenity::Error> {
    command
        .create_response(
            &ctx.http,
            CreateInteractionResponse::Defer(
                CreateInteractionResponseMessage::new().ephemeral(ephemeral),
            ),
        )
        .await
}

/// Fill a deferred response with `text`, overflowing into followups.
pub async fn edit_chunked(
    ctx: &Context,
    command: &CommandInteraction,
    text: &str,
) -> Result<(), serenity::Error> {
    let chunks = split_chunks(text);
    let first = chunks.first().map(String::as_str).unwrap_or("(empty)");

    command
        .edit_response(&ctx.http, EditInteractionResponse::new().content(first))
        .await?;

    for chunk in chunks.iter().skip(1) {
        command
            .create_followup(
                &ctx.http,
                CreateInteractionResponseFollowup::new().content(chunk),
            )
            .await?;
    }
    Ok(())
}

/// Resolve a deferred response with a file attachment plus a short note.
pub async fn followup_file(
    ctx: &Context,
    command: &CommandInteraction,
    content: &str,
    file_name: &str,
    bytes: Vec<u8>,
) -> Result<(), serenity::Error> {
    command
        .create_followup(
            &ctx.http,
            CreateInteractionResponseFollowup::new()
                .content(content)
                .add_file(CreateAttachment::bytes(bytes, file_name)),
        )
        .await
        .map(|_| ())
}

/// Top-level string option by name.
pub fn opt_str<'a>(command: &'a CommandInteraction, name: &str) -> Option<&'a str> {
    command
        .data
        .options
        .iter()
        .find(|o| o.name == name)
        .and_then(|o| o.value.as_str())
}

/// Top-level integer option by name.
pub fn opt_i64(command: &CommandInteraction, name: &str) -> Option<i64> {
    command
        .data
        .options
        .iter()
        .find(|o| o.name == name)
        .and_then(|o| o.value.as_i64())
}

/// The invoked subcommand and its nested options, if any.
pub fn subcommand(command: &CommandInteraction) -> Option<(&str, &[CommandDataOption])> {
    command.data.options.first().and_then(|o| match &o.value {
        CommandDataOptionValue::SubCommand(options) => Some((o.name.as_str(), options.as_slice())),
        _ => None,
    })
}

/// String option nested inside a subcommand.
pub fn nested_str<'a>(options: &'a [CommandDataOption], name: &str) -> Option<&'a str> {
    options
        .iter()
        .find(|o| o.name == name)
        .and_then(|o| o.value.as_str())
}

/// Integer option nested inside a subcommand.
pub fn nested_i64(options: &[CommandDataOption], name: &str) -> Option<i64> {
    options
        .iter()
        .find(|o| o.name == name)
        .and_then(|o| o.value.as_i64())
}

/// Collect the attachments supplied under numbered options (`video1`,
/// `video2`, ...) in option-name order, which is the user's input order.
pub fn attachment_sources(command: &CommandInteraction, prefix: &str) -> Vec<MediaSource> {
    let mut found: Vec<(&str, MediaSource)> = Vec::new();

    for option in &command.data.options {
        if !option.name.starts_with(prefix) {
            continue;
        }
        if let CommandDataOptionValue::Attachment(id) = &option.value {
            if let Some(att) = command.data.resolved.attachments.get(id) {
                found.push((
                    option.name.as_str(),
                    MediaSource {
                        name: att.filename.clone(),
                        content_type: att.content_type.clone(),
                        url: att.url.clone(),
                        size: att.size as u64,
                    },
                ));
            }
        }
    }

    found.sort_by(|a, b| a.0.cmp(b.0));
    found.into_iter().map(|(_, source)| source).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn short_text_is_single_chunk() {
        let chunks = split_chunks("Hello, world!");
        assert_eq!(chunks.len(), 1);
        assert_eq!(chunks[0], "Hello, world!");
    }

    #[test]
    fn long_text_splits_on_newline() {
        let line = "a".repeat(1000);
        let text = format!("{}\n{}", line, line);
        let chunks = split_chunks(&text);
        assert_eq!(chunks.len(), 2);
        for c in &chunks {
            assert!(c.len() <= CHUNK_MAX, "chunk too large: {}", c.len());
        }
    }

    #[test]
    fn very_long_word_still_splits() {
        let text = "x".repeat(4000);
        let chunks = split_chunks(&text);
        assert!(chunks.len() >= 2);
        for c in &chunks {
            assert!(c.len() <= CHUNK_MAX);
        }
    }

    #[test]
    fn multibyte_text_splits_on_char_boundaries() {
        // 1 + 3000 bytes; byte 1950 falls inside a euro sign, so a byte-offset
        // split would panic.
        let text = format!("a{}", "\u{20ac}".repeat(1000));
        let chunks = split_chunks(&text);
        assert!(chunks.len() >= 2);
        for c in &chunks {
            assert!(c.len() <= CHUNK_MAX, "chunk too large: {}", c.len());
        }
        assert_eq!(chunks.concat(), text);
    }

    #[test]
    fn mixed_width_text_round_trips() {
        // Long unbroken runs mixing widths, like pasted registrar output.
        let text = "\u{00f1}a".repeat(2000);
        let chunks = split_chunks(&text);
        for c in &chunks {
            assert!(c.len() <= CHUNK_MAX);
        }
        assert_eq!(chunks.concat(), text);
    }

    #[test]
    fn leading_newline_never_yields_an_empty_chunk() {
        let text = format!("\n{}", "x".repeat(2500));
        let chunks = split_chunks(&text);
        assert!(chunks.iter().all(|c| !c.is_empty()));
        for c in &chunks {
            assert!(c.len() <= CHUNK_MAX);
        }
    }
}
