//! Slash command roster: registration on ready, dispatch on interaction.
//!
//! Handler contract: parse and validate options first, answer validation
//! and missing-dependency errors ephemerally before deferring, defer before
//! any slow work, and resolve every interaction with exactly one reply
//! (file results arrive as a followup attachment).

use std::sync::Arc;

use serenity::builder::{CreateCommand, CreateCommandOption};
use serenity::model::application::{Command, CommandInteraction, CommandOptionType};
use serenity::model::id::GuildId;
use serenity::prelude::Context;
use tracing::{info, warn};

use crate::context::BotContext;
use crate::reply::respond_ephemeral;

mod crypto;
mod habits;
mod hola;
mod lookup;
mod media;
mod system;
mod web;

/// Register the command roster. Call from `ready()`.
pub async fn register_commands(ctx: &Context, guild_id: Option<GuildId>) {
    let commands = vec![
        CreateCommand::new("hola").description("Say hi"),
        CreateCommand::new("ping")
            .description("Ping a host from the bot's machine")
            .add_option(
                CreateCommandOption::new(CommandOptionType::String, "host", "Hostname or IP")
                    .required(true),
            ),
        CreateCommand::new("whois")
            .description("WHOIS lookup for a domain")
            .add_option(
                CreateCommandOption::new(CommandOptionType::String, "domain", "Domain to look up")
                    .required(true),
            ),
        CreateCommand::new("speedtest").description("Run a network speed test (takes a minute)"),
        CreateCommand::new("sysinfo").description("Show host system information"),
        CreateCommand::new("update")
            .description("Pull the latest code and restart if anything changed"),
        CreateCommand::new("restart").description("Restart the bot service"),
        CreateCommand::new("weather")
            .description("Current weather for a place")
            .add_option(
                CreateCommandOption::new(CommandOptionType::String, "place", "City or place name")
                    .required(true),
            ),
        CreateCommand::new("define")
            .description("Dictionary definition of a word")
            .add_option(
                CreateCommandOption::new(CommandOptionType::String, "word", "Word to define")
                    .required(true),
            )
            .add_option(
                CreateCommandOption::new(
                    CommandOptionType::String,
                    "language",
                    "Dictionary language",
                )
                .add_string_choice("English", "en")
                .add_string_choice("Spanish", "es"),
            ),
        CreateCommand::new("translate")
            .description("Translate text between two languages")
            .add_option(
                CreateCommandOption::new(CommandOptionType::String, "text", "Text to translate")
                    .required(true),
            )
            .add_option(
                CreateCommandOption::new(
                    CommandOptionType::String,
                    "from",
                    "Source language code (e.g. en)",
                )
                .required(true),
            )
            .add_option(
                CreateCommandOption::new(
                    CommandOptionType::String,
                    "to",
                    "Target language code (e.g. es)",
                )
                .required(true),
            ),
        CreateCommand::new("shorten")
            .description("Shorten a URL with is.gd")
            .add_option(
                CreateCommandOption::new(CommandOptionType::String, "url", "URL to shorten")
                    .required(true),
            ),
        CreateCommand::new("qr")
            .description("Generate a QR code image")
            .add_option(
                CreateCommandOption::new(CommandOptionType::String, "text", "Text to encode")
                    .required(true),
            ),
        CreateCommand::new("screenshot")
            .description("Screenshot a web page")
            .add_option(
                CreateCommandOption::new(CommandOptionType::String, "url", "Page to capture")
                    .required(true),
            ),
        CreateCommand::new("hash")
            .description("Hex digest of a text")
            .add_option(
                CreateCommandOption::new(CommandOptionType::String, "text", "Text to hash")
                    .required(true),
            )
            .add_option(
                CreateCommandOption::new(
                    CommandOptionType::String,
                    "algorithm",
                    "Hash algorithm",
                )
                .required(true)
                .add_string_choice("SHA-256", "sha256")
                .add_string_choice("SHA-512", "sha512"),
            ),
        CreateCommand::new("hmac")
            .description("HMAC-SHA256 tag of a text (reply is private)")
            .add_option(
                CreateCommandOption::new(CommandOptionType::String, "key", "Secret key")
                    .required(true),
            )
            .add_option(
                CreateCommandOption::new(CommandOptionType::String, "text", "Text to sign")
                    .required(true),
            ),
        CreateCommand::new("b64")
            .description("Base64 encode or decode")
            .add_option(
                CreateCommandOption::new(CommandOptionType::String, "mode", "Direction")
                    .required(true)
                    .add_string_choice("encode", "encode")
                    .add_string_choice("decode", "decode"),
            )
            .add_option(
                CreateCommandOption::new(CommandOptionType::String, "text", "Input text")
                    .required(true),
            ),
        CreateCommand::new("habit")
            .description("Recurring reminders")
            .add_option(
                CreateCommandOption::new(
                    CommandOptionType::SubCommand,
                    "add",
                    "Add or replace a recurring reminder",
                )
                .add_sub_option(
                    CreateCommandOption::new(
                        CommandOptionType::String,
                        "message",
                        "Reminder text (also its identifier)",
                    )
                    .required(true),
                )
                .add_sub_option(
                    CreateCommandOption::new(
                        CommandOptionType::Integer,
                        "interval",
                        "Interval in minutes",
                    )
                    .min_int_value(1)
                    .required(true),
                ),
            )
            .add_option(CreateCommandOption::new(
                CommandOptionType::SubCommand,
                "list",
                "List registered habits",
            ))
            .add_option(
                CreateCommandOption::new(
                    CommandOptionType::SubCommand,
                    "remove",
                    "Remove a habit",
                )
                .add_sub_option(
                    CreateCommandOption::new(
                        CommandOptionType::String,
                        "message",
                        "Reminder text of the habit to remove",
                    )
                    .required(true),
                ),
            ),
        CreateCommand::new("remindme")
            .description("One-shot reminder after N minutes")
            .add_option(
                CreateCommandOption::new(
                    CommandOptionType::Integer,
                    "minutes",
                    "Minutes from now",
                )
                .min_int_value(1)
                .required(true),
            )
            .add_option(
                CreateCommandOption::new(
                    CommandOptionType::String,
                    "text",
                    "What to remind you about",
                )
                .required(true),
            ),
        attachment_command("mergevideos", "Concatenate 2-5 videos into one mp4", "video", 2),
        attachment_command("mergepdfs", "Merge 2-5 PDFs into one document", "pdf", 2),
        attachment_command("zip", "Bundle 1-5 attachments into a zip", "file", 1),
    ];

    match guild_id {
        Some(gid) => match gid.set_commands(&ctx.http, commands).await {
            Ok(cmds) => info!(guild = %gid, count = cmds.len(), "registered guild slash commands"),
            Err(e) => warn!(guild = %gid, error = %e, "failed to register guild commands"),
        },
        None => match Command::set_global_commands(&ctx.http, commands).await {
            Ok(cmds) => info!(count = cmds.len(), "registered global slash commands"),
            Err(e) => warn!(error = %e, "failed to register global slash commands"),
        },
    }
}

/// Build a command taking five numbered attachment options, the first
/// `required` of them mandatory.
fn attachment_command(
    name: &str,
    description: &str,
    option_prefix: &str,
    required: usize,
) -> CreateCommand {
    let mut command = CreateCommand::new(name).description(description);
    for i in 1..=5 {
        command = command.add_option(
            CreateCommandOption::new(
                CommandOptionType::Attachment,
                format!("{option_prefix}{i}"),
                format!("Attachment #{i}"),
            )
            .required(i <= required),
        );
    }
    command
}

/// Dispatch a slash command interaction to the appropriate handler.
pub async fn handle_interaction(app: &Arc<BotContext>, ctx: &Context, command: &CommandInteraction) {
    let result = match command.data.name.as_str() {
        "hola" => hola::handle(ctx, command).await,
        "ping" => system::handle_ping(ctx, command).await,
        "whois" => system::handle_whois(ctx, command).await,
        "speedtest" => system::handle_speedtest(ctx, command).await,
        "sysinfo" => system::handle_sysinfo(ctx, command).await,
        "update" => system::handle_update(app, ctx, command).await,
        "restart" => system::handle_restart(app, ctx, command).await,
        "weather" => lookup::handle_weather(app, ctx, command).await,
        "define" => lookup::handle_define(app, ctx, command).await,
        "translate" => lookup::handle_translate(app, ctx, command).await,
        "shorten" => web::handle_shorten(app, ctx, command).await,
        "qr" => web::handle_qr(app, ctx, command).await,
        "screenshot" => web::handle_screenshot(app, ctx, command).await,
        "hash" => crypto::handle_hash(ctx, command).await,
        "hmac" => crypto::handle_hmac(ctx, command).await,
        "b64" => crypto::handle_b64(ctx, command).await,
        "habit" => habits::handle_habit(app, ctx, command).await,
        "remindme" => habits::handle_remindme(app, ctx, command).await,
        "mergevideos" => media::handle_merge_videos(app, ctx, command).await,
        "mergepdfs" => media::handle_merge_pdfs(app, ctx, command).await,
        "zip" => media::handle_zip(app, ctx, command).await,
        _ => {
            respond_ephemeral(ctx, command, "Unknown command.").await;
            Ok(())
        }
    };

    if let Err(e) = result {
        warn!(command = %command.data.name, error = %e, "slash command error");
    }
}
