//! `/habit add|list|remove` and `/remindme`, backed by the habit registry.

use std::sync::Arc;

use serenity::model::application::CommandInteraction;
use serenity::prelude::Context;

use botones_habits::InstallOutcome;

use crate::context::BotContext;
use crate::reply::{nested_i64, nested_str, opt_i64, opt_str, respond_ephemeral, respond_text, subcommand};

pub async fn handle_habit(
    app: &Arc<BotContext>,
    ctx: &Context,
    command: &CommandInteraction,
) -> Result<(), serenity::Error> {
    let Some((sub, options)) = subcommand(command) else {
        respond_ephemeral(ctx, command, "Choose add, list or remove.").await;
        return Ok(());
    };

    let text = match sub {
        "add" => {
            let message = nested_str(options, "message").unwrap_or("").trim();
            let interval = nested_i64(options, "interval").unwrap_or(0);
            if message.is_empty() {
                "The reminder needs a message.".to_string()
            } else {
                let channel_id = command.channel_id.get();
                match app.habits.create_or_replace(message, interval, channel_id) {
                    Ok(InstallOutcome::Created) => {
                        format!("Habit registered: \u{201c}{message}\u{201d} every {interval} min.")
                    }
                    Ok(InstallOutcome::Replaced) => format!(
                        "Habit replaced: \u{201c}{message}\u{201d} now fires every {interval} min."
                    ),
                    Err(e) => e.to_string(),
                }
            }
        }
        "list" => {
            let habits = app.habits.list();
            if habits.is_empty() {
                "No habits registered.".to_string()
            } else {
                let mut text = format!("**Habits** ({}):\n", habits.len());
                for habit in &habits {
                    text.push_str(&format!(
                        "- \u{201c}{}\u{201d} every {} min\n",
                        habit.key, habit.interval_minutes
                    ));
                }
                text
            }
        }
        "remove" => {
            let message = nested_str(options, "message").unwrap_or("").trim();
            match app.habits.delete(message) {
                Ok(info) => format!("Habit removed: \u{201c}{}\u{201d}.", info.key),
                Err(e) => e.to_string(),
            }
        }
        other => format!("Unknown subcommand: {other}"),
    };

    respond_ephemeral(ctx, command, &text).await;
    Ok(())
}

pub async fn handle_remindme(
    app: &Arc<BotContext>,
    ctx: &Context,
    command: &CommandInteraction,
) -> Result<(), serenity::Error> {
    let minutes = opt_i64(command, "minutes").unwrap_or(0);
    let text = opt_str(command, "text").unwrap_or("").trim().to_string();
    if text.is_empty() {
        respond_ephemeral(ctx, command, "The reminder needs a message.").await;
        return Ok(());
    }

    let channel_id = command.channel_id.get();
    if let Err(e) = app.habits.schedule_once(&text, minutes, channel_id) {
        respond_ephemeral(ctx, command, &e.to_string()).await;
        return Ok(());
    }

    respond_text(
        ctx,
        command,
        &format!("\u{2705} I'll remind you here in {minutes} min: {text}"),
    )
    .await
}
