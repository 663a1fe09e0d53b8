//! `/hola`, the canonical smoke test.

use serenity::model::application::CommandInteraction;
use serenity::model::mention::Mentionable;
use serenity::prelude::Context;

use crate::reply::respond_text;

pub async fn handle(ctx: &Context, command: &CommandInteraction) -> Result<(), serenity::Error> {
    let text = format!("\u{1f44b} \u{00a1}Hola, {}!", command.user.mention());
    respond_text(ctx, command, &text).await
}
