use std::sync::Arc;

use serenity::async_trait;
use serenity::model::application::Interaction;
use serenity::model::gateway::Ready;
use serenity::model::id::GuildId;
use serenity::prelude::{Context, EventHandler};
use tracing::info;

use crate::context::BotContext;

/// Serenity event handler: registers the command roster on ready and routes
/// every command interaction to its handler.
pub struct BotonesHandler {
    pub ctx: Arc<BotContext>,
}

#[async_trait]
impl EventHandler for BotonesHandler {
    async fn ready(&self, ctx: Context, ready: Ready) {
        info!(name = %ready.user.name, "Discord bot connected");

        // Guild registration propagates instantly, global takes up to an
        // hour; a configured guild_id picks the former for development.
        let guild_id = self.ctx.config.discord.guild_id.map(GuildId::new);
        crate::commands::register_commands(&ctx, guild_id).await;
    }

    async fn interaction_create(&self, ctx: Context, interaction: Interaction) {
        if let Interaction::Command(command) = interaction {
            crate::commands::handle_interaction(&self.ctx, &ctx, &command).await;
        }
    }
}
