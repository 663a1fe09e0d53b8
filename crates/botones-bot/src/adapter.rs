use std::sync::Arc;
use std::time::Duration;

use serenity::model::gateway::GatewayIntents;
use serenity::Client;
use tokio::sync::mpsc;
use tracing::{error, info, warn};

use botones_habits::HabitNotice;

use crate::context::BotContext;
use crate::handler::BotonesHandler;

/// Discord adapter.
///
/// Wraps a serenity `Client` and drives the event loop until the process
/// exits. Reconnects automatically whenever the gateway drops.
pub struct BotonesAdapter {
    ctx: Arc<BotContext>,
}

impl BotonesAdapter {
    pub fn new(ctx: Arc<BotContext>) -> Self {
        Self { ctx }
    }

    /// Connect to Discord and keep reconnecting whenever the gateway drops.
    ///
    /// Never returns. The habit delivery task is spawned once with
    /// `Arc<Http>` (Discord REST, not the gateway WebSocket), so it keeps
    /// working across reconnects without being restarted.
    pub async fn run(self, notice_rx: mpsc::Receiver<HabitNotice>) {
        // Everything arrives as slash-command interactions; no privileged
        // message intents are needed.
        let intents = GatewayIntents::empty();

        let first_client = loop {
            match self.build_client(intents).await {
                Ok(c) => break c,
                Err(e) => {
                    error!("Discord: initial connect failed ({e}), retrying in 30s");
                    tokio::time::sleep(Duration::from_secs(30)).await;
                }
            }
        };

        let http = Arc::clone(&first_client.http);
        tokio::spawn(crate::delivery::run_delivery(http, notice_rx));

        let mut client = first_client;

        loop {
            info!("Discord: gateway connecting");

            if let Err(e) = client.start().await {
                warn!("Discord: gateway error ({e}), reconnecting in 5s");
            } else {
                info!("Discord: gateway stopped cleanly, reconnecting in 5s");
            }

            tokio::time::sleep(Duration::from_secs(5)).await;

            client = loop {
                match self.build_client(intents).await {
                    Ok(c) => break c,
                    Err(e) => {
                        error!("Discord: reconnect failed ({e}), retrying in 30s");
                        tokio::time::sleep(Duration::from_secs(30)).await;
                    }
                }
            };
        }
    }

    async fn build_client(&self, intents: GatewayIntents) -> Result<Client, serenity::Error> {
        let handler = BotonesHandler {
            ctx: Arc::clone(&self.ctx),
        };

        Client::builder(&self.ctx.config.discord.bot_token, intents)
            .event_handler(handler)
            .await
    }
}
