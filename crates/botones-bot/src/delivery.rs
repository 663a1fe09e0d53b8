//! Proactive delivery: posts fired habit notices and reminders to Discord.

use std::sync::Arc;

use serenity::model::id::ChannelId;
use tokio::sync::mpsc;
use tracing::{debug, info, warn};

use botones_habits::HabitNotice;

use crate::reply::send_chunked;

/// Background task that receives fired notices and posts them to their
/// origin channel.
///
/// Spawned once in `adapter.rs` after the serenity client is built. Runs
/// until the registry side of the channel is dropped.
pub async fn run_delivery(
    http: Arc<serenity::http::Http>,
    mut rx: mpsc::Receiver<HabitNotice>,
) {
    while let Some(notice) = rx.recv().await {
        debug!(channel_id = notice.channel_id, "delivering habit notice");

        let text = format!("\u{23f0} {}", notice.key);
        if let Err(e) = send_chunked(&http, ChannelId::new(notice.channel_id), &text).await {
            warn!(
                channel_id = notice.channel_id,
                error = %e,
                "habit notice delivery failed"
            );
        }
    }

    info!("habit delivery task exiting (channel closed)");
}
