//! Shared application state handed to every command handler.

use std::sync::Arc;

use botones_api::ApiClient;
use botones_core::BotonesConfig;
use botones_habits::HabitRegistry;
use botones_storage::StorageResolver;

pub struct BotContext {
    pub config: BotonesConfig,
    pub api: ApiClient,
    pub storage: StorageResolver,
    pub habits: Arc<HabitRegistry>,
}
