use figment::{
    providers::{Env, Format, Toml},
    Figment,
};
use serde::{Deserialize, Serialize};

// Operational limits — shared across the workspace.
pub const INLINE_ATTACHMENT_CEILING_BYTES: usize = 24 * 1024 * 1024; // Discord caps uploads at ~25 MB
pub const DIAGNOSTIC_TAIL_CHARS: usize = 600; // tool stderr excerpt shown in failure replies
pub const MERGE_MIN_INPUTS: usize = 2;
pub const MERGE_MAX_INPUTS: usize = 5;
pub const USER_AGENT: &str = concat!("botones/", env!("CARGO_PKG_VERSION"));

/// Top-level config (botones.toml + BOTONES_* env overrides).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BotonesConfig {
    pub discord: DiscordConfig,
    #[serde(default)]
    pub storage: StorageConfig,
    #[serde(default)]
    pub service: ServiceConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DiscordConfig {
    /// Bot token. Startup is fatal without one.
    pub bot_token: String,
    /// When set, slash commands register on this guild only (instant
    /// propagation). Global registration can take up to an hour to roll out.
    #[serde(default)]
    pub guild_id: Option<u64>,
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct StorageConfig {
    /// Base directory for persisted artifacts. When unset the resolver
    /// probes the well-known candidates and falls back to the cwd.
    #[serde(default)]
    pub base_dir: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServiceConfig {
    /// systemd unit restarted by /restart and /update.
    #[serde(default = "default_service_name")]
    pub name: String,
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self {
            name: default_service_name(),
        }
    }
}

fn default_service_name() -> String {
    "botones.service".to_string()
}

impl BotonesConfig {
    /// Load config from a TOML file with BOTONES_* env var overrides.
    ///
    /// Nested keys use a double-underscore separator in the environment so
    /// snake_case fields stay addressable, e.g. `BOTONES_DISCORD__BOT_TOKEN`
    /// or `BOTONES_STORAGE__BASE_DIR`.
    ///
    /// Checks in order:
    ///   1. Explicit path argument
    ///   2. ~/.botones/botones.toml
    pub fn load(config_path: Option<&str>) -> crate::error::Result<Self> {
        let path = config_path
            .map(String::from)
            .unwrap_or_else(default_config_path);

        let config: BotonesConfig = Figment::new()
            .merge(Toml::file(&path))
            .merge(Env::prefixed("BOTONES_").split("__"))
            .extract()
            .map_err(|e| crate::error::ConfigError::Load(e.to_string()))?;

        Ok(config)
    }
}

fn default_config_path() -> String {
    let home = std::env::var("HOME").unwrap_or_else(|_| ".".to_string());
    format!("{}/.botones/botones.toml", home)
}
