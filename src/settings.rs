use anyhow::Context;
use livescore_api::MergePolicy;
use livescore_api::livescore::LIVESCORE_BASE;
use livescore_api::thesportsdb::THESPORTSDB_BASE;
use log::{LevelFilter, warn};
use std::net::SocketAddr;
use std::path::PathBuf;

/// Placeholder token shipped in example configs; treated as unset.
const PLACEHOLDER_TOKEN: &str = "YOUR_BOT_TOKEN_HERE";

/// Runtime settings, read from the environment with defaults.
#[derive(Debug, Clone)]
pub struct AppSettings {
    pub data_dir: PathBuf,
    pub listen_addr: SocketAddr,
    pub merge_policy: MergePolicy,
    pub season: String,
    pub feeds_path: Option<PathBuf>,
    pub telegram: TelegramSettings,
    pub livescore_base_url: String,
    pub sportsdb_base_url: String,
    pub log_level: Option<LevelFilter>,
}

#[derive(Debug, Clone, Default)]
pub struct TelegramSettings {
    pub bot_token: Option<String>,
    pub chat_id: Option<String>,
}

impl TelegramSettings {
    pub fn token(&self) -> Option<&str> {
        self.bot_token
            .as_deref()
            .filter(|t| !t.is_empty() && *t != PLACEHOLDER_TOKEN)
    }
}

impl AppSettings {
    pub fn load() -> anyhow::Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    fn from_lookup(get: impl Fn(&str) -> Option<String>) -> anyhow::Result<Self> {
        let var = |key: &str| get(key).map(|v| v.trim().to_owned()).filter(|v| !v.is_empty());

        let listen_addr = var("GOAL2GOL_LISTEN")
            .unwrap_or_else(|| "0.0.0.0:8000".to_owned())
            .parse()
            .context("GOAL2GOL_LISTEN must be a socket address such as 0.0.0.0:8000")?;

        let merge_policy = match var("GOAL2GOL_MERGE_POLICY") {
            Some(raw) => raw.parse().map_err(anyhow::Error::msg)?,
            None => MergePolicy::default(),
        };

        let log_level = var("GOAL2GOL_LOG").and_then(|raw| match raw.parse() {
            Ok(level) => Some(level),
            Err(_) => {
                warn!("ignoring unknown GOAL2GOL_LOG level {raw:?}");
                None
            }
        });

        Ok(Self {
            data_dir: var("GOAL2GOL_DATA_DIR").unwrap_or_else(|| "data".to_owned()).into(),
            listen_addr,
            merge_policy,
            season: var("GOAL2GOL_SEASON").unwrap_or_else(|| "2025-2026".to_owned()),
            feeds_path: var("GOAL2GOL_FEEDS_JSON").map(PathBuf::from),
            telegram: TelegramSettings {
                bot_token: var("TELEGRAM_BOT_TOKEN"),
                chat_id: var("TELEGRAM_CHAT_ID"),
            },
            livescore_base_url: var("LIVESCORE_BASE_URL").unwrap_or_else(|| LIVESCORE_BASE.to_owned()),
            sportsdb_base_url: var("THESPORTSDB_BASE_URL")
                .unwrap_or_else(|| THESPORTSDB_BASE.to_owned()),
            log_level,
        })
    }

    pub fn schedules_dir(&self) -> PathBuf {
        self.data_dir.join("schedules")
    }
}
