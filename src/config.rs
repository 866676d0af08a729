//! Configuration loading and logging setup.
//!
//! Configuration comes from an optional TOML file; the API key is taken
//! from the `GW2_API_KEY` environment variable (a `.env` file works) and
//! never from the config file.

use std::collections::HashSet;
use std::path::{Path, PathBuf};

use serde::Deserialize;
use tracing_subscriber::{fmt, EnvFilter};

use crate::api::DEFAULT_API_URL;
use crate::error::{ConfigError, Result};
use crate::model::ItemId;
use crate::plan::Policy;

const API_KEY_ENV: &str = "GW2_API_KEY";

#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Root directory for all on-disk state.
    pub cache_dir: PathBuf,
    /// Serve stale caches instead of refetching.
    pub offline: bool,
    /// Upstream API root; overridable for testing.
    pub api_url: String,
    pub logging: LoggingConfig,
    pub policy: PolicyConfig,
    /// Bearer token, from `GW2_API_KEY` only.
    #[serde(skip)]
    pub api_key: Option<String>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            cache_dir: default_cache_dir(),
            offline: false,
            api_url: DEFAULT_API_URL.to_string(),
            logging: LoggingConfig::default(),
            policy: PolicyConfig::default(),
            api_key: std::env::var(API_KEY_ENV).ok(),
        }
    }
}

fn default_cache_dir() -> PathBuf {
    dirs::cache_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("tradesmith")
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Log level filter (`error`, `warn`, `info`, `debug`, `trace`).
    pub level: String,
    /// Emit JSON log lines instead of human-readable ones.
    pub json: bool,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            json: false,
        }
    }
}

/// The data-valued planning policy knobs. The closure-valued hooks
/// (`can_craft_recipe`, `adjust_prices`, ...) are set programmatically on
/// [`Policy`].
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct PolicyConfig {
    pub forbid_buy: Vec<u32>,
    pub forbid_craft: Vec<u32>,
    pub buy_on_demand: Vec<u32>,
    pub auto_refine: Vec<u32>,
    pub sell_batch_size: Option<i64>,
    pub auto_goals: bool,
    pub expand_research_bundles: bool,
}

impl PolicyConfig {
    pub fn to_policy(&self) -> Policy {
        let ids = |list: &[u32]| -> HashSet<ItemId> { list.iter().map(|&id| ItemId(id)).collect() };
        let mut policy = Policy {
            forbid_buy: ids(&self.forbid_buy),
            forbid_craft: ids(&self.forbid_craft),
            buy_on_demand: ids(&self.buy_on_demand),
            auto_refine: self.auto_refine.iter().map(|&id| ItemId(id)).collect(),
            auto_goals: self.auto_goals,
            expand_research_bundles: self.expand_research_bundles,
            ..Policy::default()
        };
        if let Some(batch) = self.sell_batch_size {
            policy.sell_batch_size = batch;
        }
        policy
    }
}

impl Config {
    /// Load from `path`; a missing file yields the defaults so first runs
    /// need no setup beyond the API key.
    pub fn load(path: &Path) -> Result<Self> {
        let text = match std::fs::read_to_string(path) {
            Ok(text) => text,
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => {
                return Ok(Self::default());
            }
            Err(err) => return Err(ConfigError::ReadFile(err).into()),
        };
        let mut config: Config = toml::from_str(&text).map_err(ConfigError::Parse)?;
        config.api_key = std::env::var(API_KEY_ENV).ok();
        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> Result<()> {
        if let Some(batch) = self.policy.sell_batch_size {
            if batch <= 0 {
                return Err(ConfigError::InvalidValue {
                    field: "policy.sell_batch_size",
                    reason: format!("must be positive, got {batch}"),
                }
                .into());
            }
        }
        Ok(())
    }

    /// Install the global tracing subscriber. `RUST_LOG` wins over the
    /// configured level.
    pub fn init_logging(&self) {
        let filter = EnvFilter::try_from_default_env()
            .unwrap_or_else(|_| EnvFilter::new(&self.logging.level));
        if self.logging.json {
            fmt().with_env_filter(filter).json().init();
        } else {
            fmt().with_env_filter(filter).init();
        }
    }
}
