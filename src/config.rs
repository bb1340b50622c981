// src/config.rs
//! Service configuration: optional TOML file plus environment overrides.
//! Everything has a working default so the binary boots with no files and no
//! env set; a malformed config file is a boot error, a missing one is not.

use serde::Deserialize;
use std::{env, fs, path::PathBuf};
use tracing::warn;

use crate::estimator::Strategy;

pub const DEFAULT_APP_CONFIG_PATH: &str = "config/service.toml";
pub const DEFAULT_BIND_ADDR: &str = "0.0.0.0:8000";
pub const DEFAULT_HISTORY_CAPACITY: usize = 2000;

pub const ENV_APP_CONFIG_PATH: &str = "RISK_SERVICE_CONFIG_PATH";
pub const ENV_STRATEGY: &str = "RISK_STRATEGY";
pub const ENV_SEED: &str = "RISK_SEED";
pub const ENV_BIND_ADDR: &str = "RISK_BIND_ADDR";

/// Raw file schema; all fields optional.
#[derive(Debug, Clone, Default, Deserialize)]
struct RawConfig {
    strategy: Option<String>,
    seed: Option<u64>,
    bind_addr: Option<String>,
    history_capacity: Option<usize>,
    factors_path: Option<PathBuf>,
    chatbot_path: Option<PathBuf>,
}

/// Resolved configuration the binary and tests build state from.
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub strategy: Strategy,
    /// Fixed RNG seed makes the whole service deterministic (tests, demos).
    pub seed: Option<u64>,
    pub bind_addr: String,
    pub history_capacity: usize,
    /// Explicit table/script paths; `None` falls through to each module's
    /// own env/default resolution.
    pub factors_path: Option<PathBuf>,
    pub chatbot_path: Option<PathBuf>,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            strategy: Strategy::default(),
            seed: None,
            bind_addr: DEFAULT_BIND_ADDR.to_string(),
            history_capacity: DEFAULT_HISTORY_CAPACITY,
            factors_path: None,
            chatbot_path: None,
        }
    }
}

impl AppConfig {
    /// Load from `RISK_SERVICE_CONFIG_PATH` (or the default path), then apply
    /// environment overrides.
    pub fn load() -> anyhow::Result<Self> {
        let path = env::var(ENV_APP_CONFIG_PATH)
            .map(PathBuf::from)
            .unwrap_or_else(|_| PathBuf::from(DEFAULT_APP_CONFIG_PATH));

        let raw = match fs::read_to_string(&path) {
            Ok(s) => toml::from_str::<RawConfig>(&s).map_err(|e| {
                anyhow::anyhow!("bad service config at {}: {}", path.display(), e)
            })?,
            Err(_) => RawConfig::default(),
        };

        Ok(Self::from_raw(raw).with_env_overrides())
    }

    fn from_raw(raw: RawConfig) -> Self {
        let defaults = Self::default();
        Self {
            strategy: raw
                .strategy
                .as_deref()
                .map(Strategy::parse_or_default)
                .unwrap_or_default(),
            seed: raw.seed,
            bind_addr: raw.bind_addr.unwrap_or(defaults.bind_addr),
            history_capacity: raw.history_capacity.unwrap_or(defaults.history_capacity),
            factors_path: raw.factors_path,
            chatbot_path: raw.chatbot_path,
        }
    }

    fn with_env_overrides(mut self) -> Self {
        if let Ok(s) = env::var(ENV_STRATEGY) {
            self.strategy = Strategy::parse_or_default(&s);
        }
        if let Ok(s) = env::var(ENV_SEED) {
            match s.trim().parse::<u64>() {
                Ok(seed) => self.seed = Some(seed),
                Err(_) => warn!(value = %s, "ignoring unparsable {ENV_SEED}"),
            }
        }
        if let Ok(s) = env::var(ENV_BIND_ADDR) {
            self.bind_addr = s;
        }
        self
    }
}
