//! # Factor Tables
//!
//! Configurable mapping from categorical demographic values to the numbers
//! the scoring strategies consume: indicator base rates, multiplicative
//! adjustment factors, and the additive strategy's base/deltas.
//!
//! - Loads from TOML; a compiled-in default keeps the binary self-contained.
//! - Lookup is exact-match on the canonical vocabulary; unknown keys are
//!   neutral (multiplier 1.0 / delta 0.0), matching the permissive input
//!   policy of the estimator.
//! - `FactorHandle` rechecks the file mtime on access so edits and the admin
//!   reload endpoint take effect without a restart.

use once_cell::sync::Lazy;
use serde::Deserialize;
use std::{
    collections::HashMap,
    fs,
    path::{Path, PathBuf},
    sync::RwLock,
    time::SystemTime,
};
use tracing::warn;

pub const DEFAULT_FACTORS_CONFIG_PATH: &str = "config/factors.toml";
pub const ENV_FACTORS_CONFIG_PATH: &str = "FACTORS_CONFIG_PATH";

static EMBEDDED_TOML: &str = include_str!("../../config/factors.toml");

static EMBEDDED: Lazy<FactorTables> = Lazy::new(|| {
    FactorTables::from_toml_str(EMBEDDED_TOML).expect("embedded factor tables are valid TOML")
});

#[derive(Debug, Clone, Deserialize)]
pub struct FactorTables {
    pub base: BaseSection,
    #[serde(default)]
    pub multipliers: HashMap<String, HashMap<String, f64>>,
    pub additive: AdditiveSection,
}

#[derive(Debug, Clone, Deserialize)]
pub struct BaseSection {
    /// Base rate when the indicator is missing or unrecognized.
    pub default: f64,
    #[serde(default)]
    pub indicator: HashMap<String, f64>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct AdditiveSection {
    /// Fixed starting rate of the additive strategy.
    pub base: f64,
    /// Per-field delta tables, keyed like `multipliers` (plus `indicator`).
    #[serde(flatten)]
    pub deltas: HashMap<String, HashMap<String, f64>>,
}

impl FactorTables {
    pub fn from_toml_str(toml_str: &str) -> anyhow::Result<Self> {
        let tables: FactorTables = toml::from_str(toml_str)?;
        Ok(tables)
    }

    /// Load from a TOML file. Falls back to the embedded tables on any error,
    /// with a warning, so a broken edit never takes the estimator down.
    pub fn load_from_file<P: AsRef<Path>>(path: P) -> Self {
        match fs::read_to_string(&path) {
            Ok(s) => Self::from_toml_str(&s).unwrap_or_else(|e| {
                warn!(path = %path.as_ref().display(), error = %e, "bad factor config, using embedded tables");
                Self::embedded()
            }),
            Err(_) => Self::embedded(),
        }
    }

    /// The compiled-in defaults.
    pub fn embedded() -> Self {
        EMBEDDED.clone()
    }

    /// Base rate selected by the assessment indicator.
    pub fn base_rate(&self, indicator: &str) -> f64 {
        self.base
            .indicator
            .get(indicator)
            .copied()
            .unwrap_or(self.base.default)
    }

    /// Multiplicative factor for a field/value pair; neutral when the field
    /// has no table, the value is empty, or the value is unrecognized.
    pub fn multiplier(&self, field: &str, value: &str) -> f64 {
        if value.is_empty() {
            return 1.0;
        }
        self.multipliers
            .get(field)
            .and_then(|t| t.get(value))
            .copied()
            .unwrap_or(1.0)
    }

    /// Fixed base of the additive strategy.
    pub fn additive_base(&self) -> f64 {
        self.additive.base
    }

    /// Additive delta for a field/value pair; 0.0 when unrecognized.
    pub fn delta(&self, field: &str, value: &str) -> f64 {
        if value.is_empty() {
            return 0.0;
        }
        self.additive
            .deltas
            .get(field)
            .and_then(|t| t.get(value))
            .copied()
            .unwrap_or(0.0)
    }
}

/// Hot-reloading handle around the factor tables. Rechecks the file's mtime
/// on each `current()` call, the same discipline the chatbot script uses.
#[derive(Debug)]
pub struct FactorHandle {
    path: PathBuf,
    inner: RwLock<State>,
}

#[derive(Debug)]
struct State {
    tables: FactorTables,
    last_modified: Option<SystemTime>,
}

impl FactorHandle {
    /// Resolve the config path (explicit > env > default) and load eagerly.
    pub fn new(path: Option<&Path>) -> Self {
        let path = path
            .map(Path::to_path_buf)
            .or_else(|| std::env::var(ENV_FACTORS_CONFIG_PATH).ok().map(PathBuf::from))
            .unwrap_or_else(|| PathBuf::from(DEFAULT_FACTORS_CONFIG_PATH));
        let tables = FactorTables::load_from_file(&path);
        let last_modified = fs::metadata(&path).and_then(|m| m.modified()).ok();
        Self {
            path,
            inner: RwLock::new(State {
                tables,
                last_modified,
            }),
        }
    }

    /// Current tables, reloading first if the file changed on disk.
    pub fn current(&self) -> FactorTables {
        let needs_reload = match fs::metadata(&self.path).and_then(|m| m.modified()) {
            Ok(mtime) => {
                let guard = self.inner.read().expect("factor lock poisoned");
                guard.last_modified != Some(mtime)
            }
            Err(_) => false,
        };

        if !needs_reload {
            return self.inner.read().expect("factor lock poisoned").tables.clone();
        }

        self.force_reload();
        self.inner.read().expect("factor lock poisoned").tables.clone()
    }

    /// Reload unconditionally (admin endpoint). Returns true when the file was
    /// readable; the embedded fallback still applies on parse errors.
    pub fn force_reload(&self) -> bool {
        let readable = self.path.is_file();
        let tables = FactorTables::load_from_file(&self.path);
        let mtime = fs::metadata(&self.path).and_then(|m| m.modified()).ok();
        let mut guard = self.inner.write().expect("factor lock poisoned");
        guard.tables = tables;
        guard.last_modified = mtime;
        readable
    }
}
