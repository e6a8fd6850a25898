//! Configuration system: TOML file + env var overrides + smart defaults.

#![allow(missing_docs)]

use std::env;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::core::errors::{NofomoError, Result};
use crate::dashboard::model::{Tab, UserType};

/// Upper bound for any simulated delay.
const MAX_DELAY_MS: u64 = 60_000;

/// Full dashboard configuration model.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(default)]
pub struct Config {
    pub timing: TimingConfig,
    pub view: ViewConfig,
    pub logging: LoggingConfig,
    pub paths: PathsConfig,
}

/// Simulated latencies for the mock data service and the advisor.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct TimingConfig {
    /// Delay between a fixture request and its resolution.
    pub fetch_latency_ms: u64,
    /// Delay between a chat message and the advisor reply.
    pub reply_delay_ms: u64,
}

/// Initial view state applied at mount.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(default)]
pub struct ViewConfig {
    pub start_tab: Tab,
    pub user_type: UserType,
}

/// Activity log tuning.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct LoggingConfig {
    pub enabled: bool,
    pub max_size_bytes: u64,
    pub max_rotated_files: u32,
}

/// Filesystem paths used by nofomo.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct PathsConfig {
    pub config_file: PathBuf,
    pub jsonl_log: PathBuf,
}

impl Default for TimingConfig {
    fn default() -> Self {
        Self {
            fetch_latency_ms: 500,
            reply_delay_ms: 1_000,
        }
    }
}

impl TimingConfig {
    /// Fetch latency as a [`Duration`].
    #[must_use]
    pub const fn fetch_latency(&self) -> Duration {
        Duration::from_millis(self.fetch_latency_ms)
    }

    /// Advisor reply delay as a [`Duration`].
    #[must_use]
    pub const fn reply_delay(&self) -> Duration {
        Duration::from_millis(self.reply_delay_ms)
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            max_size_bytes: 10 * 1024 * 1024,
            max_rotated_files: 3,
        }
    }
}

impl Default for PathsConfig {
    fn default() -> Self {
        let home_dir = env::var_os("HOME").map_or_else(
            || {
                eprintln!(
                    "[NFM-CONFIG] WARNING: HOME not set, falling back to /tmp for data paths"
                );
                PathBuf::from("/tmp")
            },
            PathBuf::from,
        );
        Self {
            config_file: home_dir.join(".config").join("nofomo").join("config.toml"),
            jsonl_log: home_dir
                .join(".local")
                .join("share")
                .join("nofomo")
                .join("activity.jsonl"),
        }
    }
}

impl Config {
    /// Default configuration path.
    #[must_use]
    pub fn default_path() -> PathBuf {
        PathsConfig::default().config_file
    }

    /// Load config from default or explicit path, then apply env overrides.
    ///
    /// Missing config file is not an error when loading from default path; defaults are used.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let path_buf = path.map_or_else(Self::default_path, Path::to_path_buf);
        let is_explicit_path = path.is_some();

        let mut cfg = if path_buf.exists() {
            let raw = fs::read_to_string(&path_buf).map_err(|source| NofomoError::Io {
                path: path_buf.clone(),
                source,
            })?;
            toml::from_str::<Self>(&raw)?
        } else if is_explicit_path {
            return Err(NofomoError::MissingConfig { path: path_buf });
        } else {
            Self::default()
        };

        cfg.paths.config_file = path_buf;
        cfg.apply_env_overrides_from(env_var)?;
        cfg.validate()?;
        Ok(cfg)
    }

    /// Deterministic hash of the effective config for the activity log.
    ///
    /// FNV-1a over the canonical JSON encoding, stable across processes.
    pub fn stable_hash(&self) -> Result<String> {
        let canonical = serde_json::to_string(self)?;
        Ok(format!("{:016x}", fnv1a(canonical.as_bytes())))
    }

    fn apply_env_overrides_from<F>(&mut self, mut lookup: F) -> Result<()>
    where
        F: FnMut(&str) -> Option<String>,
    {
        if let Some(raw) = lookup("NOFOMO_TIMING_FETCH_LATENCY_MS") {
            self.timing.fetch_latency_ms = parse_env_u64("NOFOMO_TIMING_FETCH_LATENCY_MS", &raw)?;
        }
        if let Some(raw) = lookup("NOFOMO_TIMING_REPLY_DELAY_MS") {
            self.timing.reply_delay_ms = parse_env_u64("NOFOMO_TIMING_REPLY_DELAY_MS", &raw)?;
        }

        if let Some(raw) = lookup("NOFOMO_VIEW_START_TAB") {
            self.view.start_tab = raw.parse().map_err(|details| NofomoError::ConfigParse {
                context: "env",
                details: format!("NOFOMO_VIEW_START_TAB={raw:?}: {details}"),
            })?;
        }
        if let Some(raw) = lookup("NOFOMO_VIEW_USER_TYPE") {
            self.view.user_type = raw.parse().map_err(|details| NofomoError::ConfigParse {
                context: "env",
                details: format!("NOFOMO_VIEW_USER_TYPE={raw:?}: {details}"),
            })?;
        }

        if let Some(raw) = lookup("NOFOMO_LOGGING_ENABLED") {
            self.logging.enabled = parse_env_bool("NOFOMO_LOGGING_ENABLED", &raw)?;
        }
        if let Some(raw) = lookup("NOFOMO_LOGGING_MAX_SIZE_BYTES") {
            self.logging.max_size_bytes = parse_env_u64("NOFOMO_LOGGING_MAX_SIZE_BYTES", &raw)?;
        }
        if let Some(raw) = lookup("NOFOMO_PATHS_JSONL_LOG") {
            self.paths.jsonl_log = PathBuf::from(raw);
        }

        Ok(())
    }

    fn validate(&self) -> Result<()> {
        validate_delay("timing.fetch_latency_ms", self.timing.fetch_latency_ms)?;
        validate_delay("timing.reply_delay_ms", self.timing.reply_delay_ms)?;

        if self.logging.max_size_bytes < 1024 {
            return Err(NofomoError::InvalidConfig {
                details: format!(
                    "logging.max_size_bytes must be >= 1024, got {}",
                    self.logging.max_size_bytes
                ),
            });
        }
        if self.logging.max_rotated_files == 0 {
            return Err(NofomoError::InvalidConfig {
                details: "logging.max_rotated_files must be >= 1".to_string(),
            });
        }
        if self.logging.enabled && self.paths.jsonl_log.as_os_str().is_empty() {
            return Err(NofomoError::InvalidConfig {
                details: "paths.jsonl_log must be set when logging is enabled".to_string(),
            });
        }

        Ok(())
    }
}

/// FNV-1a 64-bit hash.
pub(crate) fn fnv1a(bytes: &[u8]) -> u64 {
    let mut hash: u64 = 0xcbf2_9ce4_8422_2325;
    for byte in bytes {
        hash ^= u64::from(*byte);
        hash = hash.wrapping_mul(0x0100_0000_01b3);
    }
    hash
}

fn validate_delay(name: &str, value: u64) -> Result<()> {
    if value == 0 || value > MAX_DELAY_MS {
        return Err(NofomoError::InvalidConfig {
            details: format!("{name} must be in [1,{MAX_DELAY_MS}], got {value}"),
        });
    }
    Ok(())
}

fn env_var(name: &str) -> Option<String> {
    env::var(name).ok().filter(|raw| !raw.trim().is_empty())
}

fn parse_env_u64(name: &str, raw: &str) -> Result<u64> {
    raw.parse::<u64>().map_err(|error| NofomoError::ConfigParse {
        context: "env",
        details: format!("{name}={raw:?}: {error}"),
    })
}

fn parse_env_bool(name: &str, raw: &str) -> Result<bool> {
    raw.parse::<bool>().map_err(|error| NofomoError::ConfigParse {
        context: "env",
        details: format!("{name}={raw:?}: {error}"),
    })
}

#[cfg(test)]
mod tests {
    use super::{Config, NofomoError};
    use crate::dashboard::model::{Tab, UserType};
    use std::collections::HashMap;
    use std::path::{Path, PathBuf};

    fn vars(pairs: &[(&str, &str)]) -> HashMap<String, String> {
        pairs
            .iter()
            .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
            .collect()
    }

    #[test]
    fn default_config_is_valid() {
        let cfg = Config::default();
        assert!(cfg.validate().is_ok());
        assert_eq!(cfg.timing.fetch_latency_ms, 500);
        assert_eq!(cfg.timing.reply_delay_ms, 1_000);
        assert_eq!(cfg.view.start_tab, Tab::Overview);
        assert_eq!(cfg.view.user_type, UserType::Individual);
    }

    #[test]
    fn zero_latency_rejected() {
        let mut cfg = Config::default();
        cfg.timing.fetch_latency_ms = 0;
        let err = cfg.validate().unwrap_err();
        assert!(matches!(err, NofomoError::InvalidConfig { .. }));
    }

    #[test]
    fn oversized_reply_delay_rejected() {
        let mut cfg = Config::default();
        cfg.timing.reply_delay_ms = 120_000;
        assert!(cfg.validate().is_err());
    }

    #[test]
    fn tiny_log_cap_rejected() {
        let mut cfg = Config::default();
        cfg.logging.max_size_bytes = 10;
        assert!(cfg.validate().is_err());
    }

    #[test]
    fn stable_hash_changes_when_config_changes() {
        let a = Config::default();
        let mut b = Config::default();
        b.timing.reply_delay_ms = 250;
        assert_ne!(a.stable_hash().unwrap(), b.stable_hash().unwrap());
    }

    #[test]
    fn stable_hash_deterministic() {
        let cfg = Config::default();
        assert_eq!(cfg.stable_hash().unwrap(), cfg.stable_hash().unwrap());
    }

    #[test]
    fn env_overrides_apply_to_every_section() {
        let env = vars(&[
            ("NOFOMO_TIMING_FETCH_LATENCY_MS", "50"),
            ("NOFOMO_TIMING_REPLY_DELAY_MS", "75"),
            ("NOFOMO_VIEW_START_TAB", "sentiment"),
            ("NOFOMO_VIEW_USER_TYPE", "investor-relations"),
            ("NOFOMO_LOGGING_ENABLED", "false"),
            ("NOFOMO_PATHS_JSONL_LOG", "/tmp/nofomo-test.jsonl"),
        ]);
        let mut cfg = Config::default();
        cfg.apply_env_overrides_from(|name| env.get(name).cloned())
            .unwrap();

        assert_eq!(cfg.timing.fetch_latency_ms, 50);
        assert_eq!(cfg.timing.reply_delay_ms, 75);
        assert_eq!(cfg.view.start_tab, Tab::Sentiment);
        assert_eq!(cfg.view.user_type, UserType::InvestorRelations);
        assert!(!cfg.logging.enabled);
        assert_eq!(cfg.paths.jsonl_log, PathBuf::from("/tmp/nofomo-test.jsonl"));
    }

    #[test]
    fn env_invalid_number_rejected() {
        let env = vars(&[("NOFOMO_TIMING_FETCH_LATENCY_MS", "soon")]);
        let mut cfg = Config::default();
        let err = cfg
            .apply_env_overrides_from(|name| env.get(name).cloned())
            .unwrap_err();
        assert!(matches!(
            err,
            NofomoError::ConfigParse { context: "env", .. }
        ));
    }

    #[test]
    fn env_unknown_tab_rejected() {
        let env = vars(&[("NOFOMO_VIEW_START_TAB", "charts")]);
        let mut cfg = Config::default();
        assert!(cfg
            .apply_env_overrides_from(|name| env.get(name).cloned())
            .is_err());
    }

    #[test]
    fn load_returns_error_for_explicit_missing_path() {
        let err = Config::load(Some(Path::new("/definitely/not/here/nofomo.toml"))).unwrap_err();
        assert!(matches!(err, NofomoError::MissingConfig { .. }));
    }

    #[test]
    fn load_parses_partial_toml_with_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(
            &path,
            "[timing]\nreply_delay_ms = 200\n\n[view]\nstart_tab = \"advisor\"\nuser_type = \"advisor\"\n",
        )
        .unwrap();

        let cfg = Config::load(Some(&path)).unwrap();
        assert_eq!(cfg.timing.reply_delay_ms, 200);
        assert_eq!(cfg.timing.fetch_latency_ms, 500);
        assert_eq!(cfg.view.start_tab, Tab::Advisor);
        assert_eq!(cfg.view.user_type, UserType::Advisor);
        assert_eq!(cfg.paths.config_file, path);
    }

    #[test]
    fn load_rejects_malformed_toml() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "[timing\nfetch_latency_ms = ").unwrap();
        let err = Config::load(Some(&path)).unwrap_err();
        assert_eq!(err.code(), "NFM-1003");
    }
}
