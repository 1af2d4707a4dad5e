//! Configuration loading and representation.
//!
//! Layers, later wins:
//! 1. built-in defaults
//! 2. `vanstock.toml` (if present)
//! 3. `VANSTOCK_*` environment variables

use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::Deserialize;
use thiserror::Error;

use vanstock_inventory::ShortfallPolicy;

pub const CONFIG_FILE_NAME: &str = "vanstock.toml";

pub const ENV_DATA_DIR: &str = "VANSTOCK_DATA_DIR";
pub const ENV_ADVISORY_TIMEOUT_MS: &str = "VANSTOCK_ADVISORY_TIMEOUT_MS";
pub const ENV_SHORTFALL_POLICY: &str = "VANSTOCK_SHORTFALL_POLICY";
pub const ENV_LOOKBACK_DAYS: &str = "VANSTOCK_LOOKBACK_DAYS";
pub const ENV_COVERAGE_DAYS: &str = "VANSTOCK_COVERAGE_DAYS";
pub const ENV_ORDER_EMAIL: &str = "VANSTOCK_ORDER_EMAIL";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config file {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid config file {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },

    #[error("invalid value for {var}: {message}")]
    Env { var: &'static str, message: String },

    #[error("{0}")]
    Invalid(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    /// Directory holding the section catalogs and the assembly ledger.
    pub data_dir: PathBuf,
    /// Upper bound for one advisory estimator run.
    pub advisory_timeout: Duration,
    pub shortfall_policy: ShortfallPolicy,
    pub lookback_days: u32,
    pub coverage_days: u32,
    /// Office address reorder e-mails go to. Empty recipient when unset.
    pub order_email: Option<String>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            data_dir: default_data_dir(),
            advisory_timeout: Duration::from_millis(2_000),
            shortfall_policy: ShortfallPolicy::ExcludeLine,
            lookback_days: 90,
            coverage_days: 30,
            order_email: None,
        }
    }
}

/// `vanstock.toml` contents. Every key is optional.
#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
struct FileConfig {
    data_dir: Option<PathBuf>,
    advisory_timeout_ms: Option<u64>,
    shortfall_policy: Option<ShortfallPolicy>,
    lookback_days: Option<u32>,
    coverage_days: Option<u32>,
    order_email: Option<String>,
}

/// Platform data directory, e.g. `~/.local/share/vanstock`.
pub fn default_data_dir() -> PathBuf {
    dirs::data_dir()
        .map(|dir| dir.join("vanstock"))
        .unwrap_or_else(|| PathBuf::from(".vanstock"))
}

impl Config {
    /// Load configuration from an explicit file (must exist) or from
    /// `vanstock.toml` in the working directory (optional), then apply the
    /// process environment.
    pub fn load(file: Option<&Path>) -> Result<Self, ConfigError> {
        let mut config = Config::default();

        match file {
            Some(path) => config.merge_file(path)?,
            None => {
                let local = Path::new(CONFIG_FILE_NAME);
                if local.is_file() {
                    config.merge_file(local)?;
                }
            }
        }

        config.merge_env(|var| std::env::var(var).ok())?;
        config.validate()?;
        Ok(config)
    }

    pub fn merge_file(&mut self, path: &Path) -> Result<(), ConfigError> {
        let raw = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        self.merge_toml(&raw).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }

    fn merge_toml(&mut self, raw: &str) -> Result<(), toml::de::Error> {
        let file: FileConfig = toml::from_str(raw)?;

        if let Some(dir) = file.data_dir {
            self.data_dir = dir;
        }
        if let Some(ms) = file.advisory_timeout_ms {
            self.advisory_timeout = Duration::from_millis(ms);
        }
        if let Some(policy) = file.shortfall_policy {
            self.shortfall_policy = policy;
        }
        if let Some(days) = file.lookback_days {
            self.lookback_days = days;
        }
        if let Some(days) = file.coverage_days {
            self.coverage_days = days;
        }
        if let Some(email) = file.order_email {
            self.order_email = Some(email);
        }
        Ok(())
    }

    /// Overlay environment variables read through `lookup`.
    pub fn merge_env<F>(&mut self, lookup: F) -> Result<(), ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |var: &str| lookup(var).filter(|v| !v.trim().is_empty());

        if let Some(dir) = get(ENV_DATA_DIR) {
            self.data_dir = PathBuf::from(dir);
        }
        if let Some(ms) = get(ENV_ADVISORY_TIMEOUT_MS) {
            self.advisory_timeout = Duration::from_millis(parse_number(ENV_ADVISORY_TIMEOUT_MS, &ms)?);
        }
        if let Some(policy) = get(ENV_SHORTFALL_POLICY) {
            self.shortfall_policy = policy.parse().map_err(|e: vanstock_core::DomainError| ConfigError::Env {
                var: ENV_SHORTFALL_POLICY,
                message: e.to_string(),
            })?;
        }
        if let Some(days) = get(ENV_LOOKBACK_DAYS) {
            self.lookback_days = parse_number(ENV_LOOKBACK_DAYS, &days)?;
        }
        if let Some(days) = get(ENV_COVERAGE_DAYS) {
            self.coverage_days = parse_number(ENV_COVERAGE_DAYS, &days)?;
        }
        if let Some(email) = get(ENV_ORDER_EMAIL) {
            self.order_email = Some(email.trim().to_string());
        }
        Ok(())
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.lookback_days == 0 {
            return Err(ConfigError::Invalid("lookback_days must be at least 1".to_string()));
        }
        if self.coverage_days == 0 {
            return Err(ConfigError::Invalid("coverage_days must be at least 1".to_string()));
        }
        if self.advisory_timeout.is_zero() {
            return Err(ConfigError::Invalid("advisory timeout must be positive".to_string()));
        }
        Ok(())
    }
}

fn parse_number<T: core::str::FromStr>(var: &'static str, raw: &str) -> Result<T, ConfigError>
where
    T::Err: core::fmt::Display,
{
    raw.trim().parse().map_err(|e: T::Err| ConfigError::Env {
        var,
        message: format!("'{raw}': {e}"),
    })
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;

    fn env(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs.iter().map(|(k, v)| (k.to_string(), v.to_string())).collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn defaults_are_valid() {
        let config = Config::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.shortfall_policy, ShortfallPolicy::ExcludeLine);
        assert!(config.data_dir.ends_with("vanstock") || config.data_dir.ends_with(".vanstock"));
    }

    #[test]
    fn file_then_env_later_wins() {
        let mut config = Config::default();
        config
            .merge_toml(
                r#"
                data_dir = "/srv/van-1"
                shortfall_policy = "abort"
                lookback_days = 60
                order_email = "buero@example.de"
                "#,
            )
            .unwrap();

        config
            .merge_env(env(&[
                (ENV_LOOKBACK_DAYS, "14"),
                (ENV_ADVISORY_TIMEOUT_MS, "250"),
                (ENV_ORDER_EMAIL, "  "),
            ]))
            .unwrap();

        assert_eq!(config.data_dir, PathBuf::from("/srv/van-1"));
        assert_eq!(config.shortfall_policy, ShortfallPolicy::AbortTransaction);
        assert_eq!(config.lookback_days, 14);
        assert_eq!(config.advisory_timeout, Duration::from_millis(250));
        // Blank env values are ignored.
        assert_eq!(config.order_email.as_deref(), Some("buero@example.de"));
    }

    #[test]
    fn bad_env_values_name_the_variable() {
        let mut config = Config::default();
        let err = config.merge_env(env(&[(ENV_COVERAGE_DAYS, "a month")])).unwrap_err();
        assert!(matches!(err, ConfigError::Env { var: ENV_COVERAGE_DAYS, .. }));

        let err = config.merge_env(env(&[(ENV_SHORTFALL_POLICY, "ignore")])).unwrap_err();
        assert!(matches!(err, ConfigError::Env { var: ENV_SHORTFALL_POLICY, .. }));
    }

    #[test]
    fn unknown_file_keys_are_rejected() {
        let mut config = Config::default();
        assert!(config.merge_toml("colour = \"blue\"").is_err());
    }

    #[test]
    fn explicit_missing_file_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let err = Config::default().merge_file(&dir.path().join("nope.toml")).unwrap_err();
        assert!(matches!(err, ConfigError::Read { .. }));
    }

    #[test]
    fn zero_windows_fail_validation() {
        let config = Config {
            coverage_days: 0,
            ..Config::default()
        };
        assert!(matches!(config.validate(), Err(ConfigError::Invalid(_))));
    }
}
