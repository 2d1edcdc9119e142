//! Runtime configuration.
//!
//! Resolution order: built-in defaults, then the JSON file named by
//! `ESCROW_LEDGER_CONFIG` (if set), then individual `ESCROW_*` variables.

use std::path::Path;

use serde::Deserialize;

use crate::error::ConfigError;

pub const CONFIG_PATH_VAR: &str = "ESCROW_LEDGER_CONFIG";
pub const MAILBOX_CAPACITY_VAR: &str = "ESCROW_MAILBOX_CAPACITY";
pub const EVENT_CAPACITY_VAR: &str = "ESCROW_EVENT_CAPACITY";
pub const LOG_FILTER_VAR: &str = "ESCROW_LOG";
pub const ON_TIME_WINDOW_VAR: &str = "ESCROW_ON_TIME_WINDOW_SECS";

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct LedgerConfig {
    /// Bound of the ledger service's request mailbox.
    pub mailbox_capacity: usize,
    /// Slots in the live event broadcast; slow subscribers past this lag.
    pub event_capacity: usize,
    /// Fallback `tracing` filter when `RUST_LOG` is unset.
    pub log_filter: String,
    /// Window used by the advisory on-time delivery check.
    pub on_time_window_secs: u64,
}

impl Default for LedgerConfig {
    fn default() -> Self {
        Self {
            mailbox_capacity: 100,
            event_capacity: 256,
            log_filter: "info".to_string(),
            on_time_window_secs: 48 * 60 * 60,
        }
    }
}

impl LedgerConfig {
    /// Loads configuration from the process environment.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Loads configuration using `lookup` in place of the environment.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let mut config = match lookup(CONFIG_PATH_VAR) {
            Some(path) => Self::from_file(path)?,
            None => Self::default(),
        };

        if let Some(raw) = lookup(MAILBOX_CAPACITY_VAR) {
            config.mailbox_capacity = parse_var(MAILBOX_CAPACITY_VAR, &raw)?;
        }
        if let Some(raw) = lookup(EVENT_CAPACITY_VAR) {
            config.event_capacity = parse_var(EVENT_CAPACITY_VAR, &raw)?;
        }
        if let Some(raw) = lookup(LOG_FILTER_VAR) {
            config.log_filter = raw;
        }
        if let Some(raw) = lookup(ON_TIME_WINDOW_VAR) {
            config.on_time_window_secs = parse_var(ON_TIME_WINDOW_VAR, &raw)?;
        }

        config.validate()?;
        Ok(config)
    }

    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let display = path.display().to_string();
        let raw = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: display.clone(),
            source,
        })?;
        let config: Self = serde_json::from_str(&raw).map_err(|source| ConfigError::Parse {
            path: display,
            source,
        })?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.mailbox_capacity == 0 {
            return Err(ConfigError::InvalidValue {
                key: "mailbox_capacity",
                value: "0".to_string(),
            });
        }
        if self.event_capacity == 0 {
            return Err(ConfigError::InvalidValue {
                key: "event_capacity",
                value: "0".to_string(),
            });
        }
        Ok(())
    }
}

fn parse_var<T: std::str::FromStr>(key: &'static str, raw: &str) -> Result<T, ConfigError> {
    raw.trim().parse().map_err(|_| ConfigError::InvalidValue {
        key,
        value: raw.to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key: &str| vars.get(key).cloned()
    }

    #[test]
    fn test_defaults_without_environment() {
        let config = LedgerConfig::from_lookup(lookup(&[])).unwrap();
        assert_eq!(config, LedgerConfig::default());
        assert_eq!(config.on_time_window_secs, 172_800);
    }

    #[test]
    fn test_env_overrides() {
        let config = LedgerConfig::from_lookup(lookup(&[
            (MAILBOX_CAPACITY_VAR, "8"),
            (LOG_FILTER_VAR, "escrow_ledger=debug"),
        ]))
        .unwrap();
        assert_eq!(config.mailbox_capacity, 8);
        assert_eq!(config.log_filter, "escrow_ledger=debug");
        assert_eq!(config.event_capacity, 256);
    }

    #[test]
    fn test_rejects_zero_and_garbage() {
        let err = LedgerConfig::from_lookup(lookup(&[(MAILBOX_CAPACITY_VAR, "0")])).unwrap_err();
        assert!(matches!(err, ConfigError::InvalidValue { key: "mailbox_capacity", .. }));

        let err = LedgerConfig::from_lookup(lookup(&[(EVENT_CAPACITY_VAR, "lots")])).unwrap_err();
        assert!(matches!(err, ConfigError::InvalidValue { key: EVENT_CAPACITY_VAR, .. }));
    }

    #[test]
    fn test_file_then_env() {
        let path = std::env::temp_dir().join(format!("escrow-ledger-config-{}.json", std::process::id()));
        std::fs::write(&path, r#"{ "mailbox_capacity": 16, "log_filter": "warn" }"#).unwrap();

        let path_str = path.display().to_string();
        let config = LedgerConfig::from_lookup(lookup(&[
            (CONFIG_PATH_VAR, path_str.as_str()),
            (LOG_FILTER_VAR, "debug"),
        ]))
        .unwrap();
        std::fs::remove_file(&path).unwrap();

        assert_eq!(config.mailbox_capacity, 16);
        assert_eq!(config.log_filter, "debug");
        assert_eq!(config.event_capacity, 256);
    }
}
