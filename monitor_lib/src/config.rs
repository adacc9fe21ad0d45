use once_cell::sync::Lazy;
use serde::Deserialize;
use sspi_shared::{DiagError, LogLevel, Result};
use std::path::Path;

pub const ENV_LOG_LEVEL: &str = "SSPI_MONITOR_LOG_LEVEL";
pub const ENV_MASK_SECRETS: &str = "SSPI_MONITOR_MASK_SECRETS";
pub const ENV_CHAIN_DUMP: &str = "SSPI_MONITOR_CHAIN_DUMP";
pub const ENV_CONFIG_FILE: &str = "SSPI_MONITOR_CONFIG";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    pub log_level: LogLevel,
    /// Replace logged passwords with a fixed mask.
    pub mask_secrets: bool,
    /// Dump the whole certificate chain when a policy check fails.
    pub chain_dump: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            log_level: LogLevel::Debug,
            mask_secrets: true,
            chain_dump: true,
        }
    }
}

/// Fields a JSON config file may override; anything absent keeps its
/// environment value.
#[derive(Deserialize, Debug, Default)]
#[serde(default)]
struct ConfigOverrides {
    log_level: Option<LogLevel>,
    mask_secrets: Option<bool>,
    chain_dump: Option<bool>,
}

impl Config {
    fn from_vars(var: impl Fn(&str) -> Option<String>) -> Self {
        let defaults = Config::default();

        let log_level = var(ENV_LOG_LEVEL)
            .and_then(|s| s.parse().ok())
            .unwrap_or(defaults.log_level);

        let mask_secrets = var(ENV_MASK_SECRETS)
            .and_then(|s| s.trim().parse::<bool>().ok())
            .unwrap_or(defaults.mask_secrets);

        let chain_dump = var(ENV_CHAIN_DUMP)
            .and_then(|s| s.trim().parse::<bool>().ok())
            .unwrap_or(defaults.chain_dump);

        Self {
            log_level,
            mask_secrets,
            chain_dump,
        }
    }

    fn from_env() -> Self {
        let mut config = Self::from_vars(|name| std::env::var(name).ok());
        if let Ok(path) = std::env::var(ENV_CONFIG_FILE) {
            // A broken file must not keep the monitor from loading.
            let _ = config.apply_file(path);
        }
        config
    }

    pub fn apply_json(&mut self, text: &str) -> Result<()> {
        let overrides: ConfigOverrides =
            serde_json::from_str(text).map_err(|e| DiagError::Config(e.to_string()))?;
        if let Some(level) = overrides.log_level {
            self.log_level = level;
        }
        if let Some(mask) = overrides.mask_secrets {
            self.mask_secrets = mask;
        }
        if let Some(dump) = overrides.chain_dump {
            self.chain_dump = dump;
        }
        Ok(())
    }

    pub fn apply_file(&mut self, path: impl AsRef<Path>) -> Result<()> {
        let text = std::fs::read_to_string(path.as_ref())
            .map_err(|e| DiagError::Config(format!("{}: {}", path.as_ref().display(), e)))?;
        self.apply_json(&text)
    }
}

pub static CONFIG: Lazy<Config> = Lazy::new(Config::from_env);

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn vars(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |name| map.get(name).cloned()
    }

    #[test]
    fn test_defaults_without_environment() {
        assert_eq!(Config::from_vars(vars(&[])), Config::default());
    }

    #[test]
    fn test_environment_values() {
        let config = Config::from_vars(vars(&[
            (ENV_LOG_LEVEL, "info"),
            (ENV_MASK_SECRETS, "false"),
            (ENV_CHAIN_DUMP, " false "),
        ]));
        assert_eq!(config.log_level, LogLevel::Info);
        assert!(!config.mask_secrets);
        assert!(!config.chain_dump);
    }

    #[test]
    fn test_invalid_environment_values_fall_back() {
        let config = Config::from_vars(vars(&[(ENV_LOG_LEVEL, "chatty"), (ENV_MASK_SECRETS, "yes")]));
        assert_eq!(config, Config::default());
    }

    #[test]
    fn test_json_overrides_only_present_fields() {
        let mut config = Config::default();
        config.apply_json(r#"{ "log_level": "trace", "chain_dump": false }"#).unwrap();
        assert_eq!(config.log_level, LogLevel::Trace);
        assert!(!config.chain_dump);
        assert!(config.mask_secrets);
    }

    #[test]
    fn test_bad_json_is_a_config_error() {
        let mut config = Config::default();
        let err = config.apply_json("{ not json").unwrap_err();
        assert!(matches!(err, DiagError::Config(_)));
        assert_eq!(config, Config::default());
    }

    #[test]
    fn test_config_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("monitor.json");
        std::fs::write(&path, r#"{ "mask_secrets": false }"#).unwrap();
        let mut config = Config::default();
        config.apply_file(&path).unwrap();
        assert!(!config.mask_secrets);
        assert!(config.apply_file(dir.path().join("missing.json")).is_err());
    }
}
