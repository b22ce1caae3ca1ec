pub mod fetch;
pub mod live;

pub use crate::{
    config::{fetch::FetchConfig, live::LiveConfig},
    defaults,
};
use crate::utils::{is_opt_env_var, trim_opt_env_key};
use serde::Deserialize;
use std::{fs::File, io::Error, path::Path};
use strum::{AsRefStr, EnumString};
use thiserror::Error;

/// Error type returned by configuration operations.
#[derive(Error, Debug)]
pub enum PagerConfigError {
    #[error("Error parsing env variables from config")]
    EnvVarParseError(#[from] std::env::VarError),
    #[error("Error processing file: {0:?}")]
    ConfigFileError(#[from] Error),
    #[error("Error processing YAML file: {0:?}")]
    SerdeYamlError(#[from] serde_yaml::Error),
    #[error("Invalid value for '{0}': expected {1}")]
    InvalidValue(String, &'static str),
}

/// Result type returned by configuration operations.
pub type PagerConfigResult<T> = core::result::Result<T, PagerConfigError>;

/// Environment variables consulted when a setting is not given explicitly.
#[derive(Debug, EnumString, AsRefStr)]
pub enum EnvVar {
    #[strum(serialize = "FEED_PAGER_LOG_LEVEL")]
    LogLevel,
}

/// Return the value of an environment variable or a default value.
pub fn env_or_default(var: EnvVar, default: String) -> String {
    std::env::var(var.as_ref()).unwrap_or(default)
}

/// Resolve a `$VAR` or `${VAR}` value of `key` from the environment, in place.
fn resolve_opt_env_var(key: &str, value: &mut String) -> PagerConfigResult<()> {
    if !value.starts_with('$') {
        return Ok(());
    }

    match trim_opt_env_key(value) {
        Some(name) if is_opt_env_var(value) => {
            let resolved = std::env::var(name)?;
            *value = resolved;
            Ok(())
        }
        _ => Err(PagerConfigError::InvalidValue(
            key.to_string(),
            "an environment variable reference like `$VAR` or `${VAR}`",
        )),
    }
}

/// Missing keys take their values from [`defaults`].
#[derive(Clone, Deserialize, Debug)]
#[serde(default)]
pub struct PagerConfig {
    /// Log level used when `RUST_LOG` is not set.
    pub log_level: String,

    /// Enable verbose (debug) logging for the pager crates.
    pub verbose: bool,

    /// Number of edges requested per page.
    pub page_size: u32,

    /// Page fetch retry settings.
    pub fetch: FetchConfig,

    /// Live update channel settings.
    pub live: LiveConfig,
}

impl Default for PagerConfig {
    fn default() -> Self {
        Self {
            log_level: env_or_default(EnvVar::LogLevel, defaults::LOG_LEVEL.to_string()),
            verbose: defaults::VERBOSE,
            page_size: defaults::PAGE_SIZE,
            fetch: FetchConfig::default(),
            live: LiveConfig::default(),
        }
    }
}

fn as_bool(value: &serde_yaml::Value, key: &str) -> PagerConfigResult<bool> {
    value
        .as_bool()
        .ok_or_else(|| PagerConfigError::InvalidValue(key.to_string(), "a boolean"))
}

fn as_u64(value: &serde_yaml::Value, key: &str) -> PagerConfigResult<u64> {
    value.as_u64().ok_or_else(|| {
        PagerConfigError::InvalidValue(key.to_string(), "a non-negative integer")
    })
}

fn as_string(value: &serde_yaml::Value, key: &str) -> PagerConfigResult<String> {
    value
        .as_str()
        .map(|s| s.to_string())
        .ok_or_else(|| PagerConfigError::InvalidValue(key.to_string(), "a string"))
}

impl PagerConfig {
    // When building the config via a file, if any section (e.g., fetch, live, etc),
    // or if any individual setting in a section (e.g., fetch.retry_attempts) is empty,
    // replace it with its respective default value.
    pub fn from_file(path: impl AsRef<Path>) -> PagerConfigResult<Self> {
        let file = File::open(path)?;
        let content: serde_yaml::Value = serde_yaml::from_reader(file)?;
        Self::from_yaml(&content)
    }

    pub fn from_yaml(content: &serde_yaml::Value) -> PagerConfigResult<Self> {
        let mut config = PagerConfig::default();

        if let Some(log_level) = content.get("log_level") {
            config.log_level = as_string(log_level, "log_level")?;
        }

        if let Some(verbose) = content.get("verbose") {
            config.verbose = as_bool(verbose, "verbose")?;
        }

        if let Some(page_size) = content.get("page_size") {
            config.page_size = match u32::try_from(as_u64(page_size, "page_size")?) {
                Ok(0) | Err(_) => {
                    return Err(PagerConfigError::InvalidValue(
                        "page_size".into(),
                        "a positive 32-bit integer",
                    ))
                }
                Ok(n) => n,
            };
        }

        if let Some(section) = content.get("fetch") {
            if let Some(retry_attempts) = section.get("retry_attempts") {
                config.fetch.retry_attempts =
                    as_u64(retry_attempts, "fetch.retry_attempts")? as usize;
            }

            if let Some(delay) = section.get("initial_retry_delay_ms") {
                config.fetch.initial_retry_delay_ms =
                    as_u64(delay, "fetch.initial_retry_delay_ms")?;
            }
        }

        if let Some(section) = content.get("live") {
            if let Some(enabled) = section.get("enabled") {
                config.live.enabled = as_bool(enabled, "live.enabled")?;
            }

            if let Some(capacity) = section.get("channel_capacity") {
                let capacity = as_u64(capacity, "live.channel_capacity")? as usize;
                if capacity == 0 {
                    return Err(PagerConfigError::InvalidValue(
                        "live.channel_capacity".into(),
                        "a positive integer",
                    ));
                }
                config.live.channel_capacity = capacity;
            }
        }

        config.inject_opt_env_vars()?;

        Ok(config)
    }

    // Only string settings can reference the environment.
    pub fn inject_opt_env_vars(&mut self) -> PagerConfigResult<()> {
        resolve_opt_env_var("log_level", &mut self.log_level)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    fn parse(s: &str) -> PagerConfigResult<PagerConfig> {
        let content: serde_yaml::Value = serde_yaml::from_str(s)?;
        PagerConfig::from_yaml(&content)
    }

    #[test]
    fn test_pager_config_will_supplement_top_level_config_vars() {
        let config = parse(
            r#"
    verbose: true

    ## Fetch configuration
    #
    fetch:
      retry_attempts: 5
    "#,
        )
        .unwrap();

        assert!(config.verbose);
        assert_eq!(config.page_size, defaults::PAGE_SIZE);
        assert_eq!(config.fetch.retry_attempts, 5);
        assert_eq!(
            config.fetch.initial_retry_delay_ms,
            defaults::INITIAL_RETRY_DELAY_MS
        );
    }

    #[test]
    fn test_pager_config_will_supplement_entire_config_sections() {
        let config = parse(
            r#"
    page_size: 20
    "#,
        )
        .unwrap();

        assert_eq!(config.page_size, 20);
        assert_eq!(config.live.enabled, defaults::LIVE_UPDATES_ENABLED);
        assert_eq!(config.live.channel_capacity, defaults::LIVE_CHANNEL_CAPACITY);
        assert_eq!(config.fetch.retry_attempts, defaults::FETCH_RETRY_ATTEMPTS);
    }

    #[test]
    fn test_pager_config_rejects_wrongly_typed_values() {
        let res = parse(
            r#"
    live:
      enabled: "sometimes"
    "#,
        );
        assert!(matches!(
            res,
            Err(PagerConfigError::InvalidValue(key, _)) if key == "live.enabled"
        ));

        let res = parse(
            r#"
    live:
      channel_capacity: 0
    "#,
        );
        assert!(matches!(res, Err(PagerConfigError::InvalidValue(..))));
    }

    #[test]
    fn test_pager_config_resolves_env_vars() {
        std::env::set_var("FEED_PAGER_TEST_LEVEL", "debug");
        let config = parse(
            r#"
    log_level: ${FEED_PAGER_TEST_LEVEL}
    "#,
        )
        .unwrap();
        assert_eq!(config.log_level, "debug");

        let res = parse(
            r#"
    log_level: $FEED_PAGER_TEST_UNSET_LEVEL
    "#,
        );
        assert!(matches!(res, Err(PagerConfigError::EnvVarParseError(_))));
    }

    #[test]
    fn test_pager_config_rejects_malformed_env_var_references() {
        for value in [r#""${""#, r#""${FEED_PAGER_TEST_LEVEL""#, r#""$""#] {
            let res = parse(&format!("log_level: {value}"));
            assert!(
                matches!(
                    &res,
                    Err(PagerConfigError::InvalidValue(key, _)) if key == "log_level"
                ),
                "{value} was accepted: {res:?}"
            );
        }
    }

    #[test]
    fn test_pager_config_rejects_zero_page_size() {
        let res = parse("page_size: 0");
        assert!(matches!(
            res,
            Err(PagerConfigError::InvalidValue(key, _)) if key == "page_size"
        ));
    }

    #[test]
    fn test_pager_config_deserializes_with_defaults() {
        let config: PagerConfig = serde_yaml::from_str(
            r#"
    verbose: true
    fetch:
      retry_attempts: 7
    "#,
        )
        .unwrap();

        assert!(config.verbose);
        assert_eq!(config.page_size, defaults::PAGE_SIZE);
        assert_eq!(config.fetch.retry_attempts, 7);
        assert_eq!(
            config.fetch.initial_retry_delay_ms,
            defaults::INITIAL_RETRY_DELAY_MS
        );
        assert_eq!(config.live.channel_capacity, defaults::LIVE_CHANNEL_CAPACITY);
        assert!(!config.log_level.is_empty());
    }

    #[test]
    fn test_pager_config_from_file() {
        let file_path: &str = "feed_pager_config_test.yaml";
        let config_str = r#"
    log_level: warn
    live:
      enabled: false
    "#;

        fs::write(file_path, config_str).unwrap();
        let config = PagerConfig::from_file(file_path).unwrap();
        fs::remove_file(file_path).unwrap();

        assert_eq!(config.log_level, "warn");
        assert!(!config.live.enabled);
    }
}
