//! Run configuration management
//!
//! Loads settings from a TOML file, `POSTSIM_*` environment variables and
//! command-line flags, in increasing order of precedence.

use std::path::Path;
use std::str::FromStr;
use std::time::Duration;

use postsim_engine::executor::{ExecutorConfig, FailurePolicy, DEFAULT_DRAWS};
use postsim_engine::DEFAULT_HORIZON;
use serde::Deserialize;
use thiserror::Error;

/// Configuration error types
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Invalid log level: {0}. Must be one of: trace, debug, info, warn, error")]
    InvalidLogLevel(String),

    #[error("Invalid failure policy: {0}. Must be one of: fail-fast, best-effort")]
    InvalidPolicy(String),

    #[error("Invalid value for {key}: {value}")]
    InvalidValue { key: &'static str, value: String },

    #[error("Configuration file error: {0}")]
    FileError(String),

    #[error(transparent)]
    Executor(#[from] postsim_engine::ConfigError),
}

/// Log levels supported by the CLI
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LogLevel {
    Trace,
    Debug,
    #[default]
    Info,
    Warn,
    Error,
}

impl FromStr for LogLevel {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "trace" => Ok(LogLevel::Trace),
            "debug" => Ok(LogLevel::Debug),
            "info" => Ok(LogLevel::Info),
            "warn" => Ok(LogLevel::Warn),
            "error" => Ok(LogLevel::Error),
            _ => Err(ConfigError::InvalidLogLevel(s.to_string())),
        }
    }
}

impl LogLevel {
    /// Convert log level to tracing filter string
    pub fn as_filter_str(&self) -> &'static str {
        match self {
            LogLevel::Trace => "trace",
            LogLevel::Debug => "debug",
            LogLevel::Info => "info",
            LogLevel::Warn => "warn",
            LogLevel::Error => "error",
        }
    }
}

/// Parses `fail-fast` / `best-effort` (underscores and case ignored)
pub fn parse_policy(s: &str) -> Result<FailurePolicy, ConfigError> {
    match s.to_lowercase().replace('_', "-").as_str() {
        "fail-fast" | "failfast" => Ok(FailurePolicy::FailFast),
        "best-effort" | "besteffort" => Ok(FailurePolicy::BestEffort),
        _ => Err(ConfigError::InvalidPolicy(s.to_string())),
    }
}

/// Run configuration
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct RunConfig {
    /// Number of posterior draws
    pub n_draws: usize,
    /// Worker threads (all cores when absent)
    pub workers: Option<usize>,
    /// Draws submitted per chunk
    pub chunk_size: Option<usize>,
    /// Seed of draw 0
    pub seed: u64,
    /// Behaviour on failed draws
    #[serde(deserialize_with = "deserialize_policy")]
    pub failure_policy: FailurePolicy,
    /// Soft per-draw deadline in seconds
    pub task_timeout_secs: Option<f64>,
    /// Impulse-response horizon
    pub horizon: usize,
    /// Log level
    #[serde(deserialize_with = "deserialize_log_level")]
    pub log_level: LogLevel,
}

fn deserialize_log_level<'de, D>(deserializer: D) -> Result<LogLevel, D::Error>
where
    D: serde::Deserializer<'de>,
{
    let s = String::deserialize(deserializer)?;
    LogLevel::from_str(&s).map_err(serde::de::Error::custom)
}

fn deserialize_policy<'de, D>(deserializer: D) -> Result<FailurePolicy, D::Error>
where
    D: serde::Deserializer<'de>,
{
    let s = String::deserialize(deserializer)?;
    parse_policy(&s).map_err(serde::de::Error::custom)
}

impl Default for RunConfig {
    fn default() -> Self {
        Self {
            n_draws: DEFAULT_DRAWS,
            workers: None,
            chunk_size: None,
            seed: 0,
            failure_policy: FailurePolicy::FailFast,
            task_timeout_secs: None,
            horizon: DEFAULT_HORIZON,
            log_level: LogLevel::Info,
        }
    }
}

fn parse_value<T: FromStr>(key: &'static str, value: &str) -> Result<T, ConfigError> {
    value.trim().parse().map_err(|_| ConfigError::InvalidValue {
        key,
        value: value.to_string(),
    })
}

impl RunConfig {
    /// Load configuration from a TOML file
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| ConfigError::FileError(format!("Failed to read config file: {}", e)))?;

        toml::from_str(&content)
            .map_err(|e| ConfigError::FileError(format!("Failed to parse TOML: {}", e)))
    }

    /// Override fields from `POSTSIM_*` variables supplied by `lookup`
    pub fn apply_env<F>(&mut self, lookup: F) -> Result<(), ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(v) = lookup("POSTSIM_DRAWS") {
            self.n_draws = parse_value("POSTSIM_DRAWS", &v)?;
        }
        if let Some(v) = lookup("POSTSIM_WORKERS") {
            self.workers = Some(parse_value("POSTSIM_WORKERS", &v)?);
        }
        if let Some(v) = lookup("POSTSIM_CHUNK_SIZE") {
            self.chunk_size = Some(parse_value("POSTSIM_CHUNK_SIZE", &v)?);
        }
        if let Some(v) = lookup("POSTSIM_SEED") {
            self.seed = parse_value("POSTSIM_SEED", &v)?;
        }
        if let Some(v) = lookup("POSTSIM_FAILURE_POLICY") {
            self.failure_policy = parse_policy(&v)?;
        }
        if let Some(v) = lookup("POSTSIM_TASK_TIMEOUT_SECS") {
            self.task_timeout_secs = Some(parse_value("POSTSIM_TASK_TIMEOUT_SECS", &v)?);
        }
        if let Some(v) = lookup("POSTSIM_HORIZON") {
            self.horizon = parse_value("POSTSIM_HORIZON", &v)?;
        }
        if let Some(v) = lookup("POSTSIM_LOG_LEVEL") {
            self.log_level = LogLevel::from_str(&v)?;
        }
        Ok(())
    }

    /// Merge with CLI arguments (CLI takes precedence)
    pub fn merge_with_cli(&mut self, cli: &CliArgs) -> Result<(), ConfigError> {
        if let Some(n_draws) = cli.n_draws {
            self.n_draws = n_draws;
        }
        if let Some(workers) = cli.workers {
            self.workers = Some(workers);
        }
        if let Some(chunk_size) = cli.chunk_size {
            self.chunk_size = Some(chunk_size);
        }
        if let Some(seed) = cli.seed {
            self.seed = seed;
        }
        if let Some(policy) = &cli.failure_policy {
            self.failure_policy = parse_policy(policy)?;
        }
        if let Some(timeout) = cli.task_timeout_secs {
            self.task_timeout_secs = Some(timeout);
        }
        if let Some(horizon) = cli.horizon {
            self.horizon = horizon;
        }
        if let Some(log_level) = &cli.log_level {
            self.log_level = LogLevel::from_str(log_level)?;
        }
        Ok(())
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.horizon == 0 {
            return Err(ConfigError::InvalidValue {
                key: "horizon",
                value: "0".to_string(),
            });
        }
        self.executor_config()?;
        Ok(())
    }

    /// Executor configuration for this run
    pub fn executor_config(&self) -> Result<ExecutorConfig, ConfigError> {
        let mut builder = ExecutorConfig::builder()
            .n_draws(self.n_draws)
            .maybe_worker_count(self.workers)
            .failure_policy(self.failure_policy)
            .base_seed(self.seed);
        if let Some(chunk_size) = self.chunk_size {
            builder = builder.chunk_size(chunk_size);
        }
        if let Some(secs) = self.task_timeout_secs {
            builder = builder.task_timeout(timeout_from_secs(secs)?);
        }
        Ok(builder.build()?)
    }
}

/// Converts a timeout in seconds; rejects non-positive, non-finite and
/// out-of-range values.
fn timeout_from_secs(secs: f64) -> Result<Duration, ConfigError> {
    let invalid = || ConfigError::InvalidValue {
        key: "task_timeout_secs",
        value: secs.to_string(),
    };
    if secs <= 0.0 {
        return Err(invalid());
    }
    Duration::try_from_secs_f64(secs).map_err(|_| invalid())
}

/// CLI arguments structure
#[derive(Debug, Clone, Default)]
pub struct CliArgs {
    pub config_file: Option<String>,
    pub log_level: Option<String>,
    pub n_draws: Option<usize>,
    pub workers: Option<usize>,
    pub chunk_size: Option<usize>,
    pub seed: Option<u64>,
    pub failure_policy: Option<String>,
    pub task_timeout_secs: Option<f64>,
    pub horizon: Option<usize>,
}

/// Build configuration from all sources
///
/// Priority (highest to lowest):
/// 1. CLI arguments
/// 2. Environment variables
/// 3. Config file
/// 4. Default values
pub fn build_config(cli: &CliArgs) -> Result<RunConfig, ConfigError> {
    build_config_with_env(cli, |key| std::env::var(key).ok())
}

fn build_config_with_env<F>(cli: &CliArgs, lookup: F) -> Result<RunConfig, ConfigError>
where
    F: Fn(&str) -> Option<String>,
{
    let mut config = match &cli.config_file {
        Some(path) => RunConfig::from_file(Path::new(path))?,
        None => RunConfig::default(),
    };
    config.apply_env(lookup)?;
    config.merge_with_cli(cli)?;
    config.validate()?;
    Ok(config)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn env(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn test_default_config() {
        let config = RunConfig::default();
        assert_eq!(config.n_draws, 1000);
        assert_eq!(config.workers, None);
        assert_eq!(config.seed, 0);
        assert_eq!(config.failure_policy, FailurePolicy::FailFast);
        assert_eq!(config.horizon, DEFAULT_HORIZON);
        assert_eq!(config.log_level, LogLevel::Info);
    }

    #[test]
    fn test_log_level_parsing() {
        assert_eq!(LogLevel::from_str("trace").unwrap(), LogLevel::Trace);
        assert_eq!(LogLevel::from_str("DEBUG").unwrap(), LogLevel::Debug);
        assert_eq!(LogLevel::from_str("Warn").unwrap(), LogLevel::Warn);
        assert!(LogLevel::from_str("loud").is_err());
        assert_eq!(LogLevel::Error.as_filter_str(), "error");
    }

    #[test]
    fn test_policy_parsing() {
        assert_eq!(parse_policy("fail-fast").unwrap(), FailurePolicy::FailFast);
        assert_eq!(parse_policy("BEST_EFFORT").unwrap(), FailurePolicy::BestEffort);
        assert!(matches!(
            parse_policy("retry"),
            Err(ConfigError::InvalidPolicy(_))
        ));
    }

    #[test]
    fn test_toml_deserialization() {
        let toml_str = r#"
            n_draws = 250
            workers = 3
            seed = 7
            failure_policy = "best-effort"
            task_timeout_secs = 1.5
            horizon = 12
            log_level = "debug"
        "#;

        let config: RunConfig = toml::from_str(toml_str).unwrap();
        assert_eq!(config.n_draws, 250);
        assert_eq!(config.workers, Some(3));
        assert_eq!(config.chunk_size, None);
        assert_eq!(config.seed, 7);
        assert_eq!(config.failure_policy, FailurePolicy::BestEffort);
        assert_eq!(config.task_timeout_secs, Some(1.5));
        assert_eq!(config.horizon, 12);
        assert_eq!(config.log_level, LogLevel::Debug);
    }

    #[test]
    fn test_partial_toml_deserialization() {
        let config: RunConfig = toml::from_str("n_draws = 10").unwrap();
        assert_eq!(config.n_draws, 10);
        assert_eq!(config.horizon, DEFAULT_HORIZON);
    }

    #[test]
    fn test_env_overrides() {
        let mut config = RunConfig::default();
        config
            .apply_env(env(&[
                ("POSTSIM_DRAWS", "40"),
                ("POSTSIM_WORKERS", "2"),
                ("POSTSIM_FAILURE_POLICY", "best-effort"),
            ]))
            .unwrap();
        assert_eq!(config.n_draws, 40);
        assert_eq!(config.workers, Some(2));
        assert_eq!(config.failure_policy, FailurePolicy::BestEffort);
    }

    #[test]
    fn test_env_invalid_number() {
        let mut config = RunConfig::default();
        let err = config
            .apply_env(env(&[("POSTSIM_DRAWS", "many")]))
            .unwrap_err();
        assert!(matches!(
            err,
            ConfigError::InvalidValue {
                key: "POSTSIM_DRAWS",
                ..
            }
        ));
    }

    #[test]
    fn test_cli_takes_precedence_over_env() {
        let cli = CliArgs {
            n_draws: Some(5),
            log_level: Some("warn".to_string()),
            ..Default::default()
        };
        let config = build_config_with_env(
            &cli,
            env(&[("POSTSIM_DRAWS", "40"), ("POSTSIM_SEED", "9")]),
        )
        .unwrap();
        assert_eq!(config.n_draws, 5);
        assert_eq!(config.seed, 9);
        assert_eq!(config.log_level, LogLevel::Warn);
    }

    #[test]
    fn test_validation() {
        let config = RunConfig {
            n_draws: 0,
            ..Default::default()
        };
        assert!(matches!(config.validate(), Err(ConfigError::Executor(_))));

        let config = RunConfig {
            horizon: 0,
            ..Default::default()
        };
        assert!(config.validate().is_err());

        let config = RunConfig {
            task_timeout_secs: Some(-1.0),
            ..Default::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_timeout_out_of_range_is_rejected() {
        for secs in [1e20, f64::INFINITY, f64::NAN, 0.0] {
            let config = RunConfig {
                task_timeout_secs: Some(secs),
                ..Default::default()
            };
            assert!(matches!(
                config.validate(),
                Err(ConfigError::InvalidValue {
                    key: "task_timeout_secs",
                    ..
                })
            ));
        }

        let cli = CliArgs::default();
        let result =
            build_config_with_env(&cli, env(&[("POSTSIM_TASK_TIMEOUT_SECS", "1e20")]));
        assert!(matches!(result, Err(ConfigError::InvalidValue { .. })));
    }

    #[test]
    fn test_executor_config() {
        let config = RunConfig {
            n_draws: 30,
            workers: Some(2),
            chunk_size: Some(4),
            seed: 100,
            task_timeout_secs: Some(0.5),
            ..Default::default()
        };
        let executor = config.executor_config().unwrap();
        assert_eq!(executor.n_draws(), 30);
        assert_eq!(executor.workers(), 2);
        assert_eq!(executor.chunk_size(), 4);
        assert_eq!(executor.seed_for(1), 101);
        assert_eq!(executor.task_timeout(), Some(Duration::from_millis(500)));
    }

    #[test]
    fn test_missing_config_file() {
        let err = RunConfig::from_file(Path::new("/nonexistent/postsim.toml")).unwrap_err();
        assert!(matches!(err, ConfigError::FileError(_)));
    }
}
