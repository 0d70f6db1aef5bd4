//! Process configuration from environment variables

use std::path::PathBuf;
use std::time::Duration;
use thiserror::Error;

const DEFAULT_API_URL: &str = "https://api.telegram.org";
const DEFAULT_POLL_TIMEOUT_SECS: u64 = 60;
const DEFAULT_QUEUE_CAPACITY: usize = 64;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("{0} is not set")]
    Missing(&'static str),
    #[error("{name} has invalid value {value:?}: {reason}")]
    Invalid {
        name: &'static str,
        value: String,
        reason: String,
    },
}

#[derive(Debug, Clone)]
pub struct Config {
    pub bot_token: String,
    /// The only sender whose updates are processed
    pub operator_id: i64,
    pub db_path: PathBuf,
    pub api_url: String,
    pub poll_timeout: Duration,
    pub queue_capacity: usize,
}

impl Config {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    fn from_lookup(var: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let bot_token = var("ENIGMA_BOT_TOKEN")
            .filter(|t| !t.trim().is_empty())
            .ok_or(ConfigError::Missing("ENIGMA_BOT_TOKEN"))?;

        let operator_id: i64 = parse_required(&var, "ENIGMA_OPERATOR_ID")?;
        if operator_id == 0 {
            return Err(ConfigError::Invalid {
                name: "ENIGMA_OPERATOR_ID",
                value: "0".to_string(),
                reason: "must be a non-zero user id".to_string(),
            });
        }

        let db_path = var("ENIGMA_DB_PATH").map_or_else(
            || {
                let home = var("HOME").unwrap_or_else(|| "/tmp".to_string());
                PathBuf::from(format!("{home}/.enigma/enigma.db"))
            },
            PathBuf::from,
        );

        let queue_capacity = parse_optional(&var, "ENIGMA_QUEUE_CAPACITY", DEFAULT_QUEUE_CAPACITY)?;
        if queue_capacity == 0 {
            return Err(ConfigError::Invalid {
                name: "ENIGMA_QUEUE_CAPACITY",
                value: "0".to_string(),
                reason: "must be at least 1".to_string(),
            });
        }

        Ok(Self {
            bot_token,
            operator_id,
            db_path,
            api_url: var("ENIGMA_API_URL").unwrap_or_else(|| DEFAULT_API_URL.to_string()),
            poll_timeout: Duration::from_secs(parse_optional(
                &var,
                "ENIGMA_POLL_TIMEOUT_SECS",
                DEFAULT_POLL_TIMEOUT_SECS,
            )?),
            queue_capacity,
        })
    }
}

fn parse_required<T>(var: &impl Fn(&str) -> Option<String>, name: &'static str) -> Result<T, ConfigError>
where
    T: std::str::FromStr,
    T::Err: std::fmt::Display,
{
    let value = var(name).ok_or(ConfigError::Missing(name))?;
    value.trim().parse().map_err(|e: T::Err| ConfigError::Invalid {
        name,
        reason: e.to_string(),
        value,
    })
}

fn parse_optional<T>(
    var: &impl Fn(&str) -> Option<String>,
    name: &'static str,
    default: T,
) -> Result<T, ConfigError>
where
    T: std::str::FromStr,
    T::Err: std::fmt::Display,
{
    match var(name) {
        Some(_) => parse_required(var, name),
        None => Ok(default),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
            .collect();
        move |name| map.get(name).cloned()
    }

    #[test]
    fn test_defaults() {
        let config = Config::from_lookup(lookup(&[
            ("ENIGMA_BOT_TOKEN", "123:abc"),
            ("ENIGMA_OPERATOR_ID", "42"),
            ("HOME", "/home/op"),
        ]))
        .unwrap();

        assert_eq!(config.bot_token, "123:abc");
        assert_eq!(config.operator_id, 42);
        assert_eq!(config.db_path, PathBuf::from("/home/op/.enigma/enigma.db"));
        assert_eq!(config.api_url, DEFAULT_API_URL);
        assert_eq!(config.poll_timeout, Duration::from_secs(60));
        assert_eq!(config.queue_capacity, 64);
    }

    #[test]
    fn test_overrides() {
        let config = Config::from_lookup(lookup(&[
            ("ENIGMA_BOT_TOKEN", "t"),
            ("ENIGMA_OPERATOR_ID", " -100 "),
            ("ENIGMA_DB_PATH", "/var/lib/enigma.db"),
            ("ENIGMA_API_URL", "http://localhost:8081"),
            ("ENIGMA_POLL_TIMEOUT_SECS", "5"),
            ("ENIGMA_QUEUE_CAPACITY", "8"),
        ]))
        .unwrap();

        assert_eq!(config.operator_id, -100);
        assert_eq!(config.db_path, PathBuf::from("/var/lib/enigma.db"));
        assert_eq!(config.api_url, "http://localhost:8081");
        assert_eq!(config.poll_timeout, Duration::from_secs(5));
        assert_eq!(config.queue_capacity, 8);
    }

    #[test]
    fn test_missing_token() {
        let err = Config::from_lookup(lookup(&[("ENIGMA_OPERATOR_ID", "42")])).unwrap_err();
        assert!(matches!(err, ConfigError::Missing("ENIGMA_BOT_TOKEN")));

        let err = Config::from_lookup(lookup(&[
            ("ENIGMA_BOT_TOKEN", "  "),
            ("ENIGMA_OPERATOR_ID", "42"),
        ]))
        .unwrap_err();
        assert!(matches!(err, ConfigError::Missing("ENIGMA_BOT_TOKEN")));
    }

    #[test]
    fn test_invalid_operator() {
        let err = Config::from_lookup(lookup(&[
            ("ENIGMA_BOT_TOKEN", "t"),
            ("ENIGMA_OPERATOR_ID", "someone"),
        ]))
        .unwrap_err();
        assert!(matches!(err, ConfigError::Invalid { name: "ENIGMA_OPERATOR_ID", .. }));

        let err = Config::from_lookup(lookup(&[
            ("ENIGMA_BOT_TOKEN", "t"),
            ("ENIGMA_OPERATOR_ID", "0"),
        ]))
        .unwrap_err();
        assert!(matches!(err, ConfigError::Invalid { name: "ENIGMA_OPERATOR_ID", .. }));
    }

    #[test]
    fn test_zero_queue_capacity_rejected() {
        let err = Config::from_lookup(lookup(&[
            ("ENIGMA_BOT_TOKEN", "t"),
            ("ENIGMA_OPERATOR_ID", "1"),
            ("ENIGMA_QUEUE_CAPACITY", "0"),
        ]))
        .unwrap_err();
        assert!(err.to_string().contains("ENIGMA_QUEUE_CAPACITY"));
    }
}
