//! Configuration module
//!
//! Builds the run configuration once at startup from the environment. The
//! job store credentials are required; everything else has a default.

use stagehand_queue::{StoreSettings, TableName};
use std::path::PathBuf;
use std::time::Duration;

use crate::error::ConfigError;

const REQUIRED: [&str; 4] = ["DB_NAME", "COL_NAME", "USERNAME", "SECRET"];

/// Run configuration
#[derive(Debug, Clone)]
pub struct Config {
    /// Working tree to stage from
    pub repo_dir: PathBuf,

    /// Upper bound for each git invocation
    pub git_timeout: Duration,

    /// Job store connection
    pub store: StoreSettings,
}

impl Config {
    /// Creates configuration from environment variables
    ///
    /// Required environment variables:
    /// - DB_NAME: job store database
    /// - COL_NAME: jobs table
    /// - USERNAME, SECRET: job store credentials
    ///
    /// Optional:
    /// - DB_HOST (default: localhost)
    /// - DB_PORT (default: 5432)
    /// - STAGE_GIT_TIMEOUT_SECS (default: 30)
    /// - STAGE_DB_TIMEOUT_SECS (default: 5)
    pub fn from_env(repo_dir: PathBuf) -> Result<Self, ConfigError> {
        Self::from_lookup(repo_dir, |key| std::env::var(key).ok())
    }

    /// Creates configuration from an arbitrary variable source
    pub fn from_lookup(
        repo_dir: PathBuf,
        lookup: impl Fn(&str) -> Option<String>,
    ) -> Result<Self, ConfigError> {
        let value = |key: &str| lookup(key).filter(|v| !v.is_empty());

        let missing: Vec<&'static str> = REQUIRED
            .into_iter()
            .filter(|key| value(*key).is_none())
            .collect();
        if !missing.is_empty() {
            return Err(ConfigError::Missing(missing));
        }

        let collection = value("COL_NAME").unwrap_or_default();
        let table = TableName::parse(&collection).map_err(|e| ConfigError::Invalid {
            name: "COL_NAME",
            value: collection.clone(),
            reason: e.to_string(),
        })?;

        let port = match value("DB_PORT") {
            Some(raw) => raw.parse::<u16>().map_err(|e| ConfigError::Invalid {
                name: "DB_PORT",
                value: raw.clone(),
                reason: e.to_string(),
            })?,
            None => 5432,
        };

        let git_timeout = seconds(value("STAGE_GIT_TIMEOUT_SECS"), "STAGE_GIT_TIMEOUT_SECS", 30)?;
        let db_timeout = seconds(value("STAGE_DB_TIMEOUT_SECS"), "STAGE_DB_TIMEOUT_SECS", 5)?;

        Ok(Self {
            repo_dir,
            git_timeout,
            store: StoreSettings {
                host: value("DB_HOST").unwrap_or_else(|| "localhost".to_string()),
                port,
                database: value("DB_NAME").unwrap_or_default(),
                username: value("USERNAME").unwrap_or_default(),
                password: value("SECRET").unwrap_or_default(),
                table,
                timeout: db_timeout,
            },
        })
    }

    /// Validates the configuration
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.git_timeout.is_zero() {
            return Err(ConfigError::Invalid {
                name: "STAGE_GIT_TIMEOUT_SECS",
                value: "0".to_string(),
                reason: "must be greater than 0".to_string(),
            });
        }

        if self.store.timeout.is_zero() {
            return Err(ConfigError::Invalid {
                name: "STAGE_DB_TIMEOUT_SECS",
                value: "0".to_string(),
                reason: "must be greater than 0".to_string(),
            });
        }

        Ok(())
    }
}

fn seconds(raw: Option<String>, name: &'static str, default: u64) -> Result<Duration, ConfigError> {
    match raw {
        Some(raw) => raw
            .parse::<u64>()
            .map(Duration::from_secs)
            .map_err(|e| ConfigError::Invalid {
                name,
                value: raw.clone(),
                reason: e.to_string(),
            }),
        None => Ok(Duration::from_secs(default)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    fn required() -> Vec<(&'static str, &'static str)> {
        vec![
            ("DB_NAME", "pool_test"),
            ("COL_NAME", "queue"),
            ("USERNAME", "builder"),
            ("SECRET", "s3cret"),
        ]
    }

    #[test]
    fn test_defaults() {
        let config = Config::from_lookup(PathBuf::from("."), lookup(&required())).unwrap();

        assert_eq!(config.store.host, "localhost");
        assert_eq!(config.store.port, 5432);
        assert_eq!(config.store.database, "pool_test");
        assert_eq!(config.store.table.as_str(), "queue");
        assert_eq!(config.store.username, "builder");
        assert_eq!(config.store.password, "s3cret");
        assert_eq!(config.git_timeout, Duration::from_secs(30));
        assert_eq!(config.store.timeout, Duration::from_secs(5));
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_missing_variables_are_all_listed() {
        let err = Config::from_lookup(PathBuf::from("."), lookup(&[("COL_NAME", "queue")]))
            .unwrap_err();

        match err {
            ConfigError::Missing(names) => {
                assert_eq!(names, vec!["DB_NAME", "USERNAME", "SECRET"])
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_empty_values_count_as_missing() {
        let mut vars = required();
        vars[3] = ("SECRET", "");

        let err = Config::from_lookup(PathBuf::from("."), lookup(&vars)).unwrap_err();
        assert!(matches!(err, ConfigError::Missing(names) if names == vec!["SECRET"]));
    }

    #[test]
    fn test_rejects_unsafe_table_name() {
        let mut vars = required();
        vars[1] = ("COL_NAME", "queue; drop table x");

        let err = Config::from_lookup(PathBuf::from("."), lookup(&vars)).unwrap_err();
        assert!(matches!(err, ConfigError::Invalid { name: "COL_NAME", .. }));
    }

    #[test]
    fn test_optional_overrides() {
        let mut vars = required();
        vars.push(("DB_HOST", "db.internal"));
        vars.push(("DB_PORT", "6543"));
        vars.push(("STAGE_GIT_TIMEOUT_SECS", "90"));

        let config = Config::from_lookup(PathBuf::from("/tmp/repo"), lookup(&vars)).unwrap();
        assert_eq!(config.store.host, "db.internal");
        assert_eq!(config.store.port, 6543);
        assert_eq!(config.git_timeout, Duration::from_secs(90));
        assert_eq!(config.repo_dir, PathBuf::from("/tmp/repo"));
    }

    #[test]
    fn test_validation_rejects_zero_timeouts() {
        let mut vars = required();
        vars.push(("STAGE_GIT_TIMEOUT_SECS", "0"));

        let config = Config::from_lookup(PathBuf::from("."), lookup(&vars)).unwrap();
        assert!(config.validate().is_err());

        let mut vars = required();
        vars.push(("DB_PORT", "not-a-port"));
        assert!(Config::from_lookup(PathBuf::from("."), lookup(&vars)).is_err());
    }
}
