use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;

const DEFAULT_HOST: &str = "0.0.0.0";
const DEFAULT_PORT: u16 = 3001;
const DEFAULT_DB_PATH: &str = "./tasks.db";

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("TASKBOARD_PORT must be a port number, got '{0}'")]
    Port(String),
    #[error("TASKBOARD_ENV must be 'development' or 'production', got '{0}'")]
    RunMode(String),
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum RunMode {
    #[default]
    Development,
    Production,
}

impl RunMode {
    /// Log filter used when `RUST_LOG` is unset.
    pub fn default_log_filter(&self) -> &'static str {
        match self {
            Self::Development => "taskboard=debug,tower_http=debug",
            Self::Production => "taskboard=info,tower_http=warn",
        }
    }
}

impl FromStr for RunMode {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "development" | "dev" => Ok(Self::Development),
            "production" | "prod" => Ok(Self::Production),
            _ => Err(ConfigError::RunMode(s.to_string())),
        }
    }
}

impl fmt::Display for RunMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Development => f.write_str("development"),
            Self::Production => f.write_str("production"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    pub host: String,
    pub port: u16,
    pub db_path: PathBuf,
    pub mode: RunMode,
}

impl Config {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Builds the config from any key lookup. Unset and empty values fall back
    /// to defaults.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let var = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        let port = match var("TASKBOARD_PORT") {
            Some(raw) => raw
                .trim()
                .parse()
                .map_err(|_| ConfigError::Port(raw.clone()))?,
            None => DEFAULT_PORT,
        };
        let mode = match var("TASKBOARD_ENV") {
            Some(raw) => raw.parse()?,
            None => RunMode::default(),
        };

        let db_path = var("TASKBOARD_DB_PATH").unwrap_or_else(|| DEFAULT_DB_PATH.into());

        Ok(Self {
            host: var("TASKBOARD_HOST").unwrap_or_else(|| DEFAULT_HOST.into()),
            port,
            db_path: PathBuf::from(db_path),
            mode,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn config(vars: &[(&str, &str)]) -> Result<Config, ConfigError> {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        Config::from_lookup(|key| vars.get(key).cloned())
    }

    #[test]
    fn defaults_apply_when_unset() {
        let config = config(&[]).unwrap();
        assert_eq!(config.host, "0.0.0.0");
        assert_eq!(config.port, 3001);
        assert_eq!(config.db_path, PathBuf::from("./tasks.db"));
        assert_eq!(config.mode, RunMode::Development);
    }

    #[test]
    fn values_are_read_from_lookup() {
        let config = config(&[
            ("TASKBOARD_HOST", "127.0.0.1"),
            ("TASKBOARD_PORT", "8080"),
            ("TASKBOARD_DB_PATH", "/var/lib/taskboard/tasks.db"),
            ("TASKBOARD_ENV", "Production"),
        ])
        .unwrap();
        assert_eq!(config.host, "127.0.0.1");
        assert_eq!(config.port, 8080);
        assert_eq!(config.db_path, PathBuf::from("/var/lib/taskboard/tasks.db"));
        assert_eq!(config.mode, RunMode::Production);
    }

    #[test]
    fn empty_values_count_as_unset() {
        let config = config(&[("TASKBOARD_PORT", ""), ("TASKBOARD_HOST", "  ")]).unwrap();
        assert_eq!(config.port, 3001);
        assert_eq!(config.host, "0.0.0.0");
    }

    #[test]
    fn bad_values_are_errors() {
        assert!(matches!(
            config(&[("TASKBOARD_PORT", "http")]),
            Err(ConfigError::Port(p)) if p == "http"
        ));
        assert!(matches!(
            config(&[("TASKBOARD_PORT", "70000")]),
            Err(ConfigError::Port(_))
        ));
        assert!(matches!(
            config(&[("TASKBOARD_ENV", "staging")]),
            Err(ConfigError::RunMode(_))
        ));
    }

    #[test]
    fn log_filters_follow_mode() {
        assert_eq!(
            RunMode::Production.default_log_filter(),
            "taskboard=info,tower_http=warn"
        );
        assert!(RunMode::Development.default_log_filter().contains("debug"));
        assert_eq!(RunMode::Production.to_string(), "production");
    }
}
