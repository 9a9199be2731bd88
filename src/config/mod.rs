//! Configuration loading for the Idefix reconciler.
//!
//! Loads layered `.env` files and environment variables prefixed with
//! `IDEFIX_`, producing a typed [`AppConfig`].

use std::{collections::BTreeMap, env, path::PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;

const ENV_PREFIX: &str = "IDEFIX_";
const REDACTED: &str = "[REDACTED]";

/// Application configuration derived from `IDEFIX_*` environment variables.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub struct AppConfig {
    #[serde(default = "default_profile")]
    pub profile: String,
    /// Base URL of the Idefix REST API
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub login: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub password: Option<String>,
    /// Per-request timeout applied to every remote call
    #[serde(default = "default_request_timeout_seconds")]
    pub request_timeout_seconds: u64,
    #[serde(default = "default_log_level")]
    pub log_level: String,
    #[serde(default = "default_log_format")]
    pub log_format: String,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            profile: default_profile(),
            url: None,
            login: None,
            password: None,
            request_timeout_seconds: default_request_timeout_seconds(),
            log_level: default_log_level(),
            log_format: default_log_format(),
        }
    }
}

impl AppConfig {
    /// Returns a redacted JSON representation (secrets are redacted).
    pub fn redacted_json(&self) -> serde_json::Result<String> {
        let mut config = self.clone();
        if config.password.is_some() {
            config.password = Some(REDACTED.to_string());
        }
        serde_json::to_string_pretty(&config)
    }

    fn is_test_profile(&self) -> bool {
        self.profile == "test"
    }

    /// Validates the configuration, returning an error if required settings are missing.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !(1..=600).contains(&self.request_timeout_seconds) {
            return Err(ConfigError::InvalidRequestTimeout {
                value: self.request_timeout_seconds,
            });
        }

        if !matches!(self.log_format.as_str(), "json" | "pretty") {
            return Err(ConfigError::InvalidLogFormat {
                value: self.log_format.clone(),
            });
        }

        if let Some(ref url) = self.url {
            url::Url::parse(url).map_err(|source| ConfigError::InvalidUrl {
                value: url.clone(),
                source,
            })?;
        }

        // Credentials and endpoint are only optional for the test profile
        if !self.is_test_profile() {
            if self.url.is_none() {
                return Err(ConfigError::MissingUrl);
            }
            if self.login.is_none() {
                return Err(ConfigError::MissingLogin);
            }
            if self.password.is_none() {
                return Err(ConfigError::MissingPassword);
            }
        }

        Ok(())
    }
}

fn default_profile() -> String {
    "local".to_string()
}

fn default_request_timeout_seconds() -> u64 {
    30
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_log_format() -> String {
    "json".to_string()
}

/// Errors that can occur while loading configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to load environment file {path}: {source}")]
    EnvFile {
        path: PathBuf,
        source: dotenvy::Error,
    },
    #[error("invalid Idefix URL '{value}': {source}")]
    InvalidUrl {
        value: String,
        source: url::ParseError,
    },
    #[error("Idefix URL is missing; set IDEFIX_URL environment variable")]
    MissingUrl,
    #[error("Idefix login is missing; set IDEFIX_LOGIN environment variable")]
    MissingLogin,
    #[error("Idefix password is missing; set IDEFIX_PASSWORD environment variable")]
    MissingPassword,
    #[error("request timeout must be between 1 and 600 seconds, got {value}")]
    InvalidRequestTimeout { value: u64 },
    #[error("request timeout must be an integer number of seconds, got '{value}'")]
    UnparsableRequestTimeout { value: String },
    #[error("log format must be 'json' or 'pretty', got '{value}'")]
    InvalidLogFormat { value: String },
}

/// Loads configuration using layered `.env` files and `IDEFIX_*` env vars.
pub struct ConfigLoader {
    base_dir: PathBuf,
}

impl ConfigLoader {
    /// Creates a new loader rooted at the current working directory.
    pub fn new() -> Self {
        Self {
            base_dir: env::current_dir().unwrap_or_else(|_| PathBuf::from(".")),
        }
    }

    /// Creates a loader rooted at the provided directory (useful for tests).
    pub fn with_base_dir(base_dir: PathBuf) -> Self {
        Self { base_dir }
    }

    /// Loads and validates the configuration.
    pub fn load(&self) -> Result<AppConfig, ConfigError> {
        let (mut layered, profile_hint) = self.collect_layered_env()?;

        // Overlay process environment last so it wins.
        for (key, value) in env::vars() {
            if let Some(stripped) = key.strip_prefix(ENV_PREFIX) {
                layered.insert(stripped.to_string(), value);
            }
        }

        let non_empty = |value: String| {
            let trimmed = value.trim();
            if trimmed.is_empty() {
                None
            } else {
                Some(trimmed.to_string())
            }
        };

        let profile = layered
            .remove("PROFILE")
            .and_then(non_empty)
            .unwrap_or(profile_hint);
        let url = layered
            .remove("URL")
            .and_then(non_empty)
            .map(|url| url.trim_end_matches('/').to_string());
        let login = layered.remove("LOGIN").and_then(non_empty);
        // Passwords are taken verbatim; only an empty value counts as unset
        let password = layered.remove("PASSWORD").filter(|v| !v.is_empty());
        let request_timeout_seconds = match layered
            .remove("REQUEST_TIMEOUT_SECONDS")
            .and_then(non_empty)
        {
            Some(raw) => raw
                .parse()
                .map_err(|_| ConfigError::UnparsableRequestTimeout { value: raw })?,
            None => default_request_timeout_seconds(),
        };
        let log_level = layered
            .remove("LOG_LEVEL")
            .and_then(non_empty)
            .unwrap_or_else(default_log_level);
        let log_format = layered
            .remove("LOG_FORMAT")
            .and_then(non_empty)
            .map(|format| format.to_ascii_lowercase())
            .unwrap_or_else(default_log_format);

        let config = AppConfig {
            profile,
            url,
            login,
            password,
            request_timeout_seconds,
            log_level,
            log_format,
        };

        config.validate()?;
        Ok(config)
    }

    fn collect_layered_env(&self) -> Result<(BTreeMap<String, String>, String), ConfigError> {
        let mut values = BTreeMap::new();

        self.merge_dotenv(self.base_dir.join(".env"), &mut values)?;
        self.merge_dotenv(self.base_dir.join(".env.local"), &mut values)?;

        let profile = env::var(format!("{ENV_PREFIX}PROFILE"))
            .ok()
            .filter(|v| !v.is_empty())
            .or_else(|| values.get("PROFILE").cloned())
            .unwrap_or_else(default_profile);

        self.merge_dotenv(
            self.base_dir.join(format!(".env.{}", &profile)),
            &mut values,
        )?;
        self.merge_dotenv(
            self.base_dir.join(format!(".env.{}.local", &profile)),
            &mut values,
        )?;

        Ok((values, profile))
    }

    fn merge_dotenv(
        &self,
        path: PathBuf,
        values: &mut BTreeMap<String, String>,
    ) -> Result<(), ConfigError> {
        match dotenvy::from_path_iter(&path) {
            Ok(iter) => {
                for item in iter {
                    let (key, value) = item.map_err(|source| ConfigError::EnvFile {
                        path: path.clone(),
                        source,
                    })?;
                    if let Some(stripped) = key.strip_prefix(ENV_PREFIX) {
                        values.insert(stripped.to_string(), value);
                    }
                }
                Ok(())
            }
            Err(dotenvy::Error::Io(ref io_err))
                if io_err.kind() == std::io::ErrorKind::NotFound =>
            {
                Ok(())
            }
            Err(err) => Err(ConfigError::EnvFile { path, source: err }),
        }
    }
}

impl Default for ConfigLoader {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn complete() -> AppConfig {
        AppConfig {
            profile: "prod".to_string(),
            url: Some("https://idefix.example.com/api".to_string()),
            login: Some("svc-terraform".to_string()),
            password: Some("s3cret".to_string()),
            ..AppConfig::default()
        }
    }

    #[test]
    fn test_default_config_is_valid_for_test_profile_only() {
        let config = AppConfig {
            profile: "test".to_string(),
            ..AppConfig::default()
        };
        assert!(config.validate().is_ok());

        assert!(matches!(
            AppConfig::default().validate(),
            Err(ConfigError::MissingUrl)
        ));
    }

    #[test]
    fn test_credentials_required_outside_test_profile() {
        assert!(complete().validate().is_ok());

        let config = AppConfig {
            login: None,
            ..complete()
        };
        assert!(matches!(config.validate(), Err(ConfigError::MissingLogin)));

        let config = AppConfig {
            password: None,
            ..complete()
        };
        assert!(matches!(config.validate(), Err(ConfigError::MissingPassword)));
    }

    #[test]
    fn test_timeout_and_format_bounds() {
        let config = AppConfig {
            request_timeout_seconds: 0,
            ..complete()
        };
        assert!(matches!(
            config.validate(),
            Err(ConfigError::InvalidRequestTimeout { value: 0 })
        ));

        let config = AppConfig {
            request_timeout_seconds: 601,
            ..complete()
        };
        assert!(config.validate().is_err());

        let config = AppConfig {
            log_format: "xml".to_string(),
            ..complete()
        };
        assert!(matches!(
            config.validate(),
            Err(ConfigError::InvalidLogFormat { .. })
        ));
    }

    #[test]
    fn test_invalid_url_rejected() {
        let config = AppConfig {
            url: Some("not a url".to_string()),
            ..complete()
        };
        assert!(matches!(
            config.validate(),
            Err(ConfigError::InvalidUrl { .. })
        ));
    }

    #[test]
    fn test_redacted_json_hides_password() {
        let json = complete().redacted_json().unwrap();
        assert!(json.contains("[REDACTED]"));
        assert!(!json.contains("s3cret"));
        assert!(json.contains("svc-terraform"));
    }
}
