use crate::services::debounce::DEFAULT_DEBOUNCE;
use reqwest::Url;
use std::time::Duration;
use thiserror::Error;

pub const DEFAULT_API_URL: &str = "https://openlibrary.org/search.json";
pub const DEFAULT_COVERS_URL: &str = "https://covers.openlibrary.org";
pub const DEFAULT_SITE_URL: &str = "https://openlibrary.org";
pub const DEFAULT_PORT: u16 = 7004;

#[derive(Error, Debug, PartialEq, Eq)]
pub enum ConfigError {
    #[error("Invalid URL in {name}: '{value}' ({reason})")]
    InvalidUrl {
        name: &'static str,
        value: String,
        reason: String,
    },
    #[error("Invalid number in {name}: '{value}'")]
    InvalidNumber { name: &'static str, value: String },
}

#[derive(Debug, Clone)]
pub struct Config {
    pub api_url: Url,
    pub covers_url: String,
    pub site_url: String,
    pub debounce: Duration,
    pub port: u16,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            api_url: Url::parse(DEFAULT_API_URL).expect("default API URL is valid"),
            covers_url: DEFAULT_COVERS_URL.to_string(),
            site_url: DEFAULT_SITE_URL.to_string(),
            debounce: DEFAULT_DEBOUNCE,
            port: DEFAULT_PORT,
        }
    }
}

impl Config {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = Config::default();

        if let Some(value) = lookup("BOOK_FINDER_API_URL") {
            config.api_url = Url::parse(&value).map_err(|e| ConfigError::InvalidUrl {
                name: "BOOK_FINDER_API_URL",
                value: value.clone(),
                reason: e.to_string(),
            })?;
        }
        if let Some(value) = lookup("BOOK_FINDER_COVERS_URL") {
            config.covers_url = value;
        }
        if let Some(value) = lookup("BOOK_FINDER_SITE_URL") {
            config.site_url = value;
        }
        if let Some(value) = lookup("BOOK_FINDER_DEBOUNCE_MS") {
            let millis = value
                .trim()
                .parse::<u64>()
                .map_err(|_| ConfigError::InvalidNumber {
                    name: "BOOK_FINDER_DEBOUNCE_MS",
                    value: value.clone(),
                })?;
            config.debounce = Duration::from_millis(millis);
        }
        if let Some(value) = lookup("PORT") {
            config.port = value
                .trim()
                .parse::<u16>()
                .map_err(|_| ConfigError::InvalidNumber {
                    name: "PORT",
                    value: value.clone(),
                })?;
        }

        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn defaults_without_environment() {
        let config = Config::from_lookup(|_| None).unwrap();
        assert_eq!(config.api_url.as_str(), DEFAULT_API_URL);
        assert_eq!(config.debounce, Duration::from_millis(500));
        assert_eq!(config.port, 7004);
    }

    #[test]
    fn overrides_from_environment() {
        let config = Config::from_lookup(lookup_from(&[
            ("BOOK_FINDER_API_URL", "http://localhost:9000/search.json"),
            ("BOOK_FINDER_DEBOUNCE_MS", "250"),
            ("PORT", "8080"),
        ]))
        .unwrap();

        assert_eq!(config.api_url.as_str(), "http://localhost:9000/search.json");
        assert_eq!(config.debounce, Duration::from_millis(250));
        assert_eq!(config.port, 8080);
    }

    #[test]
    fn rejects_bad_values() {
        let err = Config::from_lookup(lookup_from(&[("PORT", "seventy")])).unwrap_err();
        assert_eq!(
            err,
            ConfigError::InvalidNumber {
                name: "PORT",
                value: "seventy".to_string()
            }
        );

        let err = Config::from_lookup(lookup_from(&[("BOOK_FINDER_API_URL", "not a url")]));
        assert!(matches!(err, Err(ConfigError::InvalidUrl { .. })));
    }

    #[test]
    fn bad_config_propagates_as_boxed_error() {
        fn load() -> Result<Config, Box<dyn std::error::Error>> {
            Ok(Config::from_lookup(|key| {
                (key == "BOOK_FINDER_DEBOUNCE_MS").then(|| "soon".to_string())
            })?)
        }

        let err = load().unwrap_err();
        assert_eq!(err.to_string(), "Invalid number in BOOK_FINDER_DEBOUNCE_MS: 'soon'");
    }
}
