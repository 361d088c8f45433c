use std::env;

use crate::{errors::Error, Result};

pub const DEFAULT_SNAPI_URL: &str = "https://snapi.fun/api/api-keys";

/// How many leading characters of the API key are shown on the about screen and in logs.
const KEY_PREVIEW_CHARS: usize = 20;

/// Typed configuration for the relay bot.
#[derive(Clone, Debug)]
pub struct Config {
    pub telegram_bot_token: String,
    pub snapi_api_key: String,
    /// Base URL of the SNAPI API, without a trailing `/`.
    pub snapi_url: String,
}

impl Config {
    /// Load from the process environment, reading `.env` first when present.
    ///
    /// Variables already set in the environment win over `.env` entries.
    pub fn load() -> Result<Self> {
        let _ = dotenvy::dotenv();
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Build a config from an arbitrary key lookup (env, map, ...).
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let required = |key: &str| {
            lookup(key).and_then(non_empty).ok_or_else(|| {
                Error::Config(format!("{key} environment variable is required"))
            })
        };

        let telegram_bot_token = required("TELEGRAM_BOT_TOKEN")?;
        let snapi_api_key = required("SNAPI_API_KEY")?;

        let snapi_url = lookup("SNAPI_URL")
            .and_then(non_empty)
            .unwrap_or_else(|| DEFAULT_SNAPI_URL.to_string())
            .trim()
            .trim_end_matches('/')
            .to_string();

        Ok(Self {
            telegram_bot_token,
            snapi_api_key,
            snapi_url,
        })
    }

    /// API key shortened for display: the first characters followed by `...`.
    pub fn api_key_preview(&self) -> String {
        let head: String = self.snapi_api_key.chars().take(KEY_PREVIEW_CHARS).collect();
        format!("{head}...")
    }
}

fn non_empty(s: String) -> Option<String> {
    if s.trim().is_empty() {
        None
    } else {
        Some(s)
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;

    fn lookup_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn loads_required_values_and_default_url() {
        let cfg = Config::from_lookup(lookup_from(&[
            ("TELEGRAM_BOT_TOKEN", "123:abc"),
            ("SNAPI_API_KEY", "key"),
        ]))
        .unwrap();
        assert_eq!(cfg.telegram_bot_token, "123:abc");
        assert_eq!(cfg.snapi_api_key, "key");
        assert_eq!(cfg.snapi_url, DEFAULT_SNAPI_URL);
    }

    #[test]
    fn trims_trailing_slash_from_url() {
        let cfg = Config::from_lookup(lookup_from(&[
            ("TELEGRAM_BOT_TOKEN", "t"),
            ("SNAPI_API_KEY", "k"),
            ("SNAPI_URL", " http://localhost:8080/api/ "),
        ]))
        .unwrap();
        assert_eq!(cfg.snapi_url, "http://localhost:8080/api");
    }

    #[test]
    fn missing_or_blank_secrets_are_config_errors() {
        let err = Config::from_lookup(lookup_from(&[("SNAPI_API_KEY", "k")])).unwrap_err();
        assert!(matches!(err, Error::Config(ref m) if m.contains("TELEGRAM_BOT_TOKEN")));

        let err = Config::from_lookup(lookup_from(&[
            ("TELEGRAM_BOT_TOKEN", "t"),
            ("SNAPI_API_KEY", "   "),
        ]))
        .unwrap_err();
        assert!(matches!(err, Error::Config(ref m) if m.contains("SNAPI_API_KEY")));
    }

    #[test]
    fn key_preview_keeps_first_twenty_chars() {
        let cfg = Config::from_lookup(lookup_from(&[
            ("TELEGRAM_BOT_TOKEN", "t"),
            ("SNAPI_API_KEY", "snapi_0123456789abcdefghij"),
        ]))
        .unwrap();
        assert_eq!(cfg.api_key_preview(), "snapi_0123456789abcd...");

        let short = Config {
            snapi_api_key: "abc".to_string(),
            ..cfg
        };
        assert_eq!(short.api_key_preview(), "abc...");
    }
}
