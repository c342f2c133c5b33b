//! Runtime configuration read from the environment

use std::path::PathBuf;
use std::time::Duration;

/// Default Google Books API root
pub const DEFAULT_API_BASE: &str = "https://www.googleapis.com/books/v1";

/// Settings shared by every consumer of the library
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    /// Catalog API root, without trailing slash
    pub api_base: String,

    /// Catalog API key (may be empty)
    pub api_key: String,

    /// Directory holding the durable review/favorite records
    pub storage_path: PathBuf,

    /// Per-request timeout for catalog calls
    pub http_timeout: Duration,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            api_base: DEFAULT_API_BASE.to_string(),
            api_key: String::new(),
            storage_path: PathBuf::from("./bookrev_data"),
            http_timeout: Duration::from_secs(10),
        }
    }
}

impl Config {
    /// Read `BOOKREV_*` variables, falling back to defaults
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build a config from an arbitrary variable source
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let defaults = Self::default();

        let http_timeout = match lookup("BOOKREV_HTTP_TIMEOUT_SECS") {
            Some(raw) => match raw.trim().parse::<u64>() {
                Ok(secs) if secs > 0 => Duration::from_secs(secs),
                _ => {
                    tracing::warn!("Ignoring invalid BOOKREV_HTTP_TIMEOUT_SECS={:?}", raw);
                    defaults.http_timeout
                }
            },
            None => defaults.http_timeout,
        };

        Self {
            api_base: lookup("BOOKREV_API_BASE")
                .map(|base| base.trim_end_matches('/').to_string())
                .unwrap_or(defaults.api_base),
            api_key: lookup("BOOKREV_API_KEY").unwrap_or(defaults.api_key),
            storage_path: lookup("BOOKREV_STORAGE_PATH")
                .map(PathBuf::from)
                .unwrap_or(defaults.storage_path),
            http_timeout,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn test_defaults() {
        assert_eq!(Config::from_lookup(lookup(&[])), Config::default());
    }

    #[test]
    fn test_overrides() {
        let config = Config::from_lookup(lookup(&[
            ("BOOKREV_API_BASE", "http://127.0.0.1:8080/v1/"),
            ("BOOKREV_API_KEY", "secret"),
            ("BOOKREV_STORAGE_PATH", "/tmp/bookrev"),
            ("BOOKREV_HTTP_TIMEOUT_SECS", "3"),
        ]));

        assert_eq!(config.api_base, "http://127.0.0.1:8080/v1");
        assert_eq!(config.api_key, "secret");
        assert_eq!(config.storage_path, PathBuf::from("/tmp/bookrev"));
        assert_eq!(config.http_timeout, Duration::from_secs(3));
    }

    #[test]
    fn test_invalid_timeout_falls_back() {
        let config = Config::from_lookup(lookup(&[("BOOKREV_HTTP_TIMEOUT_SECS", "0")]));
        assert_eq!(config.http_timeout, Duration::from_secs(10));
    }
}
