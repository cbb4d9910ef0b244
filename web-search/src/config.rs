//! Environment-driven configuration for the live search client.

use crate::errors::{SearchError, SearchResult};

pub const DEFAULT_SERPER_URL: &str = "https://google.serper.dev/search";
pub const DEFAULT_LIMIT: usize = 5;
pub const DEFAULT_LANGUAGE: &str = "en";
pub const DEFAULT_TIMEOUT_SECS: u64 = 10;

/// Live search settings.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SearchConfig {
    /// `None` disables online search; every query then fails with
    /// [`SearchError::MissingApiKey`].
    pub api_key: Option<String>,
    pub url: String,
    /// Results requested per query.
    pub limit: usize,
    /// Interface language (`hl`).
    pub language: String,
    pub timeout_secs: u64,
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            url: DEFAULT_SERPER_URL.to_string(),
            limit: DEFAULT_LIMIT,
            language: DEFAULT_LANGUAGE.to_string(),
            timeout_secs: DEFAULT_TIMEOUT_SECS,
        }
    }
}

impl SearchConfig {
    /// Reads:
    /// - `SERPER_API_KEY` (optional)
    /// - `SERPER_URL` (default: `https://google.serper.dev/search`)
    /// - `SEARCH_LIMIT` (default: 5)
    /// - `SEARCH_LANGUAGE` (default: `en`)
    /// - `SEARCH_TIMEOUT_SECS` (default: 10)
    ///
    /// # Errors
    /// Returns [`SearchError::Config`] for unparsable numbers or a bad URL.
    pub fn from_env() -> SearchResult<Self> {
        Self::from_lookup(|k| std::env::var(k).ok())
    }

    /// Same as [`SearchConfig::from_env`] with an injectable variable source.
    pub fn from_lookup<F>(get: F) -> SearchResult<Self>
    where
        F: Fn(&'static str) -> Option<String>,
    {
        let non_empty = |k| get(k).filter(|v: &String| !v.trim().is_empty());
        let mut cfg = Self::default();

        cfg.api_key = non_empty("SERPER_API_KEY").map(|v| v.trim().to_string());
        if let Some(url) = non_empty("SERPER_URL") {
            cfg.url = url.trim().to_string();
        }
        if let Some(v) = non_empty("SEARCH_LIMIT") {
            cfg.limit = parse_number("SEARCH_LIMIT", &v)?;
        }
        if let Some(v) = non_empty("SEARCH_LANGUAGE") {
            cfg.language = v.trim().to_string();
        }
        if let Some(v) = non_empty("SEARCH_TIMEOUT_SECS") {
            cfg.timeout_secs = parse_number("SEARCH_TIMEOUT_SECS", &v)?;
        }

        cfg.validate()?;
        Ok(cfg)
    }

    /// Validates config values.
    pub fn validate(&self) -> SearchResult<()> {
        if !(self.url.starts_with("http://") || self.url.starts_with("https://")) {
            return Err(SearchError::Config {
                var: "SERPER_URL",
                reason: "must start with http:// or https://".into(),
            });
        }
        if self.limit == 0 {
            return Err(SearchError::Config {
                var: "SEARCH_LIMIT",
                reason: "must be > 0".into(),
            });
        }
        Ok(())
    }
}

fn parse_number<T: std::str::FromStr>(var: &'static str, value: &str) -> SearchResult<T> {
    value.trim().parse::<T>().map_err(|_| SearchError::Config {
        var,
        reason: format!("not a number: '{value}'"),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(pairs: &[(&'static str, &str)]) -> impl Fn(&'static str) -> Option<String> {
        let map: HashMap<&'static str, String> =
            pairs.iter().map(|(k, v)| (*k, v.to_string())).collect();
        move |k| map.get(k).cloned()
    }

    #[test]
    fn defaults_without_env() {
        let cfg = SearchConfig::from_lookup(lookup(&[])).unwrap();
        assert_eq!(cfg, SearchConfig::default());
        assert!(cfg.api_key.is_none());
    }

    #[test]
    fn overrides_are_applied() {
        let cfg = SearchConfig::from_lookup(lookup(&[
            ("SERPER_API_KEY", " secret "),
            ("SEARCH_LIMIT", "8"),
            ("SEARCH_LANGUAGE", "de"),
            ("SEARCH_TIMEOUT_SECS", "4"),
        ]))
        .unwrap();
        assert_eq!(cfg.api_key.as_deref(), Some("secret"));
        assert_eq!(cfg.limit, 8);
        assert_eq!(cfg.language, "de");
        assert_eq!(cfg.timeout_secs, 4);
    }

    #[test]
    fn blank_key_counts_as_missing() {
        let cfg = SearchConfig::from_lookup(lookup(&[("SERPER_API_KEY", "  ")])).unwrap();
        assert!(cfg.api_key.is_none());
    }

    #[test]
    fn bad_values_are_rejected() {
        assert!(matches!(
            SearchConfig::from_lookup(lookup(&[("SEARCH_LIMIT", "five")])),
            Err(SearchError::Config { var: "SEARCH_LIMIT", .. })
        ));
        assert!(matches!(
            SearchConfig::from_lookup(lookup(&[("SEARCH_LIMIT", "0")])),
            Err(SearchError::Config { var: "SEARCH_LIMIT", .. })
        ));
        assert!(matches!(
            SearchConfig::from_lookup(lookup(&[("SERPER_URL", "google.serper.dev")])),
            Err(SearchError::Config { var: "SERPER_URL", .. })
        ));
    }
}
