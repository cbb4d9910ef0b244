//! Runtime configuration loaded from environment variables.

/// Config bag for the retrieval core. All fields have defaults via `from_env`.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ContextorConfig {
    /// Offline top-K.
    pub top_k: usize,

    // Connectivity probe
    pub connectivity_url: String,
    pub connectivity_timeout_secs: u64,
    /// How long a probe result is reused.
    pub connectivity_ttl_secs: u64,
    /// Skip the probe and treat the network as unavailable.
    pub force_offline: bool,
}

impl Default for ContextorConfig {
    fn default() -> Self {
        Self {
            top_k: 3,
            connectivity_url: "https://www.google.com".to_string(),
            connectivity_timeout_secs: 3,
            connectivity_ttl_secs: 60,
            force_offline: false,
        }
    }
}

impl ContextorConfig {
    /// Build from environment variables with sensible defaults.
    ///
    /// - `RAG_TOP_K` (3)
    /// - `CONNECTIVITY_URL` (`https://www.google.com`)
    /// - `CONNECTIVITY_TIMEOUT_SECS` (3)
    /// - `CONNECTIVITY_TTL_SECS` (60)
    /// - `FORCE_OFFLINE` (false)
    ///
    /// Unparsable values fall back to the default.
    ///
    /// # Example
    /// ```
    /// use contextor::ContextorConfig;
    /// let cfg = ContextorConfig::from_env();
    /// assert!(cfg.top_k >= 1);
    /// ```
    pub fn from_env() -> Self {
        let d = Self::default();
        Self {
            top_k: parse("RAG_TOP_K", d.top_k).max(1),
            connectivity_url: env("CONNECTIVITY_URL", &d.connectivity_url),
            connectivity_timeout_secs: parse("CONNECTIVITY_TIMEOUT_SECS", d.connectivity_timeout_secs),
            connectivity_ttl_secs: parse("CONNECTIVITY_TTL_SECS", d.connectivity_ttl_secs),
            force_offline: std::env::var("FORCE_OFFLINE")
                .map(|v| is_truthy(&v))
                .unwrap_or(d.force_offline),
        }
    }
}

fn env(k: &str, dflt: &str) -> String {
    std::env::var(k)
        .ok()
        .filter(|v| !v.trim().is_empty())
        .unwrap_or_else(|| dflt.to_string())
}

fn parse<T: std::str::FromStr>(k: &str, dflt: T) -> T {
    std::env::var(k)
        .ok()
        .and_then(|v| v.trim().parse().ok())
        .unwrap_or(dflt)
}

fn is_truthy(v: &str) -> bool {
    matches!(
        v.trim().to_ascii_lowercase().as_str(),
        "1" | "true" | "yes" | "on"
    )
}
