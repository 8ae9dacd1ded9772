//! Tool configuration model.

use serde::{Deserialize, Serialize};

/// Environment variable overriding the charm store base URL.
pub const CHARMSTORE_URL_ENV: &str = "BUNDLEKIT_CHARMSTORE_URL";

/// Environment variable disabling network lookups when set to `1` or `true`.
pub const OFFLINE_ENV: &str = "BUNDLEKIT_OFFLINE";

/// Root configuration for collaborator access.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ToolConfig {
    /// Base URL of the charm store API.
    pub charm_store_url: String,
    /// Whether network lookups are disabled.
    pub offline: bool,
}

impl Default for ToolConfig {
    fn default() -> Self {
        Self {
            charm_store_url: crate::constants::DEFAULT_CHARMSTORE_URL.to_string(),
            offline: false,
        }
    }
}

impl ToolConfig {
    /// Builds the configuration from defaults overlaid with the process environment.
    #[must_use]
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let mut config = Self::default();
        if let Some(url) = lookup(CHARMSTORE_URL_ENV).filter(|u| !u.trim().is_empty()) {
            config.charm_store_url = url.trim_end_matches('/').to_string();
        }
        if let Some(flag) = lookup(OFFLINE_ENV) {
            config.offline = matches!(flag.trim().to_ascii_lowercase().as_str(), "1" | "true");
        }
        config
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_point_at_public_store() {
        let config = ToolConfig::default();
        assert_eq!(config.charm_store_url, "https://api.jujucharms.com/charmstore");
        assert!(!config.offline);
    }

    #[test]
    fn lookup_overrides_url_and_offline() {
        let config = ToolConfig::from_lookup(|key| match key {
            CHARMSTORE_URL_ENV => Some("http://localhost:8080/".into()),
            OFFLINE_ENV => Some("TRUE".into()),
            _ => None,
        });
        assert_eq!(config.charm_store_url, "http://localhost:8080");
        assert!(config.offline);
    }

    #[test]
    fn blank_url_is_ignored() {
        let config = ToolConfig::from_lookup(|key| (key == CHARMSTORE_URL_ENV).then(|| "  ".into()));
        assert_eq!(config, ToolConfig::default());
    }
}
