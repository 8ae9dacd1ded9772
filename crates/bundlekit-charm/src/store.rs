//! Charm store metadata queries.
//!
//! Lookups are best-effort: callers turn a failed query into a warning and
//! fall back to treating the charm as having no metadata.

use bundlekit_common::config::ToolConfig;
use bundlekit_common::constants::CHARMSTORE_API_VERSION;
use bundlekit_common::error::{BundleError, Result};
use serde_json::Value;

/// Metadata kind holding a charm's config option schema.
pub const CHARM_CONFIG: &str = "charm-config";

/// Config option whose presence marks a charm as HA-capable.
pub const HA_MARKER_OPTION: &str = "vip";

/// Source of per-charm metadata documents.
pub trait MetadataSource {
    /// Fetches metadata of `kind` for `charm` on `series`.
    ///
    /// # Errors
    ///
    /// Returns an error if the lookup fails or answers with a non-success status.
    fn query(&self, charm: &str, series: &str, kind: &str) -> Result<Value>;
}

/// Blocking HTTP client for the charm store API.
#[derive(Debug, Clone)]
pub struct CharmStoreClient {
    base_url: String,
    http: reqwest::blocking::Client,
}

impl CharmStoreClient {
    /// Creates a client rooted at `base_url`.
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into().trim_end_matches('/').to_string(),
            http: reqwest::blocking::Client::new(),
        }
    }

    /// Creates a client from the tool configuration.
    #[must_use]
    pub fn from_config(config: &ToolConfig) -> Self {
        Self::new(config.charm_store_url.clone())
    }

    /// URL of a metadata document.
    #[must_use]
    pub fn meta_url(&self, charm: &str, series: &str, kind: &str) -> String {
        format!(
            "{}/{CHARMSTORE_API_VERSION}/{series}/{charm}/meta/{kind}",
            self.base_url
        )
    }
}

impl MetadataSource for CharmStoreClient {
    fn query(&self, charm: &str, series: &str, kind: &str) -> Result<Value> {
        let url = self.meta_url(charm, series, kind);
        tracing::debug!(%url, "querying charm store");

        let response = self.http.get(&url).send().map_err(|e| BundleError::Query {
            url: url.clone(),
            message: e.to_string(),
        })?;

        let status = response.status();
        if !status.is_success() {
            tracing::error!(charm, series, kind, %status, "charm store query failed");
            return Err(BundleError::Query {
                url,
                message: format!("HTTP {status}"),
            });
        }

        let body = response.text().map_err(|e| BundleError::Query {
            url: url.clone(),
            message: format!("failed to read response body: {e}"),
        })?;
        Ok(serde_json::from_str(&body)?)
    }
}

/// Returns whether a `charm-config` document declares the HA marker option.
#[must_use]
pub fn declares_ha_option(charm_config: &Value) -> bool {
    charm_config
        .get("Options")
        .and_then(Value::as_object)
        .is_some_and(|options| options.contains_key(HA_MARKER_OPTION))
}
