//! Parsing input documents.
//!
//! A document is either a plain bundle (its top level has a `services` key)
//! or a variant document: a mapping of target names to partial bundles that
//! may inherit from one another.

use bundlekit_common::error::{BundleError, Result};
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use serde_yaml::Value;

use crate::bundle::{Bundle, ServiceDef, null_as_default};
use crate::relation::Relation;

/// One named variant inside a variant document.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Variant {
    /// Parent variant key.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub inherits: Option<String>,
    /// Default series contributed by this variant.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub series: Option<String>,
    /// Services (full or partial definitions).
    #[serde(default, deserialize_with = "null_as_default")]
    pub services: IndexMap<String, ServiceDef>,
    /// Relations added by this variant.
    #[serde(default, deserialize_with = "null_as_default")]
    pub relations: Vec<Relation>,
    /// Option values applied across all services after flattening.
    #[serde(
        default,
        deserialize_with = "null_as_default",
        skip_serializing_if = "IndexMap::is_empty"
    )]
    pub overrides: IndexMap<String, Value>,
    /// Any other keys, merged into the flattened bundle's top level.
    #[serde(flatten)]
    pub extra: IndexMap<String, Value>,
}

/// Variants keyed by target name.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct VariantDocument {
    /// Variants in authored order.
    pub variants: IndexMap<String, Variant>,
}

impl VariantDocument {
    /// Looks up a variant by key.
    #[must_use]
    pub fn get(&self, key: &str) -> Option<&Variant> {
        self.variants.get(key)
    }

    /// Target keys in authored order.
    pub fn targets(&self) -> impl Iterator<Item = &str> {
        self.variants.keys().map(String::as_str)
    }
}

/// A parsed input document.
#[derive(Debug, Clone, PartialEq)]
pub enum Document {
    /// A plain bundle.
    Bundle(Bundle),
    /// A variant document that must be resolved against a target.
    Variants(VariantDocument),
}

impl Document {
    /// Parses YAML text into a document.
    ///
    /// # Errors
    ///
    /// Returns [`BundleError::MalformedDocument`] on invalid YAML, a
    /// non-mapping top level, or a structurally invalid entry.
    pub fn parse(input: &str) -> Result<Self> {
        let value: Value = serde_yaml::from_str(input)
            .map_err(|e| BundleError::malformed(format!("invalid YAML: {e}")))?;
        Self::from_value(value)
    }

    /// Classifies and converts an already-parsed YAML value.
    ///
    /// # Errors
    ///
    /// Returns [`BundleError::MalformedDocument`] when the structure does not fit.
    pub fn from_value(value: Value) -> Result<Self> {
        let Value::Mapping(ref map) = value else {
            return Err(BundleError::malformed(
                "top level of a bundle document must be a mapping",
            ));
        };
        if map.contains_key("services") {
            tracing::debug!("parsing plain bundle document");
            let bundle = serde_yaml::from_value(value)
                .map_err(|e| BundleError::malformed(format!("invalid bundle: {e}")))?;
            Ok(Self::Bundle(bundle))
        } else {
            tracing::debug!(variants = map.len(), "parsing variant document");
            let variants = serde_yaml::from_value(value)
                .map_err(|e| BundleError::malformed(format!("invalid variant document: {e}")))?;
            Ok(Self::Variants(variants))
        }
    }

    /// Parses a document that must be a plain bundle, such as an override file.
    ///
    /// # Errors
    ///
    /// Returns [`BundleError::MalformedDocument`] if the text is not a plain bundle.
    /// A document with neither `services` nor `relations` is accepted as an
    /// empty override.
    pub fn parse_bundle(input: &str) -> Result<Bundle> {
        if input.trim().is_empty() {
            return Ok(Bundle::default());
        }
        let value: Value = serde_yaml::from_str(input)
            .map_err(|e| BundleError::malformed(format!("invalid YAML: {e}")))?;
        match value {
            Value::Null => Ok(Bundle::default()),
            Value::Mapping(ref map) if !map.contains_key("services") => {
                serde_yaml::from_value(value)
                    .map_err(|e| BundleError::malformed(format!("invalid bundle: {e}")))
            }
            other => match Self::from_value(other)? {
                Self::Bundle(bundle) => Ok(bundle),
                Self::Variants(_) => Err(BundleError::malformed("expected a plain bundle")),
            },
        }
    }
}
