//! Unified error types for the bundlekit workspace.
//!
//! Every variant here is fatal: the run stops and the binary exits non-zero.
//! Recoverable conditions are reported as [`crate::warning::Warning`] instead.

use std::path::PathBuf;

use thiserror::Error;

/// Top-level error type shared across the workspace.
#[derive(Debug, Error)]
pub enum BundleError {
    /// An I/O operation failed.
    #[error("I/O error at {path}: {source}")]
    Io {
        /// Path where the I/O error occurred.
        path: PathBuf,
        /// Underlying I/O error.
        source: std::io::Error,
    },

    /// The input document does not exist.
    #[error("input file not found: {path}")]
    InputNotFound {
        /// Path that was requested.
        path: PathBuf,
    },

    /// The output file exists and overwriting was not requested.
    #[error("output file exists and will not be overwritten: {path}")]
    OutputAlreadyExists {
        /// Path of the existing file.
        path: PathBuf,
    },

    /// The document has a syntax or structural problem.
    #[error("malformed document: {message}")]
    MalformedDocument {
        /// Description of the violation.
        message: String,
    },

    /// The requested target is not defined in the variant document.
    #[error("target not found: {target}")]
    TargetNotFound {
        /// Requested target key.
        target: String,
    },

    /// A variant inherits from a key that is not defined.
    #[error("target \"{target}\" inherits from undefined target \"{ancestor}\"")]
    AncestorNotFound {
        /// Variant carrying the dangling reference.
        target: String,
        /// Missing parent key.
        ancestor: String,
    },

    /// The inheritance chain loops back on itself.
    #[error("inheritance cycle detected: {}", chain.join(" -> "))]
    InheritanceCycle {
        /// Keys visited, ending with the key seen twice.
        chain: Vec<String>,
    },

    /// A charm locator was requested for an unsupported channel.
    #[error("{channel} is not a valid channel, expected one of: stable, next, github")]
    InvalidChannel {
        /// Rejected channel name.
        channel: String,
    },

    /// A charm store metadata query failed.
    #[error("charm store query failed for {url}: {message}")]
    Query {
        /// Queried URL.
        url: String,
        /// Failure description.
        message: String,
    },

    /// YAML serialization or deserialization failed.
    #[error("YAML error: {source}")]
    Yaml {
        /// Underlying YAML error.
        #[from]
        source: serde_yaml::Error,
    },

    /// JSON serialization or deserialization failed.
    #[error("JSON error: {source}")]
    Json {
        /// Underlying JSON error.
        #[from]
        source: serde_json::Error,
    },
}

impl BundleError {
    /// Shorthand for a [`BundleError::MalformedDocument`].
    pub fn malformed(message: impl Into<String>) -> Self {
        Self::MalformedDocument {
            message: message.into(),
        }
    }
}

/// Convenience alias used throughout the workspace.
pub type Result<T> = std::result::Result<T, BundleError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cycle_message_lists_chain() {
        let err = BundleError::InheritanceCycle {
            chain: vec!["a".into(), "b".into(), "a".into()],
        };
        assert_eq!(err.to_string(), "inheritance cycle detected: a -> b -> a");
    }

    #[test]
    fn ancestor_message_names_both_keys() {
        let err = BundleError::AncestorNotFound {
            target: "xenial-newton".into(),
            ancestor: "xenial".into(),
        };
        let msg = err.to_string();
        assert!(msg.contains("xenial-newton"), "got: {msg}");
        assert!(msg.contains("\"xenial\""), "got: {msg}");
    }

    #[test]
    fn yaml_error_converts() {
        let parse: std::result::Result<serde_yaml::Value, _> = serde_yaml::from_str("a: [b");
        let err: BundleError = parse.expect_err("invalid yaml").into();
        assert!(matches!(err, BundleError::Yaml { .. }));
    }
}
