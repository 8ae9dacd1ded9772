//! Non-fatal diagnostics.
//!
//! A warning degrades one service or one feature; the transformation still
//! produces a best-effort document.

use std::fmt;

/// A recoverable condition encountered during a transformation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Warning {
    /// An origin value was not written because the service is in neither
    /// the uses-source nor the uses-origin class.
    UnclassifiedOriginTarget {
        /// Service that was skipped.
        service: String,
        /// Origin value that was dropped.
        origin: String,
    },
    /// A collaborator lookup failed; the dependent feature was skipped.
    UnresolvedCollaboratorQuery {
        /// Service whose derived field was skipped.
        service: String,
        /// Failure description.
        reason: String,
    },
    /// A requested service name does not exist in the bundle.
    UnknownService {
        /// Requested name.
        service: String,
    },
    /// The same service was both included and excluded.
    IncludeExcludeOverlap {
        /// Overlapping names, in sorted order.
        services: Vec<String>,
    },
    /// A target string could not be split into series and release.
    UnparsedTarget {
        /// Offending target.
        target: String,
    },
}

impl Warning {
    /// Logs the warning and appends it to `sink`.
    pub fn record(self, sink: &mut Vec<Self>) {
        tracing::warn!("{self}");
        sink.push(self);
    }
}

impl fmt::Display for Warning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::UnclassifiedOriginTarget { service, origin } => write!(
                f,
                "{service} uses neither source nor openstack-origin, not setting origin {origin}"
            ),
            Self::UnresolvedCollaboratorQuery { service, reason } => {
                write!(f, "metadata lookup for {service} failed: {reason}")
            }
            Self::UnknownService { service } => {
                write!(f, "requested service {service} is not in the bundle")
            }
            Self::IncludeExcludeOverlap { services } => write!(
                f,
                "including and excluding the same services, exclude wins: {}",
                services.join(",")
            ),
            Self::UnparsedTarget { target } => write!(
                f,
                "target {target} is not <series>-<release>[-<pocket>], not setting origin"
            ),
        }
    }
}
