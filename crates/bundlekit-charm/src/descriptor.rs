//! The narrow interface the transformation core uses to reach charm knowledge.
//!
//! The core never consults the classification or release tables directly;
//! it goes through a [`CharmDescriptor`], so tests and alternative
//! deployments can inject their own tables.

use bundlekit_common::error::Result;

use crate::classify::{self, OriginClass};
use crate::locator;
use crate::origin::{self, Target};

/// Outcome of deriving an origin for one service.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OriginAssignment {
    /// The release is native to the series; nothing is written.
    Native,
    /// Write `value` under option `key`.
    Assign {
        /// Option key, `source` or `openstack-origin`.
        key: &'static str,
        /// Origin pointer, e.g. `cloud:trusty-liberty`.
        value: String,
    },
    /// An origin exists but the service has no known key for it.
    Unclassified {
        /// Origin pointer that will be dropped.
        value: String,
    },
}

/// Per-charm knowledge consumed by the core.
pub trait CharmDescriptor {
    /// Classifies a service by which option key carries its origin.
    fn classify(&self, service: &str, charm_ref: Option<&str>) -> OriginClass;

    /// Builds the store locator for `name` on `channel`.
    ///
    /// # Errors
    ///
    /// Returns an error if the channel is not supported.
    fn locate(
        &self,
        name: &str,
        channel: &str,
        series: Option<&str>,
        user: Option<&str>,
    ) -> Result<String>;

    /// Origin pointer for a series/release/pocket, `None` when native.
    fn origin_for(&self, series: &str, release: &str, pocket: Option<&str>) -> Option<String>;

    /// Derives the origin option for one service under `target`.
    fn origin_assignment(
        &self,
        service: &str,
        charm_ref: Option<&str>,
        target: &Target,
    ) -> OriginAssignment {
        let Some(value) = self.origin_for(&target.series, &target.release, target.pocket.as_deref())
        else {
            return OriginAssignment::Native;
        };
        match self.classify(service, charm_ref).option_key() {
            Some(key) => OriginAssignment::Assign { key, value },
            None => OriginAssignment::Unclassified { value },
        }
    }
}

/// Descriptor backed by the compiled-in tables.
#[derive(Debug, Clone, Copy, Default)]
pub struct StaticCharmDescriptor;

impl CharmDescriptor for StaticCharmDescriptor {
    fn classify(&self, service: &str, charm_ref: Option<&str>) -> OriginClass {
        classify::classify(service, charm_ref)
    }

    fn locate(
        &self,
        name: &str,
        channel: &str,
        series: Option<&str>,
        user: Option<&str>,
    ) -> Result<String> {
        locator::locate(name, channel, series, user)
    }

    fn origin_for(&self, series: &str, release: &str, pocket: Option<&str>) -> Option<String> {
        origin::origin_for(series, release, pocket)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn native_target_assigns_nothing() {
        let target = Target::new("trusty", "icehouse");
        let outcome = StaticCharmDescriptor.origin_assignment("keystone", None, &target);
        assert_eq!(outcome, OriginAssignment::Native);
    }

    #[test]
    fn origin_class_uses_openstack_origin() {
        let target = Target::new("trusty", "liberty");
        let outcome = StaticCharmDescriptor.origin_assignment("keystone", None, &target);
        assert_eq!(
            outcome,
            OriginAssignment::Assign {
                key: "openstack-origin",
                value: "cloud:trusty-liberty".into()
            }
        );
    }

    #[test]
    fn source_class_uses_source() {
        let target = Target::new("trusty", "liberty");
        let outcome = StaticCharmDescriptor.origin_assignment("rabbitmq-server", None, &target);
        assert!(matches!(outcome, OriginAssignment::Assign { key: "source", .. }));
    }

    #[test]
    fn unclassified_service_keeps_value_for_reporting() {
        let target = Target::new("trusty", "liberty");
        let outcome = StaticCharmDescriptor.origin_assignment("ntp", Some("cs:ntp"), &target);
        assert_eq!(
            outcome,
            OriginAssignment::Unclassified {
                value: "cloud:trusty-liberty".into()
            }
        );
    }
}
