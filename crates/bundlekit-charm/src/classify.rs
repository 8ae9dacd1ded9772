//! Static origin classification tables.
//!
//! Charms read their package origin from one of two config keys. Writing the
//! wrong key is at best ignored and at worst rejected by the charm, so the
//! origin is only ever written under the key the charm is known to use.

use bundlekit_common::constants::{OPENSTACK_ORIGIN_KEY, SOURCE_KEY};

/// Charms configured through the `source` option.
pub const CHARMS_USE_SOURCE: &[&str] = &[
    "ceph",
    "ceph-osd",
    "ceph-radosgw",
    "ceph-mon",
    "mongodb",
    "mysql",
    "percona-cluster",
    "rabbitmq-server",
];

/// Charms configured through the `openstack-origin` option.
pub const CHARMS_USE_ORIGIN: &[&str] = &[
    "ceilometer",
    "ceilometer-agent",
    "cinder",
    "glance",
    "heat",
    "keystone",
    "neutron-api",
    "neutron-gateway",
    "nova-cloud-controller",
    "nova-compute",
    "openstack-dashboard",
    "swift-proxy",
    "swift-storage",
];

/// Service names conventionally deployed from a differently named charm.
pub const SERVICE_TO_CHARM: &[(&str, &str)] = &[
    ("database", "percona-cluster"),
    ("mysql-cluster", "percona-cluster"),
    ("amqp", "rabbitmq-server"),
    ("dashboard", "openstack-dashboard"),
    ("ceph-storage", "ceph-osd"),
];

/// Which option key, if any, carries the origin for a service.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum OriginClass {
    /// The charm reads `source`.
    UsesSource,
    /// The charm reads `openstack-origin`.
    UsesOrigin,
    /// The charm is in neither table.
    Unclassified,
}

impl OriginClass {
    /// Option key the origin is written under.
    #[must_use]
    pub const fn option_key(self) -> Option<&'static str> {
        match self {
            Self::UsesSource => Some(SOURCE_KEY),
            Self::UsesOrigin => Some(OPENSTACK_ORIGIN_KEY),
            Self::Unclassified => None,
        }
    }

    /// Class that accepts the given origin-style option key.
    #[must_use]
    pub fn for_option_key(key: &str) -> Option<Self> {
        match key {
            SOURCE_KEY => Some(Self::UsesSource),
            OPENSTACK_ORIGIN_KEY => Some(Self::UsesOrigin),
            _ => None,
        }
    }
}

/// Classifies a single charm name against the static tables.
#[must_use]
pub fn classify_name(name: &str) -> OriginClass {
    if CHARMS_USE_ORIGIN.contains(&name) {
        OriginClass::UsesOrigin
    } else if CHARMS_USE_SOURCE.contains(&name) {
        OriginClass::UsesSource
    } else {
        OriginClass::Unclassified
    }
}

/// Classifies a service by its name, then the charm its ref points at,
/// then the service alias table.
#[must_use]
pub fn classify(service: &str, charm_ref: Option<&str>) -> OriginClass {
    let by_name = classify_name(service);
    if by_name != OriginClass::Unclassified {
        return by_name;
    }
    if let Some(charm) = charm_ref.and_then(charm_name_from_ref) {
        let by_charm = classify_name(&charm);
        if by_charm != OriginClass::Unclassified {
            return by_charm;
        }
    }
    SERVICE_TO_CHARM
        .iter()
        .find(|(svc, _)| *svc == service)
        .map_or(OriginClass::Unclassified, |(_, charm)| classify_name(charm))
}

/// Extracts the bare charm name from a charm reference.
///
/// `cs:~user/xenial/percona-cluster-245` yields `percona-cluster`,
/// `git://github.com/openstack/charm-keystone` yields `keystone`.
#[must_use]
pub fn charm_name_from_ref(charm_ref: &str) -> Option<String> {
    let last = charm_ref.rsplit('/').next()?;
    let last = last.rsplit(':').next()?;
    let last = last.strip_prefix("charm-").unwrap_or(last);
    let name = match last.rsplit_once('-') {
        Some((head, rev)) if !head.is_empty() && rev.chars().all(|c| c.is_ascii_digit()) => head,
        _ => last,
    };
    (!name.is_empty()).then(|| name.to_string())
}
