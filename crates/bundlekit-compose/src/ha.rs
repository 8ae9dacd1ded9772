//! High-availability augmentation.
//!
//! A service whose charm exposes a `vip` option can run clustered. Such a
//! service is scaled to at least three units and paired with an `hacluster`
//! subordinate. The lookup that decides this is best-effort.

use bundlekit_charm::catalog::is_subordinate;
use bundlekit_charm::classify::charm_name_from_ref;
use bundlekit_charm::store::{CHARM_CONFIG, declares_ha_option};
use bundlekit_charm::MetadataSource;
use bundlekit_common::constants::HA_MIN_UNITS;
use bundlekit_common::warning::Warning;
use serde_yaml::Value;

use crate::bundle::{Bundle, ServiceDef};
use crate::relation::{Endpoint, Relation};

/// Suffix of the generated subordinate service.
pub const HACLUSTER_SUFFIX: &str = "-hacluster";

/// Charm reference of the clustering subordinate.
pub const HACLUSTER_CHARM: &str = "cs:hacluster";

fn hacluster_service(series: &str) -> ServiceDef {
    let mut def = ServiceDef {
        charm: Some(HACLUSTER_CHARM.to_string()),
        series: Some(series.to_string()),
        num_units: Some(0),
        ..ServiceDef::default()
    };
    def.set_option("cluster_count", Value::from(u64::from(HA_MIN_UNITS)));
    def
}

fn ha_endpoint(service: &str) -> Endpoint {
    Endpoint {
        service: service.to_string(),
        interface: Some("ha".to_string()),
    }
}

/// Makes every HA-capable service highly available.
///
/// Subordinates, zero-unit services, and existing hacluster services are
/// skipped. A failed lookup records a warning and leaves the service as is.
pub fn augment(
    bundle: &mut Bundle,
    series: &str,
    metadata: &dyn MetadataSource,
    warnings: &mut Vec<Warning>,
) {
    let candidates: Vec<(String, String)> = bundle
        .services
        .iter()
        .filter(|(name, def)| {
            !name.ends_with(HACLUSTER_SUFFIX) && def.num_units != Some(0) && !is_subordinate(name)
        })
        .map(|(name, def)| {
            let charm = def
                .charm
                .as_deref()
                .and_then(charm_name_from_ref)
                .unwrap_or_else(|| name.clone());
            (name.clone(), charm)
        })
        .collect();

    for (name, charm) in candidates {
        let capable = match metadata.query(&charm, series, CHARM_CONFIG) {
            Ok(config) => declares_ha_option(&config),
            Err(e) => {
                Warning::UnresolvedCollaboratorQuery {
                    service: name.clone(),
                    reason: e.to_string(),
                }
                .record(warnings);
                false
            }
        };
        if !capable {
            tracing::debug!(service = %name, "not HA-capable");
            continue;
        }

        if let Some(def) = bundle.services.get_mut(&name) {
            let units = def.num_units.unwrap_or(1).max(HA_MIN_UNITS);
            def.num_units = Some(units);
        }
        let sub = format!("{name}{HACLUSTER_SUFFIX}");
        if !bundle.services.contains_key(&sub) {
            let _ = bundle.services.insert(sub.clone(), hacluster_service(series));
            bundle
                .relations
                .push(Relation::pair(ha_endpoint(&name), ha_endpoint(&sub)));
        }
        tracing::info!(service = %name, subordinate = %sub, "made service highly available");
    }
}
