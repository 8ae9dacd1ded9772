//! Flattening a target through its chain of inheriting variants.
//!
//! The chain is walked upward from the target to a root, then applied
//! root-first so that more specific variants win. Services merge field by
//! field, options key by key, and relations accumulate.

use bundlekit_charm::{CharmDescriptor, OriginClass};
use bundlekit_common::error::{BundleError, Result};
use bundlekit_common::warning::Warning;
use indexmap::{IndexMap, IndexSet};
use serde_yaml::Value;

use crate::bundle::{Bundle, Transformed, value_text};
use crate::document::{Variant, VariantDocument};

/// Returns the inheritance chain of `target`, root first.
///
/// # Errors
///
/// - [`BundleError::TargetNotFound`] if `target` is not defined.
/// - [`BundleError::AncestorNotFound`] if a parent reference dangles.
/// - [`BundleError::InheritanceCycle`] if a key recurs before a root is reached.
pub fn ancestry<'a>(document: &'a VariantDocument, target: &str) -> Result<Vec<(&'a str, &'a Variant)>> {
    let Some((key, variant)) = document.variants.get_key_value(target) else {
        return Err(BundleError::TargetNotFound {
            target: target.to_string(),
        });
    };

    let mut visited: IndexSet<&str> = IndexSet::new();
    let mut chain = Vec::new();
    let mut current = (key.as_str(), variant);
    loop {
        if !visited.insert(current.0) {
            let mut cycle: Vec<String> = visited.iter().map(|k| (*k).to_string()).collect();
            cycle.push(current.0.to_string());
            return Err(BundleError::InheritanceCycle { chain: cycle });
        }
        chain.push(current);
        let variant: &'a Variant = current.1;
        let Some(parent) = variant.inherits.as_deref() else {
            break;
        };
        match document.variants.get_key_value(parent) {
            Some((key, variant)) => current = (key.as_str(), variant),
            None => {
                return Err(BundleError::AncestorNotFound {
                    target: current.0.to_string(),
                    ancestor: parent.to_string(),
                });
            }
        }
    }
    chain.reverse();
    tracing::debug!(
        requested = target,
        chain = ?chain.iter().map(|(k, _)| *k).collect::<Vec<_>>(),
        "resolved inheritance chain"
    );
    Ok(chain)
}

/// Resolves `target` into one flattened bundle.
///
/// Variant `overrides` are applied after flattening: origin-style keys go
/// only to services whose classification accepts them, other keys only to
/// services already carrying that option.
///
/// Only the variant-level chain is flattened. A service's own `inherits`
/// field is kept as data, so a later `reduce` with `remove_inheritance` can
/// still act on it.
///
/// # Errors
///
/// Propagates every error of [`ancestry`].
pub fn resolve(
    document: &VariantDocument,
    target: &str,
    descriptor: &dyn CharmDescriptor,
) -> Result<Transformed> {
    let chain = ancestry(document, target)?;

    let mut bundle = Bundle::default();
    let mut overrides: IndexMap<String, Value> = IndexMap::new();
    for (key, variant) in &chain {
        tracing::debug!(variant = key, "applying variant");
        if variant.series.is_some() {
            bundle.series.clone_from(&variant.series);
        }
        for (name, def) in &variant.services {
            bundle.overlay_service(name, def);
        }
        bundle.relations.extend(variant.relations.iter().cloned());
        for (k, v) in &variant.overrides {
            let _ = overrides.insert(k.clone(), v.clone());
        }
        for (k, v) in &variant.extra {
            let _ = bundle.extra.insert(k.clone(), v.clone());
        }
    }

    let mut warnings = Vec::new();
    apply_overrides(&mut bundle, &overrides, descriptor, &mut warnings);

    tracing::info!(
        requested = target,
        services = bundle.services.len(),
        relations = bundle.relations.len(),
        "rendered target"
    );
    Ok(Transformed { bundle, warnings })
}

/// Applies document-wide option overrides to every eligible service.
pub fn apply_overrides(
    bundle: &mut Bundle,
    overrides: &IndexMap<String, Value>,
    descriptor: &dyn CharmDescriptor,
    warnings: &mut Vec<Warning>,
) {
    for (key, value) in overrides {
        let gate = OriginClass::for_option_key(key);
        for (name, def) in &mut bundle.services {
            let eligible = match gate {
                Some(accepted) => match descriptor.classify(name, def.charm.as_deref()) {
                    OriginClass::Unclassified => {
                        Warning::UnclassifiedOriginTarget {
                            service: name.clone(),
                            origin: value_text(value),
                        }
                        .record(warnings);
                        false
                    }
                    class => class == accepted,
                },
                None => def.options.contains_key(key),
            };
            if eligible {
                tracing::debug!(service = %name, key = %key, "applying override");
                def.set_option(key.clone(), value.clone());
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use bundlekit_charm::StaticCharmDescriptor;

    use super::*;
    use crate::document::Document;

    fn variants(yaml: &str) -> VariantDocument {
        match Document::parse(yaml).expect("document should parse") {
            Document::Variants(v) => v,
            Document::Bundle(_) => panic!("expected a variant document"),
        }
    }

    const CHAIN: &str = "
base:
  series: trusty
  services:
    cinder:
      charm: cs:cinder
      num_units: 1
      options: {source: stable}
    mysql: {charm: cs:percona-cluster}
  relations:
    - [cinder, mysql]
xenial-mitaka:
  inherits: base
  series: xenial
  services:
    cinder:
      options: {block-device: /dev/vdb}
    rabbitmq-server: {charm: cs:rabbitmq-server}
  relations:
    - [cinder, rabbitmq-server]
";

    #[test]
    fn ancestry_is_root_first() {
        let doc = variants(CHAIN);
        let chain = ancestry(&doc, "xenial-mitaka").expect("chain");
        let keys: Vec<&str> = chain.iter().map(|(k, _)| *k).collect();
        assert_eq!(keys, vec!["base", "xenial-mitaka"]);
    }

    #[test]
    fn options_merge_across_chain() {
        let out = resolve(&variants(CHAIN), "xenial-mitaka", &StaticCharmDescriptor)
            .expect("resolve");
        let cinder = out.bundle.services.get("cinder").expect("cinder");
        assert_eq!(cinder.option_str("source"), Some("stable"));
        assert_eq!(cinder.option_str("block-device"), Some("/dev/vdb"));
        assert_eq!(cinder.options.len(), 2);
        assert_eq!(cinder.num_units, Some(1));
    }

    #[test]
    fn relations_concatenate_and_series_descends() {
        let out = resolve(&variants(CHAIN), "xenial-mitaka", &StaticCharmDescriptor)
            .expect("resolve");
        assert_eq!(out.bundle.series.as_deref(), Some("xenial"));
        let rendered: Vec<String> = out.bundle.relations.iter().map(ToString::to_string).collect();
        assert_eq!(rendered, vec!["[cinder, mysql]", "[cinder, rabbitmq-server]"]);
    }

    #[test]
    fn resolving_root_ignores_children() {
        let out = resolve(&variants(CHAIN), "base", &StaticCharmDescriptor).expect("resolve");
        assert!(!out.bundle.services.contains_key("rabbitmq-server"));
        assert_eq!(out.bundle.series.as_deref(), Some("trusty"));
    }

    #[test]
    fn missing_target_fails() {
        let err = resolve(&variants(CHAIN), "bionic-queens", &StaticCharmDescriptor).unwrap_err();
        assert!(matches!(err, BundleError::TargetNotFound { ref target } if target == "bionic-queens"));
    }

    #[test]
    fn dangling_parent_fails() {
        let doc = variants("child:\n  inherits: nowhere\n");
        let err = ancestry(&doc, "child").unwrap_err();
        assert!(matches!(
            err,
            BundleError::AncestorNotFound { ref target, ref ancestor }
                if target == "child" && ancestor == "nowhere"
        ));
    }

    #[test]
    fn two_node_cycle_detected_from_either_end() {
        let doc = variants("A:\n  inherits: B\nB:\n  inherits: A\n");
        for target in ["A", "B"] {
            let err = ancestry(&doc, target).unwrap_err();
            assert!(matches!(err, BundleError::InheritanceCycle { .. }), "target {target}");
        }
    }

    #[test]
    fn self_cycle_detected() {
        let doc = variants("loop:\n  inherits: loop\n");
        let err = ancestry(&doc, "loop").unwrap_err();
        assert_eq!(err.to_string(), "inheritance cycle detected: loop -> loop");
    }

    #[test]
    fn resolution_is_deterministic() {
        let doc = variants(CHAIN);
        let first = resolve(&doc, "xenial-mitaka", &StaticCharmDescriptor).expect("first");
        let second = resolve(&doc, "xenial-mitaka", &StaticCharmDescriptor).expect("second");
        assert_eq!(first, second);
    }

    #[test]
    fn origin_overrides_are_key_gated() {
        let doc = variants(
            "
base:
  services:
    keystone: {charm: cs:keystone}
    rabbitmq-server: {charm: cs:rabbitmq-server}
    ntp: {charm: cs:ntp}
  overrides:
    openstack-origin: cloud:trusty-liberty
    source: cloud:trusty-liberty
",
        );
        let out = resolve(&doc, "base", &StaticCharmDescriptor).expect("resolve");
        let svc = |n: &str| out.bundle.services.get(n).expect(n);
        assert_eq!(svc("keystone").option_str("openstack-origin"), Some("cloud:trusty-liberty"));
        assert_eq!(svc("keystone").option_str("source"), None);
        assert_eq!(svc("rabbitmq-server").option_str("source"), Some("cloud:trusty-liberty"));
        assert_eq!(svc("rabbitmq-server").option_str("openstack-origin"), None);
        assert!(svc("ntp").options.is_empty());
        assert_eq!(out.warnings.len(), 2);
        assert!(out
            .warnings
            .iter()
            .all(|w| matches!(w, Warning::UnclassifiedOriginTarget { service, .. } if service == "ntp")));
    }

    #[test]
    fn plain_overrides_only_touch_configured_services() {
        let doc = variants(
            "
base:
  services:
    nova-compute: {options: {worker-multiplier: 1}}
    glance: {}
  overrides:
    worker-multiplier: 0.25
child:
  inherits: base
  overrides:
    worker-multiplier: 0.5
",
        );
        let out = resolve(&doc, "child", &StaticCharmDescriptor).expect("resolve");
        let nova = out.bundle.services.get("nova-compute").expect("nova");
        assert_eq!(nova.options.get("worker-multiplier"), Some(&Value::from(0.5)));
        assert!(out.bundle.services.get("glance").expect("glance").options.is_empty());
    }

    #[test]
    fn service_inherits_field_is_kept_as_data() {
        let doc = variants(
            "
base:
  services:
    glance: {charm: cs:glance, inherits: glance-base}
child:
  inherits: base
",
        );
        let out = resolve(&doc, "child", &StaticCharmDescriptor).expect("resolve");
        let glance = out.bundle.services.get("glance").expect("glance");
        assert_eq!(glance.inherits.as_deref(), Some("glance-base"));
        assert!(!out.bundle.extra.contains_key("inherits"));
    }
}
