//! The render pipeline.
//!
//! Produces a deployable bundle from a document or from the base catalogue:
//! 1. Source (plain bundle, resolved target, or generated).
//! 2. Locate charms and fill defaults.
//! 3. Write the origin for the target.
//! 4. Optionally augment HA-capable services.
//! 5. Layer override documents last, so they truly override.

use bundlekit_charm::catalog::{BASE_CHARMS, BASE_RELATIONS, is_subordinate};
use bundlekit_charm::classify::charm_name_from_ref;
use bundlekit_charm::locator::default_charm_ref;
use bundlekit_charm::{CharmDescriptor, MetadataSource, OriginAssignment, Target};
use bundlekit_common::constants::{DEFAULT_RELEASE, DEFAULT_SERIES};
use bundlekit_common::error::{BundleError, Result};
use bundlekit_common::warning::Warning;

use crate::bundle::{Bundle, ServiceDef, Transformed};
use crate::document::Document;
use crate::relation::Relation;
use crate::{cascade, ha, inherit};

/// Where the bundle being rendered comes from.
#[derive(Debug, Clone)]
pub enum RenderSource {
    /// A parsed input document.
    Document(Document),
    /// The base OpenStack catalogue.
    Generate,
}

/// Parameters of [`render`].
#[derive(Debug, Clone)]
pub struct RenderRequest {
    /// Input bundle or catalogue.
    pub source: RenderSource,
    /// Target to resolve and derive the origin from.
    pub target: Option<String>,
    /// Series used when the target does not name one.
    pub series: String,
    /// Release used for the origin when no target is given.
    pub release: String,
    /// Channel to rebuild every charm locator for.
    pub channel: Option<String>,
    /// Store user owning the charms.
    pub user: Option<String>,
    /// Charm refs replacing the computed locator, by service name.
    pub locations: Vec<(String, String)>,
    /// Whether to run HA augmentation.
    pub ha: bool,
    /// Override documents, least significant first.
    pub overrides: Vec<Bundle>,
}

impl RenderRequest {
    /// A request with default series/release and no optional stages.
    #[must_use]
    pub fn new(source: RenderSource) -> Self {
        Self {
            source,
            target: None,
            series: DEFAULT_SERIES.to_string(),
            release: DEFAULT_RELEASE.to_string(),
            channel: None,
            user: None,
            locations: Vec::new(),
            ha: false,
            overrides: Vec::new(),
        }
    }
}

/// Builds a bundle from the base OpenStack catalogue.
///
/// # Errors
///
/// Returns an error if a catalogue relation is malformed.
pub fn generate_bundle() -> Result<Bundle> {
    let mut bundle = Bundle::default();
    for name in BASE_CHARMS {
        let def = ServiceDef {
            num_units: Some(u32::from(!is_subordinate(name))),
            ..ServiceDef::default()
        };
        let _ = bundle.services.insert((*name).to_string(), def);
    }
    for pair in BASE_RELATIONS {
        bundle.relations.push(Relation::parse(pair)?);
    }
    Ok(bundle)
}

/// Sets series, charm refs, and unit defaults on every service.
///
/// # Errors
///
/// Returns an error if the channel is not supported.
pub fn locate_services(
    bundle: &mut Bundle,
    series: &str,
    channel: Option<&str>,
    user: Option<&str>,
    locations: &[(String, String)],
    descriptor: &dyn CharmDescriptor,
) -> Result<()> {
    tracing::info!(?channel, series, "setting charm locations");
    for (name, def) in &mut bundle.services {
        def.series = Some(series.to_string());
        if let Some(channel) = channel {
            let charm = def
                .charm
                .as_deref()
                .and_then(charm_name_from_ref)
                .unwrap_or_else(|| name.clone());
            def.charm = Some(descriptor.locate(&charm, channel, Some(series), user)?);
        }
        if let Some((_, url)) = locations.iter().find(|(svc, _)| svc == name) {
            tracing::debug!(service = %name, %url, "using location override");
            def.charm = Some(url.clone());
        }
    }
    fill_defaults(bundle);
    Ok(())
}

/// Gives services without `charm` or `num_units` their defaults.
pub fn fill_defaults(bundle: &mut Bundle) {
    for (name, def) in &mut bundle.services {
        if def.charm.is_none() {
            def.charm = Some(default_charm_ref(name));
        }
        if def.num_units.is_none() {
            def.num_units = Some(1);
        }
    }
}

/// Writes the origin of `target` into each service under its classified key.
pub fn set_origin(
    bundle: &mut Bundle,
    target: &Target,
    descriptor: &dyn CharmDescriptor,
    warnings: &mut Vec<Warning>,
) {
    tracing::info!(%target, "setting openstack-origin and source");
    for (name, def) in &mut bundle.services {
        match descriptor.origin_assignment(name, def.charm.as_deref(), target) {
            OriginAssignment::Native => {
                tracing::debug!(service = %name, %target, "release is native, not setting origin");
            }
            OriginAssignment::Assign { key, value } => {
                tracing::debug!(service = %name, key, %value, "setting origin");
                def.set_option(key, value);
            }
            OriginAssignment::Unclassified { value } => Warning::UnclassifiedOriginTarget {
                service: name.clone(),
                origin: value,
            }
            .record(warnings),
        }
    }
}

/// Runs the full render pipeline.
///
/// # Errors
///
/// Returns an error if the target cannot be resolved, a variant document is
/// given without a target, or the channel is not supported.
pub fn render(
    request: &RenderRequest,
    descriptor: &dyn CharmDescriptor,
    metadata: Option<&dyn MetadataSource>,
) -> Result<Transformed> {
    let mut warnings = Vec::new();

    let mut bundle = match request.source {
        RenderSource::Generate => generate_bundle()?,
        RenderSource::Document(Document::Bundle(ref bundle)) => bundle.clone(),
        RenderSource::Document(Document::Variants(ref variants)) => {
            let Some(ref target) = request.target else {
                return Err(BundleError::malformed(
                    "variant document requires a target to render",
                ));
            };
            let resolved = inherit::resolve(variants, target, descriptor)?;
            warnings.extend(resolved.warnings);
            resolved.bundle
        }
    };

    let target = match request.target {
        Some(ref raw) => raw.parse::<Target>().map_or_else(
            |_| {
                Warning::UnparsedTarget {
                    target: raw.clone(),
                }
                .record(&mut warnings);
                None
            },
            Some,
        ),
        None => Some(Target::new(request.series.clone(), request.release.clone())),
    };
    let series = target
        .as_ref()
        .map_or(request.series.as_str(), |t| t.series.as_str());

    locate_services(
        &mut bundle,
        series,
        request.channel.as_deref(),
        request.user.as_deref(),
        &request.locations,
        descriptor,
    )?;

    if let Some(ref target) = target {
        set_origin(&mut bundle, target, descriptor, &mut warnings);
    }

    if request.ha {
        match metadata {
            Some(store) => ha::augment(&mut bundle, series, store, &mut warnings),
            None => tracing::warn!("HA requested but no metadata source available, skipping"),
        }
    }

    if !request.overrides.is_empty() {
        tracing::info!(layers = request.overrides.len(), "merging overrides");
        bundle = cascade::merge(bundle, &request.overrides);
        fill_defaults(&mut bundle);
    }

    Ok(Transformed { bundle, warnings })
}

#[cfg(test)]
mod tests {
    use bundlekit_charm::StaticCharmDescriptor;

    use super::*;

    fn doc(yaml: &str) -> RenderSource {
        RenderSource::Document(Document::parse(yaml).expect("document should parse"))
    }

    #[test]
    fn generated_bundle_covers_catalogue() {
        let bundle = generate_bundle().expect("generate");
        assert_eq!(bundle.services.len(), BASE_CHARMS.len());
        assert_eq!(bundle.relations.len(), BASE_RELATIONS.len());
        assert_eq!(bundle.services["neutron-openvswitch"].num_units, Some(0));
        assert_eq!(bundle.services["keystone"].num_units, Some(1));
    }

    #[test]
    fn defaults_filled_without_channel() {
        let request = RenderRequest::new(doc("services: {mysql: {}, keystone: {charm: 'cs:~me/keystone'}}"));
        let out = render(&request, &StaticCharmDescriptor, None).expect("render");
        assert_eq!(out.bundle.services["mysql"].charm.as_deref(), Some("cs:mysql"));
        assert_eq!(out.bundle.services["mysql"].num_units, Some(1));
        assert_eq!(out.bundle.services["mysql"].series.as_deref(), Some("xenial"));
        assert_eq!(out.bundle.services["keystone"].charm.as_deref(), Some("cs:~me/keystone"));
    }

    #[test]
    fn channel_relocates_and_location_override_wins() {
        let mut request = RenderRequest::new(doc(
            "services: {db: {charm: 'cs:percona-cluster-12'}, glance: {}, mongodb: {}}",
        ));
        request.channel = Some("next".into());
        request.locations = vec![("mongodb".into(), "cs:~me/trusty/mongodb".into())];
        let out = render(&request, &StaticCharmDescriptor, None).expect("render");
        assert_eq!(
            out.bundle.services["db"].charm.as_deref(),
            Some("cs:~openstack-charmers-next/xenial/percona-cluster")
        );
        assert_eq!(
            out.bundle.services["glance"].charm.as_deref(),
            Some("cs:~openstack-charmers-next/xenial/glance")
        );
        assert_eq!(out.bundle.services["mongodb"].charm.as_deref(), Some("cs:~me/trusty/mongodb"));
    }

    #[test]
    fn invalid_channel_fails() {
        let mut request = RenderRequest::new(doc("services: {glance: {}}"));
        request.channel = Some("edge".into());
        let err = render(&request, &StaticCharmDescriptor, None).unwrap_err();
        assert!(matches!(err, BundleError::InvalidChannel { .. }));
    }

    #[test]
    fn native_release_writes_no_origin() {
        let request = RenderRequest::new(doc("services: {keystone: {}}"));
        let out = render(&request, &StaticCharmDescriptor, None).expect("render");
        assert!(out.bundle.services["keystone"].options.is_empty());
    }

    #[test]
    fn target_origin_written_per_class() {
        let mut request = RenderRequest::new(doc(
            "services: {keystone: {}, rabbitmq-server: {}, ntp: {}}",
        ));
        request.target = Some("trusty-liberty".into());
        let out = render(&request, &StaticCharmDescriptor, None).expect("render");
        let svc = |n: &str| &out.bundle.services[n];
        assert_eq!(svc("keystone").option_str("openstack-origin"), Some("cloud:trusty-liberty"));
        assert_eq!(svc("rabbitmq-server").option_str("source"), Some("cloud:trusty-liberty"));
        assert_eq!(svc("keystone").series.as_deref(), Some("trusty"));
        assert!(svc("ntp").options.is_empty());
        assert!(matches!(
            out.warnings.as_slice(),
            [Warning::UnclassifiedOriginTarget { service, .. }] if service == "ntp"
        ));
    }

    #[test]
    fn variant_document_needs_target() {
        let request = RenderRequest::new(doc("base:\n  services: {mysql: {}}\n"));
        let err = render(&request, &StaticCharmDescriptor, None).unwrap_err();
        assert!(matches!(err, BundleError::MalformedDocument { .. }));
    }

    #[test]
    fn non_series_target_resolves_but_skips_origin() {
        let mut request = RenderRequest::new(doc("base:\n  services: {keystone: {}}\n"));
        request.target = Some("base".into());
        request.release = "newton".into();
        let out = render(&request, &StaticCharmDescriptor, None).expect("render");
        assert!(out.bundle.services["keystone"].options.is_empty());
        assert_eq!(
            out.warnings,
            vec![Warning::UnparsedTarget {
                target: "base".into()
            }]
        );
    }

    #[test]
    fn hyphenated_variant_key_keeps_requested_series() {
        let mut request = RenderRequest::new(doc(
            "openstack-base:\n  services: {keystone: {charm: cs:keystone}, ntp: {}}\n",
        ));
        request.target = Some("openstack-base".into());
        request.series = "trusty".into();
        request.channel = Some("stable".into());
        let out = render(&request, &StaticCharmDescriptor, None).expect("render");
        let keystone = &out.bundle.services["keystone"];
        assert_eq!(keystone.series.as_deref(), Some("trusty"));
        assert_eq!(keystone.charm.as_deref(), Some("cs:trusty/keystone"));
        assert!(keystone.options.is_empty());
        assert_eq!(
            out.warnings,
            vec![Warning::UnparsedTarget {
                target: "openstack-base".into()
            }]
        );
    }

    #[test]
    fn overrides_applied_last() {
        let mut request = RenderRequest::new(doc("services: {keystone: {}}"));
        request.target = Some("trusty-liberty".into());
        request.overrides = vec![
            Document::parse_bundle("services: {keystone: {options: {openstack-origin: 'cloud:trusty-mitaka'}}}")
                .expect("override"),
            Document::parse_bundle("services: {ntp: {options: {source: ppa}}}\nrelations: [[keystone, ntp]]")
                .expect("override"),
        ];
        let out = render(&request, &StaticCharmDescriptor, None).expect("render");
        assert_eq!(
            out.bundle.services["keystone"].option_str("openstack-origin"),
            Some("cloud:trusty-mitaka")
        );
        let ntp = &out.bundle.services["ntp"];
        assert_eq!(ntp.charm.as_deref(), Some("cs:ntp"));
        assert_eq!(ntp.num_units, Some(1));
        assert_eq!(out.bundle.relations.len(), 1);
    }

    #[test]
    fn ha_without_metadata_source_is_skipped() {
        let mut request = RenderRequest::new(doc("services: {keystone: {}}"));
        request.ha = true;
        let out = render(&request, &StaticCharmDescriptor, None).expect("render");
        assert_eq!(out.bundle.services.len(), 1);
    }
}
