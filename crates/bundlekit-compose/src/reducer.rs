//! Reduction of a bundle to a subset of its services.
//!
//! The kept set is the requested services plus, unless disabled, their
//! direct neighbours in the relation graph, minus every excluded service.
//! Relations survive only when every endpoint survives.

use std::collections::BTreeSet;

use bundlekit_common::warning::Warning;
use indexmap::IndexSet;

use crate::bundle::{Bundle, Transformed};
use crate::graph::{GroupPolicy, RelationGraph};

/// What `remove_inheritance` does to a service that carries `inherits`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum InheritancePolicy {
    /// Drop the whole service.
    #[default]
    DropService,
    /// Keep the service and delete only its `inherits` field.
    StripField,
}

/// Parameters of [`reduce`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ReduceOptions {
    /// Services to keep. Empty means every service.
    pub include: BTreeSet<String>,
    /// Services to drop, winning over `include` and over the closure.
    pub exclude: BTreeSet<String>,
    /// Keep only `include`, without its direct neighbours.
    pub exclude_related: bool,
    /// Delete `constraints` from kept services.
    pub remove_constraints: bool,
    /// Delete placement (`to:`) from kept services.
    pub remove_placements: bool,
    /// Apply `inheritance_policy` to services carrying `inherits`.
    pub remove_inheritance: bool,
    /// Reading of `remove_inheritance`.
    pub inheritance_policy: InheritancePolicy,
    /// Reading of relation groups with more than two endpoints.
    pub group_policy: GroupPolicy,
}

impl ReduceOptions {
    /// Options selecting `include`, everything else default.
    pub fn including<I, S>(include: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            include: include.into_iter().map(Into::into).collect(),
            ..Self::default()
        }
    }
}

/// Computes the working set before exclusion, in bundle order.
fn working_set<'a>(
    bundle: &'a Bundle,
    options: &ReduceOptions,
    warnings: &mut Vec<Warning>,
) -> IndexSet<&'a str> {
    if options.include.is_empty() {
        tracing::debug!("including all services");
        return bundle.service_names().collect();
    }

    for name in &options.include {
        if !bundle.services.contains_key(name) {
            Warning::UnknownService {
                service: name.clone(),
            }
            .record(warnings);
        }
    }

    let graph = (!options.exclude_related)
        .then(|| RelationGraph::from_bundle(bundle, options.group_policy));

    let mut wanted: BTreeSet<&str> = BTreeSet::new();
    for name in bundle.service_names().filter(|n| options.include.contains(*n)) {
        let _ = wanted.insert(name);
        if let Some(ref graph) = graph {
            let related = graph.neighbors(name);
            tracing::debug!(service = name, ?related, "adding related services");
            wanted.extend(related);
        }
    }

    bundle
        .service_names()
        .filter(|n| wanted.contains(n))
        .collect()
}

/// Reduces `bundle` according to `options`.
///
/// Unknown names in `include` and include/exclude overlaps produce warnings,
/// never errors.
#[must_use]
pub fn reduce(bundle: &Bundle, options: &ReduceOptions) -> Transformed {
    let mut warnings = Vec::new();

    let overlap: Vec<String> = options
        .include
        .intersection(&options.exclude)
        .cloned()
        .collect();
    if !overlap.is_empty() {
        Warning::IncludeExcludeOverlap { services: overlap }.record(&mut warnings);
    }

    let mut kept = working_set(bundle, options, &mut warnings);
    kept.retain(|name| !options.exclude.contains(*name));

    let mut services = indexmap::IndexMap::with_capacity(kept.len());
    for name in kept {
        let Some(def) = bundle.services.get(name) else {
            continue;
        };
        let mut def = def.clone();
        if options.remove_inheritance && def.inherits.is_some() {
            match options.inheritance_policy {
                InheritancePolicy::DropService => {
                    tracing::debug!(service = name, "removing service that uses inheritance");
                    continue;
                }
                InheritancePolicy::StripField => def.inherits = None,
            }
        }
        if options.remove_constraints {
            def.constraints = None;
        }
        if options.remove_placements {
            def.placement = None;
        }
        let _ = services.insert(name.to_string(), def);
    }

    let relations = bundle
        .relations
        .iter()
        .filter(|relation| {
            let keep = relation.services().all(|s| services.contains_key(s));
            if !keep {
                tracing::debug!(%relation, "dropping relation with a removed endpoint");
            }
            keep
        })
        .cloned()
        .collect();

    let reduced = Bundle {
        series: bundle.series.clone(),
        services,
        relations,
        extra: bundle.extra.clone(),
    };
    tracing::info!(
        services = reduced.services.len(),
        relations = reduced.relations.len(),
        "reduced bundle"
    );
    Transformed {
        bundle: reduced,
        warnings,
    }
}
