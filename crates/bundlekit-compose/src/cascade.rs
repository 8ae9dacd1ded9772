//! Override cascade merge.
//!
//! Layers override documents onto a base bundle, least significant first:
//! - Services: field-level overlay (options per key, scalars last-wins)
//! - New services: taken as authored
//! - Relations: appended, duplicates kept
//! - Other top-level keys: last wins per key

use crate::bundle::Bundle;

/// Applies one override layer to `acc`, returning the merged bundle.
#[must_use]
pub fn merge_step(mut acc: Bundle, layer: &Bundle) -> Bundle {
    if layer.series.is_some() {
        acc.series.clone_from(&layer.series);
    }
    for (name, def) in &layer.services {
        if acc.services.contains_key(name) {
            tracing::debug!(service = %name, "updating service from override");
        } else {
            tracing::debug!(service = %name, "adding service from override");
        }
        acc.overlay_service(name, def);
    }
    acc.relations.extend(layer.relations.iter().cloned());
    for (key, value) in &layer.extra {
        let _ = acc.extra.insert(key.clone(), value.clone());
    }
    acc
}

/// Merges `overrides` onto `base` in order; later layers win.
#[must_use]
pub fn merge(base: Bundle, overrides: &[Bundle]) -> Bundle {
    overrides.iter().fold(base, merge_step)
}
