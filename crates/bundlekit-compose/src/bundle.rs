//! In-memory bundle model.
//!
//! Field presence matters: an omitted field is `None` (or empty) so that
//! merges can tell "not set here" apart from "set to a value".

use bundlekit_common::warning::Warning;
use indexmap::IndexMap;
use serde::{Deserialize, Deserializer, Serialize};
use serde_yaml::Value;

use crate::relation::Relation;

/// Ordered option map of a service.
pub type Options = IndexMap<String, Value>;

/// Deserializes `null` (an empty YAML key) as the type's default.
pub(crate) fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de> + Default,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

/// Reads `to:` as a list, accepting a single scalar as a one-element list.
fn deserialize_placement<'de, D>(deserializer: D) -> Result<Option<Vec<String>>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<Value>::deserialize(deserializer)?;
    let scalar = |v: &Value| -> Result<String, D::Error> {
        match v {
            Value::String(s) => Ok(s.clone()),
            Value::Number(n) => Ok(n.to_string()),
            other => Err(serde::de::Error::custom(format!(
                "placement must be a string or number, got {other:?}"
            ))),
        }
    };
    match value {
        None | Some(Value::Null) => Ok(None),
        Some(Value::Sequence(items)) => items.iter().map(scalar).collect::<Result<_, _>>().map(Some),
        Some(ref one) => Ok(Some(vec![scalar(one)?])),
    }
}

/// Replaces `slot` with `value` when `value` is set.
fn overwrite<T: Clone>(slot: &mut Option<T>, value: Option<&T>) {
    if let Some(v) = value {
        *slot = Some(v.clone());
    }
}

/// Definition of one service inside a bundle.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ServiceDef {
    /// Charm reference, e.g. `cs:xenial/keystone`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub charm: Option<String>,
    /// Series the service is deployed on.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub series: Option<String>,
    /// Number of units.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub num_units: Option<u32>,
    /// Charm config options.
    #[serde(
        default,
        deserialize_with = "null_as_default",
        skip_serializing_if = "IndexMap::is_empty"
    )]
    pub options: Options,
    /// Placement directives (`to:`).
    #[serde(
        rename = "to",
        default,
        deserialize_with = "deserialize_placement",
        skip_serializing_if = "Option::is_none"
    )]
    pub placement: Option<Vec<String>>,
    /// Juju constraints string.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub constraints: Option<String>,
    /// Parent reference.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub inherits: Option<String>,
    /// Any other keys, carried through verbatim.
    #[serde(flatten)]
    pub extra: IndexMap<String, Value>,
}

impl ServiceDef {
    /// Applies `overlay` on top of `self`: set scalars overwrite, options
    /// and extra keys merge per key, placement is replaced only when set.
    pub fn overlay(&mut self, overlay: &Self) {
        overwrite(&mut self.charm, overlay.charm.as_ref());
        overwrite(&mut self.series, overlay.series.as_ref());
        overwrite(&mut self.num_units, overlay.num_units.as_ref());
        overwrite(&mut self.placement, overlay.placement.as_ref());
        overwrite(&mut self.constraints, overlay.constraints.as_ref());
        overwrite(&mut self.inherits, overlay.inherits.as_ref());
        for (key, value) in &overlay.options {
            let _ = self.options.insert(key.clone(), value.clone());
        }
        for (key, value) in &overlay.extra {
            let _ = self.extra.insert(key.clone(), value.clone());
        }
    }

    /// Sets one option, replacing any previous value.
    pub fn set_option(&mut self, key: impl Into<String>, value: impl Into<Value>) {
        let _ = self.options.insert(key.into(), value.into());
    }

    /// Returns an option as a string, if it is one.
    #[must_use]
    pub fn option_str(&self, key: &str) -> Option<&str> {
        self.options.get(key).and_then(Value::as_str)
    }
}

/// A set of services and the relations between them.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Bundle {
    /// Default series of the bundle.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub series: Option<String>,
    /// Services keyed by name, in authored order.
    #[serde(default, deserialize_with = "null_as_default")]
    pub services: IndexMap<String, ServiceDef>,
    /// Relation entries, in authored order.
    #[serde(default, deserialize_with = "null_as_default")]
    pub relations: Vec<Relation>,
    /// Any other top-level keys (e.g. `machines`), carried through verbatim.
    #[serde(flatten)]
    pub extra: IndexMap<String, Value>,
}

impl Bundle {
    /// Merges `def` into the service `name`, inserting it when absent.
    pub fn overlay_service(&mut self, name: &str, def: &ServiceDef) {
        match self.services.get_mut(name) {
            Some(existing) => existing.overlay(def),
            None => {
                let _ = self.services.insert(name.to_string(), def.clone());
            }
        }
    }

    /// Service names in bundle order.
    pub fn service_names(&self) -> impl Iterator<Item = &str> {
        self.services.keys().map(String::as_str)
    }

    /// Serializes the bundle to YAML.
    ///
    /// # Errors
    ///
    /// Returns an error if a value cannot be represented in YAML.
    pub fn to_yaml(&self) -> bundlekit_common::error::Result<String> {
        Ok(serde_yaml::to_string(self)?)
    }
}

/// A transformed bundle together with the warnings raised while producing it.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Transformed {
    /// Resulting bundle.
    pub bundle: Bundle,
    /// Recoverable problems, in the order they were met.
    pub warnings: Vec<Warning>,
}

/// Renders an option value for log and warning messages.
pub(crate) fn value_text(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => serde_yaml::to_string(other)
            .map(|s| s.trim_end().to_string())
            .unwrap_or_default(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn svc(yaml: &str) -> ServiceDef {
        serde_yaml::from_str(yaml).expect("service should parse")
    }

    #[test]
    fn placement_scalar_becomes_list() {
        let def = svc("to: lxd:0");
        assert_eq!(def.placement, Some(vec!["lxd:0".to_string()]));
        let def = svc("to: [0, 'lxd:1']");
        assert_eq!(def.placement, Some(vec!["0".to_string(), "lxd:1".to_string()]));
    }

    #[test]
    fn unknown_keys_are_preserved() {
        let def = svc("charm: cs:ntp\nexpose: true\nannotations: {gui-x: 10}");
        assert_eq!(def.extra.len(), 2);
        assert_eq!(def.extra.get("expose"), Some(&Value::Bool(true)));
        let text = serde_yaml::to_string(&def).expect("serialize");
        assert!(text.contains("expose: true"), "got: {text}");
    }

    #[test]
    fn overlay_merges_options_per_key() {
        let mut base = svc("options: {source: stable, debug: false}");
        let top = svc("options: {block-device: /dev/vdb, debug: true}");
        base.overlay(&top);
        assert_eq!(base.option_str("source"), Some("stable"));
        assert_eq!(base.option_str("block-device"), Some("/dev/vdb"));
        assert_eq!(base.options.get("debug"), Some(&Value::Bool(true)));
    }

    #[test]
    fn overlay_keeps_unset_fields() {
        let mut base = svc("charm: cs:keystone\nnum_units: 3\nto: ['lxd:0']\nconstraints: mem=4G");
        base.overlay(&svc("num_units: 1"));
        assert_eq!(base.charm.as_deref(), Some("cs:keystone"));
        assert_eq!(base.num_units, Some(1));
        assert_eq!(base.placement, Some(vec!["lxd:0".to_string()]));
        assert_eq!(base.constraints.as_deref(), Some("mem=4G"));
    }

    #[test]
    fn overlay_replaces_placement_wholesale() {
        let mut base = svc("to: ['lxd:0', 'lxd:1']");
        base.overlay(&svc("to: ['lxd:2']"));
        assert_eq!(base.placement, Some(vec!["lxd:2".to_string()]));
    }

    #[test]
    fn empty_services_key_reads_as_empty() {
        let bundle: Bundle = serde_yaml::from_str("services:\nrelations:\n").expect("parse");
        assert!(bundle.services.is_empty());
        assert!(bundle.relations.is_empty());
    }

    #[test]
    fn top_level_extras_survive() {
        let bundle: Bundle =
            serde_yaml::from_str("services: {}\nmachines: {'0': {series: xenial}}").expect("parse");
        assert!(bundle.extra.contains_key("machines"));
        let text = bundle.to_yaml().expect("serialize");
        assert!(text.contains("machines"), "got: {text}");
    }

    #[test]
    fn overlay_service_inserts_missing() {
        let mut bundle = Bundle::default();
        bundle.overlay_service("ntp", &svc("charm: cs:ntp"));
        bundle.overlay_service("ntp", &svc("num_units: 0"));
        let ntp = bundle.services.get("ntp").expect("ntp");
        assert_eq!(ntp.charm.as_deref(), Some("cs:ntp"));
        assert_eq!(ntp.num_units, Some(0));
    }
}
