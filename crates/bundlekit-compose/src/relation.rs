//! Relation entries and their endpoints.
//!
//! Three YAML shapes are accepted:
//! - `[a, b]`: a single pair.
//! - `[a, b, c]`: a group of more than two endpoints.
//! - `[hub, [x, y]]`: the hub relates to each listed endpoint.

use std::fmt;
use std::str::FromStr;

use bundlekit_common::error::BundleError;
use serde::{Deserialize, Serialize};
use serde_yaml::Value;

use crate::graph::GroupPolicy;

/// A `service[:interface]` reference.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Endpoint {
    /// Service name.
    pub service: String,
    /// Optional interface name.
    pub interface: Option<String>,
}

impl Endpoint {
    /// Endpoint on `service` without an interface.
    pub fn service(service: impl Into<String>) -> Self {
        Self {
            service: service.into(),
            interface: None,
        }
    }
}

impl FromStr for Endpoint {
    type Err = BundleError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (service, interface) = match s.split_once(':') {
            Some((svc, iface)) => (svc.trim(), Some(iface.trim())),
            None => (s.trim(), None),
        };
        if service.is_empty() {
            return Err(BundleError::malformed(format!(
                "relation endpoint \"{s}\" has no service name"
            )));
        }
        Ok(Self {
            service: service.to_string(),
            interface: interface.filter(|i| !i.is_empty()).map(str::to_string),
        })
    }
}

impl TryFrom<String> for Endpoint {
    type Error = BundleError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<Endpoint> for String {
    fn from(endpoint: Endpoint) -> Self {
        endpoint.to_string()
    }
}

impl fmt::Display for Endpoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.interface {
            Some(ref iface) => write!(f, "{}:{iface}", self.service),
            None => write!(f, "{}", self.service),
        }
    }
}

/// One entry of a bundle's `relations` list.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "Value", into = "Value")]
pub enum Relation {
    /// Two or more endpoints listed flat.
    Group(Vec<Endpoint>),
    /// One endpoint related to each of several others.
    Hub {
        /// Shared endpoint.
        hub: Endpoint,
        /// Endpoints each related to the hub.
        spokes: Vec<Endpoint>,
    },
}

impl Relation {
    /// A two-endpoint relation.
    #[must_use]
    pub fn pair(a: Endpoint, b: Endpoint) -> Self {
        Self::Group(vec![a, b])
    }

    /// Parses a relation from endpoint strings, e.g. `["cinder:amqp", "rabbitmq-server"]`.
    ///
    /// # Errors
    ///
    /// Returns an error if fewer than two endpoints are given or one is empty.
    pub fn parse<S: AsRef<str>>(endpoints: &[S]) -> Result<Self, BundleError> {
        let parsed = endpoints
            .iter()
            .map(|e| e.as_ref().parse())
            .collect::<Result<Vec<Endpoint>, _>>()?;
        if parsed.len() < 2 {
            return Err(BundleError::malformed(
                "relation needs at least two endpoints",
            ));
        }
        Ok(Self::Group(parsed))
    }

    /// Every endpoint of the relation, hub first.
    pub fn endpoints(&self) -> impl Iterator<Item = &Endpoint> {
        let (head, tail): (Option<&Endpoint>, &[Endpoint]) = match self {
            Self::Group(list) => (None, list.as_slice()),
            Self::Hub { hub, spokes } => (Some(hub), spokes.as_slice()),
        };
        head.into_iter().chain(tail.iter())
    }

    /// Service names of every endpoint.
    pub fn services(&self) -> impl Iterator<Item = &str> {
        self.endpoints().map(|e| e.service.as_str())
    }

    /// Pairs of services this entry relates, under `policy` for flat groups.
    #[must_use]
    pub fn edges(&self, policy: GroupPolicy) -> Vec<(&str, &str)> {
        match self {
            Self::Hub { hub, spokes } => spokes
                .iter()
                .map(|s| (hub.service.as_str(), s.service.as_str()))
                .collect(),
            Self::Group(list) => match list.as_slice() {
                [] | [_] => Vec::new(),
                [first, rest @ ..] if policy == GroupPolicy::Star => rest
                    .iter()
                    .map(|s| (first.service.as_str(), s.service.as_str()))
                    .collect(),
                _ => {
                    let mut edges = Vec::new();
                    for (i, a) in list.iter().enumerate() {
                        for b in &list[i + 1..] {
                            edges.push((a.service.as_str(), b.service.as_str()));
                        }
                    }
                    edges
                }
            },
        }
    }
}

fn endpoint_from_value(value: &Value) -> Result<Endpoint, BundleError> {
    match value {
        Value::String(s) => s.parse(),
        other => Err(BundleError::malformed(format!(
            "relation endpoint must be a string, got {other:?}"
        ))),
    }
}

impl TryFrom<Value> for Relation {
    type Error = BundleError;

    fn try_from(value: Value) -> Result<Self, Self::Error> {
        let Value::Sequence(items) = value else {
            return Err(BundleError::malformed(format!(
                "relation must be a list of endpoints, got {value:?}"
            )));
        };
        if let [hub, Value::Sequence(spokes)] = items.as_slice() {
            let hub = endpoint_from_value(hub)?;
            let spokes = spokes
                .iter()
                .map(endpoint_from_value)
                .collect::<Result<Vec<_>, _>>()?;
            if spokes.is_empty() {
                return Err(BundleError::malformed(format!(
                    "relation hub \"{hub}\" has no related endpoints"
                )));
            }
            return Ok(Self::Hub { hub, spokes });
        }
        let endpoints = items
            .iter()
            .map(endpoint_from_value)
            .collect::<Result<Vec<_>, _>>()?;
        if endpoints.len() < 2 {
            return Err(BundleError::malformed(
                "relation needs at least two endpoints",
            ));
        }
        Ok(Self::Group(endpoints))
    }
}

impl From<Relation> for Value {
    fn from(relation: Relation) -> Self {
        let text = |e: Endpoint| Self::String(e.to_string());
        match relation {
            Relation::Group(list) => Self::Sequence(list.into_iter().map(text).collect()),
            Relation::Hub { hub, spokes } => Self::Sequence(vec![
                text(hub),
                Self::Sequence(spokes.into_iter().map(text).collect()),
            ]),
        }
    }
}

impl fmt::Display for Relation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Group(list) => {
                let names: Vec<String> = list.iter().map(ToString::to_string).collect();
                write!(f, "[{}]", names.join(", "))
            }
            Self::Hub { hub, spokes } => {
                let names: Vec<String> = spokes.iter().map(ToString::to_string).collect();
                write!(f, "[{hub}, [{}]]", names.join(", "))
            }
        }
    }
}
