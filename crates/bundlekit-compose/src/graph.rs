//! Relation graph management using `petgraph`.
//!
//! Builds an undirected graph over service names from a bundle's relation
//! list, so the reducer can ask for the direct neighbours of any service.

use std::collections::HashMap;

use petgraph::graph::{NodeIndex, UnGraph};

use crate::bundle::Bundle;
use crate::relation::Relation;

/// How a flat relation entry with more than two endpoints is read.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum GroupPolicy {
    /// Every endpoint relates to every other endpoint.
    #[default]
    Clique,
    /// The first endpoint relates to each of the others.
    Star,
}

/// An undirected adjacency view over service names.
#[derive(Debug, Default)]
pub struct RelationGraph {
    /// Internal petgraph representation.
    graph: UnGraph<String, ()>,
    /// Node lookup by service name.
    nodes: HashMap<String, NodeIndex>,
}

impl RelationGraph {
    /// Creates an empty relation graph.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds the graph of `bundle`: one node per service and per relation
    /// endpoint, one edge per related pair.
    #[must_use]
    pub fn from_bundle(bundle: &Bundle, policy: GroupPolicy) -> Self {
        let mut graph = Self::new();
        for name in bundle.service_names() {
            let _ = graph.add_service(name);
        }
        for relation in &bundle.relations {
            graph.add_relation(relation, policy);
        }
        tracing::debug!(
            nodes = graph.graph.node_count(),
            edges = graph.graph.edge_count(),
            "built relation graph"
        );
        graph
    }

    /// Adds a service node, returning the existing node if already present.
    pub fn add_service(&mut self, name: &str) -> NodeIndex {
        if let Some(&idx) = self.nodes.get(name) {
            return idx;
        }
        let idx = self.graph.add_node(name.to_string());
        let _ = self.nodes.insert(name.to_string(), idx);
        idx
    }

    /// Relates two services. Self-relations and repeats are ignored.
    pub fn relate(&mut self, a: &str, b: &str) {
        if a == b {
            return;
        }
        let a = self.add_service(a);
        let b = self.add_service(b);
        let _ = self.graph.update_edge(a, b, ());
    }

    /// Adds every pair a relation entry relates.
    pub fn add_relation(&mut self, relation: &Relation, policy: GroupPolicy) {
        for (a, b) in relation.edges(policy) {
            self.relate(a, b);
        }
    }

    /// Returns whether a service node exists.
    #[must_use]
    pub fn contains(&self, name: &str) -> bool {
        self.nodes.contains_key(name)
    }

    /// Direct neighbours of `name`, in the order the services were first seen.
    #[must_use]
    pub fn neighbors(&self, name: &str) -> Vec<&str> {
        let Some(&idx) = self.nodes.get(name) else {
            return Vec::new();
        };
        let mut adjacent: Vec<NodeIndex> = self.graph.neighbors(idx).collect();
        adjacent.sort_unstable();
        adjacent.dedup();
        adjacent
            .into_iter()
            .filter_map(|n| self.graph.node_weight(n).map(String::as_str))
            .collect()
    }

    /// Returns whether two services are directly related.
    #[must_use]
    pub fn are_related(&self, a: &str, b: &str) -> bool {
        match (self.nodes.get(a), self.nodes.get(b)) {
            (Some(&a), Some(&b)) => self.graph.contains_edge(a, b),
            _ => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn bundle(yaml: &str) -> Bundle {
        serde_yaml::from_str(yaml).expect("bundle should parse")
    }

    #[test]
    fn empty_graph_has_no_neighbors() {
        let graph = RelationGraph::new();
        assert!(graph.neighbors("api").is_empty());
        assert!(!graph.contains("api"));
    }

    #[test]
    fn isolated_service_is_present() {
        let graph = RelationGraph::from_bundle(&bundle("services: {ntp: {}}"), GroupPolicy::Clique);
        assert!(graph.contains("ntp"));
        assert!(graph.neighbors("ntp").is_empty());
    }

    #[test]
    fn relation_is_undirected() {
        let mut graph = RelationGraph::new();
        graph.relate("keystone", "mysql");
        assert_eq!(graph.neighbors("keystone"), vec!["mysql"]);
        assert_eq!(graph.neighbors("mysql"), vec!["keystone"]);
        assert!(graph.are_related("mysql", "keystone"));
    }

    #[test]
    fn neighbors_follow_first_seen_order() {
        let b = bundle(
            "services: {mysql: {}, keystone: {}, cinder: {}, glance: {}}\n\
             relations: [[glance, mysql], [keystone, mysql], [cinder, mysql]]",
        );
        let graph = RelationGraph::from_bundle(&b, GroupPolicy::Clique);
        assert_eq!(graph.neighbors("mysql"), vec!["keystone", "cinder", "glance"]);
    }

    #[test]
    fn duplicate_relations_collapse_to_one_edge() {
        let mut graph = RelationGraph::new();
        graph.relate("a", "b");
        graph.relate("b", "a");
        graph.relate("a", "b");
        assert_eq!(graph.neighbors("a"), vec!["b"]);
    }

    #[test]
    fn self_relation_ignored() {
        let mut graph = RelationGraph::new();
        graph.relate("peer", "peer");
        assert!(graph.neighbors("peer").is_empty());
    }

    #[test]
    fn neighbors_are_one_hop_only() {
        let b = bundle("services: {a: {}, b: {}, c: {}}\nrelations: [[a, b], [b, c]]");
        let graph = RelationGraph::from_bundle(&b, GroupPolicy::Clique);
        assert_eq!(graph.neighbors("a"), vec!["b"]);
        assert!(!graph.are_related("a", "c"));
    }

    #[test]
    fn group_policy_changes_adjacency() {
        let b = bundle("services: {a: {}, b: {}, c: {}}\nrelations: [[a, b, c]]");
        let clique = RelationGraph::from_bundle(&b, GroupPolicy::Clique);
        assert!(clique.are_related("b", "c"));
        let star = RelationGraph::from_bundle(&b, GroupPolicy::Star);
        assert!(star.are_related("a", "c"));
        assert!(!star.are_related("b", "c"));
    }

    #[test]
    fn endpoints_outside_services_become_nodes() {
        let b = bundle("services: {a: {}}\nrelations: [[a, ghost]]");
        let graph = RelationGraph::from_bundle(&b, GroupPolicy::Clique);
        assert!(graph.contains("ghost"));
        assert_eq!(graph.neighbors("a"), vec!["ghost"]);
    }
}
