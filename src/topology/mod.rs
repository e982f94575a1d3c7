// Network topology data model
//
// Immutable description of the network being visualized: nodes with their
// authored 3D positions and the deduplicated, adjacency-resolved edge list.
// A Graph is built once from caller-supplied nodes and never mutated; a new
// snapshot means a new Graph and a full scene rebuild.

pub mod demo;

use crate::error::ConstructionError;
use glam::Vec3;
use std::borrow::Borrow;
use std::collections::{HashMap, HashSet};
use std::fmt;

// ============================================================================
// Identifiers and enums
// ============================================================================

/// Stable, unique node identifier
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(String);

impl NodeId {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<&str> for NodeId {
    fn from(id: &str) -> Self {
        Self(id.to_string())
    }
}

impl From<String> for NodeId {
    fn from(id: String) -> Self {
        Self(id)
    }
}

impl Borrow<str> for NodeId {
    fn borrow(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Role of a node in the network; drives the icon drawn for it
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NodeCategory {
    Router,
    Server,
    Workstation,
    Firewall,
    Ids,
}

impl NodeCategory {
    pub fn name(&self) -> &'static str {
        match self {
            NodeCategory::Router => "router",
            NodeCategory::Server => "server",
            NodeCategory::Workstation => "workstation",
            NodeCategory::Firewall => "firewall",
            NodeCategory::Ids => "ids",
        }
    }
}

impl fmt::Display for NodeCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Security status of a node
///
/// Variants are declared in ascending severity, so the derived `Ord` is the
/// authoritative severity order: `Offline > Compromised > Warning > Secure`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum NodeStatus {
    Secure,
    Warning,
    Compromised,
    Offline,
}

impl NodeStatus {
    #[cfg(test)]
    pub const ALL: [NodeStatus; 4] = [
        NodeStatus::Secure,
        NodeStatus::Warning,
        NodeStatus::Compromised,
        NodeStatus::Offline,
    ];

    /// The more severe of two statuses
    pub fn worse(self, other: NodeStatus) -> NodeStatus {
        self.max(other)
    }

    pub fn name(&self) -> &'static str {
        match self {
            NodeStatus::Secure => "secure",
            NodeStatus::Warning => "warning",
            NodeStatus::Compromised => "compromised",
            NodeStatus::Offline => "offline",
        }
    }
}

impl fmt::Display for NodeStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

// ============================================================================
// Nodes and edges
// ============================================================================

/// A single device in the network snapshot
#[derive(Debug, Clone, PartialEq)]
pub struct NetworkNode {
    pub id: NodeId,
    pub label: String,
    pub category: NodeCategory,
    pub status: NodeStatus,
    /// Authoring-time coordinate; never computed by a layout pass
    pub position: Vec3,
    /// Outgoing adjacency
    pub connections: Vec<NodeId>,
    pub ip: String,
    pub services: Vec<String>,
    pub threat_count: u32,
}

impl NetworkNode {
    pub fn new(
        id: impl Into<NodeId>,
        label: impl Into<String>,
        category: NodeCategory,
        status: NodeStatus,
        position: [f32; 3],
    ) -> Self {
        Self {
            id: id.into(),
            label: label.into(),
            category,
            status,
            position: Vec3::from_array(position),
            connections: Vec::new(),
            ip: String::new(),
            services: Vec::new(),
            threat_count: 0,
        }
    }

    pub fn with_connections<I, T>(mut self, connections: I) -> Self
    where
        I: IntoIterator<Item = T>,
        T: Into<NodeId>,
    {
        self.connections = connections.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_ip(mut self, ip: impl Into<String>) -> Self {
        self.ip = ip.into();
        self
    }

    pub fn with_services<I, T>(mut self, services: I) -> Self
    where
        I: IntoIterator<Item = T>,
        T: Into<String>,
    {
        self.services = services.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_threats(mut self, threat_count: u32) -> Self {
        self.threat_count = threat_count;
        self
    }
}

/// Undirected edge between two nodes, emitted once per unordered pair
///
/// `a` and `b` index into `Graph::nodes()`; `a` is always the endpoint with
/// the smaller id.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Edge {
    pub a: usize,
    pub b: usize,
}

/// Validated, read-only network snapshot
#[derive(Debug, Clone)]
pub struct Graph {
    nodes: Vec<NetworkNode>,
    index: HashMap<NodeId, usize>,
    edges: Vec<Edge>,
}

impl Graph {
    /// Nodes in insertion order
    pub fn nodes(&self) -> &[NetworkNode] {
        &self.nodes
    }

    pub fn edges(&self) -> &[Edge] {
        &self.edges
    }

    pub fn get(&self, id: &str) -> Option<&NetworkNode> {
        self.index.get(id).map(|&idx| &self.nodes[idx])
    }

    pub fn index_of(&self, id: &str) -> Option<usize> {
        self.index.get(id).copied()
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }
}

/// Validate caller-supplied nodes and resolve them into a Graph
///
/// Checks, in order: id uniqueness and position finiteness for every node,
/// then that every `connections` entry resolves inside the snapshot. The
/// first violation is returned; nothing is built on failure.
///
/// Edges are deduplicated per unordered pair, so A→B and B→A yield a single
/// edge. Self-connections are ignored.
pub fn build_graph(nodes: Vec<NetworkNode>) -> Result<Graph, ConstructionError> {
    let mut index = HashMap::with_capacity(nodes.len());

    for (idx, node) in nodes.iter().enumerate() {
        if !node.position.is_finite() {
            return Err(ConstructionError::NonFinitePosition {
                id: node.id.clone(),
                position: node.position.to_array(),
            });
        }
        if index.insert(node.id.clone(), idx).is_some() {
            return Err(ConstructionError::DuplicateId(node.id.clone()));
        }
    }

    let mut edges = Vec::new();
    let mut seen: HashSet<(usize, usize)> = HashSet::new();

    for (from_idx, node) in nodes.iter().enumerate() {
        for target in &node.connections {
            let Some(&to_idx) = index.get(target) else {
                return Err(ConstructionError::DanglingConnection {
                    from: node.id.clone(),
                    to: target.clone(),
                });
            };
            if to_idx == from_idx {
                continue;
            }

            // Order endpoints by id so the pair is canonical
            let (a, b) = if nodes[from_idx].id <= nodes[to_idx].id {
                (from_idx, to_idx)
            } else {
                (to_idx, from_idx)
            };
            if seen.insert((a, b)) {
                edges.push(Edge { a, b });
            }
        }
    }

    tracing::debug!(
        nodes = nodes.len(),
        edges = edges.len(),
        "Built network graph"
    );

    Ok(Graph {
        nodes,
        index,
        edges,
    })
}
