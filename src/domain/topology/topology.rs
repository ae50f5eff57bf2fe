use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};
use std::fmt;

use crate::domain::utils::id::Urn;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum VertexType {
    Switch,
    Router,
    Port,
    /// A logical stand-in created by the service-layer abstraction.
    Virtual,
    /// A device whose role is neither switch nor router.
    Device,
}

impl VertexType {
    pub fn is_device(&self) -> bool {
        matches!(self, VertexType::Switch | VertexType::Router | VertexType::Device)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Layer {
    /// Union of all physical layers.
    Physical,
    Ethernet,
    /// Device to port adjacencies inside a single device.
    Internal,
    Mpls,
    /// Derived service-layer abstraction with logical links.
    Service,
}

/// A topology element. Two vertices are equal when URN and type are equal.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Vertex {
    pub urn: Urn,
    pub vertex_type: VertexType,
}

impl Vertex {
    pub fn new(urn: impl Into<String>, vertex_type: VertexType) -> Self {
        Self { urn: Urn::new(urn), vertex_type }
    }

    pub fn port(urn: impl Into<String>) -> Self {
        Self::new(urn, VertexType::Port)
    }

    /// The virtual counterpart of `vertex`, sharing its URN so that per-URN records still apply.
    pub fn virtual_of(vertex: &Vertex) -> Self {
        Self { urn: vertex.urn.clone(), vertex_type: VertexType::Virtual }
    }

    pub fn is(&self, vertex_type: VertexType) -> bool {
        self.vertex_type == vertex_type
    }
}

impl fmt::Display for Vertex {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.urn)
    }
}

/// A directed adjacency `a -> z` with its named metrics.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Edge {
    pub a: Vertex,
    pub z: Vertex,
    pub layer: Layer,
    #[serde(default)]
    pub metrics: BTreeMap<String, i64>,
}

impl Edge {
    pub fn new(a: Vertex, z: Vertex, layer: Layer) -> Self {
        Self { a, z, layer, metrics: BTreeMap::new() }
    }

    pub fn with_metric(mut self, name: impl Into<String>, value: i64) -> Self {
        self.metrics.insert(name.into(), value);
        self
    }

    /// True if `other` connects the same vertices in the opposite direction.
    pub fn is_reverse_of(&self, other: &Edge) -> bool {
        self.a == other.z && self.z == other.a
    }

    pub fn touches(&self, vertex: &Vertex) -> bool {
        &self.a == vertex || &self.z == vertex
    }
}

impl fmt::Display for Edge {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.a, self.z)
    }
}

/// Vertices and directed edges of one layer.
///
/// Edges keep their insertion order; every search over a topology is therefore deterministic.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Topology {
    pub layer: Layer,
    pub vertices: BTreeSet<Vertex>,
    pub edges: Vec<Edge>,
}

impl Topology {
    pub fn new(layer: Layer) -> Self {
        Self { layer, vertices: BTreeSet::new(), edges: Vec::new() }
    }

    /// Builds a topology from edges, deriving the vertex set from the edge endpoints.
    pub fn from_edges(layer: Layer, edges: Vec<Edge>) -> Self {
        let vertices = edges.iter().flat_map(|e| [e.a.clone(), e.z.clone()]).collect();
        Self { layer, vertices, edges }
    }

    pub fn add_vertex(&mut self, vertex: Vertex) {
        self.vertices.insert(vertex);
    }

    /// Adds `edge` and both of its endpoints.
    pub fn add_edge(&mut self, edge: Edge) {
        self.vertices.insert(edge.a.clone());
        self.vertices.insert(edge.z.clone());
        self.edges.push(edge);
    }

    /// Adds `a -> z` and `z -> a` with the same metrics.
    pub fn add_bidirectional(&mut self, edge: Edge) {
        let reverse = Edge { a: edge.z.clone(), z: edge.a.clone(), layer: edge.layer, metrics: edge.metrics.clone() };
        self.add_edge(edge);
        self.add_edge(reverse);
    }

    /// Merges several topologies into one tagged with `layer`.
    pub fn union<'a>(layer: Layer, parts: impl IntoIterator<Item = &'a Topology>) -> Self {
        let mut merged = Topology::new(layer);
        for part in parts {
            merged.vertices.extend(part.vertices.iter().cloned());
            merged.edges.extend(part.edges.iter().cloned());
        }
        merged
    }

    /// First edge whose endpoints are exactly those of `edge` reversed.
    pub fn reverse_of(&self, edge: &Edge) -> Option<&Edge> {
        self.edges.iter().find(|candidate| candidate.is_reverse_of(edge))
    }

    pub fn contains_vertex(&self, vertex: &Vertex) -> bool {
        self.vertices.contains(vertex)
    }

    pub fn edge_between(&self, a: &Vertex, z: &Vertex) -> Option<&Edge> {
        self.edges.iter().find(|e| &e.a == a && &e.z == z)
    }
}
