use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::domain::topology::topology::{Edge, Layer, Topology};

/// Source of the per-request topology snapshot.
///
/// Implementations hand out frozen copies; the engine never writes back.
pub trait TopologyProvider {
    /// The topology of a single layer, empty if the layer is unknown.
    fn layer(&self, layer: Layer) -> Topology;

    /// Union of all physical layers.
    fn multilayer_topology(&self) -> Topology;
}

/// Per-layer topologies describing the same physical network.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TopologySnapshot {
    layers: BTreeMap<Layer, Topology>,
}

impl TopologySnapshot {
    pub fn new() -> Self {
        Self { layers: BTreeMap::new() }
    }

    /// Adds an edge to the layer named by the edge itself.
    pub fn add_edge(&mut self, edge: Edge) {
        self.layers.entry(edge.layer).or_insert_with(|| Topology::new(edge.layer)).add_edge(edge);
    }

    /// Adds an edge and its reverse twin with the same metrics.
    pub fn add_bidirectional(&mut self, edge: Edge) {
        self.layers.entry(edge.layer).or_insert_with(|| Topology::new(edge.layer)).add_bidirectional(edge);
    }

    pub fn set_layer(&mut self, topology: Topology) {
        self.layers.insert(topology.layer, topology);
    }
}

impl TopologyProvider for TopologySnapshot {
    fn layer(&self, layer: Layer) -> Topology {
        self.layers.get(&layer).cloned().unwrap_or_else(|| Topology::new(layer))
    }

    fn multilayer_topology(&self) -> Topology {
        let physical = self.layers.iter().filter(|(layer, _)| !matches!(layer, Layer::Service)).map(|(_, topology)| topology);
        Topology::union(Layer::Physical, physical)
    }
}
