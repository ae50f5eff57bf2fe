use slotmap::{SecondaryMap, SlotMap, new_key_type};
use std::collections::HashMap;

use crate::domain::topology::topology::{Edge, Vertex};

new_key_type! {
    pub struct NodeId;
    pub struct ArcId;
}

/// One traversable arc as seen by a search: `source -> target` at `weight`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ArcRef {
    pub id: ArcId,
    pub source: NodeId,
    pub target: NodeId,
    pub weight: f64,
}

/// Directed weighted multigraph with adjacency iteration.
///
/// Searches only ever see the graph through this trait, which lets the disjoint path
/// engine run the same searches over its residual view.
pub trait WeightedMultigraph {
    fn node_ids(&self) -> impl Iterator<Item = NodeId> + '_;

    fn out_arcs(&self, node: NodeId) -> impl Iterator<Item = ArcRef> + '_;
}

/// An arc of the built graph together with the topology edge it was built from.
#[derive(Debug, Clone)]
pub struct GraphArc {
    pub source: NodeId,
    pub target: NodeId,
    pub weight: f64,
    pub edge: Edge,
}

/// Cost of a single hop, for least-hop objectives.
pub fn hop_cost(_edge: &Edge) -> f64 {
    1.0
}

/// Cost of an edge by its dominant metric: the maximum of its metric values, never below 0.
pub fn metric_cost(edge: &Edge) -> f64 {
    edge.metrics.values().fold(0.0, |cost, &metric| if metric as f64 > cost { metric as f64 } else { cost })
}

/// Arena backed multigraph built from an edge list and a cost function.
#[derive(Debug, Clone, Default)]
pub struct PceGraph {
    nodes: SlotMap<NodeId, Vertex>,
    arcs: SlotMap<ArcId, GraphArc>,
    outgoing: SecondaryMap<NodeId, Vec<ArcId>>,
    incoming: SecondaryMap<NodeId, Vec<ArcId>>,
    index: HashMap<Vertex, NodeId>,
}

impl PceGraph {
    /// Builds the graph over the vertices implied by `edges`, weighting every edge with `cost`.
    ///
    /// Parallel edges stay distinct arcs. Costs that are negative or not a number are clamped
    /// to 0, so the result is always valid input for Dijkstra.
    pub fn build<F>(edges: &[Edge], cost: F) -> Self
    where
        F: Fn(&Edge) -> f64,
    {
        let mut graph = PceGraph::default();

        for edge in edges {
            let source = graph.add_node(&edge.a);
            let target = graph.add_node(&edge.z);

            let mut weight = cost(edge);
            if weight.is_nan() || weight < 0.0 {
                log::warn!("InvalidEdgeCost: edge {} has cost {}, using 0 instead.", edge, weight);
                weight = 0.0;
            }

            let arc_id = graph.arcs.insert(GraphArc { source, target, weight, edge: edge.clone() });
            if let Some(out) = graph.outgoing.get_mut(source) {
                out.push(arc_id);
            }
            if let Some(inc) = graph.incoming.get_mut(target) {
                inc.push(arc_id);
            }
        }

        log::debug!("PceGraph built: {} nodes, {} arcs", graph.nodes.len(), graph.arcs.len());
        graph
    }

    fn add_node(&mut self, vertex: &Vertex) -> NodeId {
        if let Some(node) = self.index.get(vertex) {
            return *node;
        }

        let node = self.nodes.insert(vertex.clone());
        self.outgoing.insert(node, Vec::new());
        self.incoming.insert(node, Vec::new());
        self.index.insert(vertex.clone(), node);
        node
    }

    pub fn node_of(&self, vertex: &Vertex) -> Option<NodeId> {
        self.index.get(vertex).copied()
    }

    pub fn vertex(&self, node: NodeId) -> Option<&Vertex> {
        self.nodes.get(node)
    }

    pub fn arc(&self, arc: ArcId) -> Option<&GraphArc> {
        self.arcs.get(arc)
    }

    pub fn incoming(&self, node: NodeId) -> &[ArcId] {
        self.incoming.get(node).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn outgoing(&self, node: NodeId) -> &[ArcId] {
        self.outgoing.get(node).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Topology edges of an arc sequence, in order.
    pub fn edges_of(&self, arcs: &[ArcId]) -> Vec<Edge> {
        arcs.iter().filter_map(|arc| self.arcs.get(*arc)).map(|arc| arc.edge.clone()).collect()
    }

    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    pub fn arc_count(&self) -> usize {
        self.arcs.len()
    }
}

impl WeightedMultigraph for PceGraph {
    fn node_ids(&self) -> impl Iterator<Item = NodeId> + '_ {
        self.nodes.keys()
    }

    fn out_arcs(&self, node: NodeId) -> impl Iterator<Item = ArcRef> + '_ {
        self.outgoing(node).iter().filter_map(move |id| {
            self.arcs.get(*id).map(|arc| ArcRef { id: *id, source: arc.source, target: arc.target, weight: arc.weight })
        })
    }
}
