use slotmap::SecondaryMap;
use std::cmp::Ordering;
use std::collections::BinaryHeap;

use crate::domain::pce::graph::{ArcId, ArcRef, NodeId, PceGraph, WeightedMultigraph, metric_cost};
use crate::domain::topology::topology::{Edge, Topology, Vertex};
use crate::error::{PceError, PceResult};

/// A path found by a search: the start node and the arcs walked from it.
#[derive(Debug, Clone, PartialEq)]
pub struct GraphPath {
    pub start: NodeId,
    pub arcs: Vec<ArcRef>,
    pub cost: f64,
}

impl GraphPath {
    /// Nodes visited by the path, start included.
    pub fn nodes(&self) -> Vec<NodeId> {
        std::iter::once(self.start).chain(self.arcs.iter().map(|arc| arc.target)).collect()
    }

    pub fn arc_ids(&self) -> Vec<ArcId> {
        self.arcs.iter().map(|arc| arc.id).collect()
    }

    pub fn hop_count(&self) -> usize {
        self.arcs.len()
    }
}

#[derive(Clone, Copy, PartialEq)]
struct DijkstraState {
    cost: f64,
    node: NodeId,
}

impl Eq for DijkstraState {}

impl Ord for DijkstraState {
    fn cmp(&self, other: &Self) -> Ordering {
        // Reverse ordering for min-heap
        other.cost.total_cmp(&self.cost).then_with(|| other.node.cmp(&self.node))
    }
}

impl PartialOrd for DijkstraState {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

/// Single source shortest path over non-negative arc weights.
pub struct DijkstraPce;

impl DijkstraPce {
    /// Returns the cheapest `src -> dst` path, or `None` if `dst` is unreachable.
    ///
    /// Among equally cheap paths the one whose arcs were relaxed first wins, so the result
    /// only depends on the arc order of `graph`.
    pub fn search<G: WeightedMultigraph>(graph: &G, src: NodeId, dst: NodeId) -> Option<GraphPath> {
        let mut dist: SecondaryMap<NodeId, f64> = SecondaryMap::new();
        let mut prev: SecondaryMap<NodeId, ArcRef> = SecondaryMap::new();
        let mut heap = BinaryHeap::new();

        dist.insert(src, 0.0);
        heap.push(DijkstraState { cost: 0.0, node: src });

        while let Some(DijkstraState { cost, node }) = heap.pop() {
            if node == dst {
                return Some(Self::reconstruct(src, dst, cost, &prev));
            }

            if cost > dist.get(node).copied().unwrap_or(f64::INFINITY) {
                continue;
            }

            for arc in graph.out_arcs(node) {
                let next_cost = cost + arc.weight;
                if next_cost < dist.get(arc.target).copied().unwrap_or(f64::INFINITY) {
                    dist.insert(arc.target, next_cost);
                    prev.insert(arc.target, arc);
                    heap.push(DijkstraState { cost: next_cost, node: arc.target });
                }
            }
        }

        None
    }

    fn reconstruct(src: NodeId, dst: NodeId, cost: f64, prev: &SecondaryMap<NodeId, ArcRef>) -> GraphPath {
        let mut arcs = Vec::new();
        let mut current = dst;

        while current != src {
            match prev.get(current) {
                Some(arc) => {
                    arcs.push(*arc);
                    current = arc.source;
                }
                None => break,
            }
        }
        arcs.reverse();

        GraphPath { start: src, arcs, cost }
    }

    /// Shortest path between two topology vertices of a built graph.
    ///
    /// Fails with `NoPathFound` if either vertex is not part of the graph or `dst` cannot be
    /// reached from `src`.
    pub fn shortest_path(graph: &PceGraph, src: &Vertex, dst: &Vertex) -> PceResult<GraphPath> {
        let no_path = || PceError::NoPathFound { src: src.urn.clone(), dst: dst.urn.clone() };

        let (Some(src_node), Some(dst_node)) = (graph.node_of(src), graph.node_of(dst)) else {
            log::debug!("NoPathFound: {} or {} is not part of the graph", src, dst);
            return Err(no_path());
        };

        match Self::search(graph, src_node, dst_node) {
            Some(path) => {
                log::debug!("Shortest path {} => {}: {} hops, cost {}", src, dst, path.hop_count(), path.cost);
                Ok(path)
            }
            None => {
                log::debug!("NoPathFound: {} => {}", src, dst);
                Err(no_path())
            }
        }
    }

    /// Builds a metric-weighted graph from `topology` and returns the shortest path as edges.
    pub fn compute_shortest_path_edges(topology: &Topology, src: &Vertex, dst: &Vertex) -> PceResult<Vec<Edge>> {
        let graph = PceGraph::build(&topology.edges, metric_cost);
        let path = Self::shortest_path(&graph, src, dst)?;

        Ok(graph.edges_of(&path.arc_ids()))
    }
}
