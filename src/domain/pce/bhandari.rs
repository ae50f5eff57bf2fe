use slotmap::SecondaryMap;
use std::collections::{HashMap, HashSet, VecDeque};

use crate::domain::pce::dijkstra::{DijkstraPce, GraphPath};
use crate::domain::pce::graph::{ArcId, ArcRef, NodeId, PceGraph, WeightedMultigraph, metric_cost};
use crate::domain::topology::topology::{Edge, Topology, Vertex};

/// The graph after the first path has been found: each arc of that path is traversable
/// only backwards, at the negated cost.
struct ResidualGraph<'g> {
    base: &'g PceGraph,
    reversed: HashSet<ArcId>,
}

impl WeightedMultigraph for ResidualGraph<'_> {
    fn node_ids(&self) -> impl Iterator<Item = NodeId> + '_ {
        self.base.node_ids()
    }

    fn out_arcs(&self, node: NodeId) -> impl Iterator<Item = ArcRef> + '_ {
        let forward = self.base.out_arcs(node).filter(move |arc| !self.reversed.contains(&arc.id));

        let backward = self.base.incoming(node).iter().filter(move |id| self.reversed.contains(*id)).filter_map(move |id| {
            self.base.arc(*id).map(|arc| ArcRef { id: *id, source: node, target: arc.source, weight: -arc.weight })
        });

        forward.chain(backward)
    }
}

/// Link-disjoint path pairs (Bhandari's variant of Suurballe's algorithm).
pub struct BhandariPce;

impl BhandariPce {
    /// Computes up to two link-disjoint `src -> dst` paths of minimum total cost.
    ///
    /// Returns no path if `dst` is unreachable and a single path if no disjoint second path
    /// exists. When two paths are returned they share no arc.
    pub fn disjoint_pair(graph: &PceGraph, src: NodeId, dst: NodeId) -> Vec<Vec<ArcId>> {
        let Some(first) = DijkstraPce::search(graph, src, dst) else {
            return Vec::new();
        };

        if first.arcs.is_empty() {
            return vec![Vec::new()];
        }

        let residual = ResidualGraph { base: graph, reversed: first.arcs.iter().map(|arc| arc.id).collect() };

        let Some(second) = Self::bellman_ford(&residual, src, dst) else {
            log::debug!("DisjointPathNotFound: only one path between the given nodes");
            return vec![first.arc_ids()];
        };

        // A backwards use of a first-path arc cancels that arc in both paths.
        let mut cancelled: HashSet<ArcId> = HashSet::new();
        let mut second_forward: Vec<ArcId> = Vec::new();
        for arc in &second.arcs {
            if residual.reversed.contains(&arc.id) {
                cancelled.insert(arc.id);
            } else {
                second_forward.push(arc.id);
            }
        }

        let mut outgoing: HashMap<NodeId, VecDeque<ArcId>> = HashMap::new();
        let remaining = first.arcs.iter().map(|arc| arc.id).filter(|id| !cancelled.contains(id)).chain(second_forward);
        for id in remaining {
            if let Some(arc) = graph.arc(id) {
                outgoing.entry(arc.source).or_default().push_back(id);
            }
        }

        let limit = graph.arc_count();
        let primary = Self::walk(graph, src, dst, &mut outgoing, limit);
        let secondary = Self::walk(graph, src, dst, &mut outgoing, limit);

        match (primary, secondary) {
            (Some(primary), Some(secondary)) => vec![primary, secondary],
            _ => {
                log::error!("DisjointPathReconstructionFailed: residual arcs do not decompose into two paths, keeping the first path only.");
                vec![first.arc_ids()]
            }
        }
    }

    /// Shortest path allowing negative arcs, as found in the residual graph.
    fn bellman_ford<G: WeightedMultigraph>(graph: &G, src: NodeId, dst: NodeId) -> Option<GraphPath> {
        let nodes: Vec<NodeId> = graph.node_ids().collect();
        let mut dist: SecondaryMap<NodeId, f64> = SecondaryMap::new();
        let mut prev: SecondaryMap<NodeId, ArcRef> = SecondaryMap::new();
        dist.insert(src, 0.0);

        let mut converged = false;
        for _ in 0..nodes.len() {
            let mut changed = false;

            for &node in &nodes {
                let Some(&cost) = dist.get(node) else { continue };

                for arc in graph.out_arcs(node) {
                    let next_cost = cost + arc.weight;
                    if next_cost < dist.get(arc.target).copied().unwrap_or(f64::INFINITY) {
                        dist.insert(arc.target, next_cost);
                        prev.insert(arc.target, arc);
                        changed = true;
                    }
                }
            }

            if !changed {
                converged = true;
                break;
            }
        }

        if !converged {
            log::error!("NegativeCycleDetected: residual graph contains a negative cycle, no second path.");
            return None;
        }

        let cost = *dist.get(dst)?;
        let mut arcs = Vec::new();
        let mut current = dst;
        while current != src {
            let arc = prev.get(current)?;
            arcs.push(*arc);
            current = arc.source;

            if arcs.len() > nodes.len() {
                return None;
            }
        }
        arcs.reverse();

        Some(GraphPath { start: src, arcs, cost })
    }

    /// Follows unused arcs from `src` until `dst`, consuming them, then cuts out any loop.
    fn walk(graph: &PceGraph, src: NodeId, dst: NodeId, outgoing: &mut HashMap<NodeId, VecDeque<ArcId>>, limit: usize) -> Option<Vec<ArcId>> {
        let mut walk = Vec::new();
        let mut current = src;

        while current != dst {
            let id = outgoing.get_mut(&current)?.pop_front()?;
            walk.push(id);
            current = graph.arc(id)?.target;

            if walk.len() > limit {
                return None;
            }
        }

        Some(Self::strip_cycles(graph, src, walk))
    }

    fn strip_cycles(graph: &PceGraph, src: NodeId, walk: Vec<ArcId>) -> Vec<ArcId> {
        // node -> number of kept arcs when the node was reached
        let mut reached: HashMap<NodeId, usize> = HashMap::from([(src, 0)]);
        let mut kept: Vec<ArcId> = Vec::with_capacity(walk.len());

        for id in walk {
            let Some(arc) = graph.arc(id) else { continue };
            kept.push(id);

            if let Some(&count) = reached.get(&arc.target) {
                kept.truncate(count);
                reached.retain(|_, reached_at| *reached_at <= count);
            } else {
                reached.insert(arc.target, kept.len());
            }
        }

        kept
    }

    /// Disjoint path pair between two topology vertices, costed by metric.
    ///
    /// The result holds 0, 1 or 2 edge lists; callers must treat fewer than two as
    /// insufficient diversity.
    pub fn compute_path_pair(topology: &Topology, src: &Vertex, dst: &Vertex) -> Vec<Vec<Edge>> {
        let graph = PceGraph::build(&topology.edges, metric_cost);

        let (Some(src_node), Some(dst_node)) = (graph.node_of(src), graph.node_of(dst)) else {
            log::debug!("NoPathFound: {} or {} is not part of the topology", src, dst);
            return Vec::new();
        };

        let pair: Vec<Vec<Edge>> = Self::disjoint_pair(&graph, src_node, dst_node).iter().map(|arcs| graph.edges_of(arcs)).collect();
        log::debug!("Disjoint paths {} => {}: {} found", src, dst, pair.len());

        pair
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::topology::topology::{Layer, VertexType};

    fn v(urn: &str) -> Vertex {
        Vertex::new(urn, VertexType::Router)
    }

    fn e(a: &str, z: &str, metric: i64) -> Edge {
        Edge::new(v(a), v(z), Layer::Mpls).with_metric("te", metric)
    }

    fn shares_edge(left: &[Edge], right: &[Edge]) -> bool {
        left.iter().any(|edge| right.contains(edge))
    }

    #[test]
    fn test_trap_topology_needs_cancellation() {
        // The shortest path s-a-b-t blocks every other path if its edges were simply removed.
        let edges = vec![e("s", "a", 1), e("a", "b", 1), e("b", "t", 1), e("s", "b", 3), e("a", "t", 3)];
        let topology = Topology::from_edges(Layer::Mpls, edges);

        let pair = BhandariPce::compute_path_pair(&topology, &v("s"), &v("t"));

        assert_eq!(pair.len(), 2);
        assert_eq!(pair[0], vec![e("s", "a", 1), e("a", "t", 3)]);
        assert_eq!(pair[1], vec![e("s", "b", 3), e("b", "t", 1)]);
        assert!(!shares_edge(&pair[0], &pair[1]));
        assert!(!pair.iter().flatten().any(|edge| edge == &e("a", "b", 1)));
    }

    #[test]
    fn test_single_path_returns_one() {
        let topology = Topology::from_edges(Layer::Mpls, vec![e("s", "a", 1), e("a", "t", 1)]);
        let pair = BhandariPce::compute_path_pair(&topology, &v("s"), &v("t"));
        assert_eq!(pair.len(), 1);
        assert_eq!(pair[0].len(), 2);
    }

    #[test]
    fn test_unreachable_returns_none() {
        let topology = Topology::from_edges(Layer::Mpls, vec![e("s", "a", 1), e("t", "a", 1)]);
        assert!(BhandariPce::compute_path_pair(&topology, &v("s"), &v("t")).is_empty());
        assert!(BhandariPce::compute_path_pair(&topology, &v("s"), &v("missing")).is_empty());
    }

    #[test]
    fn test_parallel_links_are_disjoint() {
        let topology = Topology::from_edges(Layer::Mpls, vec![e("s", "t", 1), e("s", "t", 4)]);
        let pair = BhandariPce::compute_path_pair(&topology, &v("s"), &v("t"));

        assert_eq!(pair.len(), 2);
        assert_eq!(pair[0], vec![e("s", "t", 1)]);
        assert_eq!(pair[1], vec![e("s", "t", 4)]);
    }

    #[test]
    fn test_shared_bridge_gives_one_path() {
        // Two ways into m, but a single bridge m -> t.
        let edges = vec![e("s", "a", 1), e("a", "m", 1), e("s", "b", 1), e("b", "m", 1), e("m", "t", 1)];
        let topology = Topology::from_edges(Layer::Mpls, edges);

        assert_eq!(BhandariPce::compute_path_pair(&topology, &v("s"), &v("t")).len(), 1);
    }
}
