use std::collections::HashSet;
use std::time::Instant;

use crate::domain::pce::dijkstra::{DijkstraPce, GraphPath};
use crate::domain::pce::graph::{ArcRef, NodeId, PceGraph, WeightedMultigraph, hop_cost, metric_cost};
use crate::domain::pce::pce_path::{PcePath, PceResponse};
use crate::domain::request::route_request::RouteRequest;
use crate::domain::topology::resources::ReservableLookup;
use crate::domain::topology::topology::Topology;
use crate::error::{PceError, PceResult};

/// Tie-break between two routes: `a` if strictly preferred, `b` otherwise.
pub fn preferred<'p>(a: &'p PcePath, b: &'p PcePath) -> &'p PcePath {
    if a.preferred_over(b) { a } else { b }
}

/// Calls `visit` with every simple directed `src -> dst` path of at most `max_links` arcs and
/// returns how many paths were visited.
///
/// Partial paths are never extended past `max_links`, so the work stays bounded even on dense
/// graphs.
pub fn enumerate_paths<G, F>(graph: &G, src: NodeId, dst: NodeId, max_links: usize, visit: F) -> usize
where
    G: WeightedMultigraph,
    F: FnMut(&[ArcRef]),
{
    let mut enumeration = Enumeration { graph, dst, max_links, on_path: HashSet::from([src]), path: Vec::new(), visit, found: 0 };
    enumeration.extend(src);
    enumeration.found
}

struct Enumeration<'g, G, F> {
    graph: &'g G,
    dst: NodeId,
    max_links: usize,
    on_path: HashSet<NodeId>,
    path: Vec<ArcRef>,
    visit: F,
    found: usize,
}

impl<G, F> Enumeration<'_, G, F>
where
    G: WeightedMultigraph,
    F: FnMut(&[ArcRef]),
{
    fn extend(&mut self, node: NodeId) {
        if node == self.dst {
            (self.visit)(self.path.as_slice());
            self.found += 1;
            return;
        }

        if self.path.len() >= self.max_links {
            return;
        }

        let graph = self.graph;
        for arc in graph.out_arcs(node) {
            if !self.on_path.insert(arc.target) {
                continue;
            }

            self.path.push(arc);
            self.extend(arc.target);
            self.path.pop();
            self.on_path.remove(&arc.target);
        }
    }
}

/// Running winners while candidates stream in.
struct Selection {
    az_mbps: i64,
    za_mbps: i64,
    widest_az: Option<PcePath>,
    widest_za: Option<PcePath>,
    widest_sum: Option<PcePath>,
    fits: Option<PcePath>,
}

impl Selection {
    fn new(az_mbps: i64, za_mbps: i64) -> Self {
        Self { az_mbps, za_mbps, widest_az: None, widest_za: None, widest_sum: None, fits: None }
    }

    fn offer(&mut self, candidate: PcePath) {
        if candidate.fits(self.az_mbps, self.za_mbps) {
            let replace = match &self.fits {
                None => true,
                Some(current) => !current.preferred_over(&candidate),
            };
            if replace {
                self.fits = Some(candidate.clone());
            }
        }

        Self::keep_widest(&mut self.widest_az, &candidate, |path| path.az_available);
        Self::keep_widest(&mut self.widest_za, &candidate, |path| path.za_available);
        Self::keep_widest(&mut self.widest_sum, &candidate, PcePath::bandwidth_sum);
    }

    fn keep_widest(slot: &mut Option<PcePath>, candidate: &PcePath, width: fn(&PcePath) -> i64) {
        let replace = match slot {
            None => true,
            Some(current) => {
                let (current_width, candidate_width) = (width(current), width(candidate));
                candidate_width > current_width || (candidate_width == current_width && !current.preferred_over(candidate))
            }
        };

        if replace {
            *slot = Some(candidate.clone());
        }
    }
}

/// Multi-objective route selection over every path within a hop bound.
pub struct AllPathsPce<'a> {
    resources: &'a dyn ReservableLookup,
    hop_margin: usize,
}

impl<'a> AllPathsPce<'a> {
    pub fn new(resources: &'a dyn ReservableLookup, hop_margin: usize) -> Self {
        Self { resources, hop_margin }
    }

    /// Computes the shortest and least-hop routes between the request's devices, then scans all
    /// simple paths up to `hop_margin` links longer than the shortest one for the widest and
    /// the fitting routes.
    pub fn calculate_paths(&self, topology: &Topology, request: &RouteRequest) -> PceResult<PceResponse> {
        let src = request.a.device_vertex();
        let dst = request.z.device_vertex();

        let by_metric = PceGraph::build(&topology.edges, metric_cost);
        let by_hops = PceGraph::build(&topology.edges, hop_cost);

        let shortest_path = DijkstraPce::shortest_path(&by_metric, &src, &dst)?;
        let least_hops_path = DijkstraPce::shortest_path(&by_hops, &src, &dst)?;

        let shortest = self.to_pce_path(&by_metric, &shortest_path);
        let least_hops = self.to_pce_path(&by_hops, &least_hops_path);

        let (Some(src_node), Some(dst_node)) = (by_metric.node_of(&src), by_metric.node_of(&dst)) else {
            return Err(PceError::NoPathFound { src: src.urn.clone(), dst: dst.urn.clone() });
        };

        let max_links = shortest_path.hop_count() + self.hop_margin;
        let mut selection = Selection::new(request.az_mbps, request.za_mbps);

        let started = Instant::now();
        let evaluated = enumerate_paths(&by_metric, src_node, dst_node, max_links, |arcs| {
            let ids: Vec<_> = arcs.iter().map(|arc| arc.id).collect();
            let cost: f64 = arcs.iter().map(|arc| arc.weight).sum();
            selection.offer(PcePath::from_edges(&by_metric.edges_of(&ids), cost, self.resources));
        });
        log::info!("{} distinct paths found between {} and {} in {:?}", evaluated, src, dst, started.elapsed());

        if selection.fits.is_none() {
            log::info!("NoFittingPath: none of {} paths carries {}/{} Mbps for request {}", evaluated, request.az_mbps, request.za_mbps, request.id);
        }

        Ok(PceResponse {
            shortest,
            least_hops,
            widest_az: selection.widest_az,
            widest_za: selection.widest_za,
            widest_sum: selection.widest_sum,
            fits: selection.fits,
            evaluated,
        })
    }

    /// Route of a search result, costed by metric whatever the graph it was found in.
    fn to_pce_path(&self, graph: &PceGraph, path: &GraphPath) -> PcePath {
        let edges = graph.edges_of(&path.arc_ids());
        let cost: f64 = edges.iter().map(metric_cost).sum();
        PcePath::from_edges(&edges, cost, self.resources)
    }
}
