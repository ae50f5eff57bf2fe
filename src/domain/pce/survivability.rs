use serde::Serialize;
use std::collections::BTreeMap;

use crate::domain::pce::bhandari::BhandariPce;
use crate::domain::pce::dijkstra::DijkstraPce;
use crate::domain::pce::pruning::PruningService;
use crate::domain::pce::service_layer::ServiceLayerTopology;
use crate::domain::request::route_request::{RouteRequest, SurvivabilityType};
use crate::domain::topology::resources::ReservableLookup;
use crate::domain::topology::snapshot::TopologyProvider;
use crate::domain::topology::topology::{Edge, Topology};
use crate::error::{PceError, PceResult};

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum EroRole {
    ForwardPrimary,
    ReversePrimary,
    ForwardSecondary,
    ReverseSecondary,
}

/// Primary and secondary routes in both directions, or nothing.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(transparent)]
pub struct SurvivableEros {
    routes: BTreeMap<EroRole, Vec<Edge>>,
}

impl SurvivableEros {
    pub fn new(forward_primary: Vec<Edge>, reverse_primary: Vec<Edge>, forward_secondary: Vec<Edge>, reverse_secondary: Vec<Edge>) -> Self {
        let routes = BTreeMap::from([
            (EroRole::ForwardPrimary, forward_primary),
            (EroRole::ReversePrimary, reverse_primary),
            (EroRole::ForwardSecondary, forward_secondary),
            (EroRole::ReverseSecondary, reverse_secondary),
        ]);
        Self { routes }
    }

    pub fn is_empty(&self) -> bool {
        self.routes.is_empty()
    }

    pub fn get(&self, role: EroRole) -> Option<&[Edge]> {
        self.routes.get(&role).map(Vec::as_slice)
    }
}

/// Mirror of `forward`: for every edge the first edge of `topology` with exactly reversed
/// endpoints, in reverse order. Edges without a reverse twin are skipped, so a shorter result
/// means the route has no mirror.
pub fn palindromic_reverse(forward: &[Edge], topology: &Topology) -> Vec<Edge> {
    forward.iter().rev().filter_map(|edge| topology.reverse_of(edge)).cloned().collect()
}

fn format_route(route: &[Edge]) -> String {
    let hops: Vec<String> = route.iter().map(Edge::to_string).collect();
    format!("[{}]", hops.join(", "))
}

/// Link-disjoint primary and secondary routes for survivable circuits.
pub struct SurvivabilityPce<'a> {
    topology: &'a dyn TopologyProvider,
    pruning: PruningService<'a>,
}

impl<'a> SurvivabilityPce<'a> {
    pub fn new(topology: &'a dyn TopologyProvider, resources: &'a dyn ReservableLookup) -> Self {
        Self { topology, pruning: PruningService::new(resources) }
    }

    /// Computes primary and secondary routes in both directions for a TOTAL or PARTIAL request.
    pub fn compute_survivable_ero(&self, request: &RouteRequest) -> PceResult<SurvivableEros> {
        match request.survivability {
            SurvivabilityType::Total => self.compute_total(request),
            SurvivabilityType::Partial => self.compute_partial(request),
            SurvivabilityType::None => Err(PceError::UnsupportedSurvivabilityMode(request.survivability.to_string())),
        }
    }

    /// Physical link disjointness end to end.
    fn compute_total(&self, request: &RouteRequest) -> PceResult<SurvivableEros> {
        let src_device = request.a.device_vertex();
        let dst_device = request.z.device_vertex();
        let src_port = request.a.port_vertex()?;
        let dst_port = request.z.port_vertex()?;

        let multilayer = self.topology.multilayer_topology();
        let enter = multilayer.edge_between(&src_port, &src_device).cloned();
        let leave = multilayer.edge_between(&dst_device, &dst_port).cloned();

        let pruned = self.pruning.prune_for_request(&multilayer, request)?;

        let pair = BhandariPce::compute_path_pair(&pruned, &src_device, &dst_device);
        let (mut forward_primary, mut forward_secondary) = match <[Vec<Edge>; 2]>::try_from(pair) {
            Ok([primary, secondary]) => (primary, secondary),
            Err(pair) => {
                log::warn!("InsufficientDisjointPaths: {} => {} for request {}: {} found", src_device, dst_device, request.id, pair.len());
                return Err(PceError::InsufficientDisjointPaths { found: pair.len() });
            }
        };

        for route in [&mut forward_primary, &mut forward_secondary] {
            if let Some(enter) = &enter {
                route.insert(0, enter.clone());
            }
            if let Some(leave) = &leave {
                route.push(leave.clone());
            }
        }

        let reverse_primary = Self::mirror(&forward_primary, &pruned)?;
        let reverse_secondary = Self::mirror(&forward_secondary, &pruned)?;

        Self::log_routes(&forward_primary, &reverse_primary, &forward_secondary, &reverse_secondary);
        Ok(SurvivableEros::new(forward_primary, reverse_primary, forward_secondary, reverse_secondary))
    }

    /// Disjointness inside the routed core only, computed on the service layer.
    fn compute_partial(&self, request: &RouteRequest) -> PceResult<SurvivableEros> {
        let service = ServiceLayerTopology::build(self.topology, &self.pruning, request)?;

        let pruned_service = self.pruning.prune_for_request(service.topology(), request)?;
        let pruned_physical = self.pruning.prune_for_request(&self.topology.multilayer_topology(), request)?;

        let src = service.service_endpoint(&request.a)?;
        let dst = service.service_endpoint(&request.z)?;

        let forward = DijkstraPce::compute_shortest_path_edges(&pruned_service, &src, &dst)?;
        if forward.is_empty() {
            return Err(PceError::NoPathFound { src: src.urn, dst: dst.urn });
        }

        let reverse = palindromic_reverse(&forward, &pruned_service);
        if reverse.len() != forward.len() {
            log::warn!("MismatchedMirror: service-layer route {} has no complete reverse route", format_route(&forward));
            return Ok(SurvivableEros::default());
        }

        let forward_primary = service.actual_primary_ero(&forward);
        let forward_secondary = service.actual_secondary_ero(&forward);
        let reverse_primary = palindromic_reverse(&forward_primary, &pruned_physical);
        let reverse_secondary = palindromic_reverse(&forward_secondary, &pruned_physical);

        if reverse_primary.len() != forward_primary.len() || reverse_secondary.len() != forward_secondary.len() {
            log::warn!("MismatchedMirror: physical routes of {} have no complete reverse route", format_route(&forward));
            return Ok(SurvivableEros::default());
        }

        Self::log_routes(&forward_primary, &reverse_primary, &forward_secondary, &reverse_secondary);
        Ok(SurvivableEros::new(forward_primary, reverse_primary, forward_secondary, reverse_secondary))
    }

    fn mirror(forward: &[Edge], topology: &Topology) -> PceResult<Vec<Edge>> {
        let reverse = palindromic_reverse(forward, topology);
        if reverse.len() != forward.len() {
            log::warn!("MismatchedMirror: {} has no complete reverse route", format_route(forward));
            return Err(PceError::MismatchedMirror { forward: forward.len(), reverse: reverse.len() });
        }
        Ok(reverse)
    }

    fn log_routes(forward_primary: &[Edge], reverse_primary: &[Edge], forward_secondary: &[Edge], reverse_secondary: &[Edge]) {
        log::info!("AZ Primary: {}", format_route(forward_primary));
        log::info!("ZA Primary: {}", format_route(reverse_primary));
        log::info!("AZ Secondary: {}", format_route(forward_secondary));
        log::info!("ZA Secondary: {}", format_route(reverse_secondary));
    }
}
