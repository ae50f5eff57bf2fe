use bimap::BiMap;
use std::collections::{BTreeMap, HashMap};

use crate::domain::pce::bhandari::BhandariPce;
use crate::domain::pce::dijkstra::DijkstraPce;
use crate::domain::pce::graph::{ArcId, PceGraph, metric_cost};
use crate::domain::pce::pruning::PruningService;
use crate::domain::request::route_request::{Junction, RouteRequest};
use crate::domain::topology::snapshot::TopologyProvider;
use crate::domain::topology::topology::{Edge, Layer, Topology, Vertex, VertexType};
use crate::error::{PceError, PceResult};

/// Metric carrying the transport cost of a logical link.
pub const LOGICAL_WEIGHT_METRIC: &str = "weight";

/// A service-layer link standing for two disjoint transport sub-paths.
#[derive(Debug, Clone, PartialEq)]
pub struct LogicalLink {
    pub primary: Vec<Edge>,
    pub secondary: Vec<Edge>,
    pub weight: f64,
}

/// Where a virtual node enters the transport layer.
#[derive(Debug, Clone, PartialEq)]
struct Anchor {
    owner: Vertex,
    port: Vertex,
}

#[derive(Debug, Clone, Copy)]
enum Branch {
    Primary,
    Secondary,
}

/// Switched network with the routed core folded into logical links.
///
/// Routers and their ports do not appear; every router port facing a switch is replaced by a
/// virtual node, and virtual nodes on different routers are joined by logical links whose
/// expansion is a pair of link-disjoint transport paths.
#[derive(Debug, Clone)]
pub struct ServiceLayerTopology {
    topology: Topology,
    /// physical vertex <-> virtual vertex
    virtual_nodes: BiMap<Vertex, Vertex>,
    anchors: BTreeMap<Vertex, Anchor>,
    logical_links: HashMap<Edge, LogicalLink>,
    /// adaptation edge -> physical Ethernet edge
    adaptation: HashMap<Edge, Edge>,
}

impl ServiceLayerTopology {
    /// Derives the service layer of `provider` for `request`. Logical link weights and expansions
    /// are computed on the transport layer pruned for the request.
    pub fn build(provider: &dyn TopologyProvider, pruning: &PruningService<'_>, request: &RouteRequest) -> PceResult<Self> {
        let ethernet = provider.layer(Layer::Ethernet);
        let internal = provider.layer(Layer::Internal);
        let mpls = provider.layer(Layer::Mpls);

        let owners = port_owners(&internal);
        let owned_by = |port: &Vertex, device_type: VertexType| owners.get(port).is_some_and(|owner| owner.is(device_type));
        let switch_side = |vertex: &Vertex| vertex.is(VertexType::Switch) || owned_by(vertex, VertexType::Switch);
        let router_side = |vertex: &Vertex| vertex.is(VertexType::Router) || owned_by(vertex, VertexType::Router);

        let mut service = Self {
            topology: Topology::new(Layer::Service),
            virtual_nodes: BiMap::new(),
            anchors: BTreeMap::new(),
            logical_links: HashMap::new(),
            adaptation: HashMap::new(),
        };

        // Reduced Ethernet layer
        for vertex in ethernet.vertices.iter().filter(|&vertex| switch_side(vertex)) {
            service.topology.add_vertex(vertex.clone());
        }
        for edge in ethernet.edges.iter().filter(|edge| switch_side(&edge.a) && switch_side(&edge.z)) {
            service.topology.add_edge(edge.clone());
        }

        // Reduced internal layer: switch <-> own port
        for edge in &internal.edges {
            let own_port = |device: &Vertex, port: &Vertex| device.is(VertexType::Switch) && owners.get(port) == Some(device);
            if own_port(&edge.a, &edge.z) || own_port(&edge.z, &edge.a) {
                service.topology.add_edge(edge.clone());
            }
        }

        // Adaptation between switch ports and router ports
        let router_owner = |port: &Vertex| owners.get(port).filter(|owner| owner.is(VertexType::Router)).cloned();
        for edge in &ethernet.edges {
            let (a, z) = match (router_owner(&edge.a), router_owner(&edge.z)) {
                (None, Some(owner)) if switch_side(&edge.a) => (edge.a.clone(), service.add_virtual(&edge.z, owner)),
                (Some(owner), None) if switch_side(&edge.z) => (service.add_virtual(&edge.a, owner), edge.z.clone()),
                _ => continue,
            };

            let adapted = Edge { a, z, layer: Layer::Service, metrics: edge.metrics.clone() };
            service.topology.add_edge(adapted.clone());
            service.adaptation.insert(adapted, edge.clone());
        }

        // Endpoints that are not switches are represented by a virtual node of the device
        for junction in [&request.a, &request.z] {
            let device = junction.device_vertex();
            if device.is(VertexType::Switch) {
                continue;
            }

            let port = junction.port_vertex()?;
            service.add_anchored_virtual(&device, Anchor { owner: device.clone(), port });
        }

        let transport_edges: Vec<Edge> = mpls
            .edges
            .iter()
            .chain(internal.edges.iter().filter(|edge| router_side(&edge.a) && router_side(&edge.z)))
            .cloned()
            .collect();
        let transport = pruning.prune_for_request(&Topology::from_edges(Layer::Mpls, transport_edges), request)?;
        service.add_logical_links(&transport, &internal);

        log::debug!(
            "ServiceLayerBuilt: {} vertices, {} edges, {} virtual nodes, {} logical links",
            service.topology.vertices.len(),
            service.topology.edges.len(),
            service.virtual_nodes.len(),
            service.logical_links.len()
        );

        Ok(service)
    }

    /// Virtual node of a router port, anchored on the router owning it.
    fn add_virtual(&mut self, port: &Vertex, owner: Vertex) -> Vertex {
        self.add_anchored_virtual(port, Anchor { owner, port: port.clone() })
    }

    fn add_anchored_virtual(&mut self, physical: &Vertex, anchor: Anchor) -> Vertex {
        if let Some(existing) = self.virtual_nodes.get_by_left(physical) {
            return existing.clone();
        }

        let virtual_node = Vertex::virtual_of(physical);
        self.virtual_nodes.insert(physical.clone(), virtual_node.clone());
        self.anchors.insert(virtual_node.clone(), anchor);
        self.topology.add_vertex(virtual_node.clone());
        virtual_node
    }

    fn add_logical_links(&mut self, transport: &Topology, internal: &Topology) {
        let graph = PceGraph::build(&transport.edges, metric_cost);
        let anchors: Vec<(Vertex, Anchor)> = self.anchors.iter().map(|(node, anchor)| (node.clone(), anchor.clone())).collect();

        for (from, from_anchor) in &anchors {
            for (to, to_anchor) in &anchors {
                if from_anchor.owner == to_anchor.owner {
                    continue;
                }

                let Some(link) = Self::compute_logical_link(&graph, internal, from_anchor, to_anchor) else {
                    continue;
                };

                let edge = Edge::new(from.clone(), to.clone(), Layer::Service).with_metric(LOGICAL_WEIGHT_METRIC, link.weight.round() as i64);
                self.topology.add_edge(edge.clone());
                self.logical_links.insert(edge, link);
            }
        }
    }

    fn compute_logical_link(graph: &PceGraph, internal: &Topology, from: &Anchor, to: &Anchor) -> Option<LogicalLink> {
        let weight = DijkstraPce::shortest_path(graph, &from.owner, &to.owner).ok()?.cost;

        let (Some(enter), Some(leave)) = (internal.edge_between(&from.port, &from.owner), internal.edge_between(&to.owner, &to.port)) else {
            log::warn!("MissingAttachment: no internal edge for {} on {} or {} on {}", from.port, from.owner, to.port, to.owner);
            return None;
        };

        let (src, dst) = (graph.node_of(&from.owner)?, graph.node_of(&to.owner)?);
        let pair = BhandariPce::disjoint_pair(graph, src, dst);
        if pair.len() < 2 {
            log::debug!("NoLogicalLink: {} => {} has {} disjoint transport paths", from.port, to.port, pair.len());
            return None;
        }

        let expand = |arcs: &[ArcId]| {
            let mut route = vec![enter.clone()];
            route.extend(graph.edges_of(arcs));
            route.push(leave.clone());
            route
        };

        Some(LogicalLink { primary: expand(&pair[0]), secondary: expand(&pair[1]), weight })
    }

    pub fn topology(&self) -> &Topology {
        &self.topology
    }

    pub fn virtual_node(&self, physical: &Vertex) -> Option<&Vertex> {
        self.virtual_nodes.get_by_left(physical)
    }

    pub fn physical_node(&self, virtual_node: &Vertex) -> Option<&Vertex> {
        self.virtual_nodes.get_by_right(virtual_node)
    }

    pub fn logical_link(&self, edge: &Edge) -> Option<&LogicalLink> {
        self.logical_links.get(edge)
    }

    pub fn logical_link_count(&self) -> usize {
        self.logical_links.len()
    }

    /// Service-layer vertex a junction is routed from: the fixture port of a switch, the
    /// virtual node of any other device.
    pub fn service_endpoint(&self, junction: &Junction) -> PceResult<Vertex> {
        let device = junction.device_vertex();
        if device.is(VertexType::Switch) {
            return junction.port_vertex();
        }

        self.virtual_node(&device)
            .cloned()
            .ok_or_else(|| PceError::InvalidRequest(format!("device {} has no service-layer node", device)))
    }

    /// Physical route of a service-layer route, using the primary branch of every logical link.
    pub fn actual_primary_ero(&self, service_ero: &[Edge]) -> Vec<Edge> {
        self.expand(service_ero, Branch::Primary)
    }

    /// Physical route of a service-layer route, using the secondary branch of every logical link.
    pub fn actual_secondary_ero(&self, service_ero: &[Edge]) -> Vec<Edge> {
        self.expand(service_ero, Branch::Secondary)
    }

    fn expand(&self, service_ero: &[Edge], branch: Branch) -> Vec<Edge> {
        let mut physical = Vec::new();

        for edge in service_ero {
            if let Some(link) = self.logical_links.get(edge) {
                let sub_path = match branch {
                    Branch::Primary => &link.primary,
                    Branch::Secondary => &link.secondary,
                };
                physical.extend(sub_path.iter().cloned());
            } else if let Some(original) = self.adaptation.get(edge) {
                physical.push(original.clone());
            } else {
                physical.push(edge.clone());
            }
        }

        physical
    }
}

/// Port -> owning device, read from the internal layer.
fn port_owners(internal: &Topology) -> HashMap<Vertex, Vertex> {
    let mut owners = HashMap::new();

    for edge in &internal.edges {
        if edge.a.vertex_type.is_device() && edge.z.is(VertexType::Port) {
            owners.insert(edge.z.clone(), edge.a.clone());
        } else if edge.z.vertex_type.is_device() && edge.a.is(VertexType::Port) {
            owners.insert(edge.a.clone(), edge.z.clone());
        }
    }

    owners
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::request::route_request::{Fixture, SurvivabilityType, ValidityInterval};
    use crate::domain::topology::resources::ResourceTables;
    use crate::domain::topology::snapshot::TopologySnapshot;
    use chrono::Duration;

    fn switch(urn: &str) -> Vertex {
        Vertex::new(urn, VertexType::Switch)
    }

    fn router(urn: &str) -> Vertex {
        Vertex::new(urn, VertexType::Router)
    }

    fn port(urn: &str) -> Vertex {
        Vertex::port(urn)
    }

    /// sw-a - r1 =(two disjoint cores)= r4 - sw-z
    fn snapshot() -> TopologySnapshot {
        let mut snapshot = TopologySnapshot::new();

        let devices = [
            (switch("sw-a"), vec!["sw-a:1", "sw-a:2"]),
            (switch("sw-z"), vec!["sw-z:1", "sw-z:2"]),
            (router("r1"), vec!["r1:1", "r1:2", "r1:3"]),
            (router("r2"), vec!["r2:1", "r2:2"]),
            (router("r3"), vec!["r3:1", "r3:2"]),
            (router("r4"), vec!["r4:1", "r4:2", "r4:3"]),
        ];
        for (device, ports) in devices {
            for p in ports {
                snapshot.add_bidirectional(Edge::new(device.clone(), port(p), Layer::Internal));
            }
        }

        snapshot.add_bidirectional(Edge::new(port("sw-a:2"), port("r1:1"), Layer::Ethernet));
        snapshot.add_bidirectional(Edge::new(port("r4:1"), port("sw-z:2"), Layer::Ethernet));

        snapshot.add_bidirectional(Edge::new(port("r1:2"), port("r2:1"), Layer::Mpls).with_metric("te", 10));
        snapshot.add_bidirectional(Edge::new(port("r2:2"), port("r4:2"), Layer::Mpls).with_metric("te", 10));
        snapshot.add_bidirectional(Edge::new(port("r1:3"), port("r3:1"), Layer::Mpls).with_metric("te", 20));
        snapshot.add_bidirectional(Edge::new(port("r3:2"), port("r4:3"), Layer::Mpls).with_metric("te", 20));

        snapshot
    }

    fn request() -> RouteRequest {
        let a = Junction::new("sw-a", VertexType::Switch, vec![Fixture::new("sw-a:1", "100")]);
        let z = Junction::new("sw-z", VertexType::Switch, vec![Fixture::new("sw-z:1", "100")]);
        RouteRequest::new(a, z, 10, 10, SurvivabilityType::Partial, ValidityInterval::starting_now(Duration::hours(1)))
    }

    #[test]
    fn test_service_layer_hides_routers() {
        let resources = ResourceTables::new();
        let pruning = PruningService::new(&resources);
        let service = ServiceLayerTopology::build(&snapshot(), &pruning, &request()).unwrap();

        let topology = service.topology();
        assert!(!topology.vertices.iter().any(|v| v.is(VertexType::Router)));
        assert!(!topology.contains_vertex(&port("r1:1")));
        assert!(!topology.contains_vertex(&port("r2:1")));
        assert!(topology.contains_vertex(&port("sw-a:1")));

        let virtual_r1 = service.virtual_node(&port("r1:1")).unwrap();
        assert_eq!(virtual_r1, &Vertex::new("r1:1", VertexType::Virtual));
        assert_eq!(service.physical_node(virtual_r1), Some(&port("r1:1")));
        assert!(topology.contains_vertex(virtual_r1));

        // every virtual node on an adaptation edge is registered with its physical port
        let adapted: Vec<&Vertex> = service.adaptation.keys().flat_map(|e| [&e.a, &e.z]).filter(|v| v.is(VertexType::Virtual)).collect();
        assert_eq!(adapted.len(), 4);
        for vertex in adapted {
            assert_eq!(service.physical_node(vertex).map(|p| &p.urn), Some(&vertex.urn));
        }
    }

    #[test]
    fn test_logical_links_expand_to_disjoint_transport_paths() {
        let resources = ResourceTables::new();
        let pruning = PruningService::new(&resources);
        let service = ServiceLayerTopology::build(&snapshot(), &pruning, &request()).unwrap();

        // r1:1 <-> r4:1 in both directions
        assert_eq!(service.logical_link_count(), 2);

        let virtual_r1 = Vertex::new("r1:1", VertexType::Virtual);
        let virtual_r4 = Vertex::new("r4:1", VertexType::Virtual);
        let edge = service.topology().edge_between(&virtual_r1, &virtual_r4).unwrap();
        assert_eq!(edge.metrics.get(LOGICAL_WEIGHT_METRIC), Some(&20));

        let link = service.logical_link(edge).unwrap();
        assert_eq!(link.primary.first(), Some(&Edge::new(port("r1:1"), router("r1"), Layer::Internal)));
        assert_eq!(link.primary.last(), Some(&Edge::new(router("r4"), port("r4:1"), Layer::Internal)));
        assert!(link.primary.iter().any(|e| e.touches(&router("r2"))));
        assert!(link.secondary.iter().any(|e| e.touches(&router("r3"))));

        let transport_core = |route: &[Edge]| route[1..route.len() - 1].to_vec();
        let primary = transport_core(&link.primary);
        assert!(!transport_core(&link.secondary).iter().any(|e| primary.contains(e)));
    }

    #[test]
    fn test_actual_ero_replaces_adaptation_and_logical_links() {
        let resources = ResourceTables::new();
        let pruning = PruningService::new(&resources);
        let service = ServiceLayerTopology::build(&snapshot(), &pruning, &request()).unwrap();

        let src = service.service_endpoint(&request().a).unwrap();
        let dst = service.service_endpoint(&request().z).unwrap();
        assert_eq!(src, port("sw-a:1"));

        let service_ero = DijkstraPce::compute_shortest_path_edges(service.topology(), &src, &dst).unwrap();
        let primary = service.actual_primary_ero(&service_ero);
        let secondary = service.actual_secondary_ero(&service_ero);

        assert!(primary.contains(&Edge::new(port("sw-a:2"), port("r1:1"), Layer::Ethernet)));
        assert!(!primary.iter().any(|e| e.a.is(VertexType::Virtual) || e.z.is(VertexType::Virtual)));
        assert!(primary.iter().any(|e| e.touches(&router("r2"))));
        assert!(secondary.iter().any(|e| e.touches(&router("r3"))));
        assert_eq!(primary.first().map(|e| &e.a), Some(&port("sw-a:1")));
        assert_eq!(secondary.last().map(|e| &e.z), Some(&port("sw-z:1")));
    }

    #[test]
    fn test_router_endpoint_gets_virtual_device_node() {
        let mut snapshot = snapshot();
        snapshot.add_bidirectional(Edge::new(router("r1"), port("r1:9"), Layer::Internal));

        let a = Junction::new("r1", VertexType::Router, vec![Fixture::new("r1:9", "")]);
        let z = Junction::new("sw-z", VertexType::Switch, vec![Fixture::new("sw-z:1", "")]);
        let request = RouteRequest::new(a, z, 0, 0, SurvivabilityType::Partial, ValidityInterval::starting_now(Duration::hours(1)));

        let resources = ResourceTables::new();
        let pruning = PruningService::new(&resources);
        let service = ServiceLayerTopology::build(&snapshot, &pruning, &request).unwrap();

        let src = service.service_endpoint(&request.a).unwrap();
        assert_eq!(src, Vertex::new("r1", VertexType::Virtual));

        let virtual_r4 = Vertex::new("r4:1", VertexType::Virtual);
        let edge = service.topology().edge_between(&src, &virtual_r4).unwrap();
        let link = service.logical_link(edge).unwrap();
        assert_eq!(link.primary[0], Edge::new(port("r1:9"), router("r1"), Layer::Internal));
    }
}
