use std::collections::BTreeSet;

use crate::domain::request::route_request::RouteRequest;
use crate::domain::topology::resources::ReservableLookup;
use crate::domain::topology::topology::{Edge, Topology, Vertex};
use crate::error::PceResult;

/// Removes edges that cannot carry a request's bandwidth or VLANs.
pub struct PruningService<'a> {
    resources: &'a dyn ReservableLookup,
}

impl<'a> PruningService<'a> {
    pub fn new(resources: &'a dyn ReservableLookup) -> Self {
        Self { resources }
    }

    /// Copy of `topology` keeping only the edges usable at `az_mbps`/`za_mbps` on every VLAN in
    /// `vlans`. The vertex set is kept as is.
    pub fn prune_topology(&self, topology: &Topology, az_mbps: i64, za_mbps: i64, vlans: &BTreeSet<i32>) -> Topology {
        let edges: Vec<Edge> = topology.edges.iter().filter(|edge| self.edge_fits(edge, az_mbps, za_mbps, vlans)).cloned().collect();

        log::debug!(
            "Pruned {:?} topology for {}/{} Mbps and {} VLANs: {} of {} edges kept",
            topology.layer,
            az_mbps,
            za_mbps,
            vlans.len(),
            edges.len(),
            topology.edges.len()
        );

        Topology { layer: topology.layer, vertices: topology.vertices.clone(), edges }
    }

    /// Prunes with the demand and the VLANs of all fixtures of `request`.
    pub fn prune_for_request(&self, topology: &Topology, request: &RouteRequest) -> PceResult<Topology> {
        let vlans = request.requested_vlans()?;
        Ok(self.prune_topology(topology, request.az_mbps, request.za_mbps, &vlans))
    }

    fn edge_fits(&self, edge: &Edge, az_mbps: i64, za_mbps: i64, vlans: &BTreeSet<i32>) -> bool {
        // a sends towards z, z receives from a
        let a_fits = self.bandwidth_fits(&edge.a, az_mbps, za_mbps);
        let z_fits = self.bandwidth_fits(&edge.z, za_mbps, az_mbps);

        a_fits && z_fits && self.vlans_fit(&edge.a, vlans) && self.vlans_fit(&edge.z, vlans)
    }

    fn bandwidth_fits(&self, vertex: &Vertex, egress_mbps: i64, ingress_mbps: i64) -> bool {
        match self.resources.bandwidth(&vertex.urn) {
            Some(record) => record.egress_bw >= egress_mbps && record.ingress_bw >= ingress_mbps,
            None => true,
        }
    }

    fn vlans_fit(&self, vertex: &Vertex, vlans: &BTreeSet<i32>) -> bool {
        match self.resources.vlans(&vertex.urn) {
            Some(record) => vlans.iter().all(|vlan| record.contains(*vlan)),
            None => true,
        }
    }
}
