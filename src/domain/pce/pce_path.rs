use serde::Serialize;

use crate::domain::topology::resources::ReservableLookup;
use crate::domain::topology::topology::Edge;
use crate::domain::utils::id::Urn;

/// One hop of an explicit route object.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct EroHop {
    pub urn: Urn,
}

/// A candidate route with its mirrored hops, available bandwidth and cost.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PcePath {
    pub az_ero: Vec<EroHop>,
    pub za_ero: Vec<EroHop>,
    pub az_available: i64,
    pub za_available: i64,
    pub cost: f64,
}

impl PcePath {
    /// Builds the route for the edge sequence `edges`; the reverse ERO is the forward one mirrored.
    pub fn from_edges(edges: &[Edge], cost: f64, resources: &dyn ReservableLookup) -> Self {
        let az_ero: Vec<EroHop> = match edges.first() {
            Some(first) => std::iter::once(&first.a)
                .chain(edges.iter().map(|edge| &edge.z))
                .map(|vertex| EroHop { urn: vertex.urn.clone() })
                .collect(),
            None => Vec::new(),
        };
        let za_ero: Vec<EroHop> = az_ero.iter().rev().cloned().collect();

        let az_available = available_bandwidth(&az_ero, resources);
        let za_available = available_bandwidth(&za_ero, resources);

        Self { az_ero, za_ero, az_available, za_available, cost }
    }

    /// Links traversed.
    pub fn hop_count(&self) -> usize {
        self.az_ero.len().saturating_sub(1)
    }

    pub fn bandwidth_sum(&self) -> i64 {
        self.az_available.saturating_add(self.za_available)
    }

    pub fn fits(&self, az_mbps: i64, za_mbps: i64) -> bool {
        self.az_available >= az_mbps && self.za_available >= za_mbps
    }

    /// True if `self` is strictly cheaper than `other`, or equally cheap with strictly fewer hops.
    pub fn preferred_over(&self, other: &PcePath) -> bool {
        self.cost < other.cost || (self.cost == other.cost && self.hop_count() < other.hop_count())
    }
}

/// Bandwidth a route can carry in its direction of travel: every hop sends on its egress and
/// the next hop receives on its ingress. Unrecorded hops do not constrain.
pub fn available_bandwidth(ero: &[EroHop], resources: &dyn ReservableLookup) -> i64 {
    ero.windows(2).fold(i64::MAX, |available, pair| {
        let egress = resources.bandwidth(&pair[0].urn).map_or(i64::MAX, |record| record.egress_bw);
        let ingress = resources.bandwidth(&pair[1].urn).map_or(i64::MAX, |record| record.ingress_bw);
        available.min(egress).min(ingress)
    })
}

/// Winners of an all-paths computation.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PceResponse {
    pub shortest: PcePath,
    pub least_hops: PcePath,
    #[serde(rename = "widestAZ")]
    pub widest_az: Option<PcePath>,
    #[serde(rename = "widestZA")]
    pub widest_za: Option<PcePath>,
    pub widest_sum: Option<PcePath>,
    pub fits: Option<PcePath>,
    pub evaluated: usize,
}
