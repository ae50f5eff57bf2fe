use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use crate::domain::utils::id::Urn;

/// Inclusive integer range, e.g. a block of VLAN ids.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct IntRange {
    pub floor: i32,
    pub ceiling: i32,
}

impl IntRange {
    pub fn new(floor: i32, ceiling: i32) -> Self {
        Self { floor, ceiling }
    }

    pub fn contains(&self, value: i32) -> bool {
        self.floor <= value && value <= self.ceiling
    }
}

/// Bandwidth still available for new reservations on a URN, in Mbps.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReservableBandwidth {
    pub urn: Urn,
    pub ingress_bw: i64,
    pub egress_bw: i64,
}

/// VLAN ids still available for new reservations on a URN.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReservableVlan {
    pub urn: Urn,
    pub vlan_ranges: Vec<IntRange>,
}

impl ReservableVlan {
    pub fn contains(&self, vlan: i32) -> bool {
        self.vlan_ranges.iter().any(|range| range.contains(vlan))
    }
}

/// Lookup of reservable bandwidth and VLANs, supplied by the reservation bookkeeping.
///
/// A missing record means the URN is outside the managed domain and is not constrained.
pub trait ReservableLookup {
    fn bandwidth(&self, urn: &Urn) -> Option<&ReservableBandwidth>;

    fn vlans(&self, urn: &Urn) -> Option<&ReservableVlan>;
}

/// In-memory reservable bandwidth and VLAN tables.
#[derive(Debug, Clone, Default)]
pub struct ResourceTables {
    bandwidths: HashMap<Urn, ReservableBandwidth>,
    vlans: HashMap<Urn, ReservableVlan>,
}

impl ResourceTables {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_records(bandwidths: Vec<ReservableBandwidth>, vlans: Vec<ReservableVlan>) -> Self {
        let mut tables = Self::new();
        for bandwidth in bandwidths {
            tables.add_bandwidth(bandwidth);
        }
        for vlan in vlans {
            tables.add_vlans(vlan);
        }
        tables
    }

    /// Records bandwidth for a URN, replacing an earlier record.
    pub fn add_bandwidth(&mut self, record: ReservableBandwidth) {
        if self.bandwidths.contains_key(&record.urn) {
            log::warn!("DuplicateBandwidthRecord: replacing reservable bandwidth of {}", record.urn);
        }
        self.bandwidths.insert(record.urn.clone(), record);
    }

    pub fn set_bandwidth(&mut self, urn: impl Into<String>, ingress_bw: i64, egress_bw: i64) {
        self.add_bandwidth(ReservableBandwidth { urn: Urn::new(urn), ingress_bw, egress_bw });
    }

    /// Records VLAN ranges for a URN, replacing an earlier record.
    pub fn add_vlans(&mut self, record: ReservableVlan) {
        if self.vlans.contains_key(&record.urn) {
            log::warn!("DuplicateVlanRecord: replacing reservable VLANs of {}", record.urn);
        }
        self.vlans.insert(record.urn.clone(), record);
    }

    pub fn set_vlans(&mut self, urn: impl Into<String>, vlan_ranges: Vec<IntRange>) {
        self.add_vlans(ReservableVlan { urn: Urn::new(urn), vlan_ranges });
    }
}

impl ReservableLookup for ResourceTables {
    fn bandwidth(&self, urn: &Urn) -> Option<&ReservableBandwidth> {
        self.bandwidths.get(urn)
    }

    fn vlans(&self, urn: &Urn) -> Option<&ReservableVlan> {
        self.vlans.get(urn)
    }
}
