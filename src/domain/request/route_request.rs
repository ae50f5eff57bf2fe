use chrono::{DateTime, Duration, Utc};
use std::collections::BTreeSet;
use std::fmt;
use std::str::FromStr;

use crate::domain::request::vlan_expression::parse_vlan_expression;
use crate::domain::topology::topology::{Vertex, VertexType};
use crate::domain::utils::id::{RequestId, Urn};
use crate::error::{PceError, PceResult};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SurvivabilityType {
    None,
    /// Disjointness inside the shared transport layer only.
    Partial,
    /// Full physical link disjointness.
    Total,
}

impl FromStr for SurvivabilityType {
    type Err = PceError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "NONE" | "SURVIVABILITY_NONE" => Ok(SurvivabilityType::None),
            "PARTIAL" | "SURVIVABILITY_PARTIAL" => Ok(SurvivabilityType::Partial),
            "TOTAL" | "SURVIVABILITY_TOTAL" => Ok(SurvivabilityType::Total),
            _ => Err(PceError::UnsupportedSurvivabilityMode(s.to_string())),
        }
    }
}

impl fmt::Display for SurvivabilityType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            SurvivabilityType::None => "NONE",
            SurvivabilityType::Partial => "PARTIAL",
            SurvivabilityType::Total => "TOTAL",
        };
        write!(f, "{}", name)
    }
}

/// A port of a junction together with the VLANs requested on it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Fixture {
    pub port: Urn,
    pub vlan_expression: String,
}

impl Fixture {
    pub fn new(port: impl Into<String>, vlan_expression: impl Into<String>) -> Self {
        Self { port: Urn::new(port), vlan_expression: vlan_expression.into() }
    }

    pub fn port_vertex(&self) -> Vertex {
        Vertex { urn: self.port.clone(), vertex_type: VertexType::Port }
    }
}

/// One end of a requested pipe.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Junction {
    pub device: Urn,
    pub device_type: VertexType,
    pub fixtures: Vec<Fixture>,
}

impl Junction {
    pub fn new(device: impl Into<String>, device_type: VertexType, fixtures: Vec<Fixture>) -> Self {
        Self { device: Urn::new(device), device_type, fixtures }
    }

    pub fn device_vertex(&self) -> Vertex {
        Vertex { urn: self.device.clone(), vertex_type: self.device_type }
    }

    /// The port the circuit enters or leaves through; the first fixture.
    pub fn port_vertex(&self) -> PceResult<Vertex> {
        self.fixtures
            .first()
            .map(Fixture::port_vertex)
            .ok_or_else(|| PceError::InvalidRequest(format!("junction {} has no fixture", self.device)))
    }

    pub fn requested_vlans(&self) -> PceResult<BTreeSet<i32>> {
        let mut vlans = BTreeSet::new();
        for fixture in &self.fixtures {
            vlans.extend(parse_vlan_expression(&fixture.vlan_expression)?);
        }
        Ok(vlans)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ValidityInterval {
    pub begin: DateTime<Utc>,
    pub end: DateTime<Utc>,
}

impl ValidityInterval {
    pub fn new(begin: DateTime<Utc>, end: DateTime<Utc>) -> Self {
        Self { begin, end }
    }

    /// An interval starting now and lasting `duration`.
    pub fn starting_now(duration: Duration) -> Self {
        let begin = Utc::now();
        Self { begin, end: begin + duration }
    }
}

/// A request for a guaranteed-bandwidth path between two junctions.
#[derive(Debug, Clone, PartialEq)]
pub struct RouteRequest {
    pub id: RequestId,
    pub a: Junction,
    pub z: Junction,
    /// Demand in the A to Z direction, in Mbps.
    pub az_mbps: i64,
    /// Demand in the Z to A direction, in Mbps.
    pub za_mbps: i64,
    pub survivability: SurvivabilityType,
    pub schedule: ValidityInterval,
}

impl RouteRequest {
    /// Creates a request with a freshly generated id.
    pub fn new(a: Junction, z: Junction, az_mbps: i64, za_mbps: i64, survivability: SurvivabilityType, schedule: ValidityInterval) -> Self {
        let id = RequestId::new(uuid::Uuid::new_v4().to_string());
        Self { id, a, z, az_mbps, za_mbps, survivability, schedule }
    }

    /// Rejects requests no path computation can serve.
    pub fn validate(&self) -> PceResult<()> {
        if self.schedule.begin >= self.schedule.end {
            return Err(PceError::InvalidRequest(format!(
                "request {}: validity begins at {} but ends at {}",
                self.id, self.schedule.begin, self.schedule.end
            )));
        }

        if self.az_mbps < 0 || self.za_mbps < 0 {
            return Err(PceError::InvalidRequest(format!("request {}: negative bandwidth {}/{}", self.id, self.az_mbps, self.za_mbps)));
        }

        self.a.port_vertex()?;
        self.z.port_vertex()?;
        self.requested_vlans()?;

        Ok(())
    }

    /// Union of the VLAN ids requested on both junctions.
    pub fn requested_vlans(&self) -> PceResult<BTreeSet<i32>> {
        let mut vlans = self.a.requested_vlans()?;
        vlans.extend(self.z.requested_vlans()?);
        Ok(vlans)
    }
}
