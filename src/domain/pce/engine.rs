use serde::Serialize;

use crate::config::PceConfig;
use crate::domain::pce::all_paths::AllPathsPce;
use crate::domain::pce::pce_path::PceResponse;
use crate::domain::pce::survivability::{SurvivabilityPce, SurvivableEros};
use crate::domain::request::route_request::{RouteRequest, SurvivabilityType};
use crate::domain::topology::resources::ReservableLookup;
use crate::domain::topology::snapshot::TopologyProvider;
use crate::error::PceResult;

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum PceOutcome {
    /// Candidate routes of a request without survivability.
    Paths(PceResponse),
    Survivable(SurvivableEros),
}

/// Entry point of a path computation: one call per request against the current snapshot.
pub struct Pce<'a> {
    topology: &'a dyn TopologyProvider,
    resources: &'a dyn ReservableLookup,
    config: PceConfig,
}

impl<'a> Pce<'a> {
    pub fn new(topology: &'a dyn TopologyProvider, resources: &'a dyn ReservableLookup, config: PceConfig) -> Self {
        Self { topology, resources, config }
    }

    /// Validates `request` and routes it by its survivability type.
    pub fn compute(&self, request: &RouteRequest) -> PceResult<PceOutcome> {
        request.validate()?;

        log::info!(
            "PceRequest: {} {} => {}, {}/{} Mbps, survivability {}",
            request.id,
            request.a.device,
            request.z.device,
            request.az_mbps,
            request.za_mbps,
            request.survivability
        );

        let outcome = match request.survivability {
            SurvivabilityType::None => {
                let all_paths = AllPathsPce::new(self.resources, self.config.hop_margin);
                all_paths.calculate_paths(&self.topology.multilayer_topology(), request).map(PceOutcome::Paths)
            }
            SurvivabilityType::Partial | SurvivabilityType::Total => {
                SurvivabilityPce::new(self.topology, self.resources).compute_survivable_ero(request).map(PceOutcome::Survivable)
            }
        };

        outcome.inspect_err(|e| log::warn!("PceFailed: request {}: {}", request.id, e))
    }
}
