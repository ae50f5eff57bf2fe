use circuit_pce::config::PceConfig;
use circuit_pce::domain::request::route_request::{Fixture, Junction, RouteRequest, SurvivabilityType, ValidityInterval};
use circuit_pce::domain::topology::resources::ResourceTables;
use circuit_pce::domain::topology::snapshot::TopologySnapshot;
use circuit_pce::domain::topology::topology::{Edge, Layer, Vertex, VertexType};
use circuit_pce::{Pce, PceError};

use chrono::Duration;
use log::Level;

fn router(urn: &str) -> Vertex {
    Vertex::new(urn, VertexType::Router)
}

fn request(z: &str, survivability: SurvivabilityType) -> RouteRequest {
    let a = Junction::new("A", VertexType::Router, vec![Fixture::new("A:1", "")]);
    let z = Junction::new(z, VertexType::Router, vec![Fixture::new(format!("{}:1", z), "")]);
    RouteRequest::new(a, z, 10, 10, survivability, ValidityInterval::starting_now(Duration::hours(1)))
}

// logtest installs a process-wide logger, so every log assertion lives in this one test.
#[test]
fn test_engine_log_records() {
    let mut logger = logtest::Logger::start();

    let mut snapshot = TopologySnapshot::new();
    snapshot.add_bidirectional(Edge::new(router("A"), router("B"), Layer::Mpls).with_metric("te", 1));
    snapshot.add_bidirectional(Edge::new(router("B"), router("Z"), Layer::Mpls).with_metric("te", 1));
    let resources = ResourceTables::new();
    let pce = Pce::new(&snapshot, &resources, PceConfig::default());

    pce.compute(&request("Z", SurvivabilityType::None)).unwrap();
    let records: Vec<_> = logger.by_ref().collect();
    assert!(records.iter().any(|record| record.level() == Level::Info && record.args().starts_with("PceRequest:")));
    assert!(records.iter().any(|record| record.args().contains("1 distinct paths found between A and Z")));

    let result = pce.compute(&request("Z", SurvivabilityType::Total));
    assert_eq!(result, Err(PceError::InsufficientDisjointPaths { found: 1 }));
    let records: Vec<_> = logger.by_ref().collect();
    assert!(records.iter().any(|record| record.level() == Level::Warn && record.args().starts_with("InsufficientDisjointPaths:")));
    assert!(records.iter().any(|record| record.level() == Level::Warn && record.args().starts_with("PceFailed:")));
}
