use circuit_pce::domain::pce::pruning::PruningService;
use circuit_pce::domain::request::route_request::{Fixture, Junction, RouteRequest, SurvivabilityType, ValidityInterval};
use circuit_pce::domain::topology::resources::{IntRange, ReservableLookup, ResourceTables};
use circuit_pce::domain::topology::topology::{Edge, Layer, Topology, Vertex, VertexType};

use chrono::Duration;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::collections::BTreeSet;

const PORTS: usize = 12;

fn port(i: usize) -> Vertex {
    Vertex::port(format!("port-{:02}", i))
}

/// A random port mesh where about half of the ports carry bandwidth and VLAN records.
fn random_network(rng: &mut StdRng) -> (Topology, ResourceTables) {
    let mut topology = Topology::new(Layer::Ethernet);
    for i in 0..PORTS {
        topology.add_vertex(port(i));
    }
    for _ in 0..40 {
        let a = rng.random_range(0..PORTS);
        let z = rng.random_range(0..PORTS);
        if a != z {
            topology.add_edge(Edge::new(port(a), port(z), Layer::Ethernet).with_metric("latency", rng.random_range(1..50)));
        }
    }

    let mut resources = ResourceTables::new();
    for i in 0..PORTS {
        let urn = port(i).urn.to_string();
        if rng.random_bool(0.5) {
            resources.set_bandwidth(urn.clone(), rng.random_range(0..1000), rng.random_range(0..1000));
        }
        if rng.random_bool(0.5) {
            let floor = rng.random_range(1..3000);
            resources.set_vlans(urn, vec![IntRange::new(floor, floor + rng.random_range(0..1000))]);
        }
    }

    (topology, resources)
}

fn endpoint_accepts(resources: &ResourceTables, vertex: &Vertex, sends: i64, receives: i64, vlans: &BTreeSet<i32>) -> bool {
    let bandwidth_ok = resources.bandwidth(&vertex.urn).is_none_or(|bw| bw.egress_bw >= sends && bw.ingress_bw >= receives);
    let vlans_ok = resources.vlans(&vertex.urn).is_none_or(|record| vlans.iter().all(|vlan| record.contains(*vlan)));
    bandwidth_ok && vlans_ok
}

#[test]
fn test_pruning_property_on_random_networks() {
    for seed in 0..25 {
        let mut rng = StdRng::seed_from_u64(seed);
        let (topology, resources) = random_network(&mut rng);

        let az = rng.random_range(0..1000);
        let za = rng.random_range(0..1000);
        let vlans: BTreeSet<i32> = (0..rng.random_range(0..3)).map(|_| rng.random_range(1..4000)).collect();

        let pruned = PruningService::new(&resources).prune_topology(&topology, az, za, &vlans);

        let expected: Vec<Edge> = topology
            .edges
            .iter()
            .filter(|edge| endpoint_accepts(&resources, &edge.a, az, za, &vlans) && endpoint_accepts(&resources, &edge.z, za, az, &vlans))
            .cloned()
            .collect();

        assert_eq!(pruned.edges, expected, "seed {}", seed);
        assert_eq!(pruned.vertices, topology.vertices, "seed {}: vertices must be kept", seed);
        assert_eq!(pruned.layer, topology.layer);
    }
}

#[test]
fn test_pruning_never_adds_edges() {
    let mut rng = StdRng::seed_from_u64(7);
    let (topology, resources) = random_network(&mut rng);
    let pruning = PruningService::new(&resources);

    let loose = pruning.prune_topology(&topology, 0, 0, &BTreeSet::new());
    let strict = pruning.prune_topology(&topology, 500, 500, &BTreeSet::new());

    assert!(strict.edges.len() <= loose.edges.len());
    assert!(strict.edges.iter().all(|edge| loose.edges.contains(edge)));
}

#[test]
fn test_prune_for_request_uses_fixture_vlans_and_demand() -> anyhow::Result<()> {
    let mut topology = Topology::new(Layer::Ethernet);
    topology.add_bidirectional(Edge::new(Vertex::port("sw-a:1"), Vertex::port("sw-b:1"), Layer::Ethernet));
    topology.add_bidirectional(Edge::new(Vertex::port("sw-b:2"), Vertex::port("sw-c:1"), Layer::Ethernet));

    let mut resources = ResourceTables::new();
    resources.set_vlans("sw-b:1", vec![IntRange::new(100, 200)]);
    resources.set_bandwidth("sw-c:1", 1000, 1000);

    let a = Junction::new("sw-a", VertexType::Switch, vec![Fixture::new("sw-a:1", "150")]);
    let z = Junction::new("sw-c", VertexType::Switch, vec![Fixture::new("sw-c:1", "250")]);
    let request = RouteRequest::new(a, z, 2000, 10, SurvivabilityType::None, ValidityInterval::starting_now(Duration::hours(2)));

    let pruned = PruningService::new(&resources).prune_for_request(&topology, &request)?;

    // VLAN 250 is not reservable on sw-b:1, and sw-c:1 cannot take 2000 Mbps.
    assert!(pruned.edges.is_empty());

    let mut relaxed = request.clone();
    relaxed.z.fixtures = vec![Fixture::new("sw-c:1", "150")];
    relaxed.az_mbps = 10;
    let pruned = PruningService::new(&resources).prune_for_request(&topology, &relaxed)?;
    assert_eq!(pruned.edges.len(), 4);

    Ok(())
}

#[test]
fn test_prune_for_request_rejects_bad_vlan_expression() {
    let topology = Topology::new(Layer::Ethernet);
    let resources = ResourceTables::new();

    let a = Junction::new("sw-a", VertexType::Switch, vec![Fixture::new("sw-a:1", "ten")]);
    let z = Junction::new("sw-c", VertexType::Switch, vec![Fixture::new("sw-c:1", "")]);
    let request = RouteRequest::new(a, z, 0, 0, SurvivabilityType::None, ValidityInterval::starting_now(Duration::hours(1)));

    assert!(PruningService::new(&resources).prune_for_request(&topology, &request).is_err());
}
