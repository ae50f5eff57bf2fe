pub mod all_paths;
pub mod bhandari;
pub mod dijkstra;
pub mod engine;
pub mod graph;
pub mod pce_path;
pub mod pruning;
pub mod service_layer;
pub mod survivability;
