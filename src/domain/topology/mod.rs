pub mod resources;
pub mod snapshot;
pub mod topology;
