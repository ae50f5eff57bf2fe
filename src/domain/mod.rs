pub mod pce;
pub mod request;
pub mod topology;
pub mod utils;
