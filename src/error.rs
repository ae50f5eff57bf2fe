use thiserror::Error;

use crate::domain::utils::id::Urn;

#[derive(Debug, Error)]
pub enum Error {
    #[error("File not found or could not be read: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Failed to parse JSON: {0}")]
    DeserializationError(#[from] serde_json::Error),

    #[error("Path computation failed: {0}")]
    Pce(#[from] PceError),
}

/// Failures of a single path computation.
///
/// Pruning and all-paths enumeration never produce an error; absent records and empty
/// enumerations are regular outcomes.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum PceError {
    #[error("NoPathFound: no path between {src} and {dst}")]
    NoPathFound { src: Urn, dst: Urn },

    #[error("InsufficientDisjointPaths: expected 2 link-disjoint paths, found {found}")]
    InsufficientDisjointPaths { found: usize },

    #[error("UnsupportedSurvivabilityMode: {0}")]
    UnsupportedSurvivabilityMode(String),

    #[error("MismatchedMirror: forward route has {forward} hops, reverse route has {reverse}")]
    MismatchedMirror { forward: usize, reverse: usize },

    #[error("InvalidRequest: {0}")]
    InvalidRequest(String),

    #[error("InvalidVlanExpression: '{0}'")]
    InvalidVlanExpression(String),
}

pub type Result<T> = std::result::Result<T, Error>;

pub type PceResult<T> = std::result::Result<T, PceError>;
