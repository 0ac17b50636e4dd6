//! Error types for the in-memory relation implementation.

use cluster_relation::{RelationError, RelationErrorKind};
use thiserror::Error;

/// Error type for the in-memory relation implementation.
#[derive(Debug, Error)]
pub enum Error {
    /// Error when a peer is not part of the relation.
    #[error("Peer not found: {0}")]
    PeerNotFound(String),

    /// Returned while the relation is marked unreachable.
    #[error("Relation unreachable: {0}")]
    Unreachable(String),

    /// Error when loading or parsing the relation file.
    #[error("Relation file error: {0}")]
    RelationFile(String),
}

impl RelationError for Error {
    fn kind(&self) -> RelationErrorKind {
        match self {
            Self::PeerNotFound(_) => RelationErrorKind::PeerNotFound,
            Self::Unreachable(_) => RelationErrorKind::Transport,
            Self::RelationFile(_) => RelationErrorKind::Other,
        }
    }
}
