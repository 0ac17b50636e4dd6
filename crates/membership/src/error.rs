//! Error types for membership aggregation.

use cluster_relation::RelationError;
use thiserror::Error;

/// Result type for membership operations.
pub type Result<T, E> = std::result::Result<T, Error<E>>;

/// Errors raised while aggregating membership or publishing config.
#[derive(Debug, Error)]
pub enum Error<E>
where
    E: RelationError,
{
    /// The relation itself failed. Passed through as reported.
    #[error(transparent)]
    Transport(E),

    /// The config handed to `send_config` could not be serialized.
    #[error("failed to encode config: {0}")]
    ConfigEncoding(#[from] serde_json::Error),
}
