//! Abstract interface for exchanging facts with the remote units of a cluster relation.
#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![warn(clippy::nursery)]

use std::error::Error;
use std::fmt::{self, Debug, Display};

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

/// Identifies one remote unit within one relation instance.
#[derive(Clone, Debug, Eq, Hash, PartialEq, Serialize, Deserialize)]
pub struct PeerId {
    /// The relation instance the unit was seen on (e.g. `slurm-cluster:3`).
    pub relation_id: String,

    /// The remote unit name (e.g. `slurmd/0`).
    pub unit: String,
}

impl PeerId {
    /// Create a new peer id.
    pub fn new(relation_id: impl Into<String>, unit: impl Into<String>) -> Self {
        Self {
            relation_id: relation_id.into(),
            unit: unit.into(),
        }
    }
}

impl Display for PeerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}@{}", self.unit, self.relation_id)
    }
}

/// The kind of relation error.
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum RelationErrorKind {
    /// The requested peer is not part of the relation
    PeerNotFound,

    /// The exchange channel is unreachable or returned malformed data
    Transport,

    /// Other/unknown error
    Other,
}

impl Display for RelationErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{self:?}")
    }
}

/// Marker trait for relation errors
pub trait RelationError: Debug + Error + Send + Sync + 'static {
    /// Returns the kind of this error
    fn kind(&self) -> RelationErrorKind;
}

/// Supplies the raw key/value facts published by remote units.
///
/// Values are wire strings; decoding them is left to the consumer.
#[async_trait]
pub trait RemoteFactSource
where
    Self: Send + Sync + Clone + 'static,
{
    /// The error type for this source.
    type Error: RelationError;

    /// List every remote unit, in discovery order.
    async fn list_peers(&self) -> Result<Vec<PeerId>, Self::Error>;

    /// Get a single fact published by a remote unit.
    ///
    /// Returns `Ok(None)` if the unit has not published the key.
    async fn get_fact(&self, peer: &PeerId, key: &str) -> Result<Option<String>, Self::Error>;
}

/// Publishes local facts to every related remote unit.
#[async_trait]
pub trait ConfigPublisher
where
    Self: Send + Sync + Clone + 'static,
{
    /// The error type for this publisher.
    type Error: RelationError;

    /// Set a key on the local side of the relation. Delivery is up to the transport.
    async fn set_remote(&self, key: &str, value: String) -> Result<(), Self::Error>;
}

/// Receives named state flags consumed by downstream orchestration.
#[async_trait]
pub trait StateSink
where
    Self: Send + Sync + Clone + 'static,
{
    /// Raise a state flag. Raising an already raised flag is a no-op.
    async fn set_state(&self, state: &str);

    /// Clear a state flag. Clearing an unset flag is a no-op.
    async fn remove_state(&self, state: &str);

    /// Check whether a state flag is currently raised.
    async fn is_state(&self, state: &str) -> bool;
}
