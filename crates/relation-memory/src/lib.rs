//! In-memory (single process) implementation of a cluster relation for local development.
#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![warn(clippy::nursery)]

mod config;
mod error;
mod state;

use config::Config;
pub use error::Error;
pub use state::MemoryStateSink;

use std::collections::HashMap;
use std::fs::File;
use std::io::Read;
use std::path::Path;
use std::sync::Arc;

use async_trait::async_trait;
use cluster_relation::{ConfigPublisher, PeerId, RemoteFactSource};
use indexmap::IndexMap;
use tokio::sync::RwLock;
use tracing::debug;

#[derive(Debug, Default)]
struct Inner {
    /// Remote units and their published facts, in discovery order.
    peers: IndexMap<PeerId, HashMap<String, String>>,

    /// Facts published by the local side.
    local: HashMap<String, String>,

    unreachable: bool,
}

/// In-memory relation holding remote facts and locally published values.
#[derive(Clone, Debug, Default)]
pub struct MemoryRelation {
    inner: Arc<RwLock<Inner>>,
}

impl MemoryRelation {
    /// Creates a new relation with no remote units.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a new relation from a relation file.
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - The relation file cannot be read
    /// - The relation file contains invalid JSON
    pub fn from_relation_file<P: AsRef<Path>>(relation_path: P) -> Result<Self, Error> {
        let mut file = File::open(relation_path)
            .map_err(|e| Error::RelationFile(format!("Failed to open relation file: {e}")))?;

        let mut content = String::new();
        file.read_to_string(&mut content)
            .map_err(|e| Error::RelationFile(format!("Failed to read relation file: {e}")))?;

        let config: Config = serde_json::from_str(&content)
            .map_err(|e| Error::RelationFile(format!("Failed to parse relation file: {e}")))?;

        let mut peers = IndexMap::new();
        for relation in config.relations {
            for unit in relation.units {
                let peer = PeerId::new(relation.relation_id.clone(), unit.name);
                peers.insert(peer, unit.facts.into_iter().collect());
            }
        }

        debug!("Loaded {} remote units from relation file", peers.len());

        Ok(Self {
            inner: Arc::new(RwLock::new(Inner {
                peers,
                ..Inner::default()
            })),
        })
    }

    /// Add a remote unit with its published facts. Replaces the facts of a known unit
    /// without changing its discovery position.
    pub async fn add_peer<I, K, V>(&self, peer: PeerId, facts: I)
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        let facts = facts
            .into_iter()
            .map(|(k, v)| (k.into(), v.into()))
            .collect();

        self.inner.write().await.peers.insert(peer, facts);
    }

    /// Remove a remote unit. Returns whether the unit was present.
    pub async fn remove_peer(&self, peer: &PeerId) -> bool {
        self.inner.write().await.peers.shift_remove(peer).is_some()
    }

    /// Set a single fact published by a remote unit.
    ///
    /// # Errors
    ///
    /// Returns an error if the unit is not part of the relation.
    pub async fn set_fact(
        &self,
        peer: &PeerId,
        key: impl Into<String>,
        value: impl Into<String>,
    ) -> Result<(), Error> {
        let mut inner = self.inner.write().await;
        let facts = inner
            .peers
            .get_mut(peer)
            .ok_or_else(|| Error::PeerNotFound(peer.to_string()))?;
        facts.insert(key.into(), value.into());

        Ok(())
    }

    /// Remove a single fact published by a remote unit.
    ///
    /// # Errors
    ///
    /// Returns an error if the unit is not part of the relation.
    pub async fn remove_fact(&self, peer: &PeerId, key: &str) -> Result<(), Error> {
        let mut inner = self.inner.write().await;
        let facts = inner
            .peers
            .get_mut(peer)
            .ok_or_else(|| Error::PeerNotFound(peer.to_string()))?;
        facts.remove(key);

        Ok(())
    }

    /// Simulate the exchange channel going away. While unreachable every call fails.
    pub async fn set_unreachable(&self, unreachable: bool) {
        self.inner.write().await.unreachable = unreachable;
    }

    /// A value published by the local side via [`ConfigPublisher::set_remote`].
    pub async fn local_fact(&self, key: &str) -> Option<String> {
        self.inner.read().await.local.get(key).cloned()
    }
}

#[async_trait]
impl RemoteFactSource for MemoryRelation {
    type Error = Error;

    async fn list_peers(&self) -> Result<Vec<PeerId>, Self::Error> {
        let inner = self.inner.read().await;
        if inner.unreachable {
            return Err(Error::Unreachable("list_peers".to_string()));
        }

        Ok(inner.peers.keys().cloned().collect())
    }

    async fn get_fact(&self, peer: &PeerId, key: &str) -> Result<Option<String>, Self::Error> {
        let inner = self.inner.read().await;
        if inner.unreachable {
            return Err(Error::Unreachable(format!("get_fact {key} from {peer}")));
        }

        let facts = inner
            .peers
            .get(peer)
            .ok_or_else(|| Error::PeerNotFound(peer.to_string()))?;

        Ok(facts.get(key).cloned())
    }
}

#[async_trait]
impl ConfigPublisher for MemoryRelation {
    type Error = Error;

    async fn set_remote(&self, key: &str, value: String) -> Result<(), Self::Error> {
        let mut inner = self.inner.write().await;
        if inner.unreachable {
            return Err(Error::Unreachable(format!("set_remote {key}")));
        }

        inner.local.insert(key.to_string(), value);

        Ok(())
    }
}
