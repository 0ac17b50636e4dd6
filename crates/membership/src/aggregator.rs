//! Membership aggregation and change detection over a cluster relation

use std::fmt::Debug;
use std::sync::Arc;

use cluster_relation::{ConfigPublisher, RemoteFactSource, StateSink};
use serde::Serialize;
use tokio::sync::Mutex;
use tracing::{debug, info, warn};

use crate::config::MembershipConfig;
use crate::error::{Error, Result};
use crate::node::{FactMap, NODE_KEYS, NodeRecord, decode_facts};
use crate::partition::PartitionTable;

/// Where the relation stands after a reconciliation pass.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum MembershipState {
    /// Some peer has no address yet, or there are no peers at all.
    Unready,

    /// Every peer is ready and the node list matches the previous pass.
    ReadyUnchanged,

    /// Every peer is ready and the node list differs from the previous pass.
    ReadyChanged,
}

/// Result of a single [`MembershipAggregator::update`] call.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct ReconcileOutcome {
    /// State reached by this pass
    pub state: MembershipState,

    /// Level of the availability flag after this pass
    pub available: bool,

    /// Whether this pass flipped the availability flag
    pub availability_changed: bool,

    /// Whether this pass raised the changed flag
    pub content_changed: bool,
}

impl ReconcileOutcome {
    const fn unready(availability_changed: bool) -> Self {
        Self {
            state: MembershipState::Unready,
            available: false,
            availability_changed,
            content_changed: false,
        }
    }
}

#[derive(Debug, Default)]
struct ReconcileState {
    /// Node list stored by the last pass that ran change detection
    snapshot: Option<Vec<NodeRecord>>,

    /// Availability level as last signalled
    available: bool,

    /// The changed flag is raised and must be cleared when the cycle ends
    pulse_pending: bool,
}

/// Aggregates the facts published by remote units into a node list and partition table,
/// and signals availability and changes to a [`StateSink`].
#[derive(Clone)]
pub struct MembershipAggregator<R, S>
where
    R: RemoteFactSource,
    S: StateSink,
{
    source: R,
    sink: S,
    config: MembershipConfig,
    /// Held for the whole of `update` so passes never interleave
    state: Arc<Mutex<ReconcileState>>,
}

impl<R, S> MembershipAggregator<R, S>
where
    R: RemoteFactSource,
    S: StateSink,
{
    /// Create a new aggregator with default configuration
    pub fn new(source: R, sink: S) -> Self {
        Self::with_config(source, sink, MembershipConfig::default())
    }

    /// Create a new aggregator with custom configuration
    pub fn with_config(source: R, sink: S, config: MembershipConfig) -> Self {
        info!(
            "Creating membership aggregator for relation {}",
            config.relation_name
        );

        Self {
            source,
            sink,
            config,
            state: Arc::new(Mutex::new(ReconcileState::default())),
        }
    }

    /// Get the configuration
    pub const fn config(&self) -> &MembershipConfig {
        &self.config
    }

    /// Get the fact source
    pub const fn source(&self) -> &R {
        &self.source
    }

    /// Get the state sink
    pub const fn sink(&self) -> &S {
        &self.sink
    }

    /// Whether every remote unit has published an address.
    ///
    /// With no remote units this is vacuously true; [`Self::get_nodes`] is then empty.
    pub async fn is_ready(&self) -> Result<bool, R::Error> {
        let nodes = self.fetch_nodes().await?;

        Ok(nodes.iter().all(NodeRecord::has_address))
    }

    /// One record per remote unit, in discovery order.
    pub async fn get_nodes(&self) -> Result<Vec<NodeRecord>, R::Error> {
        self.fetch_nodes().await
    }

    /// Partition table of the current node list.
    pub async fn get_partitions(&self) -> Result<PartitionTable, R::Error> {
        let nodes = self.get_nodes().await?;

        Ok(PartitionTable::from_nodes(&nodes))
    }

    /// Reconcile the state flags with the current relation data.
    ///
    /// The relation is read once per pass, and readiness is judged on that same node list.
    /// A changed flag left over from the previous cycle is cleared first. Then the
    /// availability flag is lowered and the pass returns early when some unit has no
    /// address. Otherwise it is raised (if there is at least one unit) and the node list is
    /// compared with the one stored by the previous pass; on a difference the list is
    /// stored and the changed flag is raised until [`Self::end_cycle`] or the next call to
    /// `update`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Transport`] if the relation fails. No flag is touched in that case.
    pub async fn update(&self) -> Result<ReconcileOutcome, R::Error> {
        let mut state = self.state.lock().await;

        let nodes = self.fetch_nodes().await?;

        self.decay_pulse(&mut state).await;

        if !nodes.iter().all(NodeRecord::has_address) {
            debug!("Relation {} not ready", self.config.relation_name);
            let availability_changed = self.lower_availability(&mut state).await;
            return Ok(ReconcileOutcome::unready(availability_changed));
        }

        if nodes.is_empty() {
            debug!("Relation {} has no remote units", self.config.relation_name);
            let availability_changed = self.lower_availability(&mut state).await;
            return Ok(ReconcileOutcome::unready(availability_changed));
        }

        self.sink.set_state(&self.config.available_state()).await;
        let availability_changed = !state.available;
        if availability_changed {
            info!(
                "Relation {} available with {} nodes",
                self.config.relation_name,
                nodes.len()
            );
        }
        state.available = true;

        let content_changed = state.snapshot.as_ref() != Some(&nodes);
        if content_changed {
            info!(
                "Relation {} membership changed: {} nodes",
                self.config.relation_name,
                nodes.len()
            );
            self.sink.set_state(&self.config.changed_state()).await;
            state.pulse_pending = true;
            state.snapshot = Some(nodes);
        } else {
            debug!("Relation {} membership unchanged", self.config.relation_name);
        }

        Ok(ReconcileOutcome {
            state: if content_changed {
                MembershipState::ReadyChanged
            } else {
                MembershipState::ReadyUnchanged
            },
            available: true,
            availability_changed,
            content_changed,
        })
    }

    /// Close the current reconciliation cycle, clearing the changed flag if it was raised.
    pub async fn end_cycle(&self) {
        let mut state = self.state.lock().await;
        self.decay_pulse(&mut state).await;
    }

    /// Node list stored by the last pass that detected a change.
    pub async fn snapshot(&self) -> Option<Vec<NodeRecord>> {
        self.state.lock().await.snapshot.clone()
    }

    async fn decay_pulse(&self, state: &mut ReconcileState) {
        if state.pulse_pending {
            self.sink.remove_state(&self.config.changed_state()).await;
            state.pulse_pending = false;
            debug!("Cleared {}", self.config.changed_state());
        }
    }

    /// Returns whether the flag was previously raised.
    async fn lower_availability(&self, state: &mut ReconcileState) -> bool {
        self.sink.remove_state(&self.config.available_state()).await;

        let was_available = state.available;
        state.available = false;
        if was_available {
            info!("Relation {} no longer available", self.config.relation_name);
        }

        was_available
    }

    /// Read every remote unit once and build its record.
    async fn fetch_nodes(&self) -> Result<Vec<NodeRecord>, R::Error> {
        let facts = self.get_remote_all(&NODE_KEYS).await?;

        let nodes: Vec<NodeRecord> = facts.iter().map(NodeRecord::from_facts).collect();
        for node in nodes.iter().filter(|node| node.hostname.is_empty()) {
            warn!("Node at {:?} has not published a hostname", node.address);
        }

        Ok(nodes)
    }

    /// Fetch and decode `keys` from every remote unit, in discovery order.
    async fn get_remote_all(&self, keys: &[&str]) -> Result<Vec<FactMap>, R::Error> {
        let peers = self.source.list_peers().await.map_err(Error::Transport)?;

        let mut values = Vec::with_capacity(peers.len());
        for peer in &peers {
            let mut raw = Vec::with_capacity(keys.len());
            for key in keys {
                let value = self
                    .source
                    .get_fact(peer, key)
                    .await
                    .map_err(Error::Transport)?;
                raw.push((*key, value));
            }

            values.push(decode_facts(
                raw.iter().map(|(key, value)| (*key, value.as_deref())),
            ));
        }

        debug!("Fetched {:?} from {} remote units", keys, values.len());

        Ok(values)
    }
}

impl<R, S> MembershipAggregator<R, S>
where
    R: RemoteFactSource + ConfigPublisher,
    S: StateSink,
{
    /// Publish `config` as JSON to every related unit.
    ///
    /// # Errors
    ///
    /// Returns an error if the config cannot be serialized or the relation rejects it.
    pub async fn send_config<C>(
        &self,
        config: &C,
    ) -> Result<(), <R as ConfigPublisher>::Error>
    where
        C: Serialize + Sync + ?Sized,
    {
        let payload = serde_json::to_string(config)?;

        ConfigPublisher::set_remote(&self.source, &self.config.config_key, payload)
            .await
            .map_err(Error::Transport)?;

        debug!(
            "Published {} on relation {}",
            self.config.config_key, self.config.relation_name
        );

        Ok(())
    }
}

impl<R, S> Debug for MembershipAggregator<R, S>
where
    R: RemoteFactSource,
    S: StateSink,
{
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MembershipAggregator")
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}
