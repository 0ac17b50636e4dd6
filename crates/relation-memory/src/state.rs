use std::collections::BTreeSet;
use std::sync::Arc;

use async_trait::async_trait;
use cluster_relation::StateSink;
use tokio::sync::RwLock;
use tracing::trace;

/// In-memory state flag registry.
#[derive(Clone, Debug, Default)]
pub struct MemoryStateSink {
    states: Arc<RwLock<BTreeSet<String>>>,
}

impl MemoryStateSink {
    /// Creates a new, empty `MemoryStateSink`.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// All currently raised flags, sorted by name.
    pub async fn states(&self) -> Vec<String> {
        self.states.read().await.iter().cloned().collect()
    }
}

#[async_trait]
impl StateSink for MemoryStateSink {
    async fn set_state(&self, state: &str) {
        if self.states.write().await.insert(state.to_string()) {
            trace!("state {state} raised");
        }
    }

    async fn remove_state(&self, state: &str) {
        if self.states.write().await.remove(state) {
            trace!("state {state} cleared");
        }
    }

    async fn is_state(&self, state: &str) -> bool {
        self.states.read().await.contains(state)
    }
}
