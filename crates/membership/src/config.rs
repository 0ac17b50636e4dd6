//! Aggregator configuration

use serde::{Deserialize, Serialize};

const DEFAULT_RELATION_NAME: &str = "slurm-cluster";
const DEFAULT_CONFIG_KEY: &str = "config";

/// Configuration for the membership aggregator
#[derive(Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MembershipConfig {
    /// Relation name, used as the prefix of the state flags raised by the aggregator
    pub relation_name: String,

    /// Key the local config is published under
    pub config_key: String,
}

impl MembershipConfig {
    /// Flag raised while every peer is ready and at least one peer exists.
    pub fn available_state(&self) -> String {
        format!("{}.available", self.relation_name)
    }

    /// Flag raised for one reconciliation cycle after the node list changed.
    pub fn changed_state(&self) -> String {
        format!("{}.changed", self.relation_name)
    }
}

impl Default for MembershipConfig {
    fn default() -> Self {
        Self {
            relation_name: DEFAULT_RELATION_NAME.to_string(),
            config_key: DEFAULT_CONFIG_KEY.to_string(),
        }
    }
}
