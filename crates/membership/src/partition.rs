//! Partition table derived from a node list.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use crate::node::NodeRecord;

/// Hosts of one partition.
#[derive(Clone, Debug, Default, Eq, PartialEq, Serialize, Deserialize)]
pub struct Partition {
    /// Hostnames in discovery order. Duplicates are kept.
    pub hosts: Vec<String>,

    /// Default flag of the last node processed for this partition.
    pub default: bool,
}

/// Partitions keyed by name, in order of first appearance.
#[derive(Clone, Debug, Default, Eq, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PartitionTable {
    partitions: IndexMap<String, Partition>,
}

impl PartitionTable {
    /// Group nodes by partition.
    ///
    /// Each node appends its hostname to its partition and overwrites the partition's
    /// default flag, so the last node seen for a partition decides the flag.
    pub fn from_nodes<'a, I>(nodes: I) -> Self
    where
        I: IntoIterator<Item = &'a NodeRecord>,
    {
        let mut partitions: IndexMap<String, Partition> = IndexMap::new();

        for node in nodes {
            let partition = partitions.entry(node.partition.clone()).or_default();
            partition.hosts.push(node.hostname.clone());
            partition.default = node.is_default;
        }

        Self { partitions }
    }

    /// Look up a partition by name.
    pub fn get(&self, name: &str) -> Option<&Partition> {
        self.partitions.get(name)
    }

    /// The first partition flagged as default.
    pub fn default_partition(&self) -> Option<(&str, &Partition)> {
        self.partitions
            .iter()
            .find(|(_, partition)| partition.default)
            .map(|(name, partition)| (name.as_str(), partition))
    }

    /// Iterate over partitions in order of first appearance.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &Partition)> {
        self.partitions
            .iter()
            .map(|(name, partition)| (name.as_str(), partition))
    }

    /// Number of partitions.
    pub fn len(&self) -> usize {
        self.partitions.len()
    }

    /// Whether there are no partitions.
    pub fn is_empty(&self) -> bool {
        self.partitions.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn node(hostname: &str, partition: &str, is_default: bool) -> NodeRecord {
        NodeRecord {
            hostname: hostname.to_string(),
            address: format!("10.0.0.{}", hostname.len()),
            partition: partition.to_string(),
            is_default,
        }
    }

    #[test]
    fn test_last_default_wins() {
        let nodes = vec![node("n1", "p1", true), node("n2", "p1", false)];
        let table = PartitionTable::from_nodes(&nodes);

        assert_eq!(table.len(), 1);
        assert_eq!(
            table.get("p1"),
            Some(&Partition {
                hosts: vec!["n1".to_string(), "n2".to_string()],
                default: false,
            })
        );
        assert_eq!(table.default_partition(), None);
    }

    #[test]
    fn test_groups_in_discovery_order() {
        let nodes = vec![
            node("n1", "batch", false),
            node("n2", "gpu", true),
            node("n3", "batch", true),
            node("n3", "batch", true),
        ];
        let table = PartitionTable::from_nodes(&nodes);

        let names: Vec<_> = table.iter().map(|(name, _)| name).collect();
        assert_eq!(names, vec!["batch", "gpu"]);
        assert_eq!(table.get("batch").unwrap().hosts, vec!["n1", "n3", "n3"]);
        assert!(table.get("batch").unwrap().default);

        let (name, partition) = table.default_partition().unwrap();
        assert_eq!(name, "batch");
        assert_eq!(partition.hosts.len(), 3);
    }

    #[test]
    fn test_missing_partition_groups_under_empty_name() {
        let nodes = vec![node("n1", "", false)];
        let table = PartitionTable::from_nodes(&nodes);

        assert_eq!(table.get("").unwrap().hosts, vec!["n1"]);
    }

    #[test]
    fn test_empty() {
        let table = PartitionTable::from_nodes(&Vec::<NodeRecord>::new());
        assert!(table.is_empty());
        assert_eq!(table, PartitionTable::default());
    }

    #[test]
    fn test_serializes_as_map() {
        let nodes = vec![node("node1", "partition1", true), node("node4", "partition2", false)];
        let table = PartitionTable::from_nodes(&nodes);

        assert_eq!(
            serde_json::to_value(&table).unwrap(),
            serde_json::json!({
                "partition1": { "hosts": ["node1"], "default": true },
                "partition2": { "hosts": ["node4"], "default": false },
            })
        );
    }
}
