//! Cluster membership aggregation for the providing side of a cluster relation.
//!
//! This crate provides:
//! - Decoding of loosely typed facts published by remote units
//! - Node list and partition table assembly
//! - Availability and change signalling via a state sink
#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![warn(clippy::nursery)]

pub mod aggregator;
pub mod config;
pub mod error;
pub mod node;
pub mod partition;
pub mod scalar;

pub use aggregator::{MembershipAggregator, MembershipState, ReconcileOutcome};
pub use config::MembershipConfig;
pub use error::{Error, Result};
pub use node::{Fact, FactMap, NodeRecord};
pub use partition::{Partition, PartitionTable};
pub use scalar::ScalarValue;
