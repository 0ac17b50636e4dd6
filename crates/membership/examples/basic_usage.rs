use cluster_membership::MembershipAggregator;
use cluster_relation::{PeerId, StateSink};
use cluster_relation_memory::{MemoryRelation, MemoryStateSink};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt().init();

    let relation = MemoryRelation::new();
    let sink = MemoryStateSink::new();
    let aggregator = MembershipAggregator::new(relation.clone(), sink.clone());

    // Two compute nodes join, one of them without an address yet
    relation
        .add_peer(
            PeerId::new("slurm-cluster:0", "slurmd/0"),
            [
                ("hostname", "node1"),
                ("private-address", "10.0.0.1"),
                ("partition", "batch"),
                ("default", "true"),
            ],
        )
        .await;
    relation
        .add_peer(
            PeerId::new("slurm-cluster:0", "slurmd/1"),
            [("hostname", "node2"), ("partition", "gpu")],
        )
        .await;

    let outcome = aggregator.update().await?;
    println!("First pass: {:?}", outcome.state);
    aggregator.end_cycle().await;

    // The second node publishes its address
    relation
        .set_fact(
            &PeerId::new("slurm-cluster:0", "slurmd/1"),
            "private-address",
            "10.0.0.2",
        )
        .await?;

    let outcome = aggregator.update().await?;
    println!("Second pass: {:?}", outcome.state);
    println!("Raised flags: {:?}", sink.states().await);
    println!(
        "Changed flag raised: {}",
        sink.is_state(&aggregator.config().changed_state()).await
    );

    println!("Partitions:");
    for (name, partition) in aggregator.get_partitions().await?.iter() {
        println!(
            "  - {name}: hosts={:?}, default={}",
            partition.hosts, partition.default
        );
    }
    aggregator.end_cycle().await;

    aggregator
        .send_config(&serde_json::json!({ "control_machine": "controller-0" }))
        .await?;
    println!("Published config: {:?}", relation.local_fact("config").await);

    Ok(())
}
