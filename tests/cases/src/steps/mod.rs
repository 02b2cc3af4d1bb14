use election_modules::{InProcPeerCommunicator, RandomizedElectionTimer};
use leader_election::{NodeConfiguration, NodeHandle, NodeTimings};
use std::thread;
use std::time::Duration;

pub mod cluster;

pub type CaseNode = NodeHandle<InProcPeerCommunicator, RandomizedElectionTimer>;

pub fn sleep(seconds: u64) {
    thread::sleep(Duration::from_secs(seconds));
}

pub fn get_communication_timeout() -> Duration {
    Duration::from_millis(200)
}

pub fn get_node_timings() -> NodeTimings {
    NodeTimings {
        heartbeat_interval: Duration::from_millis(100),
        heartbeat_timeout: Duration::from_millis(500),
    }
}

pub fn get_election_timer() -> RandomizedElectionTimer {
    RandomizedElectionTimer::new(500)
}

pub fn node_ids(count: usize) -> Vec<String> {
    (1..=count).map(|id| format!("node-{}", id)).collect()
}

pub fn create_node_inproc(
    node_id: &str,
    all_nodes: &[String],
    peer_communicator: InProcPeerCommunicator,
) -> CaseNode {
    let node_config = NodeConfiguration {
        node_id: node_id.to_string(),
        peers: all_nodes
            .iter()
            .filter(|id| id.as_str() != node_id)
            .cloned()
            .collect(),
        peer_communicator,
        election_timer: get_election_timer(),
        timings: get_node_timings(),
    };

    leader_election::start_node(node_config).expect("node started")
}
