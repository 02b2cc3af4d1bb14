#[macro_use]
extern crate log;
extern crate chrono;
extern crate env_logger;

extern crate election_modules;
extern crate leader_election;

use std::io::Write;
use std::thread;
use std::time::{Duration, Instant};

use chrono::prelude::{DateTime, Local};
use clap::Parser;

use election_modules::{InProcPeerCommunicator, RandomizedElectionTimer};
use leader_election::{NodeConfiguration, NodeHandle, NodeStatus, NodeTimings};

/// Runs an in-process cluster and reports its leader.
#[derive(Parser, Debug)]
#[command(name = "node")]
#[command(about = "Raft-style leader election demo cluster")]
struct Args {
    /// Node ids (comma-separated)
    #[arg(long, value_delimiter = ',', default_value = "node-1,node-2,node-3")]
    nodes: Vec<String>,

    /// Period of the leader heartbeat in milliseconds
    #[arg(long, default_value = "300")]
    heartbeat_interval_ms: u64,

    /// Follower silence before an election in milliseconds
    #[arg(long, default_value = "1500")]
    heartbeat_timeout_ms: u64,

    /// Maximum random extension of the election timeout in milliseconds
    #[arg(long, default_value = "1500")]
    election_jitter_ms: u64,

    /// Peer request timeout in milliseconds
    #[arg(long, default_value = "500")]
    communication_timeout_ms: u64,

    /// How long to run the cluster in seconds
    #[arg(long, default_value = "10")]
    duration_secs: u64,
}

type DemoNode = NodeHandle<InProcPeerCommunicator, RandomizedElectionTimer>;

fn init_logger() {
    env_logger::builder()
        .format(|buf, record| {
            let now: DateTime<Local> = Local::now();
            let now_str = now.format("%H:%M:%S.%3f").to_string();
            writeln!(buf, "{:5}: {} - {}", record.level(), now_str, record.args())
        })
        .init();
}

fn main() {
    init_logger();
    let args = Args::parse();

    let timings = NodeTimings {
        heartbeat_interval: Duration::from_millis(args.heartbeat_interval_ms),
        heartbeat_timeout: Duration::from_millis(args.heartbeat_timeout_ms),
    };
    let peer_communicator = InProcPeerCommunicator::new(
        args.nodes.clone(),
        Duration::from_millis(args.communication_timeout_ms),
    );

    let mut nodes = Vec::new();
    for node_id in &args.nodes {
        let node_config = NodeConfiguration {
            node_id: node_id.clone(),
            peers: args.nodes.iter().filter(|id| *id != node_id).cloned().collect(),
            peer_communicator: peer_communicator.clone(),
            election_timer: RandomizedElectionTimer::new(args.election_jitter_ms),
            timings,
        };

        match leader_election::start_node(node_config) {
            Ok(node) => nodes.push(node),
            Err(err) => {
                error!("Node {} cannot start: {}", node_id, err);
                terminate(nodes);
                std::process::exit(1);
            }
        }
    }

    info!("Cluster started: {:?}", args.nodes);

    let started = Instant::now();
    while started.elapsed() < Duration::from_secs(args.duration_secs) {
        thread::sleep(Duration::from_secs(1));
        report_leader(&nodes);
    }

    terminate(nodes);
    info!("Cluster stopped");
}

fn report_leader(nodes: &[DemoNode]) {
    let leaders: Vec<_> = nodes
        .iter()
        .map(|node| node.status())
        .filter(|state| state.status == NodeStatus::Leader)
        .collect();

    match leaders.as_slice() {
        [] => info!("No leader elected yet"),
        [leader] => info!("Leader: {} term {}", leader.node_id, leader.current_term),
        _ => warn!("Several leaders: {:?}", leaders),
    }
}

fn terminate(nodes: Vec<DemoNode>) {
    for node in nodes {
        node.terminate();
    }
}
