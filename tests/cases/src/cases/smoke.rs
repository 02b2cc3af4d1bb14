use crate::steps;
use election_modules::InProcPeerCommunicator;
use std::time::Duration;

pub fn run() {
    let node_ids = steps::node_ids(3);

    let peer_communicator =
        InProcPeerCommunicator::new(node_ids.clone(), steps::get_communication_timeout());
    let cluster = steps::cluster::start_initial_cluster(
        node_ids,
        peer_communicator,
        steps::create_node_inproc,
    );

    let leader = cluster.wait_for_stable_leader(Duration::from_secs(10));
    assert!(leader.current_term >= 1);

    // heartbeats keep the same leader in place
    steps::sleep(2);
    let same_leader = cluster.wait_for_stable_leader(Duration::from_secs(5));
    assert_eq!(leader.node_id, same_leader.node_id);
    assert_eq!(leader.current_term, same_leader.current_term);

    cluster.terminate();
}
