use crate::steps;
use election_modules::InProcPeerCommunicator;
use std::time::Duration;

pub fn run() {
    let node_ids = steps::node_ids(1);

    let peer_communicator =
        InProcPeerCommunicator::new(node_ids.clone(), steps::get_communication_timeout());
    let cluster = steps::cluster::start_initial_cluster(
        node_ids,
        peer_communicator,
        steps::create_node_inproc,
    );

    let leader = cluster.wait_for_stable_leader(Duration::from_secs(5));
    assert_eq!("node-1", leader.node_id);
    assert_eq!(1, leader.current_term);

    steps::sleep(1);
    let same_leader = cluster.wait_for_stable_leader(Duration::from_secs(1));
    assert_eq!(1, same_leader.current_term);

    cluster.terminate();
}
