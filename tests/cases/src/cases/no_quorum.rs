use crate::steps;
use election_modules::InProcPeerCommunicator;
use std::time::Duration;

pub fn run() {
    let node_ids = steps::node_ids(4);

    let peer_communicator =
        InProcPeerCommunicator::new(node_ids.clone(), steps::get_communication_timeout());
    // only node-1 stays connected: it cannot gather a majority
    for node_id in node_ids.iter().skip(1) {
        peer_communicator.disconnect(node_id);
    }

    let cluster = steps::cluster::start_initial_cluster(
        node_ids.clone(),
        peer_communicator.clone(),
        steps::create_node_inproc,
    );

    steps::sleep(3);
    assert!(cluster.leaders().is_empty());

    let campaigning_node = &cluster.node_states()[0];
    assert!(campaigning_node.current_term >= 1);

    for node_id in node_ids.iter().skip(1) {
        peer_communicator.reconnect(node_id);
    }

    let leader = cluster.wait_for_stable_leader(Duration::from_secs(15));
    info!("--Leader after reconnection: {}", leader);

    cluster.terminate();
}
