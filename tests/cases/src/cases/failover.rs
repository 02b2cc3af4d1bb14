use crate::steps;
use election_modules::InProcPeerCommunicator;
use leader_election::NodeStatus;
use std::time::Duration;

pub fn run() {
    let node_ids = steps::node_ids(3);

    let peer_communicator =
        InProcPeerCommunicator::new(node_ids.clone(), steps::get_communication_timeout());
    let cluster = steps::cluster::start_initial_cluster(
        node_ids,
        peer_communicator.clone(),
        steps::create_node_inproc,
    );

    let old_leader = cluster.wait_for_stable_leader(Duration::from_secs(10));

    peer_communicator.disconnect(&old_leader.node_id);

    let new_leader = cluster.wait_for_stable_leader(Duration::from_secs(15));
    assert_ne!(old_leader.node_id, new_leader.node_id);
    assert!(new_leader.current_term > old_leader.current_term);

    // the isolated leader loses its majority and steps down
    steps::sleep(2);
    let isolated = cluster
        .node_states()
        .into_iter()
        .find(|state| state.node_id == old_leader.node_id)
        .expect("old leader state");
    assert_ne!(NodeStatus::Leader, isolated.status);

    peer_communicator.reconnect(&old_leader.node_id);

    let leader = cluster.wait_for_stable_leader(Duration::from_secs(15));
    info!("--Leader after reconnection: {}", leader);
    assert_eq!(1, cluster.leaders().len());

    cluster.terminate();
}
