use election_modules::InProcPeerCommunicator;
use leader_election::{NodeState, NodeStatus};
use std::thread;
use std::time::{Duration, Instant};

use super::CaseNode;

pub struct CaseCluster {
    pub peer_communicator: InProcPeerCommunicator,
    pub nodes: Vec<CaseNode>,
}

pub fn start_initial_cluster<F>(
    node_ids: Vec<String>,
    peer_communicator: InProcPeerCommunicator,
    node_creator: F,
) -> CaseCluster
where
    F: Fn(&str, &[String], InProcPeerCommunicator) -> CaseNode,
{
    let nodes = node_ids
        .iter()
        .map(|node_id| {
            node_creator(
                node_id.as_str(),
                node_ids.as_slice(),
                peer_communicator.clone(),
            )
        })
        .collect();

    CaseCluster {
        peer_communicator,
        nodes,
    }
}

impl CaseCluster {
    pub fn node_states(&self) -> Vec<NodeState> {
        self.nodes.iter().map(|node| node.status()).collect()
    }

    fn connected_node_states(&self) -> Vec<NodeState> {
        self.node_states()
            .into_iter()
            .filter(|state| self.peer_communicator.is_connected(&state.node_id))
            .collect()
    }

    /// Connected nodes agree on one leader: it is the only leader among them and
    /// everyone else follows it in its term.
    pub fn find_stable_leader(&self) -> Option<NodeState> {
        let states = self.connected_node_states();

        let mut leaders = states
            .iter()
            .filter(|state| state.status == NodeStatus::Leader);
        let leader = leaders.next()?;
        if leaders.next().is_some() {
            return None;
        }

        let all_follow = states.iter().all(|state| {
            state.current_term == leader.current_term
                && state.current_leader_id.as_deref() == Some(leader.node_id.as_str())
        });

        if all_follow {
            Some(leader.clone())
        } else {
            None
        }
    }

    pub fn wait_for_stable_leader(&self, timeout: Duration) -> NodeState {
        let started = Instant::now();
        while started.elapsed() < timeout {
            if let Some(leader) = self.find_stable_leader() {
                info!("--Stable leader: {}", leader);
                return leader;
            }
            thread::sleep(Duration::from_millis(50));
        }

        for state in self.node_states() {
            error!("--Node state: {}", state);
        }
        panic!("cannot get a stable leader!")
    }

    pub fn leaders(&self) -> Vec<NodeState> {
        self.node_states()
            .into_iter()
            .filter(|state| state.status == NodeStatus::Leader)
            .collect()
    }

    pub fn terminate(self) {
        for node in self.nodes {
            node.terminate();
        }
    }
}
