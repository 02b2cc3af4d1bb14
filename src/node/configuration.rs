use std::collections::HashSet;
use std::time::Duration;

use crate::errors::{new_err, ErrorKind, Result};
use crate::{ElectionTimer, PeerRequestHandler};

#[derive(Clone, Copy, Debug, Eq, PartialEq, Hash)]
pub struct NodeTimings {
    /// Period of the leader heartbeat broadcast.
    pub heartbeat_interval: Duration,

    /// Silence after which a follower starts an election.
    pub heartbeat_timeout: Duration,
}

impl Default for NodeTimings {
    fn default() -> Self {
        NodeTimings {
            heartbeat_interval: Duration::from_millis(300),
            heartbeat_timeout: Duration::from_millis(1500),
        }
    }
}

#[derive(Clone, Debug)]
pub struct NodeConfiguration<Pc, Et>
where
    Pc: PeerRequestHandler,
    Et: ElectionTimer,
{
    pub node_id: String,
    pub peers: Vec<String>,
    pub peer_communicator: Pc,
    pub election_timer: Et,
    pub timings: NodeTimings,
}

impl<Pc, Et> NodeConfiguration<Pc, Et>
where
    Pc: PeerRequestHandler,
    Et: ElectionTimer,
{
    pub fn validate(&self) -> Result<()> {
        if self.node_id.is_empty() {
            return invalid("Node id cannot be empty".to_string());
        }

        let mut unique_peers = HashSet::new();
        for peer in &self.peers {
            if peer.is_empty() {
                return invalid(format!("Node {}: peer address cannot be empty", self.node_id));
            }
            if *peer == self.node_id {
                return invalid(format!("Node {} is listed among its own peers", self.node_id));
            }
            if !unique_peers.insert(peer) {
                return invalid(format!("Node {}: duplicate peer {}", self.node_id, peer));
            }
        }

        let timings = self.timings;
        if timings.heartbeat_interval == Duration::from_millis(0) {
            return invalid(format!("Node {}: heartbeat interval must be positive", self.node_id));
        }
        if timings.heartbeat_interval >= timings.heartbeat_timeout {
            return invalid(format!(
                "Node {}: heartbeat interval {:?} must be smaller than heartbeat timeout {:?}",
                self.node_id, timings.heartbeat_interval, timings.heartbeat_timeout
            ));
        }

        Ok(())
    }
}

fn invalid<T>(text: String) -> Result<T> {
    new_err(ErrorKind::InvalidConfiguration, text, String::new())
}
