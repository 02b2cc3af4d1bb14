use crate::communication::duplex_channel::DuplexChannel;

use crossbeam_channel::Receiver;
use leader_election::{
    new_err, CandidateProposal, CandidateProposalPeerRequest, CandidateProposalResponse,
    ErrorKind, HeartbeatPeerRequest, HeartbeatRequest, HeartbeatResponse, PeerRequestChannels,
    PeerRequestHandler, RaftError,
};
use parking_lot::RwLock;

use std::collections::{HashMap, HashSet};
use std::sync::Arc;
use std::time::Duration;

/// Basic in-memory implementation of the PeerRequestHandler and PeerRequestChannels traits.
///
/// Nodes can be disconnected to simulate a network partition: requests from or to a
/// disconnected node fail as unreachable.
#[derive(Clone, Debug)]
pub struct InProcPeerCommunicator {
    heartbeat_channels: HashMap<String, DuplexChannel<HeartbeatRequest, HeartbeatResponse>>,
    candidate_proposal_channels:
        HashMap<String, DuplexChannel<CandidateProposal, CandidateProposalResponse>>,
    disconnected_nodes: Arc<RwLock<HashSet<String>>>,
}

impl InProcPeerCommunicator {
    /// Create new instance of the InProcPeerCommunicator for the nodes with communication timeout.
    pub fn new(nodes: Vec<String>, timeout: Duration) -> InProcPeerCommunicator {
        let mut communicator = InProcPeerCommunicator {
            heartbeat_channels: HashMap::new(),
            candidate_proposal_channels: HashMap::new(),
            disconnected_nodes: Arc::new(RwLock::new(HashSet::new())),
        };

        for node_id in nodes {
            communicator.add_node_communication(node_id, timeout);
        }

        communicator
    }

    fn add_node_communication(&mut self, node_id: String, timeout: Duration) {
        let heartbeat_duplex =
            DuplexChannel::new(format!("Heartbeat channel NodeId={}", node_id), timeout);
        let candidate_proposal_duplex = DuplexChannel::new(
            format!("Candidate proposal channel NodeId={}", node_id),
            timeout,
        );

        self.heartbeat_channels
            .insert(node_id.clone(), heartbeat_duplex);
        self.candidate_proposal_channels
            .insert(node_id, candidate_proposal_duplex);
    }

    /// Cuts the node off the cluster: its outbound and inbound requests fail.
    pub fn disconnect(&self, node_id: &str) {
        info!("Node {} disconnected", node_id);
        self.disconnected_nodes.write().insert(node_id.to_string());
    }

    pub fn reconnect(&self, node_id: &str) {
        info!("Node {} reconnected", node_id);
        self.disconnected_nodes.write().remove(node_id);
    }

    pub fn is_connected(&self, node_id: &str) -> bool {
        !self.disconnected_nodes.read().contains(node_id)
    }

    fn check_link(&self, source: &str, destination: &str) -> Result<(), RaftError> {
        let disconnected = self.disconnected_nodes.read();
        for node_id in &[source, destination] {
            if disconnected.contains(*node_id) {
                return new_err(
                    ErrorKind::PeerUnreachable,
                    format!("Link {} -> {} is down", source, destination),
                    format!("Node {} is disconnected", node_id),
                );
            }
        }

        Ok(())
    }
}

fn lookup<'a, T>(channels: &'a HashMap<String, T>, destination: &str) -> Result<&'a T, RaftError> {
    match channels.get(destination) {
        Some(channel) => Ok(channel),
        None => new_err(
            ErrorKind::PeerUnreachable,
            format!("Unknown destination node {}", destination),
            String::new(),
        ),
    }
}

impl PeerRequestHandler for InProcPeerCommunicator {
    fn send_heartbeat(
        &self,
        destination: &str,
        request: HeartbeatRequest,
    ) -> Result<HeartbeatResponse, RaftError> {
        trace!("Destination Node {} Sending request {}", destination, request);

        self.check_link(&request.leader_id, destination)?;
        let resp = lookup(&self.heartbeat_channels, destination)?.send_request(request);

        trace!("Destination Node {} Response {:?}", destination, resp);

        resp
    }

    fn send_candidate_proposal(
        &self,
        destination: &str,
        request: CandidateProposal,
    ) -> Result<CandidateProposalResponse, RaftError> {
        trace!("Destination Node {} Sending request {}", destination, request);

        self.check_link(&request.candidate_id, destination)?;
        let resp = lookup(&self.candidate_proposal_channels, destination)?.send_request(request);

        trace!("Destination Node {} Response {:?}", destination, resp);

        resp
    }
}

impl PeerRequestChannels for InProcPeerCommunicator {
    // A node unknown to the communicator gets a receiver that never yields a request.
    fn heartbeat_request_rx(&self, node_id: &str) -> Receiver<HeartbeatPeerRequest> {
        match self.heartbeat_channels.get(node_id) {
            Some(channel) => channel.request_rx(),
            None => {
                warn!("Node {} has no heartbeat channel", node_id);
                crossbeam_channel::never()
            }
        }
    }

    fn candidate_proposal_request_rx(
        &self,
        node_id: &str,
    ) -> Receiver<CandidateProposalPeerRequest> {
        match self.candidate_proposal_channels.get(node_id) {
            Some(channel) => channel.request_rx(),
            None => {
                warn!("Node {} has no candidate proposal channel", node_id);
                crossbeam_channel::never()
            }
        }
    }
}
