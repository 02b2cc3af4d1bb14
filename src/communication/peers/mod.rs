use crossbeam_channel::{Receiver, Sender};

use crate::common::QuorumResponse;
use crate::errors::RaftError;

/// Leader assertion for a term, sent periodically to every peer.
#[derive(Clone, Debug, Eq, PartialEq, Hash, Display)]
#[display(fmt = "Heartbeat: leader {} term {}", leader_id, term)]
pub struct HeartbeatRequest {
    pub leader_id: String,
    pub term: u64,
}

#[derive(Clone, Debug, Eq, PartialEq, Hash, Display)]
#[display(fmt = "Heartbeat response: acknowledged {} peer {}", acknowledged, peer_id)]
pub struct HeartbeatResponse {
    pub acknowledged: bool,
    pub peer_id: String,
}

/// Candidate's request to be recognized as the leader of a term.
#[derive(Clone, Debug, Eq, PartialEq, Hash, Display)]
#[display(fmt = "Candidate proposal: candidate {} term {}", candidate_id, term)]
pub struct CandidateProposal {
    pub candidate_id: String,
    pub term: u64,
}

#[derive(Clone, Debug, Eq, PartialEq, Hash, Display)]
#[display(fmt = "Candidate proposal response: accepted {} peer {}", accepted, peer_id)]
pub struct CandidateProposalResponse {
    pub accepted: bool,
    pub peer_id: String,
}

impl QuorumResponse for HeartbeatResponse {
    fn get_result(&self) -> bool {
        self.acknowledged
    }
}

impl QuorumResponse for CandidateProposalResponse {
    fn get_result(&self) -> bool {
        self.accepted
    }
}

/// Outbound side of the peer transport. Any network, encoding or timeout failure is an `Err`;
/// an application-level refusal is an `Ok` response with a negative flag.
pub trait PeerRequestHandler: Send + Sync + Clone + 'static {
    fn send_heartbeat(
        &self,
        destination: &str,
        request: HeartbeatRequest,
    ) -> Result<HeartbeatResponse, RaftError>;

    fn send_candidate_proposal(
        &self,
        destination: &str,
        request: CandidateProposal,
    ) -> Result<CandidateProposalResponse, RaftError>;
}

/// Inbound request paired with the channel its response goes to.
#[derive(Debug)]
pub struct PeerRequest<Req, Resp> {
    pub request: Req,
    pub response_tx: Sender<Resp>,
}

impl<Req, Resp> PeerRequest<Req, Resp> {
    /// Sends the response back to the requester. Returns false if the requester is gone.
    pub fn respond(self, response: Resp) -> bool {
        self.response_tx.send(response).is_ok()
    }
}

pub type HeartbeatPeerRequest = PeerRequest<HeartbeatRequest, HeartbeatResponse>;
pub type CandidateProposalPeerRequest = PeerRequest<CandidateProposal, CandidateProposalResponse>;

/// Inbound side of the peer transport: the requests addressed to a node.
pub trait PeerRequestChannels: Send + Sync + Clone + 'static {
    fn heartbeat_request_rx(&self, node_id: &str) -> Receiver<HeartbeatPeerRequest>;

    fn candidate_proposal_request_rx(&self, node_id: &str)
        -> Receiver<CandidateProposalPeerRequest>;
}
