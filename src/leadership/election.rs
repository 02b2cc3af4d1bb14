use crate::common::peer_consensus_requester::request_peer_consensus;
use crate::communication::peers::{CandidateProposal, PeerRequestHandler};
use crate::errors::Result;
use rayon::ThreadPool;

pub struct StartElectionParams<'a, Pc: PeerRequestHandler> {
    pub node_id: &'a str,
    pub term: u64,
    pub peers: &'a [String],
    pub peer_communicator: &'a Pc,
    pub peer_pool: &'a ThreadPool,
}

/// Proposes the node as the leader of `params.term` to every peer and waits for all answers.
/// Fails with `QuorumFailure` when more than half of the peers refused or were unreachable.
pub fn start_election<Pc: PeerRequestHandler>(params: StartElectionParams<Pc>) -> Result<()> {
    let proposal = CandidateProposal {
        candidate_id: params.node_id.to_string(),
        term: params.term,
    };

    if params.peers.is_empty() {
        warn!("Node {}: election with no peers", params.node_id);
    }

    let peer_communicator = params.peer_communicator;
    let requester = |destination: &str, req: CandidateProposal| {
        let resp_result = peer_communicator.send_candidate_proposal(destination, req);

        match &resp_result {
            Ok(resp) => trace!(
                "Destination Node {} candidate proposal answered. Accepted={}",
                destination,
                resp.accepted
            ),
            Err(err) => trace!(
                "Destination Node {} candidate proposal failed: {}",
                destination,
                err
            ),
        }
        resp_result
    };

    request_peer_consensus(
        params.peer_pool,
        proposal,
        params.node_id,
        params.peers,
        requester,
    )
}
