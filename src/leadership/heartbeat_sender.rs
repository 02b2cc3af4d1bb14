use crate::common::peer_consensus_requester::request_peer_consensus;
use crate::communication::peers::{HeartbeatRequest, PeerRequestHandler};
use crate::errors::Result;
use rayon::ThreadPool;

pub struct SendHeartbeatParams<'a, Pc: PeerRequestHandler> {
    pub node_id: &'a str,
    pub term: u64,
    pub peers: &'a [String],
    pub peer_communicator: &'a Pc,
    pub peer_pool: &'a ThreadPool,
}

/// Sends the leader heartbeat to every peer and waits for all answers.
/// Fails with `QuorumFailure` when more than half of the peers did not acknowledge it.
pub fn send_heartbeat<Pc: PeerRequestHandler>(params: SendHeartbeatParams<Pc>) -> Result<()> {
    let heartbeat = HeartbeatRequest {
        leader_id: params.node_id.to_string(),
        term: params.term,
    };

    trace!("Node {} Send heartbeat for term {}", params.node_id, params.term);

    let peer_communicator = params.peer_communicator;
    let requester = |destination: &str, req: HeartbeatRequest| {
        let resp_result = peer_communicator.send_heartbeat(destination, req);

        if let Err(err) = &resp_result {
            trace!("Destination Node {} heartbeat failed: {}", destination, err);
        }
        resp_result
    };

    request_peer_consensus(
        params.peer_pool,
        heartbeat,
        params.node_id,
        params.peers,
        requester,
    )
}
