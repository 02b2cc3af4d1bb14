use crossbeam_channel::Receiver;
use std::sync::Arc;

use crate::communication::peers::{
    CandidateProposalPeerRequest, HeartbeatPeerRequest, PeerRequestChannels, PeerRequestHandler,
};
use crate::leadership::coordinator::ElectionCoordinator;
use crate::ElectionTimer;

pub struct PeerRequestHandlerParams<Pc, Et>
where
    Pc: PeerRequestHandler + PeerRequestChannels,
    Et: ElectionTimer,
{
    pub coordinator: Arc<ElectionCoordinator<Pc, Et>>,
    pub peer_communicator: Pc,
}

/// Dispatches inbound heartbeats and candidate proposals to the coordinator until terminated.
pub fn process_peer_request<Pc, Et>(
    params: PeerRequestHandlerParams<Pc, Et>,
    terminate_worker_rx: Receiver<()>,
) where
    Pc: PeerRequestHandler + PeerRequestChannels,
    Et: ElectionTimer,
{
    let node_id = params.coordinator.node_id().to_string();
    let heartbeat_request_rx = params.peer_communicator.heartbeat_request_rx(&node_id);
    let candidate_proposal_request_rx = params
        .peer_communicator
        .candidate_proposal_request_rx(&node_id);

    info!("Node {} Peer request processor worker started", node_id);
    loop {
        select!(
            recv(terminate_worker_rx) -> res  => {
                if res.is_err() {
                    error!("Abnormal exit for peer request processor worker");
                }
                break
            },
            recv(heartbeat_request_rx) -> res => {
                match res {
                    Ok(request) => handle_heartbeat_request(&node_id, request, &params),
                    Err(err) => {
                        error!("Node {} Heartbeat request channel closed: {}", node_id, err);
                        break
                    }
                }
            },
            recv(candidate_proposal_request_rx) -> res => {
                match res {
                    Ok(request) => handle_candidate_proposal_request(&node_id, request, &params),
                    Err(err) => {
                        error!("Node {} Candidate proposal channel closed: {}", node_id, err);
                        break
                    }
                }
            }
        );
    }
    info!("Node {} Peer request processor worker stopped", node_id);
}

fn handle_heartbeat_request<Pc, Et>(
    node_id: &str,
    peer_request: HeartbeatPeerRequest,
    params: &PeerRequestHandlerParams<Pc, Et>,
) where
    Pc: PeerRequestHandler + PeerRequestChannels,
    Et: ElectionTimer,
{
    trace!("Node {} Received {}", node_id, peer_request.request);

    let response = params
        .coordinator
        .handle_heartbeat(peer_request.request.clone());
    if !peer_request.respond(response) {
        warn!("Node {} Heartbeat requester is gone", node_id);
    }
}

fn handle_candidate_proposal_request<Pc, Et>(
    node_id: &str,
    peer_request: CandidateProposalPeerRequest,
    params: &PeerRequestHandlerParams<Pc, Et>,
) where
    Pc: PeerRequestHandler + PeerRequestChannels,
    Et: ElectionTimer,
{
    info!("Node {} Received {}", node_id, peer_request.request);

    let response = params
        .coordinator
        .handle_candidate_proposal(peer_request.request.clone());
    if !peer_request.respond(response) {
        warn!("Node {} Candidate proposal requester is gone", node_id);
    }
}
