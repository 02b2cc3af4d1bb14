use rayon::prelude::*;
use rayon::{ThreadPool, ThreadPoolBuilder};
use std::ops::Fn;
use std::result::Result;

use super::QuorumResponse;
use crate::errors;
use crate::errors::{ErrorKind, RaftError};

/// Creates the fan-out pool of a node: one thread per peer, so every peer call of a request
/// runs at the same time and nodes of one process do not wait for each other.
pub fn build_peer_pool(node_id: &str, peer_count: usize) -> Result<ThreadPool, RaftError> {
    let thread_prefix = format!("{}-peer", node_id);

    ThreadPoolBuilder::new()
        .num_threads(peer_count.max(1))
        .thread_name(move |idx| format!("{}-{}", thread_prefix, idx))
        .build()
        .or_else(|err| {
            errors::new_err(
                ErrorKind::Internal,
                format!("Cannot create peer request pool for node {}", node_id),
                err.to_string(),
            )
        })
}

/// Sends the request to every peer in parallel on `pool`, waits for all of them and counts
/// the peers that did not answer positively. Fails with `QuorumFailure` when the failure
/// count exceeds half of the peer count (integer division). An empty peer list always
/// succeeds.
pub fn request_peer_consensus<Req, Resp, Requester>(
    pool: &ThreadPool,
    request: Req,
    node_id: &str,
    peers: &[String],
    requester: Requester,
) -> Result<(), RaftError>
where
    Requester: Fn(&str, Req) -> Result<Resp, RaftError> + Sync,
    Req: Clone + Sync + Send,
    Resp: QuorumResponse + Send,
{
    if peers.is_empty() {
        return Ok(());
    }

    let responses = get_responses_from_peers(pool, request, peers, requester);

    let mut failures = Vec::new();
    for (peer, response) in peers.iter().zip(responses) {
        match response {
            Ok(peer_resp) => {
                if !peer_resp.get_result() {
                    failures.push(RaftError::rejected_by(peer));
                }
            }
            Err(err) => failures.push(err),
        }
    }

    if quorum_lost(failures.len(), peers.len()) {
        warn!(
            "Node {}: cannot get quorum for request. Failed peers: {} of {}",
            node_id,
            failures.len(),
            peers.len()
        );
        return errors::new_multiple_err(
            ErrorKind::QuorumFailure,
            format!("Cannot get quorum for request from {} peers", peers.len()),
            failures,
        );
    }

    trace!(
        "Node {} gathered quorum for request. Failed peers: {} of {}",
        node_id,
        failures.len(),
        peers.len()
    );
    Ok(())
}

/// The node's own vote is implicit: the request holds unless more than half of the peers failed.
pub fn quorum_lost(failed_peers: usize, peer_count: usize) -> bool {
    failed_peers > peer_count / 2
}

fn get_responses_from_peers<Req, Resp, Requester>(
    pool: &ThreadPool,
    request: Req,
    peers: &[String],
    requester: Requester,
) -> Vec<Result<Resp, RaftError>>
where
    Requester: Fn(&str, Req) -> Result<Resp, RaftError> + Sync,
    Req: Clone + Sync + Send,
    Resp: QuorumResponse + Send,
{
    pool.install(|| {
        peers
            .par_iter()
            .with_max_len(1)
            .map(|peer| requester(peer.as_str(), request.clone()))
            .collect()
    })
}
