//! Raft-style leader election for a fixed cluster.
//!
//! Every node starts as a follower of term 0. When no heartbeat arrives within the election
//! timeout it becomes a candidate of the next term and proposes itself to all peers; it turns
//! into the leader unless more than half of the peers refused or could not be reached. The
//! leader keeps the others following with periodic heartbeats. Timeouts and heartbeats are
//! driven by a [`RecurringTaskScheduler`](scheduler::RecurringTaskScheduler).

#![warn(missing_debug_implementations, unsafe_code)]

#[macro_use]
extern crate log;
#[macro_use]
extern crate crossbeam_channel;
#[macro_use]
extern crate derive_more;

mod common;
mod communication;
mod errors;
mod leadership;
mod node;
mod request_handler;
pub mod scheduler;

pub use communication::peers::{
    CandidateProposal, CandidateProposalPeerRequest, CandidateProposalResponse,
    HeartbeatPeerRequest, HeartbeatRequest, HeartbeatResponse, PeerRequest,
};
pub use communication::peers::{PeerRequestChannels, PeerRequestHandler};
pub use errors::{new_err, ErrorKind, RaftError};
pub use leadership::coordinator::ElectionCoordinator;
pub use leadership::{ElectionTimer, ELECTION_TIMEOUT_TASK, LEADER_HEARTBEAT_TASK};
pub use node::configuration::{NodeConfiguration, NodeTimings};
pub use node::state::{NodeState, NodeStatus};
pub use node::NodeHandle;

/// Starts the election coordinator of the node and the worker serving its inbound peer requests.
pub fn start_node<Pc, Et>(
    node_config: NodeConfiguration<Pc, Et>,
) -> Result<NodeHandle<Pc, Et>, RaftError>
where
    Pc: PeerRequestHandler + PeerRequestChannels,
    Et: ElectionTimer,
{
    node::start(node_config)
}
