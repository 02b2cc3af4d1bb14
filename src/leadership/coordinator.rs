use parking_lot::{Mutex, MutexGuard};
use rayon::ThreadPool;
use std::sync::Arc;
use std::time::Duration;

use super::election::{start_election, StartElectionParams};
use super::heartbeat_sender::{send_heartbeat, SendHeartbeatParams};
use super::{ElectionTimer, ELECTION_TIMEOUT_TASK, LEADER_HEARTBEAT_TASK};
use crate::common::peer_consensus_requester::build_peer_pool;
use crate::communication::peers::{
    CandidateProposal, CandidateProposalResponse, HeartbeatRequest, HeartbeatResponse,
    PeerRequestHandler,
};
use crate::errors::{ErrorKind, RaftError, Result};
use crate::node::configuration::{NodeConfiguration, NodeTimings};
use crate::node::state::{InboundOutcome, Node, NodeState, NodeStatus};
use crate::scheduler::{RecurringTaskScheduler, Task};

/// Election state machine of a node. Owns the term, the status and the leader belief, and
/// drives the election timeout and the leader heartbeat through its task scheduler.
///
/// Inbound messages and timer callbacks serialize on one lock; peer calls are made outside
/// of it with the term captured beforehand.
#[derive(Debug)]
pub struct ElectionCoordinator<Pc, Et>
where
    Pc: PeerRequestHandler,
    Et: ElectionTimer,
{
    node_id: String,
    peers: Vec<String>,
    timings: NodeTimings,
    peer_communicator: Pc,
    election_timer: Et,
    scheduler: RecurringTaskScheduler,
    peer_pool: ThreadPool,
    protected_node: Mutex<Node>,
}

impl<Pc, Et> ElectionCoordinator<Pc, Et>
where
    Pc: PeerRequestHandler,
    Et: ElectionTimer,
{
    /// Validates the configuration, creates a follower of term 0 and arms its election timeout.
    pub fn start(config: NodeConfiguration<Pc, Et>) -> Result<Arc<Self>> {
        config.validate()?;
        let peer_pool = build_peer_pool(&config.node_id, config.peers.len())?;

        let coordinator = Arc::new(ElectionCoordinator {
            protected_node: Mutex::new(Node::new(config.node_id.clone())),
            node_id: config.node_id,
            peers: config.peers,
            timings: config.timings,
            peer_communicator: config.peer_communicator,
            election_timer: config.election_timer,
            scheduler: RecurringTaskScheduler::new(),
            peer_pool,
        });

        coordinator.add_election_timeout_task()?;
        info!(
            "Node {} started as Follower with peers {:?}",
            coordinator.node_id, coordinator.peers
        );

        Ok(coordinator)
    }

    pub fn node_id(&self) -> &str {
        &self.node_id
    }

    pub fn status(&self) -> NodeState {
        self.protected_node.lock().state()
    }

    /// Ids of the recurring tasks currently registered for this node.
    pub fn active_tasks(&self) -> Vec<String> {
        self.scheduler.task_ids()
    }

    pub fn shutdown(&self) {
        self.scheduler.shutdown();
        info!("Node {} election tasks stopped", self.node_id);
    }

    pub fn handle_heartbeat(self: &Arc<Self>, request: HeartbeatRequest) -> HeartbeatResponse {
        let mut node = self.protected_node.lock();

        let outcome = node.accept_heartbeat(&request.leader_id, request.term);
        let acknowledged = match outcome {
            InboundOutcome::Stale => {
                warn!(
                    "Node {} Stale heartbeat from {} for term {}, current term {}",
                    node.id,
                    request.leader_id,
                    request.term,
                    node.current_term()
                );
                false
            }
            InboundOutcome::Rejected => {
                warn!(
                    "Node {} Heartbeat rejected: node {} claims own leadership term {}",
                    node.id, request.leader_id, request.term
                );
                false
            }
            InboundOutcome::Accepted { stepped_down } => {
                trace!(
                    "Node {} Acknowledged heartbeat from leader {} term {}",
                    node.id,
                    request.leader_id,
                    request.term
                );
                self.follow_leader(&node, stepped_down);
                true
            }
        };

        HeartbeatResponse {
            acknowledged,
            peer_id: self.node_id.clone(),
        }
    }

    pub fn handle_candidate_proposal(
        self: &Arc<Self>,
        request: CandidateProposal,
    ) -> CandidateProposalResponse {
        let mut node = self.protected_node.lock();

        let outcome = node.accept_candidate_proposal(&request.candidate_id, request.term);
        let accepted = match outcome {
            InboundOutcome::Stale | InboundOutcome::Rejected => {
                warn!(
                    "Node {} Candidate proposal of {} for term {} rejected, current term {}",
                    node.id,
                    request.candidate_id,
                    request.term,
                    node.current_term()
                );
                false
            }
            InboundOutcome::Accepted { stepped_down } => {
                info!(
                    "Node {} Status changed to Follower for term {}: candidate {} accepted",
                    node.id, request.term, request.candidate_id
                );
                self.follow_leader(&node, stepped_down);
                true
            }
        };

        CandidateProposalResponse {
            accepted,
            peer_id: self.node_id.clone(),
        }
    }

    // Restarts the election countdown of a follower. A former leader gets its election
    // timeout back instead of the heartbeat broadcast.
    fn follow_leader(self: &Arc<Self>, node: &MutexGuard<Node>, stepped_down: bool) {
        if stepped_down {
            info!("Node {} Leader stepped down for term {}", node.id, node.current_term());
            self.scheduler.remove_task(LEADER_HEARTBEAT_TASK);
            self.restore_election_timeout_task();
            return;
        }

        let reset_result = self
            .scheduler
            .reset_task_schedule(ELECTION_TIMEOUT_TASK, self.next_election_timeout());
        if let Err(err) = reset_result {
            if err.kind() == ErrorKind::UnknownTask {
                self.restore_election_timeout_task();
            } else {
                error!("Node {} Cannot reset election timeout: {}", node.id, err);
            }
        }
    }

    fn next_election_timeout(&self) -> Duration {
        self.election_timer
            .next_election_timeout(self.timings.heartbeat_timeout)
    }

    fn add_election_timeout_task(self: &Arc<Self>) -> Result<()> {
        let election_coordinator = Arc::downgrade(self);
        let failure_coordinator = Arc::downgrade(self);

        let task = Task::new(self.next_election_timeout(), move || {
            match election_coordinator.upgrade() {
                Some(coordinator) => coordinator.run_election(),
                None => Ok(()),
            }
        })
        .with_failure_handler(move |err| {
            if let Some(coordinator) = failure_coordinator.upgrade() {
                coordinator.on_election_failure(err);
            }
        });

        self.scheduler.add_task(ELECTION_TIMEOUT_TASK, task)
    }

    fn restore_election_timeout_task(self: &Arc<Self>) {
        if let Err(err) = self.add_election_timeout_task() {
            error!("Node {} Cannot restore election timeout: {}", self.node_id, err);
        }
    }

    // The heartbeat task serves the leadership of one term only.
    fn add_leader_heartbeat_task(self: &Arc<Self>, term: u64) -> Result<()> {
        let heartbeat_coordinator = Arc::downgrade(self);
        let failure_coordinator = Arc::downgrade(self);

        let task = Task::new(self.timings.heartbeat_interval, move || {
            match heartbeat_coordinator.upgrade() {
                Some(coordinator) => coordinator.broadcast_heartbeat(term),
                None => Ok(()),
            }
        })
        .with_failure_handler(move |err| {
            if let Some(coordinator) = failure_coordinator.upgrade() {
                coordinator.on_heartbeat_failure(term, err);
            }
        });

        self.scheduler.add_task(LEADER_HEARTBEAT_TASK, task)
    }

    fn run_election(self: &Arc<Self>) -> Result<()> {
        let term = {
            let mut node = self.protected_node.lock();
            if node.status() == NodeStatus::Leader {
                return Ok(());
            }

            let term = node.start_candidacy();
            info!("Node {} Status changed to Candidate for term {}", node.id, term);
            term
        };

        start_election(StartElectionParams {
            node_id: &self.node_id,
            term,
            peers: &self.peers,
            peer_communicator: &self.peer_communicator,
            peer_pool: &self.peer_pool,
        })?;

        info!("Node {} Leader election - quorum gathered for term {}", self.node_id, term);
        self.promote_to_leader(term);

        Ok(())
    }

    fn promote_to_leader(self: &Arc<Self>, term: u64) {
        let mut node = self.protected_node.lock();

        if !node.promote_to_leader(term) {
            info!(
                "Node {} Election result for term {} discarded: status {} term {}",
                node.id,
                term,
                node.status(),
                node.current_term()
            );
            return;
        }

        self.scheduler.remove_task(ELECTION_TIMEOUT_TASK);
        if let Err(err) = self.add_leader_heartbeat_task(term) {
            error!("Node {} Cannot start leader heartbeat: {}", node.id, err);
            node.step_down();
            self.restore_election_timeout_task();
            return;
        }

        info!("Node {} Status changed to Leader for term {}", node.id, term);
    }

    // Lost elections leave the election timeout dormant; it is rearmed here so the node
    // keeps campaigning until it hears from a leader.
    fn on_election_failure(self: &Arc<Self>, err: RaftError) {
        let node_id = {
            let mut node = self.protected_node.lock();
            if node.revert_to_follower() {
                info!(
                    "Node {} Leader election failed for term {}. Status changed to Follower",
                    node.id,
                    node.current_term()
                );
            }
            node.id.clone()
        };
        trace!("Node {} Election failure: {}", node_id, err);

        let reset_result = self
            .scheduler
            .reset_task_schedule(ELECTION_TIMEOUT_TASK, self.next_election_timeout());
        if let Err(err) = reset_result {
            warn!("Node {} Election timeout not rearmed: {}", node_id, err);
        }
    }

    // A leader that cannot reach a majority gives up its leadership and waits for
    // another leader or its own election timeout.
    fn on_heartbeat_failure(self: &Arc<Self>, term: u64, err: RaftError) {
        let mut node = self.protected_node.lock();

        error!("Node {} Heartbeat broadcast failed for term {}: {}", node.id, term, err);

        if node.current_term() != term {
            info!(
                "Node {} Heartbeat failure of term {} ignored, current term {}",
                node.id,
                term,
                node.current_term()
            );
            return;
        }

        if node.step_down() {
            info!(
                "Node {} Status changed to Follower for term {}: no majority reached",
                node.id,
                node.current_term()
            );
            self.scheduler.remove_task(LEADER_HEARTBEAT_TASK);
            self.restore_election_timeout_task();
        }
    }

    fn broadcast_heartbeat(&self, term: u64) -> Result<()> {
        {
            let node = self.protected_node.lock();
            if node.status() != NodeStatus::Leader || node.current_term() != term {
                return Ok(());
            }
        }

        send_heartbeat(SendHeartbeatParams {
            node_id: &self.node_id,
            term,
            peers: &self.peers,
            peer_communicator: &self.peer_communicator,
            peer_pool: &self.peer_pool,
        })
    }
}
