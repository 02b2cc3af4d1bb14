use std::fmt;


#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash, Display)]
pub enum NodeStatus {
    Follower,
    Candidate,
    Leader,
}

/// Point-in-time copy of the election state of a node.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct NodeState {
    pub node_id: String,
    pub current_term: u64,
    pub status: NodeStatus,
    pub current_leader_id: Option<String>,
}

impl fmt::Display for NodeState {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(
            f,
            "Node {} status {} term {} leader {}",
            self.node_id,
            self.status,
            self.current_term,
            self.current_leader_id.as_deref().unwrap_or("<none>")
        )
    }
}

/// Result of applying an inbound heartbeat or candidate proposal.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub(crate) enum InboundOutcome {
    /// Message term is lower than the current term. Nothing changed.
    Stale,

    /// Message term is current but the node is already committed for it. Nothing changed.
    Rejected,

    /// Node follows the sender in the message term. `stepped_down` is set when the node
    /// was the leader before.
    Accepted { stepped_down: bool },
}

/// Term, status and leader belief of a node. Always accessed under one lock.
#[derive(Clone, Debug)]
pub(crate) struct Node {
    pub id: String,
    current_term: u64,
    status: NodeStatus,
    current_leader_id: Option<String>,
}

impl Node {
    pub fn new(id: String) -> Node {
        Node {
            id,
            current_term: 0,
            status: NodeStatus::Follower,
            current_leader_id: None,
        }
    }

    pub fn current_term(&self) -> u64 {
        self.current_term
    }

    pub fn status(&self) -> NodeStatus {
        self.status
    }

    pub fn state(&self) -> NodeState {
        NodeState {
            node_id: self.id.clone(),
            current_term: self.current_term,
            status: self.status,
            current_leader_id: self.current_leader_id.clone(),
        }
    }

    /// Starts a new term with the node as the candidate. Returns the new term.
    pub fn start_candidacy(&mut self) -> u64 {
        self.current_term += 1;
        self.status = NodeStatus::Candidate;
        self.current_leader_id = None;

        self.current_term
    }

    /// Promotes the candidate of `term`. Returns false when the election result is outdated:
    /// the node left the candidacy or moved to another term meanwhile.
    pub fn promote_to_leader(&mut self, term: u64) -> bool {
        if self.status != NodeStatus::Candidate || self.current_term != term {
            return false;
        }

        self.status = NodeStatus::Leader;
        self.current_leader_id = Some(self.id.clone());
        true
    }

    /// Returns a candidate to the follower status keeping its term.
    pub fn revert_to_follower(&mut self) -> bool {
        if self.status != NodeStatus::Candidate {
            return false;
        }

        self.status = NodeStatus::Follower;
        true
    }

    /// Turns a leader into a follower without a known leader.
    pub fn step_down(&mut self) -> bool {
        if self.status != NodeStatus::Leader {
            return false;
        }

        self.status = NodeStatus::Follower;
        self.current_leader_id = None;
        true
    }

    /// Heartbeats of the current or a newer term are followed. A leader keeps its own term.
    pub fn accept_heartbeat(&mut self, leader_id: &str, term: u64) -> InboundOutcome {
        if term < self.current_term {
            return InboundOutcome::Stale;
        }
        if self.status == NodeStatus::Leader && term == self.current_term {
            return InboundOutcome::Rejected;
        }

        self.follow(leader_id, term)
    }

    /// First-come-first-served vote: only a proposal for a newer term is accepted, which also
    /// raises the term so a second proposal for the same term is refused.
    pub fn accept_candidate_proposal(&mut self, candidate_id: &str, term: u64) -> InboundOutcome {
        if term < self.current_term {
            return InboundOutcome::Stale;
        }
        if term == self.current_term {
            return InboundOutcome::Rejected;
        }

        self.follow(candidate_id, term)
    }

    fn follow(&mut self, leader_id: &str, term: u64) -> InboundOutcome {
        let stepped_down = self.status == NodeStatus::Leader;

        self.current_term = term;
        self.status = NodeStatus::Follower;
        self.current_leader_id = Some(leader_id.to_string());

        InboundOutcome::Accepted { stepped_down }
    }
}
