use std::time::Duration;

pub mod coordinator;
pub mod election;
pub mod heartbeat_sender;


/// Recurring task that starts an election when no leader was heard from in time.
pub const ELECTION_TIMEOUT_TASK: &str = "leader_heartbeat_timeout";

/// Recurring task of the leader broadcasting heartbeats.
pub const LEADER_HEARTBEAT_TASK: &str = "leader_heartbeat";

/// Source of the election timeout. Asked each time the election timeout is armed.
pub trait ElectionTimer: Send + Sync + 'static {
    fn next_election_timeout(&self, heartbeat_timeout: Duration) -> Duration;
}
