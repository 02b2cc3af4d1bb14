use leader_election::ElectionTimer;
use std::time::Duration;

/// Election timeout equal to the heartbeat timeout.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq, Hash)]
pub struct FixedElectionTimer;

impl FixedElectionTimer {
    pub fn new() -> FixedElectionTimer {
        FixedElectionTimer
    }
}

impl ElectionTimer for FixedElectionTimer {
    fn next_election_timeout(&self, heartbeat_timeout: Duration) -> Duration {
        heartbeat_timeout
    }
}
