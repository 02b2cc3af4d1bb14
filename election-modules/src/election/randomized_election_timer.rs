use leader_election::ElectionTimer;
use rand::Rng;
use std::time::Duration;

/// Heartbeat timeout extended by a random jitter, so that followers of a lost leader
/// rarely start competing elections at the same moment.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Hash)]
pub struct RandomizedElectionTimer {
    max_jitter_ms: u64,
}

impl RandomizedElectionTimer {
    /// Creates new RandomizedElectionTimer with the upper jitter bound in milliseconds (inclusive).
    pub fn new(max_jitter_ms: u64) -> RandomizedElectionTimer {
        RandomizedElectionTimer { max_jitter_ms }
    }
}

impl ElectionTimer for RandomizedElectionTimer {
    fn next_election_timeout(&self, heartbeat_timeout: Duration) -> Duration {
        let mut rng = rand::thread_rng();

        heartbeat_timeout + Duration::from_millis(rng.gen_range(0..=self.max_jitter_ms))
    }
}
