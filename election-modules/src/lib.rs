//! Pluggable modules for the `leader-election` crate: the in-process peer transport and the
//! election timers.

#[macro_use]
extern crate log;
extern crate crossbeam_channel;
extern crate leader_election;

mod communication;
mod election;

pub use communication::duplex_channel::DuplexChannel;
pub use communication::inproc_peer_communicator::InProcPeerCommunicator;
pub use election::fixed_election_timer::FixedElectionTimer;
pub use election::randomized_election_timer::RandomizedElectionTimer;
