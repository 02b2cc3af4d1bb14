pub mod duplex_channel;
pub mod inproc_peer_communicator;
