pub mod failover;
pub mod no_quorum;
pub mod single_node;
pub mod smoke;
