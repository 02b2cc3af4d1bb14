//! # Leader election test cases
//!
//! This subproject provides integration tests for the leader election running on an
//! in-process cluster.

#[macro_use]
extern crate log;
pub mod cases;
mod steps;

#[cfg(test)]
mod tests {
    use crate::cases;

    #[test]
    fn smoke() {
        cases::smoke::run();
    }

    #[test]
    fn single_node() {
        cases::single_node::run();
    }

    #[test]
    fn no_quorum() {
        cases::no_quorum::run();
    }

    #[test]
    fn failover() {
        cases::failover::run();
    }
}
