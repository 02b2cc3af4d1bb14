use std::sync::Arc;

use crate::common;
use crate::common::Worker;
use crate::communication::peers::{PeerRequestChannels, PeerRequestHandler};
use crate::errors::Result;
use crate::leadership::coordinator::ElectionCoordinator;
use crate::request_handler::peer::{process_peer_request, PeerRequestHandlerParams};
use crate::ElectionTimer;

pub mod configuration;
pub mod state;

use configuration::NodeConfiguration;
use state::NodeState;

/// Running node: the election coordinator with the worker serving its inbound peer requests.
#[derive(Debug)]
pub struct NodeHandle<Pc, Et>
where
    Pc: PeerRequestHandler + PeerRequestChannels,
    Et: ElectionTimer,
{
    coordinator: Arc<ElectionCoordinator<Pc, Et>>,
    peer_request_worker: Worker,
}

pub fn start<Pc, Et>(node_config: NodeConfiguration<Pc, Et>) -> Result<NodeHandle<Pc, Et>>
where
    Pc: PeerRequestHandler + PeerRequestChannels,
    Et: ElectionTimer,
{
    let peer_communicator = node_config.peer_communicator.clone();
    let coordinator = ElectionCoordinator::start(node_config)?;

    let peer_request_worker = common::run_worker(
        process_peer_request::<Pc, Et>,
        PeerRequestHandlerParams {
            coordinator: coordinator.clone(),
            peer_communicator,
        },
    );

    info!("Node {} started", coordinator.node_id());

    Ok(NodeHandle {
        coordinator,
        peer_request_worker,
    })
}

impl<Pc, Et> NodeHandle<Pc, Et>
where
    Pc: PeerRequestHandler + PeerRequestChannels,
    Et: ElectionTimer,
{
    pub fn node_id(&self) -> &str {
        self.coordinator.node_id()
    }

    pub fn status(&self) -> NodeState {
        self.coordinator.status()
    }

    pub fn coordinator(&self) -> &Arc<ElectionCoordinator<Pc, Et>> {
        &self.coordinator
    }

    /// Stops the recurring election tasks and the peer request worker.
    pub fn terminate(self) {
        let node_id = self.coordinator.node_id().to_string();
        info!("Node {} termination requested", node_id);

        self.coordinator.shutdown();
        self.peer_request_worker.terminate();

        info!("Node {} shutting down", node_id);
    }
}
