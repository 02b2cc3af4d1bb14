use crossbeam_channel::{Receiver, Sender};

use std::time::Duration;

use leader_election::{new_err, ErrorKind, PeerRequest, RaftError};

/// Request channel of a node. Every request travels with its own response channel, so
/// concurrent requesters never receive each other's responses.
#[derive(Clone, Debug)]
pub struct DuplexChannel<Request, Response> {
    name: String,
    timeout_duration: Duration,

    request_tx: Sender<PeerRequest<Request, Response>>,
    request_rx: Receiver<PeerRequest<Request, Response>>,
}

impl<Request, Response> DuplexChannel<Request, Response> {
    /// Creates new DuplexChannel with the name and communication timeout on recv's and send's.
    pub fn new(name: String, timeout_duration: Duration) -> DuplexChannel<Request, Response> {
        let (request_tx, request_rx) = crossbeam_channel::bounded(0);

        DuplexChannel {
            name,
            timeout_duration,
            request_tx,
            request_rx,
        }
    }

    /// Returns the receiver channel for the requests.
    pub fn request_rx(&self) -> Receiver<PeerRequest<Request, Response>> {
        self.request_rx.clone()
    }

    /// Sends request and waits for the response. Both steps are bounded by the channel timeout.
    pub fn send_request(&self, request: Request) -> Result<Response, RaftError> {
        let (response_tx, response_rx) = crossbeam_channel::bounded(1);
        let peer_request = PeerRequest {
            request,
            response_tx,
        };

        if let Err(err) = self
            .request_tx
            .send_timeout(peer_request, self.timeout_duration)
        {
            return new_err(
                ErrorKind::PeerUnreachable,
                format!("Cannot send request. Channel : {}", self.name),
                err.to_string(),
            );
        }

        match response_rx.recv_timeout(self.timeout_duration) {
            Ok(response) => Ok(response),
            Err(err) => new_err(
                ErrorKind::PeerUnreachable,
                format!("Cannot receive response. Channel : {}", self.name),
                err.to_string(),
            ),
        }
    }
}
