use crossbeam_channel::{Receiver, Sender};
use std::thread;
use std::thread::JoinHandle;

pub mod peer_consensus_requester;

/// Peer response that can be counted towards a quorum.
pub trait QuorumResponse {
    fn get_result(&self) -> bool;
}

/// Long-running thread with its termination channel.
#[derive(Debug)]
pub struct Worker {
    pub join_handle: JoinHandle<()>,
    pub terminate_worker_tx: Sender<()>,
}

pub fn run_worker<T: Send + 'static, F: Fn(T, Receiver<()>) + Send + 'static>(
    worker: F,
    params: T,
) -> Worker {
    let (terminate_worker_tx, terminate_worker_rx): (Sender<()>, Receiver<()>) =
        crossbeam_channel::unbounded();

    let join_handle = thread::spawn(move || worker(params, terminate_worker_rx));

    Worker {
        join_handle,
        terminate_worker_tx,
    }
}

impl Worker {
    pub fn terminate(self) {
        let send_result = self.terminate_worker_tx.send(());
        if send_result.is_err() {
            error!("Cannot send termination signal")
        }

        let join_result = self.join_handle.join();
        if join_result.is_err() {
            error!("Worker returned an error")
        }
    }
}
