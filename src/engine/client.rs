// src/engine/client.rs

use std::fmt;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::{info, warn};

use crate::dag::JobOrderer;
use crate::engine::ClientEvent;
use crate::engine::sequence::JobSequence;
use crate::engine::worker::run_worker;
use crate::exec::ConnectionFactory;
use crate::net::host_and_port;

/// State shared between the client handle and all of its workers.
pub(crate) struct ClientShared<F, O> {
    factory: F,
    pub(crate) jobs: JobSequence<O>,
    events: mpsc::UnboundedSender<ClientEvent>,
    finished: AtomicBool,
}

impl<F, O: JobOrderer> ClientShared<F, O> {
    pub(crate) fn emit(&self, event: ClientEvent) {
        // Nobody listening is fine; the work still gets done.
        let _ = self.events.send(event);
    }

    /// Emit the terminal event. Only the first call has any effect.
    pub(crate) fn finish(&self, success: bool) {
        if self.finished.swap(true, Ordering::SeqCst) {
            return;
        }
        info!(success, "distribution finished");
        self.emit(ClientEvent::Done { success });
    }

    pub(crate) fn quit(&self) {
        self.finish(false);
        self.jobs.cancel();
    }
}

/// Distributes the jobs of one orderer among every daemon it is introduced
/// to.
///
/// Each successful [`Client::introduce`] starts one worker bound to that
/// connection. Workers pull from a shared [`JobSequence`], so daemons can be
/// added at any time without the orderer knowing how many there are.
/// Progress and the final outcome are reported through the event receiver
/// returned by [`Client::new`].
pub struct Client<F, O> {
    shared: Arc<ClientShared<F, O>>,
}

impl<F, O> Clone for Client<F, O> {
    fn clone(&self) -> Self {
        Self {
            shared: Arc::clone(&self.shared),
        }
    }
}

impl<F, O> fmt::Debug for Client<F, O> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Client")
            .field("finished", &self.shared.finished.load(Ordering::SeqCst))
            .finish_non_exhaustive()
    }
}

impl<F, O> Client<F, O>
where
    F: ConnectionFactory,
    O: JobOrderer + 'static,
{
    /// Create a client. Nothing runs until a daemon is introduced.
    pub fn new(factory: F, orderer: O) -> (Self, mpsc::UnboundedReceiver<ClientEvent>) {
        let (events, events_rx) = mpsc::unbounded_channel();
        let client = Self {
            shared: Arc::new(ClientShared {
                factory,
                jobs: JobSequence::new(orderer),
                events,
                finished: AtomicBool::new(false),
            }),
        };
        (client, events_rx)
    }

    /// Connect to a daemon and start a worker on it.
    ///
    /// Fire-and-forget: a connection failure is reported as
    /// [`ClientEvent::ConnectFailed`] and does not disturb other workers. The
    /// returned handle resolves once the worker has released its connection.
    pub fn introduce(&self, host: impl Into<String>, port: u16) -> JoinHandle<()> {
        let shared = Arc::clone(&self.shared);
        let host = host.into();

        tokio::spawn(async move {
            let address = host_and_port(&host, port);
            let connected = shared.factory.connect(&host, port).await;

            match connected {
                Ok(connection) => run_worker(shared, connection, address).await,
                Err(error) => {
                    warn!(%address, %error, "failed to connect to daemon");
                    shared.emit(ClientEvent::ConnectFailed { address, error });
                }
            }
        })
    }

    /// Stop every worker and report the overall operation as failed.
    ///
    /// Jobs already running on a daemon are allowed to finish; no new job is
    /// handed out afterwards.
    pub fn quit(&self) {
        info!("quit requested");
        self.shared.quit();
    }

    /// Whether the terminal event has been emitted.
    pub fn is_finished(&self) -> bool {
        self.shared.finished.load(Ordering::SeqCst)
    }

    /// The job sequence the workers pull from.
    pub fn jobs(&self) -> &JobSequence<O> {
        &self.shared.jobs
    }
}
