use std::sync::Arc;
use std::time::{Duration, Instant};

use tokio::sync::{mpsc, watch};
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

use liverelay_core::error::{RelayError, Result};
use liverelay_core::protocol::frame::RelayPayload;

use crate::avatar::AvatarResolver;
use crate::obs::BridgeMetrics;
use crate::relay::sender::{Connector, RelaySender};

/// One chat message waiting to be forwarded.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RelayJob {
    pub room_id: u64,
    pub uid: i64,
    pub uname: String,
    pub msg: String,
}

/// Producer side of the relay queue. Cheap to clone; never blocks.
#[derive(Clone)]
pub struct RelayHandle {
    tx: mpsc::Sender<RelayJob>,
    metrics: Arc<BridgeMetrics>,
}

impl RelayHandle {
    /// Queue a job. A full or closed queue drops the job and reports it.
    pub fn enqueue(&self, job: RelayJob) -> Result<()> {
        match self.tx.try_send(job) {
            Ok(()) => Ok(()),
            Err(mpsc::error::TrySendError::Full(job)) => {
                self.metrics.relay_queue_dropped.inc(&[("reason", "full")]);
                Err(RelayError::RelayUnavailable(format!(
                    "queue full, dropped message from uid {}",
                    job.uid
                )))
            }
            Err(mpsc::error::TrySendError::Closed(job)) => {
                self.metrics.relay_queue_dropped.inc(&[("reason", "closed")]);
                Err(RelayError::RelayUnavailable(format!(
                    "relay shut down, dropped message from uid {}",
                    job.uid
                )))
            }
        }
    }

    /// Jobs currently buffered.
    pub fn queued(&self) -> usize {
        self.tx.max_capacity() - self.tx.capacity()
    }
}

/// Bounded queue between the dispatch path and the relay worker.
pub fn relay_channel(
    capacity: usize,
    metrics: Arc<BridgeMetrics>,
) -> (RelayHandle, mpsc::Receiver<RelayJob>) {
    let (tx, rx) = mpsc::channel(capacity.max(1));
    (RelayHandle { tx, metrics }, rx)
}

/// Single consumer of the relay queue and sole owner of the connection.
pub struct RelayWorker<C: Connector> {
    rx: mpsc::Receiver<RelayJob>,
    sender: RelaySender<C>,
    resolver: Arc<AvatarResolver>,
    metrics: Arc<BridgeMetrics>,
}

impl<C: Connector + 'static> RelayWorker<C> {
    pub fn new(
        rx: mpsc::Receiver<RelayJob>,
        sender: RelaySender<C>,
        resolver: Arc<AvatarResolver>,
        metrics: Arc<BridgeMetrics>,
    ) -> Self {
        Self {
            rx,
            sender,
            resolver,
            metrics,
        }
    }

    /// Process jobs until every handle is dropped or `shutdown` fires. On
    /// shutdown the queue is closed and whatever is already buffered is still
    /// forwarded.
    pub async fn run(mut self, mut shutdown: watch::Receiver<bool>) {
        loop {
            tokio::select! {
                biased;
                job = self.rx.recv() => match job {
                    Some(job) => self.forward(job).await,
                    None => break,
                },
                _ = shutdown.changed() => {
                    self.rx.close();
                    while let Some(job) = self.rx.recv().await {
                        self.forward(job).await;
                    }
                    break;
                }
            }
        }
        info!("relay worker stopped");
    }

    /// Resolve the avatar and write one frame. Failures are logged and the
    /// job is dropped; the sender reconnects on the next job.
    pub async fn forward(&mut self, job: RelayJob) {
        let started = Instant::now();
        let face = self.resolver.resolve(job.uid).await;

        let payload = RelayPayload {
            uid: job.uid,
            uname: job.uname,
            msg: job.msg,
            face_path: face.to_string_lossy().into_owned(),
        };

        match self.sender.send(&payload).await {
            Ok(()) => {
                self.metrics.relay_frames.inc(&[("result", "ok")]);
                debug!(room_id = job.room_id, uid = payload.uid, "chat message relayed");
            }
            Err(e) => {
                self.metrics.relay_frames.inc(&[("result", "error")]);
                self.metrics.relay_errors.inc(&[("code", e.code().as_str())]);
                warn!(room_id = job.room_id, uid = payload.uid, code = e.code().as_str(), error = %e, "relay send failed");
            }
        }

        self.metrics
            .relay_send_duration
            .observe(&[], started.elapsed());
    }
}

/// Running relay: the producer handle plus what is needed to stop it.
pub struct RelayRuntime {
    pub handle: RelayHandle,
    shutdown: watch::Sender<bool>,
    join: JoinHandle<()>,
}

impl RelayRuntime {
    /// Stop accepting jobs and wait up to `drain` for the buffered ones.
    pub async fn shutdown(self, drain: Duration) {
        let _ = self.shutdown.send(true);
        drop(self.handle);
        match tokio::time::timeout(drain, self.join).await {
            Ok(_) => info!("relay drained"),
            Err(_) => warn!(drain_ms = drain.as_millis() as u64, "relay drain timed out, abandoning queued messages"),
        }
    }
}

/// Spawn the worker on the current runtime.
pub fn spawn_relay<C: Connector + 'static>(
    capacity: usize,
    sender: RelaySender<C>,
    resolver: Arc<AvatarResolver>,
    metrics: Arc<BridgeMetrics>,
) -> RelayRuntime {
    let (handle, rx) = relay_channel(capacity, Arc::clone(&metrics));
    let (shutdown, shutdown_rx) = watch::channel(false);
    let worker = RelayWorker::new(rx, sender, resolver, metrics);
    let join = tokio::spawn(worker.run(shutdown_rx));
    RelayRuntime {
        handle,
        shutdown,
        join,
    }
}
