//! FIFO serialization of model switches.
//!
//! The backend keeps a single loaded model pair and needs two independent calls to change
//! it, so two switches must never interleave. Every [`ModelSwitchSerializer::switch`] call
//! becomes a task on an unbounded channel drained by one worker task:
//!
//! - tasks run strictly in the order `switch` was called
//! - at most one task has requests in flight
//! - a failed (or panicking) task only fails its own caller; the worker moves on
//!
//! There is no cancellation. Dropping the returned future does not withdraw the task.
//!
//! [`ModelSwitchSerializer::shared`] hands out one queue per remote backend, so separate
//! synthesizers talking to the same server still take turns.

use crate::backend::TtsBackend;
use crate::types::{ModelSelection, ModelSlot};
use crate::{Error, ErrorContext, Result};
use futures::FutureExt;
use std::collections::HashMap;
use std::future::Future;
use std::panic::AssertUnwindSafe;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use tokio::sync::{mpsc, oneshot};
use tracing::{debug, info, warn};

struct SwitchTask {
    selection: ModelSelection,
    reply: oneshot::Sender<Result<()>>,
}

#[derive(Clone, PartialEq, Eq, Hash)]
enum QueueKey {
    Instance(usize),
    Endpoint(String),
}

struct SharedQueue {
    tx: mpsc::WeakUnboundedSender<SwitchTask>,
    pending: Arc<AtomicUsize>,
}

// Entries hold weak senders; a queue shuts down once its last handle is dropped.
static SHARED_QUEUES: once_cell::sync::Lazy<Mutex<HashMap<QueueKey, SharedQueue>>> =
    once_cell::sync::Lazy::new(|| Mutex::new(HashMap::new()));

/// Handle to the switch queue. Cheap to clone; all clones feed the same worker.
#[derive(Clone)]
pub struct ModelSwitchSerializer {
    tx: mpsc::UnboundedSender<SwitchTask>,
    pending: Arc<AtomicUsize>,
}

impl ModelSwitchSerializer {
    /// Spawn the worker on the current Tokio runtime.
    pub fn new(backend: Arc<dyn TtsBackend>) -> Result<Self> {
        let handle = tokio::runtime::Handle::try_current().map_err(|e| {
            Error::runtime_with_context(
                format!("model switch queue needs a Tokio runtime: {}", e),
                ErrorContext::new().with_source("switch_queue"),
            )
        })?;
        let (tx, rx) = mpsc::unbounded_channel();
        let pending = Arc::new(AtomicUsize::new(0));
        handle.spawn(run_worker(backend, rx, pending.clone()));
        Ok(Self { tx, pending })
    }

    /// Queue for `backend`, shared with every live handle targeting the same remote state.
    ///
    /// Backends are matched by [`TtsBackend::queue_key`], or by `Arc` identity when the
    /// backend has no key. A new queue is spawned only when no live one matches.
    pub fn shared(backend: Arc<dyn TtsBackend>) -> Result<Self> {
        let key = match backend.queue_key() {
            Some(endpoint) => QueueKey::Endpoint(endpoint),
            None => QueueKey::Instance(Arc::as_ptr(&backend) as *const () as usize),
        };
        let mut queues = SHARED_QUEUES.lock().unwrap_or_else(|e| e.into_inner());
        queues.retain(|_, q| q.tx.upgrade().map_or(false, |tx| !tx.is_closed()));
        if let Some(existing) = queues.get(&key) {
            if let Some(tx) = existing.tx.upgrade() {
                debug!("reusing model switch queue");
                return Ok(Self {
                    tx,
                    pending: existing.pending.clone(),
                });
            }
        }
        let queue = Self::new(backend)?;
        queues.insert(
            key,
            SharedQueue {
                tx: queue.tx.downgrade(),
                pending: queue.pending.clone(),
            },
        );
        Ok(queue)
    }

    /// Whether both handles feed the same worker.
    pub fn same_queue(&self, other: &Self) -> bool {
        self.tx.same_channel(&other.tx)
    }

    /// Queue a switch to `selection`.
    ///
    /// The task is enqueued when this method is called, not when the future is first
    /// polled, so call order is execution order.
    pub fn switch(
        &self,
        selection: ModelSelection,
    ) -> impl Future<Output = Result<()>> + Send + 'static {
        let (reply, rx) = oneshot::channel();
        let enqueued = self.enqueue(SwitchTask { selection, reply });
        async move {
            enqueued?;
            rx.await.map_err(|_| queue_closed())?
        }
    }

    /// Tasks submitted but not yet finished, including the one in flight.
    pub fn pending(&self) -> usize {
        self.pending.load(Ordering::SeqCst)
    }

    pub fn is_closed(&self) -> bool {
        self.tx.is_closed()
    }

    fn enqueue(&self, task: SwitchTask) -> Result<()> {
        self.pending.fetch_add(1, Ordering::SeqCst);
        debug!(selection = %task.selection, "queueing model switch");
        self.tx.send(task).map_err(|_| {
            self.pending.fetch_sub(1, Ordering::SeqCst);
            queue_closed()
        })
    }
}

fn queue_closed() -> Error {
    Error::runtime_with_context(
        "model switch queue closed",
        ErrorContext::new().with_source("switch_queue"),
    )
}

async fn run_worker(
    backend: Arc<dyn TtsBackend>,
    mut rx: mpsc::UnboundedReceiver<SwitchTask>,
    pending: Arc<AtomicUsize>,
) {
    while let Some(SwitchTask { selection, reply }) = rx.recv().await {
        info!(%selection, "switching models");
        let outcome = AssertUnwindSafe(apply_selection(backend.as_ref(), &selection))
            .catch_unwind()
            .await
            .unwrap_or_else(|_| {
                Err(Error::runtime_with_context(
                    "model switch task panicked",
                    ErrorContext::new()
                        .with_source("switch_queue")
                        .with_details(selection.to_string()),
                ))
            });
        match &outcome {
            Ok(()) => info!(%selection, "both models switched"),
            Err(e) => warn!(%selection, "model switch failed: {}", e),
        }
        pending.fetch_sub(1, Ordering::SeqCst);
        if reply.send(outcome).is_err() {
            debug!(%selection, "switch caller dropped before completion");
        }
    }
    debug!("model switch queue closed");
}

async fn apply_selection(backend: &dyn TtsBackend, selection: &ModelSelection) -> Result<()> {
    for slot in ModelSlot::SWITCH_ORDER {
        backend
            .set_weights(slot, selection.id_for(slot))
            .await
            .map_err(|e| match e {
                Error::Switch { .. } => e,
                other => Error::switch(slot, other.to_string()),
            })?;
    }
    Ok(())
}
