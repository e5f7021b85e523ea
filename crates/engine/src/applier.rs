//! The background index applier.
//!
//! Drains queued index operations into local batches and applies each
//! batch to the index under the store mutex, in receive order (spec
//! §4.4). Flush triggers, in priority order: batch reaches the
//! configured size, an explicit flush request, shutdown, or an idle
//! timer. Mirrors the shape of [`durakv_durability::wal::writer::Wal`]'s
//! background loop — a single thread selecting over a channel, a
//! timeout, and a shutdown flag — generalized from "fsync a byte
//! buffer" to "apply ops to an index".

use std::sync::mpsc::{sync_channel, Receiver, RecvTimeoutError, SyncSender};
use std::sync::Arc;
use std::thread::JoinHandle;
use std::time::Duration;

use parking_lot::Mutex;

use durakv_core::Operation;

use crate::state::StoreState;

/// A message sent to the applier.
enum Message {
    Op(Operation),
    Flush,
    Shutdown,
}

/// Handle to the running applier thread.
pub struct Applier {
    tx: SyncSender<Message>,
    worker: Option<JoinHandle<()>>,
}

impl Applier {
    /// Spawn the applier thread against the store's shared state.
    /// `state` is also touched by recovery before this is ever started
    /// (spec §4.6), and by the foreground path for transaction-buffer
    /// reads — never concurrently with this thread's index mutation,
    /// since both go through the same mutex.
    pub fn spawn(
        state: Arc<Mutex<StoreState>>,
        capacity: usize,
        batch_trigger: usize,
        idle: Duration,
    ) -> Self {
        let (tx, rx) = sync_channel(capacity);
        let worker = std::thread::Builder::new()
            .name("durakv-index-applier".into())
            .spawn(move || run_applier(state, rx, batch_trigger, idle))
            .expect("failed to spawn index applier thread");

        Applier {
            tx,
            worker: Some(worker),
        }
    }

    /// Enqueue an operation for eventual application to the index.
    /// Blocks once the channel is full, back-pressuring the caller
    /// (spec §5).
    pub fn enqueue(&self, op: Operation) {
        let _ = self.tx.send(Message::Op(op));
    }

    /// Ask the applier to flush its current batch without waiting for
    /// it to complete. Used by `Commit` to drain the applier promptly
    /// (spec §4.5).
    pub fn request_flush(&self) {
        let _ = self.tx.send(Message::Flush);
    }

    /// Signal shutdown and join the worker thread. The worker performs
    /// a final flush before exiting.
    pub fn close(mut self) {
        let _ = self.tx.send(Message::Shutdown);
        if let Some(worker) = self.worker.take() {
            let _ = worker.join();
        }
    }
}

impl Drop for Applier {
    fn drop(&mut self) {
        if let Some(worker) = self.worker.take() {
            let _ = self.tx.send(Message::Shutdown);
            let _ = worker.join();
        }
    }
}

fn run_applier(
    state: Arc<Mutex<StoreState>>,
    rx: Receiver<Message>,
    batch_trigger: usize,
    idle: Duration,
) {
    let mut batch: Vec<Operation> = Vec::new();

    loop {
        match rx.recv_timeout(idle) {
            Ok(Message::Op(op)) => {
                batch.push(op);
                if batch.len() >= batch_trigger {
                    apply_batch(&state, &mut batch);
                }
            }
            Ok(Message::Flush) => {
                apply_batch(&state, &mut batch);
            }
            Ok(Message::Shutdown) => {
                apply_batch(&state, &mut batch);
                break;
            }
            Err(RecvTimeoutError::Timeout) => {
                apply_batch(&state, &mut batch);
            }
            Err(RecvTimeoutError::Disconnected) => {
                apply_batch(&state, &mut batch);
                break;
            }
        }
    }
}

fn apply_batch(state: &Arc<Mutex<StoreState>>, batch: &mut Vec<Operation>) {
    if batch.is_empty() {
        return;
    }
    let applied = batch.len();
    let mut state = state.lock();
    for op in batch.drain(..) {
        match op {
            Operation::Set { key, value } => state.index.insert(key, value),
            Operation::Del { key } => {
                state.index.delete(&key);
            }
        }
    }
    drop(state);
    tracing::trace!(applied, "index applier flushed a batch");
}
