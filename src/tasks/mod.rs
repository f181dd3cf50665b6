// Copyright (C) 2026  Caprica Software Limited
//
// This program is free software: you can redistribute it and/or modify
// it under the terms of the GNU General Public License as published by
// the Free Software Foundation, either version 3 of the License, or
// (at your option) any later version.
//
// This program is distributed in the hope that it will be useful,
// but WITHOUT ANY WARRANTY; without even the implied warranty of
// MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE.  See the
// GNU General Public License for more details.
//
// You should have received a copy of the GNU General Public License
// along with this program.  If not, see <https://www.gnu.org/licenses/>.

//! Background persistence.
//!
//! Writes to the [`PersistenceGate`] may block on disk, so they are handed to
//! a dedicated worker thread and never awaited by the code that issued them.
//! Each write carries a complete snapshot, so the worker needs no merging and
//! the last write for a key always wins.
//!
//! Reads are rare (once at startup) and are served directly on the calling
//! thread.

use std::{
    sync::{
        Arc,
        mpsc::{self, Receiver, Sender},
    },
    thread,
};

use anyhow::{Context, Result};

use crate::{error::Error, store::PersistenceGate};

#[derive(Debug)]
pub(crate) enum StoreTask {
    Save { key: String, value: String },
    Remove { key: String },

    /// Acknowledged once every task queued before it has been applied.
    Flush(Sender<()>),
}

impl StoreTask {
    /// Short description for logs, without the payload.
    fn describe(&self) -> String {
        match self {
            StoreTask::Save { key, .. } => format!("save of {key}"),
            StoreTask::Remove { key } => format!("removal of {key}"),
            StoreTask::Flush(_) => "flush".to_string(),
        }
    }
}

/// Cloneable handle to a running store worker.
#[derive(Clone)]
pub struct StoreHandle {
    gate: Arc<dyn PersistenceGate>,
    task_tx: Sender<StoreTask>,
}

/// Spawns a background thread to apply store writes.
///
/// The worker exits once every [`StoreHandle`] for it has been dropped and
/// its queue is drained.
///
/// # Arguments
///
/// * `gate` - The store the worker writes to.
pub fn spawn_store_worker(gate: Arc<dyn PersistenceGate>) -> StoreHandle {
    let (task_tx, task_rx) = mpsc::channel();

    let worker_gate = Arc::clone(&gate);
    thread::spawn(move || run_worker(worker_gate.as_ref(), task_rx));

    StoreHandle { gate, task_tx }
}

fn run_worker(gate: &dyn PersistenceGate, task_rx: Receiver<StoreTask>) {
    while let Ok(task) = task_rx.recv() {
        if let Err(e) = handle_task(gate, task) {
            tracing::error!("Store write failed: {:#}", e);
        }
    }

    tracing::debug!("Store worker stopped");
}

fn handle_task(gate: &dyn PersistenceGate, task: StoreTask) -> Result<()> {
    match task {
        StoreTask::Save { key, value } => gate
            .save(&key, &value)
            .with_context(|| format!("Failed to save {key}")),

        StoreTask::Remove { key } => gate
            .remove(&key)
            .with_context(|| format!("Failed to remove {key}")),

        StoreTask::Flush(ack) => {
            // The flusher may have given up waiting.
            let _ = ack.send(());
            Ok(())
        }
    }
}

impl StoreHandle {
    /// Reads `key` synchronously from the underlying store.
    pub fn load(&self, key: &str) -> crate::Result<Option<String>> {
        self.gate.load(key)
    }

    /// Queues a write of `value` under `key` and returns immediately.
    pub fn save(&self, key: &str, value: String) {
        self.send(StoreTask::Save {
            key: key.to_string(),
            value,
        });
    }

    /// Queues removal of `key` and returns immediately.
    pub fn remove(&self, key: &str) {
        self.send(StoreTask::Remove {
            key: key.to_string(),
        });
    }

    /// Blocks until every write queued so far has been applied.
    ///
    /// # Errors
    ///
    /// Returns [`Error::WorkerStopped`] if the worker thread is gone.
    pub fn flush(&self) -> crate::Result<()> {
        let (ack_tx, ack_rx) = mpsc::channel();

        self.task_tx
            .send(StoreTask::Flush(ack_tx))
            .map_err(|_| Error::WorkerStopped)?;

        ack_rx.recv().map_err(|_| Error::WorkerStopped)
    }

    fn send(&self, task: StoreTask) {
        if let Err(e) = self.task_tx.send(task) {
            tracing::warn!("Store worker gone, dropping {}", e.0.describe());
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::MemoryStore;

    struct FailingStore;

    impl PersistenceGate for FailingStore {
        fn load(&self, _key: &str) -> crate::Result<Option<String>> {
            Ok(None)
        }

        fn save(&self, _key: &str, _value: &str) -> crate::Result<()> {
            Err(Error::WorkerStopped)
        }

        fn remove(&self, _key: &str) -> crate::Result<()> {
            Err(Error::WorkerStopped)
        }
    }

    #[test]
    fn writes_apply_in_order() {
        let store = MemoryStore::new();
        let handle = spawn_store_worker(Arc::new(store.clone()));

        handle.save("k", "one".to_string());
        handle.save("k", "two".to_string());
        handle.save("other", "x".to_string());
        handle.remove("other");
        handle.flush().unwrap();

        assert_eq!(store.get("k").as_deref(), Some("two"));
        assert_eq!(store.get("other"), None);
    }

    #[test]
    fn task_description_omits_payload() {
        let task = StoreTask::Save {
            key: "pin-storage".to_string(),
            value: r#"{"pinnedVideos":[{"id":9}]}"#.to_string(),
        };

        assert_eq!(task.describe(), "save of pin-storage");
        assert_eq!(
            StoreTask::Remove { key: "k".to_string() }.describe(),
            "removal of k"
        );
    }

    #[test]
    fn load_reads_through() {
        let store = MemoryStore::new();
        store.insert("k", "v");
        let handle = spawn_store_worker(Arc::new(store));

        assert_eq!(handle.load("k").unwrap().as_deref(), Some("v"));
    }

    #[test]
    fn failed_writes_do_not_stop_the_worker() {
        let handle = spawn_store_worker(Arc::new(FailingStore));

        handle.save("k", "v".to_string());
        handle.remove("k");

        assert!(handle.flush().is_ok());
    }
}
