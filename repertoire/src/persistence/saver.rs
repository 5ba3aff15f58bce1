//! Debounced, fire-and-forget background writes.
//!
//! Callers hand over a serialized blob and move on. Writes are coalesced per
//! key until no new blob has arrived for the debounce window, then run on
//! the blocking pool. The outcome of each write is reported on an event
//! channel; a failure never touches the caller's in-memory state.

use std::collections::BTreeMap;
use std::sync::Arc;
use std::time::Duration;

use tokio::sync::{mpsc, oneshot};
use tokio::task::JoinHandle;

use super::KeyValueStore;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SaveEvent {
    Saved { key: String },
    Failed { key: String, error: String },
}

enum SaveCommand {
    Save { key: String, blob: String },
    Flush(oneshot::Sender<()>),
}

pub struct DebouncedSaver {
    tx: mpsc::UnboundedSender<SaveCommand>,
    task: JoinHandle<()>,
}

impl DebouncedSaver {
    /// Spawn the writer task. Must be called inside a tokio runtime.
    pub fn spawn<S>(store: Arc<S>, debounce: Duration) -> (Self, mpsc::UnboundedReceiver<SaveEvent>)
    where
        S: KeyValueStore + 'static,
    {
        let (tx, rx) = mpsc::unbounded_channel();
        let (event_tx, event_rx) = mpsc::unbounded_channel();
        let task = tokio::spawn(run_saver(store, debounce, rx, event_tx));
        (Self { tx, task }, event_rx)
    }

    /// Queue `blob` for `key`, replacing any blob still waiting for it.
    pub fn save(&self, key: &str, blob: String) {
        let cmd = SaveCommand::Save {
            key: key.to_string(),
            blob,
        };
        if self.tx.send(cmd).is_err() {
            tracing::warn!(key, "Saver task is gone, dropping write");
        }
    }

    /// Write everything pending now and wait until it is done.
    pub async fn flush(&self) {
        let (done_tx, done_rx) = oneshot::channel();
        if self.tx.send(SaveCommand::Flush(done_tx)).is_ok() {
            let _ = done_rx.await;
        }
    }

    /// Write everything pending and stop the task.
    pub async fn shutdown(self) {
        drop(self.tx);
        if let Err(e) = self.task.await {
            tracing::error!("Saver task failed: {}", e);
        }
    }
}

async fn run_saver<S: KeyValueStore + 'static>(
    store: Arc<S>,
    debounce: Duration,
    mut rx: mpsc::UnboundedReceiver<SaveCommand>,
    events: mpsc::UnboundedSender<SaveEvent>,
) {
    let mut pending: BTreeMap<String, String> = BTreeMap::new();
    loop {
        let cmd = if pending.is_empty() {
            rx.recv().await
        } else {
            match tokio::time::timeout(debounce, rx.recv()).await {
                Ok(cmd) => cmd,
                Err(_) => {
                    write_pending(&store, &mut pending, &events).await;
                    continue;
                }
            }
        };

        match cmd {
            Some(SaveCommand::Save { key, blob }) => {
                pending.insert(key, blob);
            }
            Some(SaveCommand::Flush(done)) => {
                write_pending(&store, &mut pending, &events).await;
                let _ = done.send(());
            }
            None => {
                write_pending(&store, &mut pending, &events).await;
                tracing::debug!("Save channel closed, saver exiting");
                break;
            }
        }
    }
}

async fn write_pending<S: KeyValueStore + 'static>(
    store: &Arc<S>,
    pending: &mut BTreeMap<String, String>,
    events: &mpsc::UnboundedSender<SaveEvent>,
) {
    for (key, blob) in std::mem::take(pending) {
        let store = Arc::clone(store);
        let write_key = key.clone();
        let result = tokio::task::spawn_blocking(move || store.set(&write_key, &blob)).await;
        let event = match result {
            Ok(Ok(())) => SaveEvent::Saved { key },
            Ok(Err(e)) => {
                tracing::warn!(key = %key, "Save failed: {}", e);
                SaveEvent::Failed {
                    key,
                    error: e.to_string(),
                }
            }
            Err(e) => {
                tracing::error!(key = %key, "Save task panicked: {}", e);
                SaveEvent::Failed {
                    key,
                    error: e.to_string(),
                }
            }
        };
        let _ = events.send(event);
    }
}
