use std::sync::Arc;

use dashmap::DashMap;
use thiserror::Error;
use tokio::sync::oneshot;

use super::types::{ModuleOutcome, RenderError};

/// Per-dispatch result channels for in-flight module renders.
///
/// The coordinator registers a tracking key before spawning each render
/// task; the task delivers exactly one [`ModuleOutcome`] and the matching
/// receiver is awaited at the join barrier. Keys are unique per dispatch,
/// not per module identity, so duplicate identities among siblings cannot
/// collide here. Results are only ever read after every task has finished.
#[derive(Default, Clone)]
pub struct FragmentMailbox {
    inner: Arc<DashMap<String, oneshot::Sender<ModuleOutcome>>>,
}

impl FragmentMailbox {
    pub fn new() -> Self {
        Self {
            inner: Arc::new(DashMap::new()),
        }
    }

    /// Register a tracking key and obtain the receiver the coordinator will
    /// await for this dispatch.
    pub fn register(&self, tracking_key: String) -> oneshot::Receiver<ModuleOutcome> {
        let (tx, rx) = oneshot::channel();
        self.inner.insert(tracking_key, tx);
        rx
    }

    /// Deliver the outcome for a previously registered tracking key. Each
    /// key accepts at most one delivery; the channel is consumed.
    pub fn deliver(
        &self,
        tracking_key: &str,
        outcome: ModuleOutcome,
    ) -> Result<(), MailboxError> {
        match self.inner.remove(tracking_key) {
            Some((_key, sender)) => sender
                .send(outcome)
                .map_err(|_| MailboxError::ChannelClosed),
            None => Err(MailboxError::UnknownTrackingKey),
        }
    }

    /// Resolve a pending dispatch as failed. Used when the render task never
    /// reached its own delivery, for example because it panicked.
    pub fn cancel(&self, tracking_key: &str, error: RenderError) {
        if let Some((_key, sender)) = self.inner.remove(tracking_key) {
            let _ = sender.send(ModuleOutcome::Failed(error));
        }
    }

    /// Number of dispatches that have registered but not yet delivered.
    pub fn in_flight(&self) -> usize {
        self.inner.len()
    }
}

#[derive(Debug, Error)]
pub enum MailboxError {
    #[error("fragment mailbox channel already closed")]
    ChannelClosed,
    #[error("unknown fragment tracking key")]
    UnknownTrackingKey,
}
