//! Hands index events to this node's index writer.

use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use log::{debug, error, warn};
use parking_lot::RwLock;

use crate::error::EngineError;
use crate::queue::bus::Listener;
use crate::queue::event::IndexEvent;
use crate::queue::task::IndexTask;

/// The external component that applies tasks to the index.
pub trait IndexWriter: Send + Sync {
    fn apply(&self, task: IndexTask) -> Result<(), EngineError>;
}

/// Looks up the index writer. The writer may not be running yet.
pub trait WriterLookup: Send + Sync {
    fn writer(&self) -> Option<Arc<dyn IndexWriter>>;
}

impl<F> WriterLookup for F
where
    F: Fn() -> Option<Arc<dyn IndexWriter>> + Send + Sync,
{
    fn writer(&self) -> Option<Arc<dyn IndexWriter>> {
        self()
    }
}

/// A writer installed once it is up.
#[derive(Default)]
pub struct WriterSlot {
    writer: RwLock<Option<Arc<dyn IndexWriter>>>,
}

impl WriterSlot {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set(&self, writer: Arc<dyn IndexWriter>) {
        *self.writer.write() = Some(writer);
    }

    pub fn clear(&self) {
        *self.writer.write() = None;
    }
}

impl WriterLookup for WriterSlot {
    fn writer(&self) -> Option<Arc<dyn IndexWriter>> {
        self.writer.read().clone()
    }
}

/// Dispatch counters.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DispatchStats {
    pub applied: u64,
    pub dropped: u64,
    pub failed: u64,
}

/// Remote listener on the index channel.
///
/// Tasks arriving while no writer is available are dropped; nothing is
/// retried.
pub struct IndexDispatcher {
    writers: Arc<dyn WriterLookup>,
    applied: AtomicU64,
    dropped: AtomicU64,
    failed: AtomicU64,
}

impl IndexDispatcher {
    pub fn new(writers: Arc<dyn WriterLookup>) -> Self {
        IndexDispatcher {
            writers,
            applied: AtomicU64::new(0),
            dropped: AtomicU64::new(0),
            failed: AtomicU64::new(0),
        }
    }

    pub fn dispatch(&self, task: IndexTask) {
        let Some(writer) = self.writers.writer() else {
            warn!("index writer not available, dropping {task}");
            self.dropped.fetch_add(1, Ordering::Relaxed);
            return;
        };

        debug!("applying {task}");
        let description = task.to_string();
        match writer.apply(task) {
            Ok(()) => {
                self.applied.fetch_add(1, Ordering::Relaxed);
            }
            Err(e) => {
                error!("index writer failed on {description}: {e}");
                self.failed.fetch_add(1, Ordering::Relaxed);
            }
        }
    }

    pub fn stats(&self) -> DispatchStats {
        DispatchStats {
            applied: self.applied.load(Ordering::Relaxed),
            dropped: self.dropped.load(Ordering::Relaxed),
            failed: self.failed.load(Ordering::Relaxed),
        }
    }
}

impl Listener<IndexEvent> for IndexDispatcher {
    fn name(&self) -> &str {
        "index-dispatcher"
    }

    fn on_event(&self, event: &IndexEvent) {
        self.dispatch(event.to_task());
    }
}
