//! Index tasks and per-dispatch batching.

use std::fmt;

use ahash::AHashMap;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::queue::priority::Priority;
use crate::reference::EntityReference;

/// Whether a task (re-)indexes its target or removes it from the index.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TaskKind {
    Index,
    Delete,
}

/// One pending index or delete operation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IndexTask {
    pub target: EntityReference,
    pub kind: TaskKind,
    pub priority: Priority,
    /// Apply the change without emitting further change notifications.
    pub disable_event_notification: bool,
    pub queued_at: DateTime<Utc>,
}

impl IndexTask {
    pub fn new(target: EntityReference, kind: TaskKind, priority: Priority) -> Self {
        IndexTask {
            target,
            kind,
            priority,
            disable_event_notification: false,
            queued_at: Utc::now(),
        }
    }

    pub fn index(target: impl Into<EntityReference>, priority: Priority) -> Self {
        Self::new(target.into(), TaskKind::Index, priority)
    }

    pub fn delete(target: impl Into<EntityReference>, priority: Priority) -> Self {
        Self::new(target.into(), TaskKind::Delete, priority)
    }

    pub fn with_disable_event_notification(mut self, disable: bool) -> Self {
        self.disable_event_notification = disable;
        self
    }

    pub fn identity(&self) -> String {
        self.target.identity()
    }
}

impl fmt::Display for IndexTask {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:?} {} ({:?})", self.kind, self.target, self.priority)
    }
}

/// Tasks collected for one dispatch.
///
/// Holds at most one task per identity and kind. A repeated request raises
/// the priority to the highest one asked for, and notifications stay
/// suppressed only if every request suppressed them.
#[derive(Debug, Default)]
pub struct TaskBatch {
    tasks: AHashMap<(String, TaskKind), (u64, IndexTask)>,
    next_seq: u64,
}

impl TaskBatch {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, task: IndexTask) {
        let key = (task.identity(), task.kind);
        match self.tasks.get_mut(&key) {
            Some((_, pending)) => {
                pending.priority = pending.priority.max(task.priority);
                pending.disable_event_notification &= task.disable_event_notification;
            }
            None => {
                self.tasks.insert(key, (self.next_seq, task));
                self.next_seq += 1;
            }
        }
    }

    pub fn extend(&mut self, tasks: impl IntoIterator<Item = IndexTask>) {
        for task in tasks {
            self.push(task);
        }
    }

    pub fn len(&self) -> usize {
        self.tasks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tasks.is_empty()
    }

    /// The pending task for `identity` and `kind`, if any.
    pub fn get(&self, identity: &str, kind: TaskKind) -> Option<&IndexTask> {
        self.tasks
            .get(&(identity.to_string(), kind))
            .map(|(_, task)| task)
    }

    /// Highest priority first; equal priorities in submission order.
    pub fn into_ordered(self) -> Vec<IndexTask> {
        let mut tasks: Vec<(u64, IndexTask)> = self.tasks.into_values().collect();
        tasks.sort_by(|(seq_a, a), (seq_b, b)| {
            b.priority.cmp(&a.priority).then(seq_a.cmp(seq_b))
        });
        tasks.into_iter().map(|(_, task)| task).collect()
    }
}
