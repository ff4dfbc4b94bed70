//! Events carried on the queue channels.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::queue::context::ExecutionContext;
use crate::queue::priority::Priority;
use crate::queue::task::{IndexTask, TaskKind};
use crate::reference::{AttachmentReference, DocumentReference, EntityReference};

/// A change to stored content that may affect the index.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum ContentEvent {
    DocumentCreated(DocumentReference),
    DocumentUpdated(DocumentReference),
    DocumentDeleted(DocumentReference),
    AttachmentAdded(AttachmentReference),
    AttachmentUpdated(AttachmentReference),
    AttachmentDeleted(AttachmentReference),
    PartitionCreated(String),
    PartitionDeleted(String),
}

/// A content event together with the request context it happened in.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ContentChange {
    pub event: ContentEvent,
    #[serde(default)]
    pub context: ExecutionContext,
}

impl ContentChange {
    pub fn new(event: ContentEvent, context: ExecutionContext) -> Self {
        ContentChange { event, context }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct TaskPayload {
    pub priority: Priority,
    #[serde(default)]
    pub disable_event_notification: bool,
}

/// A generic index or delete request, delivered to every cluster node.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IndexEvent {
    pub kind: TaskKind,
    pub target: EntityReference,
    pub payload: TaskPayload,
    pub queued_at: DateTime<Utc>,
}

impl IndexEvent {
    pub fn to_task(&self) -> IndexTask {
        IndexTask {
            target: self.target.clone(),
            kind: self.kind,
            priority: self.payload.priority,
            disable_event_notification: self.payload.disable_event_notification,
            queued_at: self.queued_at,
        }
    }
}

impl From<IndexTask> for IndexEvent {
    fn from(task: IndexTask) -> Self {
        IndexEvent {
            kind: task.kind,
            target: task.target,
            payload: TaskPayload {
                priority: task.priority,
                disable_event_notification: task.disable_event_notification,
            },
            queued_at: task.queued_at,
        }
    }
}
