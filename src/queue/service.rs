//! Turns content changes into index tasks.

use std::sync::Arc;

use log::{debug, warn};

use crate::config::QueueConfig;
use crate::content::ContentAccess;
use crate::queue::bus::{Channel, Listener};
use crate::queue::context::ExecutionContext;
use crate::queue::event::{ContentChange, ContentEvent, IndexEvent};
use crate::queue::priority::Priority;
use crate::queue::task::{IndexTask, TaskBatch, TaskKind};
use crate::reference::{AttachmentReference, EntityReference};

/// Producer side of the index queue.
///
/// Requests are resolved against the content store, collected in a
/// [`TaskBatch`] and published on the index channel. Failures are logged and
/// never reach the caller.
pub struct IndexQueue {
    config: QueueConfig,
    content: Arc<dyn ContentAccess>,
    index_channel: Arc<Channel<IndexEvent>>,
}

impl IndexQueue {
    pub fn new(
        config: QueueConfig,
        content: Arc<dyn ContentAccess>,
        index_channel: Arc<Channel<IndexEvent>>,
    ) -> Self {
        IndexQueue {
            config,
            content,
            index_channel,
        }
    }

    pub fn config(&self) -> &QueueConfig {
        &self.config
    }

    /// Explicit argument, then context override, then the configured default.
    pub fn resolve_priority(
        &self,
        explicit: Option<Priority>,
        target: &EntityReference,
        ctx: &ExecutionContext,
    ) -> Priority {
        explicit
            .or_else(|| ctx.priority_for(target))
            .unwrap_or(self.config.default_priority)
    }

    fn task(
        &self,
        target: EntityReference,
        kind: TaskKind,
        explicit: Option<Priority>,
        ctx: &ExecutionContext,
    ) -> IndexTask {
        let priority = self.resolve_priority(explicit, &target, ctx);
        IndexTask::new(target, kind, priority)
            .with_disable_event_notification(ctx.disable_event_notification())
    }

    /// Queue (re-)indexing of `target`.
    pub fn queue_index(
        &self,
        target: impl Into<EntityReference>,
        priority: Option<Priority>,
        ctx: &ExecutionContext,
    ) {
        let mut batch = self.batch();
        self.add_index(&mut batch, target.into(), priority, ctx);
        self.dispatch(batch);
    }

    /// Queue removal of `target` from the index.
    pub fn queue_delete(
        &self,
        target: impl Into<EntityReference>,
        priority: Option<Priority>,
        ctx: &ExecutionContext,
    ) {
        let mut batch = self.batch();
        self.add_delete(&mut batch, target.into(), priority, ctx);
        self.dispatch(batch);
    }

    pub fn batch(&self) -> TaskBatch {
        TaskBatch::new()
    }

    /// Add an index task to `batch`. Documents and attachments are resolved
    /// against the content store first; unknown ones are dropped.
    pub fn add_index(
        &self,
        batch: &mut TaskBatch,
        target: EntityReference,
        priority: Option<Priority>,
        ctx: &ExecutionContext,
    ) {
        let target = match target {
            EntityReference::Partition(_) => target,
            EntityReference::Document(doc) => match self.content.get(&doc) {
                Some(info) => info.reference.into(),
                None => {
                    warn!("cannot index unknown document {}", doc.identity());
                    return;
                }
            },
            EntityReference::Attachment(att) => match self.resolve_attachment(&att) {
                Some(att) => att.into(),
                None => return,
            },
        };
        batch.push(self.task(target, TaskKind::Index, priority, ctx));
    }

    /// Add a delete task to `batch`.
    pub fn add_delete(
        &self,
        batch: &mut TaskBatch,
        target: EntityReference,
        priority: Option<Priority>,
        ctx: &ExecutionContext,
    ) {
        batch.push(self.task(target, TaskKind::Delete, priority, ctx));
    }

    /// The tasks a content change calls for.
    pub fn tasks_for(&self, event: &ContentEvent, ctx: &ExecutionContext) -> TaskBatch {
        let mut batch = self.batch();
        let attachment_priority = Some(self.config.attachment_priority);

        match event {
            ContentEvent::DocumentCreated(doc) | ContentEvent::DocumentUpdated(doc) => {
                let Some(info) = self.content.get(doc) else {
                    warn!("cannot index unknown document {}", doc.identity());
                    return batch;
                };
                batch.push(self.task(info.reference.clone().into(), TaskKind::Index, None, ctx));
                for filename in &info.attachments {
                    let att = AttachmentReference::new(info.reference.clone(), filename.as_str());
                    batch.push(self.task(att.into(), TaskKind::Index, attachment_priority, ctx));
                }
            }
            ContentEvent::DocumentDeleted(doc) => {
                self.add_delete(&mut batch, doc.clone().into(), None, ctx);
            }
            ContentEvent::AttachmentAdded(att) | ContentEvent::AttachmentUpdated(att) => {
                if let Some(att) = self.resolve_attachment(att) {
                    batch.push(self.task(att.into(), TaskKind::Index, attachment_priority, ctx));
                }
            }
            ContentEvent::AttachmentDeleted(att) => {
                let info = self.content.get_or_create(&att.document);
                let att = AttachmentReference::new(info.reference, att.filename.as_str());
                self.add_delete(&mut batch, att.into(), None, ctx);
            }
            ContentEvent::PartitionCreated(partition) => {
                let target = EntityReference::Partition(partition.clone());
                batch.push(self.task(target, TaskKind::Index, None, ctx));
            }
            ContentEvent::PartitionDeleted(partition) => {
                let target = EntityReference::Partition(partition.clone());
                self.add_delete(&mut batch, target, None, ctx);
            }
        }
        batch
    }

    /// Publish every task in `batch`, highest priority first. Returns the
    /// number of tasks published.
    pub fn dispatch(&self, batch: TaskBatch) -> usize {
        let mut published = 0;
        for task in batch.into_ordered() {
            debug!("queueing {task}");
            match self.index_channel.publish(&IndexEvent::from(task)) {
                Ok(()) => published += 1,
                Err(e) => warn!("failed to publish index event: {e}"),
            }
        }
        published
    }

    /// Map `event` to tasks and dispatch them.
    pub fn on_content_event(&self, event: &ContentEvent, ctx: &ExecutionContext) -> usize {
        self.dispatch(self.tasks_for(event, ctx))
    }

    fn resolve_attachment(&self, att: &AttachmentReference) -> Option<AttachmentReference> {
        let Some(info) = self.content.get(&att.document) else {
            warn!("cannot index attachment of unknown document {}", att.identity());
            return None;
        };
        if !info.has_attachment(&att.filename) {
            warn!("cannot index unknown attachment {}", att.identity());
            return None;
        }
        Some(AttachmentReference::new(info.reference, att.filename.as_str()))
    }
}

/// Local listener on the content channel.
pub struct ContentChangeListener {
    queue: Arc<IndexQueue>,
}

impl ContentChangeListener {
    pub fn new(queue: Arc<IndexQueue>) -> Self {
        ContentChangeListener { queue }
    }
}

impl Listener<ContentChange> for ContentChangeListener {
    fn name(&self) -> &str {
        "content-change"
    }

    fn on_event(&self, change: &ContentChange) {
        self.queue.on_content_event(&change.event, &change.context);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::content::DocumentInfo;
    use crate::reference::DocumentReference;
    use parking_lot::Mutex;

    struct MockContent;

    impl ContentAccess for MockContent {
        fn get(&self, doc: &DocumentReference) -> Option<DocumentInfo> {
            (doc.name == "doc").then(|| {
                DocumentInfo::new(doc.without_language().with_language("en"))
                    .with_attachment("att.jpg")
            })
        }

        fn get_or_create(&self, doc: &DocumentReference) -> DocumentInfo {
            self.get(doc).unwrap_or_else(|| DocumentInfo::new(doc.clone()))
        }
    }

    #[derive(Default)]
    struct Collect {
        events: Mutex<Vec<IndexEvent>>,
    }

    impl Listener<IndexEvent> for Collect {
        fn name(&self) -> &str {
            "collect"
        }

        fn on_event(&self, event: &IndexEvent) {
            self.events.lock().push(event.clone());
        }
    }

    fn queue() -> (IndexQueue, Arc<Collect>) {
        let channel = Arc::new(Channel::local("index"));
        let collect = Arc::new(Collect::default());
        channel.register_remote(collect.clone());
        (
            IndexQueue::new(QueueConfig::default(), Arc::new(MockContent), channel),
            collect,
        )
    }

    fn doc() -> DocumentReference {
        DocumentReference::new("wiki", "space", "doc")
    }

    fn identities(batch: TaskBatch) -> Vec<(String, TaskKind, Priority)> {
        batch
            .into_ordered()
            .into_iter()
            .map(|t| (t.identity(), t.kind, t.priority))
            .collect()
    }

    #[test]
    fn test_priority_resolution() {
        let (queue, _) = queue();
        let target: EntityReference = doc().into();
        let ctx = ExecutionContext::new().with_priority(Priority::Low);

        assert_eq!(
            queue.resolve_priority(Some(Priority::High), &target, &ctx),
            Priority::High
        );
        assert_eq!(queue.resolve_priority(None, &target, &ctx), Priority::Low);
        assert_eq!(
            queue.resolve_priority(None, &target, &ExecutionContext::new()),
            Priority::Default
        );
    }

    #[test]
    fn test_document_update_indexes_attachments() {
        let (queue, _) = queue();
        let batch = queue.tasks_for(
            &ContentEvent::DocumentUpdated(doc()),
            &ExecutionContext::new(),
        );
        assert_eq!(
            identities(batch),
            vec![
                ("wiki:space.doc.en".to_string(), TaskKind::Index, Priority::Default),
                ("wiki:space.doc.en.file.att.jpg".to_string(), TaskKind::Index, Priority::Low),
            ]
        );
    }

    #[test]
    fn test_unknown_document_is_dropped() {
        let (queue, collect) = queue();
        let missing = DocumentReference::new("wiki", "space", "missing");
        let ctx = ExecutionContext::new();
        let created = ContentEvent::DocumentCreated(missing.clone());
        assert_eq!(queue.on_content_event(&created, &ctx), 0);
        queue.queue_index(missing.clone(), None, &ctx);
        queue.queue_index(AttachmentReference::new(doc(), "nope.pdf"), None, &ctx);
        assert!(collect.events.lock().is_empty());
    }

    #[test]
    fn test_delete_identities() {
        let (queue, collect) = queue();
        let ctx = ExecutionContext::new();
        queue.on_content_event(&ContentEvent::DocumentDeleted(doc().with_language("en")), &ctx);
        queue.on_content_event(&ContentEvent::DocumentDeleted(doc()), &ctx);
        queue.on_content_event(
            &ContentEvent::AttachmentDeleted(AttachmentReference::new(doc(), "att.jpg")),
            &ctx,
        );
        queue.on_content_event(&ContentEvent::PartitionDeleted("wiki".to_string()), &ctx);

        let events = collect.events.lock();
        let seen: Vec<String> = events.iter().map(|e| e.target.identity()).collect();
        assert_eq!(
            seen,
            vec![
                "wiki:space.doc.en",
                "wiki:space.doc.default",
                "wiki:space.doc.en.file.att.jpg",
                "wiki",
            ]
        );
        assert!(events.iter().all(|e| e.kind == TaskKind::Delete));
    }

    #[test]
    fn test_context_flags_reach_the_event() {
        let (queue, collect) = queue();
        let ctx = ExecutionContext::new()
            .with_disable_event_notification(true)
            .with_rendered_document(doc());
        queue.queue_index(doc(), None, &ctx);

        let events = collect.events.lock();
        assert_eq!(events.len(), 1);
        assert_eq!(events[0].payload.priority, Priority::Highest);
        assert!(events[0].payload.disable_event_notification);
    }

    #[test]
    fn test_listener_dispatches_change() {
        let (queue, collect) = queue();
        let listener = ContentChangeListener::new(Arc::new(queue));
        listener.on_event(&ContentChange::new(
            ContentEvent::PartitionCreated("wiki".to_string()),
            ExecutionContext::new(),
        ));
        let events = collect.events.lock();
        assert_eq!(events[0].target, EntityReference::Partition("wiki".to_string()));
        assert_eq!(events[0].kind, TaskKind::Index);
    }
}
