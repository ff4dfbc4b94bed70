use serde::{Deserialize, Serialize};

use crate::queue::priority::Priority;
use crate::reference::{DocumentReference, EntityReference};

/// Per-request settings for queued tasks.
///
/// Belongs to one logical request and is passed along explicitly. Setters
/// overwrite, so the last one wins.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ExecutionContext {
    priority: Option<Priority>,
    disable_event_notification: bool,
    rendered_document: Option<DocumentReference>,
}

impl ExecutionContext {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_priority(mut self, priority: Priority) -> Self {
        self.priority = Some(priority);
        self
    }

    pub fn with_disable_event_notification(mut self, disable: bool) -> Self {
        self.disable_event_notification = disable;
        self
    }

    pub fn with_rendered_document(mut self, doc: DocumentReference) -> Self {
        self.rendered_document = Some(doc);
        self
    }

    pub fn set_priority(&mut self, priority: Option<Priority>) {
        self.priority = priority;
    }

    pub fn set_disable_event_notification(&mut self, disable: bool) {
        self.disable_event_notification = disable;
    }

    pub fn set_rendered_document(&mut self, doc: Option<DocumentReference>) {
        self.rendered_document = doc;
    }

    pub fn priority(&self) -> Option<Priority> {
        self.priority
    }

    pub fn disable_event_notification(&self) -> bool {
        self.disable_event_notification
    }

    pub fn rendered_document(&self) -> Option<&DocumentReference> {
        self.rendered_document.as_ref()
    }

    /// Priority override for `target`: `Highest` for the document being
    /// rendered, otherwise the context priority.
    pub fn priority_for(&self, target: &EntityReference) -> Option<Priority> {
        let rendered = match (target, &self.rendered_document) {
            (EntityReference::Document(doc), Some(rendered)) => doc.same_document(rendered),
            _ => false,
        };
        if rendered {
            Some(Priority::Highest)
        } else {
            self.priority
        }
    }
}
