//! Read access to stored content for the index queue.

use serde::{Deserialize, Serialize};

use crate::reference::DocumentReference;

/// What the queue needs to know about a stored document.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DocumentInfo {
    /// The document, pinned to its stored language.
    pub reference: DocumentReference,
    /// Filenames of the attached files.
    #[serde(default)]
    pub attachments: Vec<String>,
}

impl DocumentInfo {
    pub fn new(reference: DocumentReference) -> Self {
        DocumentInfo {
            reference,
            attachments: Vec::new(),
        }
    }

    pub fn with_attachment(mut self, filename: impl Into<String>) -> Self {
        self.attachments.push(filename.into());
        self
    }

    pub fn has_attachment(&self, filename: &str) -> bool {
        self.attachments.iter().any(|a| a == filename)
    }
}

/// Document store lookups.
pub trait ContentAccess: Send + Sync {
    /// The stored document, or `None` if it does not exist.
    fn get(&self, doc: &DocumentReference) -> Option<DocumentInfo>;

    /// The stored document, or a fresh unsaved one carrying `doc`'s
    /// identity.
    fn get_or_create(&self, doc: &DocumentReference) -> DocumentInfo;
}
