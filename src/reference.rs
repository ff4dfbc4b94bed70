//! References to indexable entities and their queue identities.
//!
//! Identities follow the index layout:
//!
//! - partition: `<partition>`
//! - document: `<partition>:<space>.<name>.<language or "default">`
//! - attachment: `<document identity>.file.<filename>`

use std::fmt;

use serde::{Deserialize, Serialize};

/// Language segment used when a document has no explicit language.
pub const DEFAULT_LANGUAGE: &str = "default";

/// A document, optionally pinned to one language variant.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct DocumentReference {
    pub partition: String,
    pub space: String,
    pub name: String,
    #[serde(default)]
    pub language: Option<String>,
}

impl DocumentReference {
    pub fn new(
        partition: impl Into<String>,
        space: impl Into<String>,
        name: impl Into<String>,
    ) -> Self {
        DocumentReference {
            partition: partition.into(),
            space: space.into(),
            name: name.into(),
            language: None,
        }
    }

    /// Pin to a language. A blank language means the default variant.
    pub fn with_language(mut self, language: impl Into<String>) -> Self {
        let language = language.into();
        self.language = (!language.trim().is_empty()).then_some(language);
        self
    }

    /// The same document without a language.
    pub fn without_language(&self) -> Self {
        DocumentReference {
            language: None,
            ..self.clone()
        }
    }

    /// `<space>.<name>`
    pub fn fullname(&self) -> String {
        format!("{}.{}", self.space, self.name)
    }

    pub fn language_or_default(&self) -> &str {
        self.language.as_deref().unwrap_or(DEFAULT_LANGUAGE)
    }

    pub fn identity(&self) -> String {
        format!(
            "{}:{}.{}",
            self.partition,
            self.fullname(),
            self.language_or_default()
        )
    }

    /// Whether both point at the same document, ignoring the language.
    pub fn same_document(&self, other: &DocumentReference) -> bool {
        self.partition == other.partition && self.space == other.space && self.name == other.name
    }
}

/// A file attached to a document.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct AttachmentReference {
    pub document: DocumentReference,
    pub filename: String,
}

impl AttachmentReference {
    pub fn new(document: DocumentReference, filename: impl Into<String>) -> Self {
        AttachmentReference {
            document,
            filename: filename.into(),
        }
    }

    pub fn identity(&self) -> String {
        format!("{}.file.{}", self.document.identity(), self.filename)
    }
}

/// Anything the index queue can index or delete.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EntityReference {
    Partition(String),
    Document(DocumentReference),
    Attachment(AttachmentReference),
}

impl EntityReference {
    pub fn identity(&self) -> String {
        match self {
            EntityReference::Partition(partition) => partition.clone(),
            EntityReference::Document(doc) => doc.identity(),
            EntityReference::Attachment(att) => att.identity(),
        }
    }

    pub fn partition(&self) -> &str {
        match self {
            EntityReference::Partition(partition) => partition,
            EntityReference::Document(doc) => &doc.partition,
            EntityReference::Attachment(att) => &att.document.partition,
        }
    }

    /// The document this entity belongs to, if any.
    pub fn document(&self) -> Option<&DocumentReference> {
        match self {
            EntityReference::Partition(_) => None,
            EntityReference::Document(doc) => Some(doc),
            EntityReference::Attachment(att) => Some(&att.document),
        }
    }
}

impl fmt::Display for EntityReference {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.identity())
    }
}

impl From<DocumentReference> for EntityReference {
    fn from(doc: DocumentReference) -> Self {
        EntityReference::Document(doc)
    }
}

impl From<AttachmentReference> for EntityReference {
    fn from(att: AttachmentReference) -> Self {
        EntityReference::Attachment(att)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn doc() -> DocumentReference {
        DocumentReference::new("wiki", "space", "doc")
    }

    #[test]
    fn test_document_identity() {
        assert_eq!(doc().with_language("en").identity(), "wiki:space.doc.en");
        assert_eq!(doc().identity(), "wiki:space.doc.default");
        assert_eq!(doc().with_language(" ").identity(), "wiki:space.doc.default");
    }

    #[test]
    fn test_attachment_identity() {
        let att = AttachmentReference::new(doc().with_language("en"), "att.jpg");
        assert_eq!(att.identity(), "wiki:space.doc.en.file.att.jpg");
    }

    #[test]
    fn test_entity_accessors() {
        let partition = EntityReference::Partition("wiki".to_string());
        assert_eq!(partition.identity(), "wiki");
        assert_eq!(partition.partition(), "wiki");
        assert!(partition.document().is_none());

        let att: EntityReference = AttachmentReference::new(doc(), "a.txt").into();
        assert_eq!(att.partition(), "wiki");
        assert_eq!(att.document(), Some(&doc()));
        assert_eq!(att.to_string(), "wiki:space.doc.default.file.a.txt");
    }

    #[test]
    fn test_same_document_ignores_language() {
        let en = doc().with_language("en");
        assert!(en.same_document(&doc()));
        assert_ne!(en, doc());
        assert_eq!(en.without_language(), doc());
    }
}
