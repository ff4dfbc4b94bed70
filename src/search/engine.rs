//! Interface of the external full-text engine.

use std::sync::Arc;

use ahash::AHashMap;
use serde::{Deserialize, Serialize};

use crate::config::FieldNames;
use crate::error::EngineError;
use crate::reference::{AttachmentReference, DEFAULT_LANGUAGE, DocumentReference, EntityReference};

/// Whether the engine filters hits by the caller's view permissions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum PermissionMode {
    /// Only hits the caller may view are counted and returned.
    #[default]
    Checked,
    /// All hits are counted and returned.
    SkipChecks,
}

/// A compiled query as handed to the engine.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct EngineQuery {
    pub text: String,
    /// Sort fields, a leading `-` meaning descending.
    pub sort_fields: Vec<String>,
    /// Languages to restrict to. Empty means all.
    pub languages: Vec<String>,
    pub mode: PermissionMode,
}

/// One hit as produced by the engine: its score and stored fields.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct EngineHit {
    pub score: f32,
    pub fields: AHashMap<String, String>,
}

impl EngineHit {
    pub fn new(score: f32) -> Self {
        EngineHit {
            score,
            fields: AHashMap::new(),
        }
    }

    pub fn with_field(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.fields.insert(name.into(), value.into());
        self
    }

    fn field(&self, name: &str) -> Option<&str> {
        self.fields
            .get(name)
            .map(|v| v.trim())
            .filter(|v| !v.is_empty())
    }

    /// Map the stored fields to the entity this hit stands for.
    ///
    /// A hit with a filename is an attachment, one with space and name a
    /// document and one with only a partition the partition itself.
    pub fn reference(&self, names: &FieldNames) -> Option<EntityReference> {
        let partition = self.field(&names.partition)?;
        let (space, name) = match (self.field(&names.space), self.field(&names.name)) {
            (Some(space), Some(name)) => (space, name),
            _ => return Some(EntityReference::Partition(partition.to_string())),
        };

        let mut doc = DocumentReference::new(partition, space, name);
        if let Some(language) = self.field(&names.language)
            && language != DEFAULT_LANGUAGE
        {
            doc = doc.with_language(language);
        }

        match self.field(&names.filename) {
            Some(filename) => Some(AttachmentReference::new(doc, filename).into()),
            None => Some(doc.into()),
        }
    }
}

/// The hits of one executed query.
pub trait EngineHits: Send + Sync {
    /// Fetch the hits in `[offset, offset + limit)`.
    fn page(&self, offset: usize, limit: usize) -> Result<Vec<EngineHit>, EngineError>;

    /// Number of hits the caller may view.
    fn hit_count(&self) -> usize;

    /// Number of hits without permission checks.
    fn total_hit_count(&self) -> usize;
}

/// The external full-text engine.
pub trait SearchEngine: Send + Sync {
    /// Parse and execute a query.
    fn search(&self, query: &EngineQuery) -> Result<Box<dyn EngineHits>, EngineError>;
}

/// Lazy lookup of the engine, which may not be initialized yet.
pub trait EngineProvider: Send + Sync {
    fn engine(&self) -> Option<Arc<dyn SearchEngine>>;
}

impl<F> EngineProvider for F
where
    F: Fn() -> Option<Arc<dyn SearchEngine>> + Send + Sync,
{
    fn engine(&self) -> Option<Arc<dyn SearchEngine>> {
        self()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn names() -> FieldNames {
        FieldNames::default()
    }

    #[test]
    fn test_document_hit() {
        let hit = EngineHit::new(1.0)
            .with_field("wiki", "xwiki")
            .with_field("web", "Main")
            .with_field("name", "WebHome")
            .with_field("lang", "en");
        let expected = DocumentReference::new("xwiki", "Main", "WebHome").with_language("en");
        assert_eq!(hit.reference(&names()), Some(expected.into()));
    }

    #[test]
    fn test_default_language_hit() {
        let hit = EngineHit::new(1.0)
            .with_field("wiki", "xwiki")
            .with_field("web", "Main")
            .with_field("name", "WebHome")
            .with_field("lang", "default");
        let expected = DocumentReference::new("xwiki", "Main", "WebHome");
        assert_eq!(hit.reference(&names()), Some(expected.into()));
    }

    #[test]
    fn test_attachment_hit() {
        let hit = EngineHit::new(0.5)
            .with_field("wiki", "xwiki")
            .with_field("web", "Main")
            .with_field("name", "WebHome")
            .with_field("filename", "logo.png");
        let doc = DocumentReference::new("xwiki", "Main", "WebHome");
        assert_eq!(
            hit.reference(&names()),
            Some(AttachmentReference::new(doc, "logo.png").into())
        );
    }

    #[test]
    fn test_partition_hit() {
        let hit = EngineHit::new(0.5).with_field("wiki", "xwiki");
        assert_eq!(
            hit.reference(&names()),
            Some(EntityReference::Partition("xwiki".to_string()))
        );
    }

    #[test]
    fn test_unmappable_hit() {
        let hit = EngineHit::new(0.5).with_field("web", "Main");
        assert_eq!(hit.reference(&names()), None);
    }
}
