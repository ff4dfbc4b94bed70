use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::queue::priority::Priority;

/// Configuration for query compilation, hit mapping and the index queue.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SieveConfig {
    /// Names of the index fields the compiler and the hit mapper refer to.
    #[serde(default)]
    pub fields: FieldNames,
    /// Index queue settings.
    #[serde(default)]
    pub queue: QueueConfig,
}

impl SieveConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn builder() -> SieveConfigBuilder {
        SieveConfigBuilder::default()
    }

    /// Parse a configuration from JSON. Missing sections take their defaults.
    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }
}

/// Index field names.
///
/// The defaults follow the wiki index layout: `wiki` holds the partition,
/// `type` the document type, `web` the space and so on.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FieldNames {
    pub partition: String,
    pub doc_type: String,
    pub space: String,
    pub name: String,
    pub fullname: String,
    pub language: String,
    pub filename: String,
    pub date: String,
    pub creation_date: String,
}

impl Default for FieldNames {
    fn default() -> Self {
        Self {
            partition: "wiki".to_string(),
            doc_type: "type".to_string(),
            space: "web".to_string(),
            name: "name".to_string(),
            fullname: "fullname".to_string(),
            language: "lang".to_string(),
            filename: "filename".to_string(),
            date: "date".to_string(),
            creation_date: "creationdate".to_string(),
        }
    }
}

/// Index queue settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct QueueConfig {
    /// Priority used when neither the caller nor the execution context sets one.
    pub default_priority: Priority,
    /// Priority of attachment tasks derived from document and attachment events.
    pub attachment_priority: Priority,
    /// Buffer size of the cluster broadcast link.
    pub cluster_capacity: usize,
    /// Channel name used for content-change events.
    pub content_channel: String,
    /// Channel name used for index/delete events.
    pub index_channel: String,
}

impl Default for QueueConfig {
    fn default() -> Self {
        Self {
            default_priority: Priority::Default,
            attachment_priority: Priority::Low,
            cluster_capacity: 1024,
            content_channel: "sieve.content".to_string(),
            index_channel: "sieve.index".to_string(),
        }
    }
}

#[derive(Default)]
pub struct SieveConfigBuilder {
    fields: FieldNames,
    queue: QueueConfig,
}

impl SieveConfigBuilder {
    pub fn fields(mut self, fields: FieldNames) -> Self {
        self.fields = fields;
        self
    }

    pub fn partition_field(mut self, name: impl Into<String>) -> Self {
        self.fields.partition = name.into();
        self
    }

    pub fn doc_type_field(mut self, name: impl Into<String>) -> Self {
        self.fields.doc_type = name.into();
        self
    }

    pub fn default_priority(mut self, priority: Priority) -> Self {
        self.queue.default_priority = priority;
        self
    }

    pub fn attachment_priority(mut self, priority: Priority) -> Self {
        self.queue.attachment_priority = priority;
        self
    }

    pub fn cluster_capacity(mut self, capacity: usize) -> Self {
        self.queue.cluster_capacity = capacity.max(1);
        self
    }

    pub fn build(self) -> SieveConfig {
        SieveConfig {
            fields: self.fields,
            queue: self.queue,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = SieveConfig::default();
        assert_eq!(config.fields.partition, "wiki");
        assert_eq!(config.fields.doc_type, "type");
        assert_eq!(config.queue.default_priority, Priority::Default);
        assert_eq!(config.queue.attachment_priority, Priority::Low);
    }

    #[test]
    fn test_from_partial_json() {
        let config = SieveConfig::from_json(
            r#"{"fields": {"partition": "db"}, "queue": {"default_priority": "High"}}"#,
        )
        .unwrap();
        assert_eq!(config.fields.partition, "db");
        assert_eq!(config.fields.space, "web");
        assert_eq!(config.queue.default_priority, Priority::High);
        assert_eq!(config.queue.cluster_capacity, 1024);
    }

    #[test]
    fn test_invalid_json() {
        assert!(SieveConfig::from_json("{not json").is_err());
    }

    #[test]
    fn test_builder() {
        let config = SieveConfig::builder()
            .partition_field("db")
            .attachment_priority(Priority::Default)
            .cluster_capacity(0)
            .build();
        assert_eq!(config.fields.partition, "db");
        assert_eq!(config.queue.attachment_priority, Priority::Default);
        assert_eq!(config.queue.cluster_capacity, 1);
    }
}
