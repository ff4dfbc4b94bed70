//! # Sieve
//!
//! Query building and index maintenance for Lucene-backed search.
//!
//! ## Features
//!
//! - Restriction trees compiled to Lucene query syntax
//! - Partition- and type-scoped queries
//! - Lazy, paginated result cursors with permission modes
//! - Deduplicated, prioritized re-index queue with cluster fan-out
//!
//! ```
//! use sieve::{LuceneQuery, QueryRestriction};
//!
//! let mut query = LuceneQuery::new("xwiki").with_doc_types(["wikipage"]);
//! query.add(QueryRestriction::new("title", "release notes"));
//! assert_eq!(
//!     query.compile(),
//!     "(wiki:(xwiki) AND type:(wikipage) AND title:(+release* +notes*))"
//! );
//! ```
pub mod config;
pub mod content;
mod error;
pub mod query;
pub mod queue;
pub mod reference;
pub mod restriction;
pub mod search;

// Re-exports for the public API
pub use config::{FieldNames, QueueConfig, SieveConfig, SieveConfigBuilder};
pub use content::{ContentAccess, DocumentInfo};
pub use error::{EngineError, Result, SieveError};
pub use query::LuceneQuery;
pub use queue::{
    ClusterLink, ContentEvent, ExecutionContext, IndexNode, IndexQueue, IndexTask, IndexWriter,
    Priority, TaskBatch, TaskKind, WriterLookup, WriterSlot,
};
pub use reference::{AttachmentReference, DocumentReference, EntityReference};
pub use restriction::factory::RestrictionFactory;
pub use restriction::{
    GroupType, QueryRestriction, QueryRestrictionGroup, QueryRestrictionString, Restriction,
    RestrictionNode,
};
pub use search::{
    LuceneSearcher, SearchEngine, SearchHit, SearchRequest, SearchRequestBuilder, SearchResults,
};

// Version information
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
