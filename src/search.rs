//! Search execution over the external engine.
//!
//! [`LuceneSearcher`] turns a [`SearchRequest`] into a [`SearchResults`]
//! cursor which runs the query lazily and pages through the hits.

pub mod cursor;
pub mod engine;
pub mod searcher;

pub use cursor::SearchResults;
pub use engine::{
    EngineHit, EngineHits, EngineProvider, EngineQuery, PermissionMode, SearchEngine,
};
pub use searcher::LuceneSearcher;

use crate::query::LuceneQuery;
use crate::reference::EntityReference;

/// A search to run: compiled query text plus ordering, language filter and window.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct SearchRequest {
    pub query: String,
    pub sort_fields: Vec<String>,
    pub languages: Vec<String>,
    pub mode: PermissionMode,
    pub offset: Option<usize>,
    pub limit: Option<usize>,
}

impl SearchRequest {
    pub fn builder(query: &LuceneQuery) -> SearchRequestBuilder {
        SearchRequestBuilder::new(query.compile())
    }

    pub fn from_text(text: impl Into<String>) -> SearchRequestBuilder {
        SearchRequestBuilder::new(text.into())
    }
}

pub struct SearchRequestBuilder {
    request: SearchRequest,
}

impl SearchRequestBuilder {
    fn new(query: String) -> Self {
        Self {
            request: SearchRequest {
                query,
                ..Default::default()
            },
        }
    }

    pub fn sort_field(mut self, field: impl Into<String>) -> Self {
        self.request.sort_fields.push(field.into());
        self
    }

    pub fn sort_fields<I, S>(mut self, fields: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.request.sort_fields.extend(fields.into_iter().map(Into::into));
        self
    }

    pub fn language(mut self, language: impl Into<String>) -> Self {
        self.request.languages.push(language.into());
        self
    }

    pub fn skip_checks(mut self, skip: bool) -> Self {
        self.request.mode = if skip {
            PermissionMode::SkipChecks
        } else {
            PermissionMode::Checked
        };
        self
    }

    pub fn offset(mut self, offset: usize) -> Self {
        self.request.offset = Some(offset);
        self
    }

    pub fn limit(mut self, limit: usize) -> Self {
        self.request.limit = Some(limit);
        self
    }

    pub fn build(self) -> SearchRequest {
        self.request
    }
}

/// A hit mapped to the entity it stands for.
#[derive(Debug, Clone, PartialEq)]
pub struct SearchHit {
    pub reference: EntityReference,
    pub score: f32,
}
