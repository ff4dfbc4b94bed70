//! Lazy, paginated result cursor.

use std::sync::Arc;

use ahash::AHashMap;
use log::debug;

use crate::config::FieldNames;
use crate::error::{Result, SieveError};
use crate::reference::EntityReference;
use crate::search::engine::{EngineHits, EngineQuery, PermissionMode, SearchEngine};
use crate::search::{SearchHit, SearchRequest};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct Window {
    offset: usize,
    limit: usize,
}

#[derive(Debug)]
struct CachedPage {
    window: Window,
    hits: Vec<SearchHit>,
}

/// Results of one search, fetched lazily and page by page.
///
/// The query runs on first access. Each distinct `(offset, limit)` window is
/// fetched from the engine once; asking again for the same window returns the
/// cached page. Changing the offset or limit drops the cached page.
///
/// A cursor belongs to one logical search and is not meant to be shared
/// between threads.
pub struct SearchResults {
    query: EngineQuery,
    offset: Option<usize>,
    limit: Option<usize>,
    engine: Option<Arc<dyn SearchEngine>>,
    fields: FieldNames,
    hits: Option<Box<dyn EngineHits>>,
    page: Option<CachedPage>,
}

impl std::fmt::Debug for SearchResults {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SearchResults")
            .field("query", &self.query)
            .field("offset", &self.offset)
            .field("limit", &self.limit)
            .field("executed", &self.hits.is_some())
            .finish()
    }
}

impl SearchResults {
    /// Create a cursor. Without an engine the cursor is always empty.
    pub fn new(
        request: SearchRequest,
        engine: Option<Arc<dyn SearchEngine>>,
        fields: FieldNames,
    ) -> Self {
        SearchResults {
            query: EngineQuery {
                text: request.query,
                sort_fields: request.sort_fields,
                languages: request.languages,
                mode: request.mode,
            },
            offset: request.offset,
            limit: request.limit,
            engine,
            fields,
            hits: None,
            page: None,
        }
    }

    /// The compiled query text.
    pub fn query(&self) -> &str {
        &self.query.text
    }

    pub fn mode(&self) -> PermissionMode {
        self.query.mode
    }

    pub fn offset(&self) -> Option<usize> {
        self.offset
    }

    pub fn limit(&self) -> Option<usize> {
        self.limit
    }

    pub fn set_offset(&mut self, offset: usize) {
        if self.offset != Some(offset) {
            self.offset = Some(offset);
            self.page = None;
        }
    }

    pub fn set_limit(&mut self, limit: usize) {
        if self.limit != Some(limit) {
            self.limit = Some(limit);
            self.page = None;
        }
    }

    /// Run the query unless it already ran. Blank queries and a missing
    /// engine leave the cursor without hits.
    fn execute(&mut self) -> Result<()> {
        if self.hits.is_some() || self.query.text.trim().is_empty() {
            return Ok(());
        }
        let Some(engine) = &self.engine else {
            return Ok(());
        };

        debug!("executing query '{}' ({:?})", self.query.text, self.query.mode);
        let hits = engine
            .search(&self.query)
            .map_err(|e| SieveError::search_failed(self.query.text.clone(), e))?;
        self.hits = Some(hits);
        Ok(())
    }

    /// Number of hits: permission-checked by default, unchecked when the
    /// cursor skips checks.
    pub fn size(&mut self) -> Result<usize> {
        self.execute()?;
        Ok(match (&self.hits, self.query.mode) {
            (None, _) => 0,
            (Some(hits), PermissionMode::Checked) => hits.hit_count(),
            (Some(hits), PermissionMode::SkipChecks) => hits.total_hit_count(),
        })
    }

    fn window(&mut self) -> Result<Window> {
        let limit = match self.limit {
            Some(limit) => limit,
            None => self.size()?,
        };
        Ok(Window {
            offset: self.offset.unwrap_or(0),
            limit,
        })
    }

    /// The hits in the current window, in engine order.
    pub fn results(&mut self) -> Result<&[SearchHit]> {
        self.execute()?;
        let window = self.window()?;

        let cached = self.page.as_ref().is_some_and(|p| p.window == window);
        if !cached {
            let hits = self.fetch(window)?;
            self.page = Some(CachedPage { window, hits });
        }
        Ok(self.page.as_ref().map(|p| p.hits.as_slice()).unwrap_or_default())
    }

    fn fetch(&self, window: Window) -> Result<Vec<SearchHit>> {
        let Some(hits) = &self.hits else {
            return Ok(Vec::new());
        };
        if window.limit == 0 {
            return Ok(Vec::new());
        }

        debug!(
            "fetching hits {}..{} of '{}'",
            window.offset,
            window.offset + window.limit,
            self.query.text
        );
        let page = hits
            .page(window.offset, window.limit)
            .map_err(|e| SieveError::search_failed(self.query.text.clone(), e))?;

        Ok(page
            .into_iter()
            .filter_map(|hit| match hit.reference(&self.fields) {
                Some(reference) => Some(SearchHit {
                    reference,
                    score: hit.score,
                }),
                None => {
                    debug!("skipping unmappable hit {:?}", hit.fields);
                    None
                }
            })
            .collect())
    }

    /// The references in the current window.
    pub fn references(&mut self) -> Result<Vec<EntityReference>> {
        Ok(self.results()?.iter().map(|h| h.reference.clone()).collect())
    }

    /// The current window as reference to score map.
    pub fn results_score_map(&mut self) -> Result<AHashMap<EntityReference, f32>> {
        Ok(self
            .results()?
            .iter()
            .map(|h| (h.reference.clone(), h.score))
            .collect())
    }
}
