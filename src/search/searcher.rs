use std::sync::Arc;

use log::warn;

use crate::config::FieldNames;
use crate::query::LuceneQuery;
use crate::search::cursor::SearchResults;
use crate::search::engine::EngineProvider;
use crate::search::SearchRequest;

/// Entry point for running searches.
///
/// The engine is looked up for every search. While it is unavailable the
/// searcher hands out empty cursors and logs why.
pub struct LuceneSearcher {
    provider: Arc<dyn EngineProvider>,
    fields: FieldNames,
}

impl LuceneSearcher {
    pub fn new(provider: Arc<dyn EngineProvider>, fields: FieldNames) -> Self {
        LuceneSearcher { provider, fields }
    }

    pub fn fields(&self) -> &FieldNames {
        &self.fields
    }

    /// Create a cursor for `request`.
    pub fn search(&self, request: SearchRequest) -> SearchResults {
        let engine = self.provider.engine();
        if engine.is_none() {
            warn!(
                "search engine not available, returning no results for '{}'",
                request.query
            );
        }
        SearchResults::new(request, engine, self.fields.clone())
    }

    /// Permission-checked search for `query`.
    pub fn search_query<I, S>(
        &self,
        query: &LuceneQuery,
        sort_fields: I,
        languages: &[&str],
    ) -> SearchResults
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.search(self.request(query, sort_fields, languages, false))
    }

    /// Search for `query` counting and returning hits regardless of permissions.
    pub fn search_without_checks<I, S>(
        &self,
        query: &LuceneQuery,
        sort_fields: I,
        languages: &[&str],
    ) -> SearchResults
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.search(self.request(query, sort_fields, languages, true))
    }

    fn request<I, S>(
        &self,
        query: &LuceneQuery,
        sort_fields: I,
        languages: &[&str],
        skip_checks: bool,
    ) -> SearchRequest
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut builder = SearchRequest::builder(query)
            .sort_fields(sort_fields)
            .skip_checks(skip_checks);
        for language in languages {
            builder = builder.language(*language);
        }
        builder.build()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::search::engine::{EngineHit, EngineHits, EngineQuery, PermissionMode, SearchEngine};
    use crate::error::EngineError;
    use parking_lot::Mutex;

    struct RecordingEngine {
        seen: Mutex<Vec<EngineQuery>>,
    }

    struct NoHits;

    impl EngineHits for NoHits {
        fn page(&self, _: usize, _: usize) -> Result<Vec<EngineHit>, EngineError> {
            Ok(Vec::new())
        }
        fn hit_count(&self) -> usize {
            0
        }
        fn total_hit_count(&self) -> usize {
            0
        }
    }

    impl SearchEngine for RecordingEngine {
        fn search(&self, query: &EngineQuery) -> Result<Box<dyn EngineHits>, EngineError> {
            self.seen.lock().push(query.clone());
            Ok(Box::new(NoHits))
        }
    }

    #[test]
    fn test_request_is_passed_through() {
        let engine = Arc::new(RecordingEngine {
            seen: Mutex::new(Vec::new()),
        });
        let handle: Arc<dyn SearchEngine> = engine.clone();
        let provider = move || Some(handle.clone());
        let searcher = LuceneSearcher::new(Arc::new(provider), FieldNames::default());

        let query = LuceneQuery::new("xwiki").with_doc_types(["wikipage"]);
        let mut results = searcher.search_without_checks(&query, ["-date", "name"], &["en"]);
        assert_eq!(results.size().unwrap(), 0);

        let seen = engine.seen.lock();
        assert_eq!(seen.len(), 1);
        assert_eq!(seen[0].text, "(wiki:(xwiki) AND type:(wikipage))");
        assert_eq!(seen[0].sort_fields, vec!["-date", "name"]);
        assert_eq!(seen[0].languages, vec!["en"]);
        assert_eq!(seen[0].mode, PermissionMode::SkipChecks);
    }

    #[test]
    fn test_unavailable_engine_gives_empty_cursor() {
        let provider = || -> Option<Arc<dyn SearchEngine>> { None };
        let searcher = LuceneSearcher::new(Arc::new(provider), FieldNames::default());
        let query = LuceneQuery::new("xwiki");
        let mut results = searcher.search_query(&query, Vec::<String>::new(), &[]);
        assert_eq!(results.size().unwrap(), 0);
        assert!(results.results().unwrap().is_empty());
    }
}
