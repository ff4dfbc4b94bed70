//! Scoped root query.

use crate::config::FieldNames;
use crate::error::{Result, SieveError};
use crate::restriction::factory::RestrictionFactory;
use crate::restriction::{
    GroupType, QueryRestriction, QueryRestrictionGroup, Restriction, RestrictionNode,
};

/// The root of every search: an `AND` of the partition scope, the accepted
/// document types and any number of user restrictions.
///
/// The scope restriction is fixed at construction and cannot be removed, so a
/// compiled query never escapes its partition. A query whose scope compiles
/// blank compiles blank as a whole; use [`try_new`](Self::try_new) to reject
/// such a partition up front.
///
/// ```
/// use sieve::query::LuceneQuery;
/// use sieve::restriction::QueryRestriction;
///
/// let mut query = LuceneQuery::new("xwiki").with_doc_types(["wikipage"]);
/// query.add(QueryRestriction::new("title", "Hans"));
/// assert_eq!(
///     query.compile(),
///     "(wiki:(xwiki) AND type:(wikipage) AND title:(+Hans*))"
/// );
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct LuceneQuery {
    partition: String,
    factory: RestrictionFactory,
    scope: QueryRestriction,
    doc_types: QueryRestrictionGroup,
    restrictions: QueryRestrictionGroup,
}

impl LuceneQuery {
    /// Create a query over `partition` using the default field names.
    pub fn new(partition: impl Into<String>) -> Self {
        Self::with_fields(partition, &FieldNames::default())
    }

    pub fn with_fields(partition: impl Into<String>, fields: &FieldNames) -> Self {
        let partition = partition.into();
        let factory = RestrictionFactory::new(fields.clone());
        LuceneQuery {
            scope: factory.partition(&partition),
            factory,
            doc_types: QueryRestrictionGroup::new(GroupType::Or),
            restrictions: QueryRestrictionGroup::new(GroupType::And),
            partition,
        }
    }

    /// Like [`new`](Self::new), but fails on a blank partition.
    pub fn try_new(partition: impl Into<String>) -> Result<Self> {
        Self::try_with_fields(partition, &FieldNames::default())
    }

    /// Like [`with_fields`](Self::with_fields), but fails on a blank partition.
    pub fn try_with_fields(partition: impl Into<String>, fields: &FieldNames) -> Result<Self> {
        let query = Self::with_fields(partition, fields);
        if query.scope.is_empty() {
            return Err(SieveError::invalid_argument(format!(
                "partition '{}' does not scope a query",
                query.partition
            )));
        }
        Ok(query)
    }

    /// Restrict to the given document types (OR-ed together).
    pub fn with_doc_types<I, S>(mut self, doc_types: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        for doc_type in doc_types {
            self.doc_types.add(self.factory.doc_type(doc_type.as_ref()));
        }
        self
    }

    /// Add a restriction. Returns `false` if it was empty or already present.
    pub fn add(&mut self, restriction: impl Into<RestrictionNode>) -> bool {
        self.restrictions.add(restriction)
    }

    pub fn add_all<I, R>(&mut self, restrictions: I) -> usize
    where
        I: IntoIterator<Item = R>,
        R: Into<RestrictionNode>,
    {
        self.restrictions.add_all(restrictions)
    }

    /// Remove a user restriction. The scope is not reachable through this.
    pub fn remove(&mut self, restriction: &RestrictionNode) -> bool {
        self.restrictions.remove(restriction)
    }

    pub fn partition(&self) -> &str {
        &self.partition
    }

    pub fn scope(&self) -> &QueryRestriction {
        &self.scope
    }

    pub fn doc_types(&self) -> &QueryRestrictionGroup {
        &self.doc_types
    }

    pub fn restrictions(&self) -> &[RestrictionNode] {
        self.restrictions.children()
    }

    /// Whether no user restriction has been added.
    pub fn is_empty(&self) -> bool {
        self.restrictions.is_empty()
    }

    /// Compile the whole query. Without a usable scope the result is blank.
    pub fn compile(&self) -> String {
        if self.scope.is_empty() {
            return String::new();
        }
        let mut root = QueryRestrictionGroup::new(GroupType::And);
        root.add(self.scope.clone());
        root.add(self.doc_types.clone());
        for restriction in self.restrictions.children() {
            root.add(restriction.clone());
        }
        root.compile()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::restriction::QueryRestrictionString;

    #[test]
    fn test_scope_only() {
        let query = LuceneQuery::new("xwiki");
        assert!(query.is_empty());
        assert_eq!(query.compile(), "wiki:(xwiki)");
    }

    #[test]
    fn test_doc_types_are_or_ed() {
        let query = LuceneQuery::new("xwiki").with_doc_types(["wikipage", "attachment"]);
        assert_eq!(
            query.compile(),
            "(wiki:(xwiki) AND (type:(wikipage) OR type:(attachment)))"
        );
    }

    #[test]
    fn test_restrictions_are_and_ed() {
        let mut query = LuceneQuery::new("xwiki");
        assert!(query.add(QueryRestriction::new("title", "Hans")));
        assert!(query.add(QueryRestrictionString::new("author:peter")));
        assert!(!query.add(QueryRestriction::new("title", "Hans")));
        assert_eq!(
            query.compile(),
            "(wiki:(xwiki) AND title:(+Hans*) AND author:peter)"
        );
    }

    #[test]
    fn test_scope_cannot_be_removed() {
        let mut query = LuceneQuery::new("xwiki");
        let scope = RestrictionNode::from(query.scope().clone());
        assert!(!query.remove(&scope));
        assert_eq!(query.compile(), "wiki:(xwiki)");
    }

    #[test]
    fn test_duplicate_of_scope_is_compiled_once() {
        let mut query = LuceneQuery::new("xwiki");
        query.add(QueryRestriction::exact("wiki", "xwiki"));
        assert_eq!(query.compile(), "wiki:(xwiki)");
    }

    #[test]
    fn test_clone_keeps_scope() {
        let mut query = LuceneQuery::new("xwiki");
        query.add(QueryRestriction::new("title", "Hans"));
        let copy = query.clone();
        assert_eq!(copy.partition(), "xwiki");
        assert_eq!(copy.compile(), query.compile());
    }

    #[test]
    fn test_custom_fields() {
        let fields = FieldNames {
            partition: "db".to_string(),
            doc_type: "kind".to_string(),
            ..Default::default()
        };
        let query = LuceneQuery::with_fields("main", &fields).with_doc_types(["page"]);
        assert_eq!(query.compile(), "(db:(main) AND kind:(page))");
    }

    #[test]
    fn test_blank_partition_compiles_blank() {
        for partition in ["", "   "] {
            let mut query = LuceneQuery::new(partition);
            assert!(query.add(QueryRestriction::new("title", "secret")));
            assert_eq!(query.compile(), "");
        }
    }

    #[test]
    fn test_try_new_rejects_blank_partition() {
        let err = LuceneQuery::try_new("").unwrap_err();
        assert!(matches!(err, SieveError::InvalidArgument(_)));
        assert!(LuceneQuery::try_new("  ").is_err());

        let query = LuceneQuery::try_new("xwiki").unwrap();
        assert_eq!(query.compile(), "wiki:(xwiki)");
    }

    #[test]
    fn test_doc_types_with_whitespace_are_quoted() {
        let query = LuceneQuery::new("xwiki").with_doc_types(["my type", "a:b"]);
        assert_eq!(
            query.compile(),
            "(wiki:(xwiki) AND (type:(\"my type\") OR type:(a\\:b)))"
        );
    }
}
