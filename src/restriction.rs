//! Restriction trees and their compilation into Lucene query text.
//!
//! A restriction is either a single field condition ([`QueryRestriction`]), a
//! boolean composition ([`QueryRestrictionGroup`]) or an opaque, already
//! formatted query ([`QueryRestrictionString`]). All three share the
//! [`Restriction`] contract and are held by groups as [`RestrictionNode`]s.
//!
//! Compilation never fails: blank input compiles to an empty string and is
//! dropped by the enclosing group.
//!
//! ```
//! use sieve::restriction::{GroupType, QueryRestriction, QueryRestrictionGroup, Restriction};
//!
//! let mut group = QueryRestrictionGroup::new(GroupType::Or);
//! group.add(QueryRestriction::new("title", "Hans Peter"));
//! group.add(QueryRestriction::new("author", "Hans").with_tokenize(false));
//! assert_eq!(group.compile(), "(title:(+Hans* +Peter*) OR author:(Hans))");
//! ```

pub mod factory;
pub mod group;
pub mod leaf;
pub mod raw;
pub mod tokenizer;

pub use group::{GroupType, QueryRestrictionGroup, QueryRestrictionGroupBuilder};
pub use leaf::QueryRestriction;
pub use raw::QueryRestrictionString;

/// Shared contract of all restriction variants.
pub trait Restriction: std::fmt::Debug {
    /// Compile as if the negate flag were `negate`.
    fn compile_with(&self, negate: bool) -> String;

    fn is_negated(&self) -> bool;

    fn set_negate(&mut self, negate: bool);

    /// Compile to query text. The text is recomputed on every call.
    fn compile(&self) -> String {
        self.compile_with(self.is_negated())
    }

    /// Whether this restriction contributes nothing to a query.
    fn is_empty(&self) -> bool {
        self.compile_with(false).is_empty()
    }

    /// Whether the compiled text is a negation, whichever way it got there.
    ///
    /// A group can compile negated without its own flag set, e.g. after moving
    /// the negation of its children up.
    fn compiles_negated(&self) -> bool {
        self.is_negated()
    }

    /// The text `P` such that `NOT P` is what [`compile`](Self::compile)
    /// yields. Only meaningful when [`compiles_negated`](Self::compiles_negated).
    fn compile_unnegated(&self) -> String {
        self.compile_with(false)
    }
}

/// Any restriction, as stored inside a group.
#[derive(Debug, Clone, PartialEq)]
pub enum RestrictionNode {
    Leaf(QueryRestriction),
    Group(QueryRestrictionGroup),
    Raw(QueryRestrictionString),
}

impl RestrictionNode {
    fn inner(&self) -> &dyn Restriction {
        match self {
            RestrictionNode::Leaf(r) => r,
            RestrictionNode::Group(r) => r,
            RestrictionNode::Raw(r) => r,
        }
    }

    fn inner_mut(&mut self) -> &mut dyn Restriction {
        match self {
            RestrictionNode::Leaf(r) => r,
            RestrictionNode::Group(r) => r,
            RestrictionNode::Raw(r) => r,
        }
    }
}

impl Restriction for RestrictionNode {
    fn compile_with(&self, negate: bool) -> String {
        self.inner().compile_with(negate)
    }

    fn is_negated(&self) -> bool {
        self.inner().is_negated()
    }

    fn set_negate(&mut self, negate: bool) {
        self.inner_mut().set_negate(negate)
    }

    fn is_empty(&self) -> bool {
        self.inner().is_empty()
    }

    fn compiles_negated(&self) -> bool {
        self.inner().compiles_negated()
    }

    fn compile_unnegated(&self) -> String {
        self.inner().compile_unnegated()
    }
}

impl From<QueryRestriction> for RestrictionNode {
    fn from(r: QueryRestriction) -> Self {
        RestrictionNode::Leaf(r)
    }
}

impl From<QueryRestrictionGroup> for RestrictionNode {
    fn from(r: QueryRestrictionGroup) -> Self {
        RestrictionNode::Group(r)
    }
}

impl From<QueryRestrictionString> for RestrictionNode {
    fn from(r: QueryRestrictionString) -> Self {
        RestrictionNode::Raw(r)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_node_delegates() {
        let mut node = RestrictionNode::from(QueryRestriction::new("title", "hello"));
        assert_eq!(node.compile(), "title:(+hello*)");
        assert!(!node.is_negated());

        node.set_negate(true);
        assert!(node.is_negated());
        assert_eq!(node.compile(), "NOT title:(+hello*)");
        assert_eq!(node.compile_with(false), "title:(+hello*)");
        assert!(node.compiles_negated());
        assert_eq!(node.compile_unnegated(), "title:(+hello*)");
    }

    #[test]
    fn test_node_is_empty() {
        assert!(RestrictionNode::from(QueryRestriction::new("", "x")).is_empty());
        assert!(RestrictionNode::from(QueryRestrictionString::new("  ")).is_empty());
        assert!(RestrictionNode::from(QueryRestrictionGroup::default()).is_empty());
        assert!(!RestrictionNode::from(QueryRestrictionString::new("a:b")).is_empty());
    }

    #[test]
    fn test_clone_is_deep() {
        let mut group = QueryRestrictionGroup::new(GroupType::And);
        group.add(QueryRestriction::new("a", "1"));
        let original = RestrictionNode::from(group);

        let mut copy = original.clone();
        if let RestrictionNode::Group(g) = &mut copy {
            g.add(QueryRestriction::new("b", "2"));
        }
        assert_eq!(original.compile(), "a:(+1*)");
        assert_eq!(copy.compile(), "(a:(+1*) AND b:(+2*))");
    }
}
