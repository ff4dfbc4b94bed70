//! Boolean composition of restrictions.

use crate::restriction::{Restriction, RestrictionNode};

/// How the children of a group are combined.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum GroupType {
    /// All children must match.
    #[default]
    And,
    /// At least one child must match.
    Or,
}

impl GroupType {
    /// The other type: `And` for `Or` and vice versa.
    pub fn flip(self) -> Self {
        match self {
            GroupType::And => GroupType::Or,
            GroupType::Or => GroupType::And,
        }
    }

    fn separator(self) -> &'static str {
        match self {
            GroupType::And => " AND ",
            GroupType::Or => " OR ",
        }
    }
}

/// An ordered set of restrictions combined with `AND` or `OR`.
///
/// Empty children and children equal to one already present are dropped by
/// [`add`](Self::add), so a group never holds either.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct QueryRestrictionGroup {
    group_type: GroupType,
    children: Vec<RestrictionNode>,
    negate: bool,
}

impl QueryRestrictionGroup {
    pub fn new(group_type: GroupType) -> Self {
        QueryRestrictionGroup {
            group_type,
            children: Vec::new(),
            negate: false,
        }
    }

    pub fn and() -> Self {
        Self::new(GroupType::And)
    }

    pub fn or() -> Self {
        Self::new(GroupType::Or)
    }

    pub fn builder(group_type: GroupType) -> QueryRestrictionGroupBuilder {
        QueryRestrictionGroupBuilder::new(group_type)
    }

    /// Add a child. Returns `false` if it was empty or a duplicate and got dropped.
    pub fn add(&mut self, restriction: impl Into<RestrictionNode>) -> bool {
        let restriction = restriction.into();
        if restriction.is_empty() || self.children.contains(&restriction) {
            return false;
        }
        self.children.push(restriction);
        true
    }

    /// Add every restriction, returning how many were kept.
    pub fn add_all<I, R>(&mut self, restrictions: I) -> usize
    where
        I: IntoIterator<Item = R>,
        R: Into<RestrictionNode>,
    {
        let mut kept = 0;
        for restriction in restrictions {
            if self.add(restriction) {
                kept += 1;
            }
        }
        kept
    }

    /// Remove a child equal to `restriction`.
    pub fn remove(&mut self, restriction: &RestrictionNode) -> bool {
        match self.children.iter().position(|c| c == restriction) {
            Some(pos) => {
                self.children.remove(pos);
                true
            }
            None => false,
        }
    }

    pub fn clear(&mut self) {
        self.children.clear();
    }

    pub fn contains(&self, restriction: &RestrictionNode) -> bool {
        self.children.contains(restriction)
    }

    pub fn children(&self) -> &[RestrictionNode] {
        &self.children
    }

    pub fn len(&self) -> usize {
        self.children.len()
    }

    pub fn group_type(&self) -> GroupType {
        self.group_type
    }

    pub fn set_type(&mut self, group_type: GroupType) {
        self.group_type = group_type;
    }

    pub fn with_negate(mut self, negate: bool) -> Self {
        self.negate = negate;
        self
    }

    /// Whether the group is written in its De Morgan form.
    ///
    /// `NOT a AND NOT b` has no direct form in the query syntax, so a group of
    /// more than one child where every child compiles negated is written as
    /// `NOT (a OR b)`: children lose their negation, the type flips and the
    /// group negation toggles. Children count as negated by their compiled
    /// form, so nested groups that were rewritten themselves take part.
    fn rewrites(&self) -> bool {
        self.children.len() > 1 && self.children.iter().all(|c| c.compiles_negated())
    }
}

impl Restriction for QueryRestrictionGroup {
    fn compile_with(&self, negate: bool) -> String {
        let rewrite = self.rewrites();
        let negate = negate ^ rewrite;
        let group_type = if rewrite {
            self.group_type.flip()
        } else {
            self.group_type
        };

        let terms: Vec<String> = self
            .children
            .iter()
            .map(|c| {
                if rewrite {
                    c.compile_unnegated()
                } else {
                    c.compile()
                }
            })
            .filter(|t| !t.is_empty())
            .collect();

        let joined = terms.join(group_type.separator());
        match (terms.len(), negate) {
            (0, _) => String::new(),
            (1, false) => joined,
            (_, false) => format!("({joined})"),
            (_, true) => format!("NOT ({joined})"),
        }
    }

    fn is_negated(&self) -> bool {
        self.negate
    }

    fn set_negate(&mut self, negate: bool) {
        self.negate = negate;
    }

    fn is_empty(&self) -> bool {
        self.children.iter().all(|c| c.is_empty())
    }

    fn compiles_negated(&self) -> bool {
        match self.children.as_slice() {
            [] => false,
            [only] => self.negate || only.compiles_negated(),
            _ => self.negate ^ self.rewrites(),
        }
    }

    fn compile_unnegated(&self) -> String {
        match self.children.as_slice() {
            [only] if !self.negate => only.compile_unnegated(),
            [_] => self.compile_with(false),
            _ => self.compile_with(self.rewrites()),
        }
    }
}

/// Builder for restriction groups.
#[derive(Debug)]
pub struct QueryRestrictionGroupBuilder {
    group: QueryRestrictionGroup,
}

impl QueryRestrictionGroupBuilder {
    pub fn new(group_type: GroupType) -> Self {
        QueryRestrictionGroupBuilder {
            group: QueryRestrictionGroup::new(group_type),
        }
    }

    pub fn add(mut self, restriction: impl Into<RestrictionNode>) -> Self {
        self.group.add(restriction);
        self
    }

    pub fn negate(mut self, negate: bool) -> Self {
        self.group.negate = negate;
        self
    }

    pub fn build(self) -> QueryRestrictionGroup {
        self.group
    }
}
