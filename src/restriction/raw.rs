use crate::restriction::Restriction;

/// Query text that is already in engine syntax and is passed through as is.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QueryRestrictionString {
    query: String,
    negate: bool,
}

impl QueryRestrictionString {
    pub fn new(query: impl Into<String>) -> Self {
        QueryRestrictionString {
            query: query.into(),
            negate: false,
        }
    }

    pub fn with_negate(mut self, negate: bool) -> Self {
        self.negate = negate;
        self
    }

    pub fn query(&self) -> &str {
        &self.query
    }
}

impl Restriction for QueryRestrictionString {
    fn compile_with(&self, negate: bool) -> String {
        let query = self.query.trim();
        if query.is_empty() {
            String::new()
        } else if negate {
            format!("NOT ({query})")
        } else {
            query.to_string()
        }
    }

    fn is_negated(&self) -> bool {
        self.negate
    }

    fn set_negate(&mut self, negate: bool) {
        self.negate = negate;
    }
}
