//! Single field restriction.

use crate::restriction::Restriction;
use crate::restriction::tokenizer::{escape, format_decimal, tokenize};

/// A restriction on a single index field.
///
/// Compiles to `field:(value)` where `value` is either the raw text or, with
/// tokenization enabled (the default), one mandatory prefix term per word:
///
/// | setting            | `"Hans Peter"` compiles to                                 |
/// |--------------------|------------------------------------------------------------|
/// | tokenized          | `field:(+Hans* +Peter*)`                                   |
/// | untokenized        | `field:(Hans Peter)`                                       |
/// | fuzzy `0.8`        | `field:((Hans* OR Hans~0.8) AND (Peter* OR Peter~0.8))`    |
/// | proximity `8`      | `field:("Hans Peter"~8)`                                   |
/// | boost `2.5`        | `field:(+Hans* +Peter*)^2.5`                               |
/// | negated            | `NOT field:(+Hans* +Peter*)`                               |
///
/// Terms the user excludes with `-` stay excluded in every mode: fuzzy
/// wraps them in `NOT (...)`, proximity keeps them out of the phrase and
/// appends them as `-term`.
#[derive(Debug, Clone, PartialEq)]
pub struct QueryRestriction {
    specifier: String,
    query: String,
    tokenize: bool,
    fuzzy: Option<f32>,
    proximity: Option<u32>,
    boost: Option<f32>,
    negate: bool,
}

impl QueryRestriction {
    /// Create a tokenized restriction of `query` on the field `specifier`.
    pub fn new(specifier: impl Into<String>, query: impl Into<String>) -> Self {
        QueryRestriction {
            specifier: specifier.into(),
            query: query.into(),
            tokenize: true,
            fuzzy: None,
            proximity: None,
            boost: None,
            negate: false,
        }
    }

    /// Create an untokenized restriction that matches `value` as written.
    pub fn exact(specifier: impl Into<String>, value: impl Into<String>) -> Self {
        Self::new(specifier, value).with_tokenize(false)
    }

    /// Create a range restriction: `[from TO to]` when `inclusive`, `{from TO to}` otherwise.
    ///
    /// An open bound is written as `*` and left unescaped.
    pub fn range(
        specifier: impl Into<String>,
        from: impl AsRef<str>,
        to: impl AsRef<str>,
        inclusive: bool,
    ) -> Self {
        let bound = |b: &str| {
            let b = b.trim();
            if b.is_empty() || b == "*" {
                "*".to_string()
            } else {
                escape(b)
            }
        };
        let (open, close) = if inclusive { ('[', ']') } else { ('{', '}') };
        let query = format!(
            "{open}{} TO {}{close}",
            bound(from.as_ref()),
            bound(to.as_ref())
        );
        Self::exact(specifier, query)
    }

    pub fn with_tokenize(mut self, tokenize: bool) -> Self {
        self.tokenize = tokenize;
        self
    }

    /// Set the fuzzy similarity. Negative values are ignored.
    pub fn with_fuzzy(mut self, fuzzy: f32) -> Self {
        self.set_fuzzy(fuzzy);
        self
    }

    /// Set the proximity window for phrase matching.
    pub fn with_proximity(mut self, proximity: u32) -> Self {
        self.proximity = Some(proximity);
        self
    }

    /// Set the boost factor. Negative values are ignored.
    pub fn with_boost(mut self, boost: f32) -> Self {
        self.set_boost(boost);
        self
    }

    pub fn with_negate(mut self, negate: bool) -> Self {
        self.negate = negate;
        self
    }

    pub fn set_specifier(&mut self, specifier: impl Into<String>) {
        self.specifier = specifier.into();
    }

    pub fn set_query(&mut self, query: impl Into<String>) {
        self.query = query.into();
    }

    pub fn set_tokenize(&mut self, tokenize: bool) {
        self.tokenize = tokenize;
    }

    pub fn set_fuzzy(&mut self, fuzzy: f32) {
        if fuzzy >= 0.0 {
            self.fuzzy = Some(fuzzy);
        }
    }

    pub fn clear_fuzzy(&mut self) {
        self.fuzzy = None;
    }

    pub fn set_proximity(&mut self, proximity: Option<u32>) {
        self.proximity = proximity;
    }

    pub fn set_boost(&mut self, boost: f32) {
        if boost >= 0.0 {
            self.boost = Some(boost);
        }
    }

    pub fn specifier(&self) -> &str {
        &self.specifier
    }

    pub fn query(&self) -> &str {
        &self.query
    }

    pub fn tokenize(&self) -> bool {
        self.tokenize
    }

    pub fn fuzzy(&self) -> Option<f32> {
        self.fuzzy
    }

    pub fn proximity(&self) -> Option<u32> {
        self.proximity
    }

    pub fn boost(&self) -> Option<f32> {
        self.boost
    }

    fn value(&self, query: &str) -> String {
        if !self.tokenize {
            return match self.proximity {
                Some(p) => format!("\"{}\"~{p}", query.replace('"', "\\\"")),
                None => query.to_string(),
            };
        }

        let tokens = tokenize(query);
        if tokens.is_empty() {
            return String::new();
        }

        if let Some(p) = self.proximity {
            let (excluded, included): (Vec<_>, Vec<_>) =
                tokens.iter().partition(|t| t.is_excluded());
            let mut parts = Vec::with_capacity(excluded.len() + 1);
            if !included.is_empty() {
                let phrase: Vec<&str> = included.iter().map(|t| t.phrase_part()).collect();
                parts.push(format!("\"{}\"~{p}", phrase.join(" ")));
            }
            parts.extend(excluded.iter().map(|t| t.mandatory(false)));
            parts.join(" ")
        } else if let Some(fuzzy) = self.fuzzy {
            // Out-of-range similarities fall back to the engine default.
            let distance = (0.0..=1.0)
                .contains(&fuzzy)
                .then(|| format_decimal(fuzzy as f64));
            tokens
                .iter()
                .map(|t| t.fuzzy(distance.as_deref()))
                .collect::<Vec<_>>()
                .join(" AND ")
        } else {
            tokens
                .iter()
                .map(|t| t.mandatory(true))
                .collect::<Vec<_>>()
                .join(" ")
        }
    }
}

impl Restriction for QueryRestriction {
    fn compile_with(&self, negate: bool) -> String {
        let specifier = self.specifier.trim();
        let query = self.query.trim();
        if specifier.is_empty() || query.is_empty() {
            return String::new();
        }

        let value = self.value(query);
        if value.is_empty() {
            return String::new();
        }

        let mut compiled = format!("{specifier}:({value})");
        if let Some(boost) = self.boost
            && boost > 0.0
        {
            compiled.push('^');
            compiled.push_str(&format_decimal(boost as f64));
        }
        if negate {
            compiled.insert_str(0, "NOT ");
        }
        compiled
    }

    fn is_negated(&self) -> bool {
        self.negate
    }

    fn set_negate(&mut self, negate: bool) {
        self.negate = negate;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tokenized() {
        let r = QueryRestriction::new("field", "Hans Peter");
        assert_eq!(r.compile(), "field:(+Hans* +Peter*)");
    }

    #[test]
    fn test_untokenized() {
        let r = QueryRestriction::new("field", "Hans Peter").with_tokenize(false);
        assert_eq!(r.compile(), "field:(Hans Peter)");
    }

    #[test]
    fn test_fuzzy() {
        let r = QueryRestriction::new("field", "Hans Peter").with_fuzzy(0.8);
        assert_eq!(
            r.compile(),
            "field:((Hans* OR Hans~0.8) AND (Peter* OR Peter~0.8))"
        );
    }

    #[test]
    fn test_fuzzy_rounding() {
        let r = QueryRestriction::new("field", "Hans").with_fuzzy(0.12345);
        assert_eq!(r.compile(), "field:((Hans* OR Hans~0.123))");
    }

    #[test]
    fn test_fuzzy_out_of_range_drops_distance() {
        let r = QueryRestriction::new("field", "Hans Peter").with_fuzzy(1.5);
        assert_eq!(r.compile(), "field:((Hans* OR Hans~) AND (Peter* OR Peter~))");
    }

    #[test]
    fn test_negative_fuzzy_is_ignored() {
        let r = QueryRestriction::new("field", "Hans").with_fuzzy(-0.5);
        assert_eq!(r.fuzzy(), None);
        assert_eq!(r.compile(), "field:(+Hans*)");
    }

    #[test]
    fn test_proximity() {
        let r = QueryRestriction::new("field", "Hans Peter").with_proximity(8);
        assert_eq!(r.compile(), "field:(\"Hans Peter\"~8)");
    }

    #[test]
    fn test_fuzzy_keeps_excluded_terms() {
        let r = QueryRestriction::new("field", "+ham -spam").with_fuzzy(0.8);
        assert_eq!(
            r.compile(),
            "field:((ham* OR ham~0.8) AND NOT (spam* OR spam~0.8))"
        );
    }

    #[test]
    fn test_proximity_keeps_excluded_terms() {
        let r = QueryRestriction::new("field", "ham eggs -spam").with_proximity(8);
        assert_eq!(r.compile(), "field:(\"ham eggs\"~8 -spam)");

        let only_excluded = QueryRestriction::new("field", "-spam").with_proximity(8);
        assert_eq!(only_excluded.compile(), "field:(-spam)");
    }

    #[test]
    fn test_proximity_wins_over_fuzzy() {
        let r = QueryRestriction::new("field", "Hans Peter")
            .with_fuzzy(0.5)
            .with_proximity(3);
        assert_eq!(r.compile(), "field:(\"Hans Peter\"~3)");
    }

    #[test]
    fn test_untokenized_proximity_escapes_quotes() {
        let r = QueryRestriction::exact("field", "say \"hi\"").with_proximity(2);
        assert_eq!(r.compile(), "field:(\"say \\\"hi\\\"\"~2)");
    }

    #[test]
    fn test_boost() {
        let r = QueryRestriction::new("field", "Hans").with_boost(2.5);
        assert_eq!(r.compile(), "field:(+Hans*)^2.5");

        let zero = QueryRestriction::new("field", "Hans").with_boost(0.0);
        assert_eq!(zero.compile(), "field:(+Hans*)");

        let negative = QueryRestriction::new("field", "Hans").with_boost(-1.0);
        assert_eq!(negative.boost(), None);
        assert_eq!(negative.compile(), "field:(+Hans*)");
    }

    #[test]
    fn test_negate_with_boost() {
        let r = QueryRestriction::new("field", "Hans")
            .with_boost(2.0)
            .with_negate(true);
        assert_eq!(r.compile(), "NOT field:(+Hans*)^2.0");
    }

    #[test]
    fn test_blank_rule() {
        assert_eq!(QueryRestriction::new("", "Hans").compile(), "");
        assert_eq!(QueryRestriction::new("  ", "Hans").compile(), "");
        assert_eq!(QueryRestriction::new("field", "").compile(), "");
        assert_eq!(QueryRestriction::new("field", "   ").compile(), "");
        assert_eq!(QueryRestriction::new("field", "* +").compile(), "");
        assert!(QueryRestriction::new("field", "").with_negate(true).is_empty());
    }

    #[test]
    fn test_escaping() {
        let r = QueryRestriction::new("field", "C++ a:b");
        assert_eq!(r.compile(), "field:(+C\\+\\+* +a\\:b*)");
    }

    #[test]
    fn test_user_operators() {
        let r = QueryRestriction::new("field", "+mandatory -excluded");
        assert_eq!(r.compile(), "field:(+mandatory* -excluded*)");
    }

    #[test]
    fn test_range() {
        let inclusive = QueryRestriction::range("field", "Hans", "Peter", true);
        assert_eq!(inclusive.compile(), "field:([Hans TO Peter])");

        let exclusive = QueryRestriction::range("field", "Hans", "Peter", false);
        assert_eq!(exclusive.compile(), "field:({Hans TO Peter})");

        let open = QueryRestriction::range("field", "", "Peter", true);
        assert_eq!(open.compile(), "field:([* TO Peter])");
    }

    #[test]
    fn test_compile_is_idempotent() {
        let r = QueryRestriction::new("field", "Hans Peter")
            .with_fuzzy(0.7)
            .with_boost(1.5);
        assert_eq!(r.compile(), r.compile());
        assert_eq!(r.clone().compile(), r.compile());
    }
}
