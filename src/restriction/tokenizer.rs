//! Tokenization and escaping for the classic Lucene query syntax.

use lazy_static::lazy_static;
use regex::Regex;

lazy_static! {
    /// A quoted span (optionally carrying a `+`/`-` operator) or a run of non-whitespace.
    static ref TOKEN_RE: Regex = Regex::new(r#"[+-]?"[^"]*"|\S+"#).unwrap();
}

/// Characters with a meaning in the query syntax.
pub const SPECIAL_CHARS: &[char] = &[
    '+', '-', '!', '(', ')', '{', '}', '[', ']', '^', '"', '~', '*', '?', ':', '\\', '&', '|',
];

/// A single search term produced by [`tokenize`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Token {
    /// Explicit `+`/`-` operator the user wrote in front of the term.
    pub operator: Option<char>,
    /// The term itself. Escaped for plain terms, the verbatim span (quotes
    /// included) for quoted phrases.
    pub body: String,
    /// Trailing wildcard run (`*`, `?`) the user wrote.
    pub wildcard: String,
    pub quoted: bool,
}

impl Token {
    /// Render as a mandatory term: `+body*`.
    ///
    /// The trailing `*` is only added when the term has no wildcard of its own,
    /// is not a phrase and `wildcard` is requested.
    pub fn mandatory(&self, wildcard: bool) -> String {
        let operator = self.operator.unwrap_or('+');
        let suffix = if !self.wildcard.is_empty() {
            self.wildcard.clone()
        } else if wildcard && !self.quoted {
            "*".to_string()
        } else {
            String::new()
        };
        format!("{operator}{}{suffix}", self.body)
    }

    /// Render as `(body* OR body~distance)`; phrases are left as they are.
    /// An excluded term is wrapped in `NOT`.
    pub fn fuzzy(&self, distance: Option<&str>) -> String {
        let term = if self.quoted {
            self.body.clone()
        } else {
            format!(
                "({body}* OR {body}~{})",
                distance.unwrap_or_default(),
                body = self.body
            )
        };
        if self.is_excluded() {
            format!("NOT {term}")
        } else {
            term
        }
    }

    /// Whether the user marked the term with `-`.
    pub fn is_excluded(&self) -> bool {
        self.operator == Some('-')
    }

    /// The bare term as it appears inside a proximity phrase.
    pub fn phrase_part(&self) -> &str {
        if self.quoted {
            self.body.trim_matches('"')
        } else {
            &self.body
        }
    }
}

/// Escape every character that has a meaning in the query syntax.
pub fn escape(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len() + 8);
    for c in text.chars() {
        if SPECIAL_CHARS.contains(&c) {
            escaped.push('\\');
        }
        escaped.push(c);
    }
    escaped
}

/// Split free text into terms.
///
/// Quoted spans stay together and pass through verbatim. For every other
/// term a leading `+`/`-` and a trailing run of `*`/`?` are kept as syntax and
/// everything in between is escaped. Terms that are empty after stripping
/// that syntax are dropped.
pub fn tokenize(text: &str) -> Vec<Token> {
    TOKEN_RE
        .find_iter(text)
        .filter_map(|m| parse_token(m.as_str()))
        .collect()
}

fn parse_token(raw: &str) -> Option<Token> {
    let (operator, rest) = match raw.chars().next() {
        Some(c @ ('+' | '-')) => (Some(c), &raw[1..]),
        _ => (None, raw),
    };

    if rest.len() >= 2 && rest.starts_with('"') && rest.ends_with('"') {
        if rest.trim_matches('"').trim().is_empty() {
            return None;
        }
        return Some(Token {
            operator,
            body: rest.to_string(),
            wildcard: String::new(),
            quoted: true,
        });
    }

    let stem = rest.trim_end_matches(['*', '?']);
    let wildcard = rest[stem.len()..].to_string();
    if stem.is_empty() {
        return None;
    }
    Some(Token {
        operator,
        body: escape(stem),
        wildcard,
        quoted: false,
    })
}

/// Format a decimal the way the engine expects it: rounded half-up to three
/// fraction digits, trailing zeros dropped but at least one digit kept, and
/// always a `.` separator.
pub fn format_decimal(value: f64) -> String {
    let negative = value < 0.0;
    let scaled = (value.abs() * 1000.0).round() as u64;
    let int_part = scaled / 1000;
    let mut frac = format!("{:03}", scaled % 1000);
    while frac.len() > 1 && frac.ends_with('0') {
        frac.pop();
    }
    let sign = if negative && scaled != 0 { "-" } else { "" };
    format!("{sign}{int_part}.{frac}")
}
