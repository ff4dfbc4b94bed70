//! Helpers building the restrictions that come up again and again: scope,
//! document, language and date range conditions.

use chrono::{DateTime, Utc};

use crate::config::FieldNames;
use crate::reference::DocumentReference;
use crate::restriction::tokenizer::escape;
use crate::restriction::{GroupType, QueryRestriction, QueryRestrictionGroup};

/// Date format of date fields in the index.
pub const INDEX_DATE_FORMAT: &str = "%Y%m%d%H%M";

/// Builds restrictions against the configured index fields.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RestrictionFactory {
    fields: FieldNames,
}

impl RestrictionFactory {
    pub fn new(fields: FieldNames) -> Self {
        RestrictionFactory { fields }
    }

    pub fn fields(&self) -> &FieldNames {
        &self.fields
    }

    /// Exact match of `value` on `field`.
    pub fn exact(&self, field: &str, value: &str) -> QueryRestriction {
        QueryRestriction::exact(field, exact_value(value))
    }

    pub fn partition(&self, partition: &str) -> QueryRestriction {
        self.exact(&self.fields.partition, partition)
    }

    pub fn doc_type(&self, doc_type: &str) -> QueryRestriction {
        self.exact(&self.fields.doc_type, doc_type)
    }

    /// Any of the given document types.
    pub fn doc_types<I, S>(&self, doc_types: I) -> QueryRestrictionGroup
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        self.field_values(&self.fields.doc_type, doc_types, GroupType::Or)
    }

    pub fn space(&self, space: &str) -> QueryRestriction {
        self.exact(&self.fields.space, space)
    }

    pub fn language(&self, language: &str) -> QueryRestriction {
        self.exact(&self.fields.language, language)
    }

    pub fn filename(&self, filename: &str) -> QueryRestriction {
        self.exact(&self.fields.filename, filename)
    }

    /// The document in its space, and its language variant if pinned.
    pub fn document(&self, doc: &DocumentReference) -> QueryRestrictionGroup {
        let mut group = QueryRestrictionGroup::and();
        group.add(self.exact(&self.fields.fullname, &doc.fullname()));
        if let Some(language) = &doc.language {
            group.add(self.language(language));
        }
        group
    }

    /// Exact matches of every value on `field`, combined with `group_type`.
    pub fn field_values<I, S>(
        &self,
        field: &str,
        values: I,
        group_type: GroupType,
    ) -> QueryRestrictionGroup
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut group = QueryRestrictionGroup::new(group_type);
        for value in values {
            group.add(self.exact(field, value.as_ref()));
        }
        group
    }

    pub fn range(&self, field: &str, from: &str, to: &str, inclusive: bool) -> QueryRestriction {
        QueryRestriction::range(field, from, to, inclusive)
    }

    /// Range on a date field. A missing bound is open.
    pub fn date_range(
        &self,
        field: &str,
        from: Option<DateTime<Utc>>,
        to: Option<DateTime<Utc>>,
        inclusive: bool,
    ) -> QueryRestriction {
        let format = |d: Option<DateTime<Utc>>| {
            d.map(|d| d.format(INDEX_DATE_FORMAT).to_string())
                .unwrap_or_else(|| "*".to_string())
        };
        QueryRestriction::range(field, format(from), format(to), inclusive)
    }

    /// Documents changed between `from` and `to`.
    pub fn modified_between(
        &self,
        from: Option<DateTime<Utc>>,
        to: Option<DateTime<Utc>>,
    ) -> QueryRestriction {
        self.date_range(&self.fields.date, from, to, true)
    }

    /// Documents created between `from` and `to`.
    pub fn created_between(
        &self,
        from: Option<DateTime<Utc>>,
        to: Option<DateTime<Utc>>,
    ) -> QueryRestriction {
        self.date_range(&self.fields.creation_date, from, to, true)
    }
}

/// Escape a value for an exact match; values with whitespace become a phrase.
fn exact_value(value: &str) -> String {
    let value = value.trim();
    if value.contains(char::is_whitespace) {
        format!("\"{}\"", value.replace('"', "\\\""))
    } else {
        escape(value)
    }
}
