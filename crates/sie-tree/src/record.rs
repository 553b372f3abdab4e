//! Record and document model for parsed SIE files.

use sie_parse::{Field, Span};

use crate::diagnostic::ParseError;

/// One sub-record line from a `{ ... }` block.
///
/// Rows are untagged and owned exclusively by their enclosing record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Row {
    /// The value fields, in line order.
    pub fields: Vec<Field>,
    /// Span of the line.
    pub span: Span,
}

impl Row {
    /// Get a field by position.
    pub fn field(&self, position: usize) -> Option<&Field> {
        self.fields.get(position)
    }
}

/// A top-level `#`-tagged record with its attached sub-record rows.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Record {
    /// The tag and value fields, in line order. Never empty: the tag is
    /// always present.
    pub fields: Vec<Field>,
    /// Sub-record rows from the `{ ... }` block following this record.
    pub rows: Vec<Row>,
    /// Span of the record line (not including its block).
    pub span: Span,
}

impl Record {
    /// The tag field. A record always has at least one field.
    pub fn tag(&self) -> &Field {
        &self.fields[0]
    }

    /// Get a field by position. Position 0 is the tag.
    pub fn field(&self, position: usize) -> Option<&Field> {
        self.fields.get(position)
    }

    /// Whether this record's tag equals the given bytes.
    pub fn has_tag(&self, tag: &[u8]) -> bool {
        self.tag().as_bytes() == tag
    }
}

/// A parsed SIE document: the top-level records in file order.
///
/// Immutable once built. Diagnostics are collected alongside, never raised
/// as a hard failure; callers that want strict validation inspect them.
#[derive(Debug, Clone, PartialEq)]
pub struct Document {
    /// Top-level records, exactly in file order.
    pub records: Vec<Record>,
    /// Recoverable errors reported during parsing and building.
    pub diagnostics: Vec<ParseError>,
}

impl Document {
    /// Whether the document has no records.
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Number of top-level records.
    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// Iterate over records carrying the given tag, in file order.
    pub fn records_with_tag<'doc>(
        &'doc self,
        tag: &'doc [u8],
    ) -> impl Iterator<Item = &'doc Record> {
        self.records.iter().filter(move |record| record.has_tag(tag))
    }
}
