//! Document builder from parse events.

use sie_parse::Event;

use crate::diagnostic::{DiagnosticKind, ParseError};
use crate::record::{Document, Record, Row};

/// Builder that assembles a [`Document`] from parse events.
///
/// Records append in file order; sub-records attach to the most recently
/// appended record. Error events become diagnostics. Building never fails:
/// the document that could be salvaged is always returned.
pub struct DocumentBuilder {
    records: Vec<Record>,
    diagnostics: Vec<ParseError>,
}

impl DocumentBuilder {
    /// Create a new document builder.
    pub fn new() -> Self {
        Self {
            records: Vec::new(),
            diagnostics: Vec::new(),
        }
    }

    /// Feed one parse event.
    pub fn event(&mut self, event: Event) {
        match event {
            Event::Record { fields, span } => {
                self.records.push(Record {
                    fields,
                    rows: Vec::new(),
                    span,
                });
            }

            Event::SubRecord { fields, span } => match self.records.last_mut() {
                Some(record) => record.rows.push(Row { fields, span }),
                // A block opened before any record; the row has no parent
                // and is dropped.
                None => {
                    self.diagnostics
                        .push(ParseError::new(DiagnosticKind::OrphanRow, span));
                }
            },

            Event::BlockStart { span } => {
                if self.records.is_empty() {
                    self.diagnostics
                        .push(ParseError::new(DiagnosticKind::OrphanRow, span));
                }
            }

            Event::BlockEnd { .. } => {}

            Event::Error { span, kind } => {
                self.diagnostics.push(ParseError::new(kind.into(), span));
            }
        }
    }

    /// Finish building and return the document.
    pub fn finish(self) -> Document {
        Document {
            records: self.records,
            diagnostics: self.diagnostics,
        }
    }
}

impl Default for DocumentBuilder {
    fn default() -> Self {
        Self::new()
    }
}
