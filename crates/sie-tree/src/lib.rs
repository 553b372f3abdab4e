//! Document layer for parsed SIE accounting export files.
//!
//! Wires the pull-based parser to a builder that assembles the file-ordered
//! record sequence, collects diagnostics, and answers record lookups.

mod builder;
mod diagnostic;
mod lookup;
mod record;

pub use builder::DocumentBuilder;
pub use diagnostic::{DiagnosticKind, ParseError};
pub use lookup::{FieldKey, find_field};
pub use record::{Document, Record, Row};
pub use sie_parse::{Event, Field, ParseErrorKind, Parser, Span};

/// Parse SIE bytes into a document.
///
/// Never fails: recoverable errors are collected in
/// [`Document::diagnostics`] and the rest of the document is still produced.
pub fn parse(source: &[u8]) -> Document {
    let mut parser = Parser::new(source);
    let mut builder = DocumentBuilder::new();
    while let Some(event) = parser.next_event() {
        builder.event(event);
    }
    builder.finish()
}

/// Parse a readable byte stream into a document.
pub fn parse_reader<R: std::io::Read>(mut reader: R) -> std::io::Result<Document> {
    let mut source = Vec::new();
    reader.read_to_end(&mut source)?;
    Ok(parse(&source))
}
