//! Pull-based parser for SIE accounting export files.
//!
//! SIE is a line-oriented, tag-prefixed text format in an 8-bit code page.
//! The parser consumes raw bytes (never decoded as multi-byte text) and
//! emits record events in file order; errors are recoverable events, not
//! failures.

mod span;
pub use span::Span;

mod event;
pub use event::{Event, Field, ParseErrorKind};

mod parser;
pub use parser::Parser;
