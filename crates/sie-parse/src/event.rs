//! Event types for the SIE event-based parser.

use crate::Span;

/// One field of a record: a token of raw 8-bit bytes.
///
/// Content is kept byte-for-byte as it appeared in the source (quotes
/// stripped for quoted fields). Bytes 0x80-0xFF are opaque code-page
/// characters and are never decoded. Field equality is byte equality.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Field {
    /// The raw bytes of the token.
    pub text: Vec<u8>,
    /// The span in the source (including quotes for quoted fields).
    pub span: Span,
    /// Whether the token came from a `"..."` quoted scan.
    pub quoted: bool,
}

impl Field {
    /// The raw bytes of this field.
    #[inline]
    pub fn as_bytes(&self) -> &[u8] {
        &self.text
    }

    /// Length of the field content in bytes.
    #[inline]
    pub fn len(&self) -> usize {
        self.text.len()
    }

    /// Whether the field content is empty (a `""` field is present but empty).
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.text.is_empty()
    }

    /// Display-only decoding: each byte becomes the Unicode scalar with the
    /// same value. The data model stays bytes; this is for diagnostics and
    /// tests.
    pub fn to_text(&self) -> String {
        self.text.iter().map(|&b| b as char).collect()
    }
}

/// Events emitted by the parser.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Event {
    /// A completed top-level record line: `#TAG field field ...`.
    ///
    /// Always has at least one field; the first is the `#`-prefixed tag.
    Record {
        /// The tag and value fields, in line order.
        fields: Vec<Field>,
        /// Span of the line, first token to line end.
        span: Span,
    },
    /// A completed line inside a `{ ... }` sub-entry block.
    ///
    /// Belongs to the most recently completed top-level record.
    SubRecord {
        /// The value fields, in line order.
        fields: Vec<Field>,
        /// Span of the line, first token to line end.
        span: Span,
    },
    /// A `{` opening a sub-entry block. Contributes no fields.
    BlockStart {
        /// Span of the opening brace.
        span: Span,
    },
    /// A `}` closing a sub-entry block. Contributes no fields.
    BlockEnd {
        /// Span of the closing brace.
        span: Span,
    },
    /// A recoverable parse error. The scan continues.
    Error {
        /// Span of the offending byte.
        span: Span,
        /// Kind of error.
        kind: ParseErrorKind,
    },
}

/// Parse error kinds.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParseErrorKind {
    /// Structural error: a byte at line start where only `#`, a newline, or
    /// a legal brace transition may appear. Also covers `{` while already
    /// inside a block and `}` outside one.
    BadLineStart {
        /// The offending byte.
        byte: u8,
    },
    /// Lexical error: a byte outside `A`-`Z` while scanning a `#`-label.
    /// The partial label is abandoned and the line closed.
    InvalidLabelByte {
        /// The offending byte.
        byte: u8,
    },
}
