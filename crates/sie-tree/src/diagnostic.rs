//! Diagnostic rendering for parser errors.

use ariadne::{Color, Label, Report, ReportKind, Source};
use sie_parse::{ParseErrorKind, Span};

/// Everything reported while producing a document.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DiagnosticKind {
    /// A byte at line start where only `#`, a newline, or a legal brace
    /// transition may appear.
    BadLineStart {
        /// The offending byte.
        byte: u8,
    },
    /// A byte outside `A`-`Z` while scanning a `#`-label.
    InvalidLabelByte {
        /// The offending byte.
        byte: u8,
    },
    /// A `{` block opened, or a sub-entry line found, before any record
    /// existed to attach it to. The rows are dropped.
    OrphanRow,
}

impl From<ParseErrorKind> for DiagnosticKind {
    fn from(kind: ParseErrorKind) -> Self {
        match kind {
            ParseErrorKind::BadLineStart { byte } => DiagnosticKind::BadLineStart { byte },
            ParseErrorKind::InvalidLabelByte { byte } => DiagnosticKind::InvalidLabelByte { byte },
        }
    }
}

/// A parser error with source location.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ParseError {
    /// The kind of error.
    pub kind: DiagnosticKind,
    /// Source location.
    pub span: Span,
}

impl ParseError {
    /// Create a new parse error.
    pub fn new(kind: DiagnosticKind, span: Span) -> Self {
        Self { kind, span }
    }

    /// Render this error with ariadne.
    ///
    /// Returns a string containing the formatted error message with source
    /// context. The 8-bit source is decoded byte-per-character for display;
    /// the document itself stays raw bytes.
    pub fn render(&self, filename: &str, source: &[u8]) -> String {
        let mut output = Vec::new();
        self.write_report(filename, source, &mut output);
        String::from_utf8(output).unwrap_or_else(|_| format!("{}", self))
    }

    /// Write the error report to a writer.
    pub fn write_report<W: std::io::Write>(&self, filename: &str, source: &[u8], writer: W) {
        let decoded: String = source.iter().map(|&b| b as char).collect();
        let report = self.build_report(filename);
        let _ = report
            .finish()
            .write((filename, Source::from(decoded)), writer);
    }

    fn build_report<'a>(
        &self,
        filename: &'a str,
    ) -> ariadne::ReportBuilder<'static, (&'a str, std::ops::Range<usize>)> {
        let range = self.span.start as usize..self.span.end as usize;

        match &self.kind {
            DiagnosticKind::BadLineStart { byte } => {
                Report::build(ReportKind::Error, (filename, range.clone()))
                    .with_message(format!(
                        "line cannot begin with '{}'",
                        std::ascii::escape_default(*byte)
                    ))
                    .with_label(
                        Label::new((filename, range))
                            .with_message("unexpected at line start")
                            .with_color(Color::Red),
                    )
                    .with_help("records start with '#'; sub-entry lines live between '{' and '}'")
            }

            DiagnosticKind::InvalidLabelByte { byte } => {
                Report::build(ReportKind::Error, (filename, range.clone()))
                    .with_message(format!(
                        "invalid label character '{}'",
                        std::ascii::escape_default(*byte)
                    ))
                    .with_label(
                        Label::new((filename, range))
                            .with_message("not a label character")
                            .with_color(Color::Red),
                    )
                    .with_help("labels use uppercase A-Z only; the line was skipped")
            }

            DiagnosticKind::OrphanRow => Report::build(ReportKind::Error, (filename, range.clone()))
                .with_message("sub-entry block before any record")
                .with_label(
                    Label::new((filename, range))
                        .with_message("no record to attach to")
                        .with_color(Color::Red),
                )
                .with_help("a '{' block belongs to the record line immediately above it"),
        }
    }
}

impl std::fmt::Display for ParseError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match &self.kind {
            DiagnosticKind::BadLineStart { byte } => write!(
                f,
                "line cannot begin with '{}'",
                std::ascii::escape_default(*byte)
            ),
            DiagnosticKind::InvalidLabelByte { byte } => write!(
                f,
                "invalid label character '{}'",
                std::ascii::escape_default(*byte)
            ),
            DiagnosticKind::OrphanRow => write!(f, "sub-entry block before any record"),
        }?;
        write!(f, " at offset {}", self.span.start)
    }
}

impl std::error::Error for ParseError {}
