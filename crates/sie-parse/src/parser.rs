//! Pull-based event parser for SIE export files.

use std::mem;

use tracing::trace;

use crate::{Event, Field, ParseErrorKind, Span};

/// Parser state machine states. One state per lexical mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum State {
    /// Expecting a record boundary.
    LineStart,
    /// Scanning a `#TAG` label.
    Label,
    /// Between fields, skipping separators.
    FieldGap,
    /// Scanning an unquoted field.
    BareField,
    /// Scanning a `"..."` field.
    QuotedField,
}

/// Buffer for the token currently being scanned.
#[derive(Debug)]
struct TokenBuf {
    bytes: Vec<u8>,
    start: u32,
    quoted: bool,
}

/// Pull-based parser over raw SIE bytes.
///
/// Each byte is one character of the source code page. The machine consumes
/// exactly one byte per transition and never backtracks. Errors come out as
/// [`Event::Error`] and never abort the scan; parsing resumes at the next
/// line start.
///
/// A line feed is the only line terminator. A carriage return is tolerated
/// padding: it separates fields or is skipped mid-token, but never ends a
/// line by itself. A final line without a terminating line feed is dropped
/// at end of input, matching the format's established behavior.
pub struct Parser<'src> {
    source: &'src [u8],
    /// Current byte position in `source`.
    pos: u32,
    state: State,
    /// Whether we are inside a `{ ... }` sub-entry block. Not a stack: the
    /// format does not nest, and a `{` inside a block is a line-start error.
    in_block: bool,
    /// Completed fields of the current line.
    fields: Vec<Field>,
    /// Token currently being accumulated, if any.
    token: Option<TokenBuf>,
    /// Start offset of the first token on the current line.
    line_start: u32,
}

impl<'src> Parser<'src> {
    /// Create a new parser for the given source bytes.
    pub fn new(source: &'src [u8]) -> Self {
        Self {
            source,
            pos: 0,
            state: State::LineStart,
            in_block: false,
            fields: Vec::new(),
            token: None,
            line_start: 0,
        }
    }

    /// Get the next event.
    ///
    /// Returns `None` once input is exhausted. Pending fields of a partial
    /// final line are not flushed.
    pub fn next_event(&mut self) -> Option<Event> {
        while (self.pos as usize) < self.source.len() {
            let at = self.pos;
            let byte = self.source[at as usize];
            self.pos += 1;
            if let Some(event) = self.step(byte, at) {
                trace!("Event {:?}", event);
                return Some(event);
            }
        }
        None
    }

    /// Parse all events into a vector.
    pub fn parse_to_vec(mut self) -> Vec<Event> {
        let mut events = Vec::new();
        while let Some(event) = self.next_event() {
            events.push(event);
        }
        events
    }

    /// Advance the state machine by one byte.
    fn step(&mut self, byte: u8, at: u32) -> Option<Event> {
        match self.state {
            State::LineStart => self.line_start_byte(byte, at),

            State::Label => match byte {
                b'A'..=b'Z' => {
                    self.push_byte(byte);
                    None
                }
                b' ' | b'\t' | b'\r' => {
                    self.push_token(at);
                    self.state = State::FieldGap;
                    None
                }
                b'\n' => {
                    self.push_token(at);
                    self.state = State::LineStart;
                    self.close_line(at)
                }
                _ => {
                    // Abandon the partial label and close the line. Whatever
                    // remains on the line is judged by the line-start state.
                    self.token = None;
                    self.fields.clear();
                    self.state = State::LineStart;
                    Some(error(ParseErrorKind::InvalidLabelByte { byte }, at))
                }
            },

            State::FieldGap => match byte {
                b' ' | b'\t' | b'\r' => None,
                b'\n' => {
                    self.state = State::LineStart;
                    self.close_line(at)
                }
                b'"' => {
                    self.start_quoted(at);
                    self.state = State::QuotedField;
                    None
                }
                _ => {
                    self.start_bare(byte, at);
                    self.state = State::BareField;
                    None
                }
            },

            State::BareField => match byte {
                b' ' | b'\t' => {
                    self.push_token(at);
                    self.state = State::FieldGap;
                    None
                }
                b'\n' => {
                    self.push_token(at);
                    self.state = State::LineStart;
                    self.close_line(at)
                }
                // Tolerated padding before a hard newline, not content.
                b'\r' => None,
                _ => {
                    self.push_byte(byte);
                    None
                }
            },

            State::QuotedField => match byte {
                b'"' => {
                    // Pushed even when empty: `""` is a present, zero-length
                    // field, distinct from no field at all.
                    self.push_token(at + 1);
                    self.state = State::FieldGap;
                    None
                }
                // Everything else is literal content, newlines and braces
                // included.
                _ => {
                    self.push_byte(byte);
                    None
                }
            },
        }
    }

    /// Handle a byte at the start of a line.
    fn line_start_byte(&mut self, byte: u8, at: u32) -> Option<Event> {
        match byte {
            // Inter-record padding.
            b'\n' | b'\r' => None,
            b'#' => {
                self.start_bare(byte, at);
                self.state = State::Label;
                None
            }
            b'{' if !self.in_block => {
                self.in_block = true;
                Some(Event::BlockStart {
                    span: Span::new(at, at + 1),
                })
            }
            b'}' if self.in_block => {
                self.in_block = false;
                Some(Event::BlockEnd {
                    span: Span::new(at, at + 1),
                })
            }
            // `{` inside a block, or `}` outside one.
            b'{' | b'}' => Some(error(ParseErrorKind::BadLineStart { byte }, at)),
            // Sub-entry lines may be indented.
            b' ' | b'\t' if self.in_block => None,
            b'"' if self.in_block => {
                self.start_quoted(at);
                self.state = State::QuotedField;
                None
            }
            // Sub-entry lines carry untagged value fields.
            _ if self.in_block => {
                self.start_bare(byte, at);
                self.state = State::BareField;
                None
            }
            _ => Some(error(ParseErrorKind::BadLineStart { byte }, at)),
        }
    }

    /// Start a bare token with its first byte.
    fn start_bare(&mut self, byte: u8, at: u32) {
        if self.fields.is_empty() {
            self.line_start = at;
        }
        self.token = Some(TokenBuf {
            bytes: vec![byte],
            start: at,
            quoted: false,
        });
    }

    /// Start a quoted token at its opening quote. No content yet.
    fn start_quoted(&mut self, at: u32) {
        if self.fields.is_empty() {
            self.line_start = at;
        }
        self.token = Some(TokenBuf {
            bytes: Vec::new(),
            start: at,
            quoted: true,
        });
    }

    /// Append a byte to the current token.
    fn push_byte(&mut self, byte: u8) {
        if let Some(token) = &mut self.token {
            token.bytes.push(byte);
        }
    }

    /// Close the current token and push it as a field.
    fn push_token(&mut self, end: u32) {
        if let Some(token) = self.token.take() {
            self.fields.push(Field {
                text: token.bytes,
                span: Span::new(token.start, end),
                quoted: token.quoted,
            });
        }
    }

    /// Commit the accumulated fields as a record or sub-record.
    ///
    /// A line with no fields (blank lines, brace lines) commits nothing.
    fn close_line(&mut self, end: u32) -> Option<Event> {
        if self.fields.is_empty() {
            return None;
        }
        let fields = mem::take(&mut self.fields);
        let span = Span::new(self.line_start, end);
        Some(if self.in_block {
            Event::SubRecord { fields, span }
        } else {
            Event::Record { fields, span }
        })
    }
}

fn error(kind: ParseErrorKind, at: u32) -> Event {
    Event::Error {
        span: Span::new(at, at + 1),
        kind,
    }
}

impl Iterator for Parser<'_> {
    type Item = Event;

    fn next(&mut self) -> Option<Self::Item> {
        self.next_event()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn events(source: &[u8]) -> Vec<Event> {
        Parser::new(source).parse_to_vec()
    }

    fn texts(fields: &[Field]) -> Vec<String> {
        fields.iter().map(Field::to_text).collect()
    }

    fn records(source: &[u8]) -> Vec<Vec<String>> {
        events(source)
            .iter()
            .filter_map(|event| match event {
                Event::Record { fields, .. } => Some(texts(fields)),
                _ => None,
            })
            .collect()
    }

    #[test]
    fn test_single_record() {
        assert_eq!(
            records(b"#IB 0 2081 15000.00\n"),
            vec![vec!["#IB", "0", "2081", "15000.00"]]
        );
    }

    #[test]
    fn test_tab_separates_fields() {
        assert_eq!(records(b"#KONTO\t2081\tEgna insatser\n").len(), 1);
        assert_eq!(
            records(b"#KONTO\t2081\tx\n"),
            vec![vec!["#KONTO", "2081", "x"]]
        );
    }

    #[test]
    fn test_quoted_field_preserves_whitespace() {
        let recs = records(b"#A \"a b\tc\"\n");
        assert_eq!(recs, vec![vec!["#A".to_string(), "a b\tc".to_string()]]);

        let evs = events(b"#A \"a b\tc\"\n");
        let Event::Record { fields, .. } = &evs[0] else {
            panic!("expected record, got {:?}", evs[0]);
        };
        assert!(fields[1].quoted);
        assert!(!fields[0].quoted);
    }

    #[test]
    fn test_empty_quoted_field_is_present() {
        assert_eq!(records(b"#A \"\" X\n"), vec![vec!["#A", "", "X"]]);
    }

    #[test]
    fn test_quoted_field_with_special_bytes() {
        // Newlines, braces, and `#` are literal inside quotes.
        assert_eq!(records(b"#A \"x\ny{z\"\n"), vec![vec!["#A", "x\ny{z"]]);
        assert_eq!(records(b"#A \"#B\"\n"), vec![vec!["#A", "#B"]]);
    }

    #[test]
    fn test_sub_entry_block() {
        let evs = events(b"#A X\n{\n  1 2\n  3 4\n}\n");
        assert_eq!(evs.len(), 5);
        assert!(matches!(&evs[0], Event::Record { fields, .. } if texts(fields) == ["#A", "X"]));
        assert!(matches!(&evs[1], Event::BlockStart { .. }));
        assert!(matches!(&evs[2], Event::SubRecord { fields, .. } if texts(fields) == ["1", "2"]));
        assert!(matches!(&evs[3], Event::SubRecord { fields, .. } if texts(fields) == ["3", "4"]));
        assert!(matches!(&evs[4], Event::BlockEnd { .. }));
    }

    #[test]
    fn test_tagged_line_inside_block_is_a_sub_record() {
        // Real exports put #TRANS lines inside #VER blocks; the tag scans
        // like any label but the line commits as a sub-record.
        let evs = events(b"#VER A 1\n{\n#TRANS 1910 100.00\n}\n");
        assert!(
            matches!(&evs[2], Event::SubRecord { fields, .. } if texts(fields) == ["#TRANS", "1910", "100.00"])
        );
    }

    #[test]
    fn test_soft_newline_after_label() {
        // CR is tolerated padding, never a field of its own.
        assert_eq!(records(b"#A\r\n"), vec![vec!["#A"]]);
    }

    #[test]
    fn test_soft_newline_inside_bare_field() {
        assert_eq!(records(b"#A B\rC\n"), vec![vec!["#A", "BC"]]);
    }

    #[test]
    fn test_line_start_error_does_not_abort() {
        let evs = events(b"#A 1\n!\n#B 2\n");
        assert_eq!(evs.len(), 3);
        assert!(matches!(&evs[0], Event::Record { fields, .. } if texts(fields) == ["#A", "1"]));
        assert!(matches!(
            &evs[1],
            Event::Error {
                kind: ParseErrorKind::BadLineStart { byte: b'!' },
                ..
            }
        ));
        assert!(matches!(&evs[2], Event::Record { fields, .. } if texts(fields) == ["#B", "2"]));
    }

    #[test]
    fn test_invalid_label_byte_abandons_line() {
        let evs = events(b"#A9 1\n#B 2\n");
        assert!(matches!(
            &evs[0],
            Event::Error {
                kind: ParseErrorKind::InvalidLabelByte { byte: b'9' },
                ..
            }
        ));
        // The #A9 line yields no record; the next line is unaffected.
        assert_eq!(records(b"#A9 1\n#B 2\n"), vec![vec!["#B", "2"]]);
    }

    #[test]
    fn test_missing_trailing_newline_drops_last_line() {
        // Established behavior: a final line without a hard newline is lost.
        assert_eq!(records(b"#A 1\n#B 2"), vec![vec!["#A", "1"]]);
    }

    #[test]
    fn test_unterminated_quote_drops_line() {
        assert!(events(b"#A \"abc").is_empty());
    }

    #[test]
    fn test_nested_open_brace_is_an_error() {
        let evs = events(b"#A X\n{\n{\n1 2\n}\n");
        assert!(evs.iter().any(|event| matches!(
            event,
            Event::Error {
                kind: ParseErrorKind::BadLineStart { byte: b'{' },
                ..
            }
        )));
        // The block flag is untouched; the value line still attaches.
        assert!(
            evs.iter()
                .any(|event| matches!(event, Event::SubRecord { fields, .. } if texts(fields) == ["1", "2"]))
        );
    }

    #[test]
    fn test_stray_closing_brace_is_an_error() {
        let evs = events(b"}\n#A 1\n");
        assert!(matches!(
            &evs[0],
            Event::Error {
                kind: ParseErrorKind::BadLineStart { byte: b'}' },
                ..
            }
        ));
        assert!(matches!(&evs[1], Event::Record { .. }));
    }

    #[test]
    fn test_high_bytes_pass_through() {
        // 0x80-0xFF are opaque code-page characters.
        let evs = events(b"#FNAMN \x8e\x99gare\n");
        let Event::Record { fields, .. } = &evs[0] else {
            panic!("expected record");
        };
        assert_eq!(fields[1].as_bytes(), b"\x8e\x99gare");
    }

    #[test]
    fn test_blank_lines_between_records() {
        assert_eq!(records(b"\n\r\n\n#A 1\n\n"), vec![vec!["#A", "1"]]);
    }

    #[test]
    fn test_bare_tag_only_line() {
        assert_eq!(records(b"#KSUMMA\n"), vec![vec!["#KSUMMA"]]);
    }

    #[test]
    fn test_record_spans_cover_the_line() {
        let evs = events(b"#A 1\n");
        let Event::Record { span, .. } = &evs[0] else {
            panic!("expected record");
        };
        assert_eq!(*span, Span::new(0, 4));
    }
}
