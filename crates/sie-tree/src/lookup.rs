//! Record lookup over a parsed document.

use sie_parse::Field;

use crate::record::Document;

/// A positional key constraint: field at `position` must equal `expected`,
/// byte for byte.
#[derive(Debug, Clone, Copy)]
pub struct FieldKey<'a> {
    /// Field position within the record. Position 0 is the tag.
    pub position: usize,
    /// Expected raw bytes at that position.
    pub expected: &'a [u8],
}

impl<'a> FieldKey<'a> {
    /// Create a new key constraint.
    pub fn new(position: usize, expected: &'a [u8]) -> Self {
        Self { position, expected }
    }
}

/// Find one value field by tag and positional keys.
///
/// Scans top-level records in file order and returns the field at
/// `value_position` of the first record whose tag equals `tag` and whose
/// field at each key position equals the expected bytes. First match wins.
/// A record with too few fields for a key or for `value_position` simply
/// does not match. Pure and read-only.
pub fn find_field<'doc>(
    document: &'doc Document,
    tag: &[u8],
    keys: &[FieldKey<'_>],
    value_position: usize,
) -> Option<&'doc Field> {
    document.records.iter().find_map(|record| {
        if !record.has_tag(tag) {
            return None;
        }
        for key in keys {
            record
                .field(key.position)
                .filter(|field| field.as_bytes() == key.expected)?;
        }
        record.field(value_position)
    })
}

impl Document {
    /// Find one value field by tag and positional keys. See [`find_field`].
    pub fn find_field(
        &self,
        tag: &[u8],
        keys: &[FieldKey<'_>],
        value_position: usize,
    ) -> Option<&Field> {
        find_field(self, tag, keys, value_position)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parse;

    fn balances() -> Document {
        parse(
            b"#FLAGGA 0\n\
              #IB 0 1510 1000.00\n\
              #IB 0 2081 15000.00\n\
              #IB 1 2081 12000.00\n\
              #UB 0 2081 17000.00\n",
        )
    }

    #[test]
    fn test_find_field_by_tag_and_keys() {
        let doc = balances();
        let field = doc
            .find_field(
                b"#IB",
                &[FieldKey::new(1, b"0"), FieldKey::new(2, b"2081")],
                3,
            )
            .map(|f| f.to_text());
        assert_eq!(field.as_deref(), Some("15000.00"));
    }

    #[test]
    fn test_first_match_wins() {
        let doc = parse(b"#IB 0 2081 1.00\n#IB 0 2081 2.00\n");
        let field = doc
            .find_field(
                b"#IB",
                &[FieldKey::new(1, b"0"), FieldKey::new(2, b"2081")],
                3,
            )
            .map(|f| f.to_text());
        assert_eq!(field.as_deref(), Some("1.00"));
    }

    #[test]
    fn test_no_match_is_none() {
        let doc = balances();
        assert!(
            doc.find_field(
                b"#IB",
                &[FieldKey::new(1, b"0"), FieldKey::new(2, b"9999")],
                3
            )
            .is_none()
        );
        assert!(doc.find_field(b"#RES", &[], 1).is_none());
    }

    #[test]
    fn test_short_record_does_not_match() {
        // A matching tag whose record is too short for the key or value
        // position is skipped, not an error.
        let doc = parse(b"#IB 0\n#IB 0 2081 15000.00\n");
        let field = doc
            .find_field(
                b"#IB",
                &[FieldKey::new(1, b"0"), FieldKey::new(2, b"2081")],
                3,
            )
            .map(|f| f.to_text());
        assert_eq!(field.as_deref(), Some("15000.00"));
    }

    #[test]
    fn test_keys_compare_bytes_not_case() {
        let doc = parse(b"#KONTO abc x\n");
        assert!(doc.find_field(b"#KONTO", &[FieldKey::new(1, b"ABC")], 2).is_none());
        assert!(doc.find_field(b"#KONTO", &[FieldKey::new(1, b"abc")], 2).is_some());
    }
}
