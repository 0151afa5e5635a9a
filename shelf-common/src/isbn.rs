//! Catalog identifier normalization
//!
//! Catalog sources report ISBNs hyphenated, spaced, or in 10-digit form. The
//! resolver deduplicates on the normalized string, so every identifier that
//! enters a `CandidateBook` goes through [`normalize_identifier`] first.
//!
//! Checksums are never validated here; a malformed identifier is still a
//! usable dedup key.

/// Identifier shape after normalization
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IdentifierKind {
    /// 13 digits (EAN-13 / ISBN-13)
    Isbn13,
    /// 9 digits followed by a digit or `X`
    Isbn10,
    /// Anything else (ASIN, OCLC number, garbage)
    Other,
}

impl IdentifierKind {
    /// Classify an already-normalized identifier
    pub fn classify(normalized: &str) -> Self {
        let bytes = normalized.as_bytes();
        match bytes.len() {
            13 if bytes.iter().all(u8::is_ascii_digit) => IdentifierKind::Isbn13,
            10 if bytes[..9].iter().all(u8::is_ascii_digit)
                && (bytes[9].is_ascii_digit() || bytes[9] == b'X') =>
            {
                IdentifierKind::Isbn10
            }
            _ => IdentifierKind::Other,
        }
    }
}

/// Strip separators from a raw identifier
///
/// Keeps ASCII alphanumerics only. A trailing lowercase `x` (ISBN-10 check
/// digit) is uppercased. Never fails: malformed input comes back stripped.
pub fn normalize_identifier(raw: &str) -> String {
    let mut normalized: String = raw.chars().filter(|c| c.is_ascii_alphanumeric()).collect();
    if normalized.ends_with('x') {
        normalized.pop();
        normalized.push('X');
    }
    normalized
}

/// Convert an ISBN-10 into its 978-prefixed ISBN-13 form
///
/// Returns `None` if the input is not ISBN-10 shaped after normalization.
pub fn isbn10_to_isbn13(isbn10: &str) -> Option<String> {
    let normalized = normalize_identifier(isbn10);
    if IdentifierKind::classify(&normalized) != IdentifierKind::Isbn10 {
        return None;
    }

    let mut isbn13 = String::with_capacity(13);
    isbn13.push_str("978");
    isbn13.push_str(&normalized[..9]);

    let sum: u32 = isbn13
        .bytes()
        .enumerate()
        .map(|(i, b)| {
            let digit = u32::from(b - b'0');
            if i % 2 == 0 {
                digit
            } else {
                digit * 3
            }
        })
        .sum();
    let check = (10 - sum % 10) % 10;
    isbn13.push(char::from_digit(check, 10)?);

    Some(isbn13)
}

/// Normalize, then upgrade ISBN-10 to ISBN-13 where possible
pub fn canonical_identifier(raw: &str) -> String {
    let normalized = normalize_identifier(raw);
    match IdentifierKind::classify(&normalized) {
        IdentifierKind::Isbn10 => isbn10_to_isbn13(&normalized).unwrap_or(normalized),
        _ => normalized,
    }
}

/// True if the raw input normalizes to an ISBN-10 or ISBN-13 shape
pub fn looks_like_isbn(raw: &str) -> bool {
    IdentifierKind::classify(&normalize_identifier(raw)) != IdentifierKind::Other
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_hyphenated_isbn13() {
        assert_eq!(normalize_identifier("978-0-06-231611-0"), "9780062316110");
    }

    #[test]
    fn test_normalize_clean_input_is_noop() {
        assert_eq!(normalize_identifier("9780062316110"), "9780062316110");
    }

    #[test]
    fn test_normalize_spaces_and_lowercase_check_digit() {
        assert_eq!(normalize_identifier(" 0-8044-2957-x "), "080442957X");
    }

    #[test]
    fn test_normalize_malformed_is_returned_stripped() {
        assert_eq!(normalize_identifier("abc--12"), "abc12");
        assert_eq!(normalize_identifier("---"), "");
    }

    #[test]
    fn test_classify() {
        assert_eq!(IdentifierKind::classify("9780062316110"), IdentifierKind::Isbn13);
        assert_eq!(IdentifierKind::classify("080442957X"), IdentifierKind::Isbn10);
        assert_eq!(IdentifierKind::classify("0306406152"), IdentifierKind::Isbn10);
        assert_eq!(IdentifierKind::classify("B00ABC1234"), IdentifierKind::Other);
        assert_eq!(IdentifierKind::classify(""), IdentifierKind::Other);
    }

    #[test]
    fn test_isbn10_to_isbn13() {
        assert_eq!(isbn10_to_isbn13("0-306-40615-2").as_deref(), Some("9780306406157"));
        assert_eq!(isbn10_to_isbn13("9780306406157"), None);
    }

    #[test]
    fn test_canonical_identifier() {
        assert_eq!(canonical_identifier("0306406152"), "9780306406157");
        assert_eq!(canonical_identifier("978-0-306-40615-7"), "9780306406157");
        assert_eq!(canonical_identifier("OL123M"), "OL123M");
    }

    #[test]
    fn test_looks_like_isbn() {
        assert!(looks_like_isbn("978-0-06-231611-0"));
        assert!(looks_like_isbn("0-8044-2957-X"));
        assert!(!looks_like_isbn("the great gatsby"));
    }
}
