//! Copybook parser for fixed-width text layouts.
//!
//! Copybook format (one field per line, keywords case-insensitive):
//! ```text
//! 01 CUSTOMER-RECORD.
//!    05 CUSTOMER-ID    PIC X(6).
//!    05 CUSTOMER-NAME  PIC X(20).
//!    05 REGION         PICTURE IS XXX.
//! ```
//!
//! - An optional level number may precede the field name
//! - Field names are letters, digits and hyphens
//! - `PIC` or `PICTURE`, optionally followed by `IS`
//! - `X(n)` or a run of `X` characters gives the field length
//! - Every field definition ends with a period
//!
//! Lines that do not match are skipped. Group items (`01 NAME.`), comment
//! lines and blank lines are skipped quietly; anything else is reported
//! according to [`UnmatchedLines`], since a typo in a field line would
//! otherwise drop that field from the layout without notice.

use std::collections::HashSet;
use std::fs;
use std::path::Path;

use tracing::{debug, warn};

use crate::error::SchemaError;
use crate::layout::RecordLayout;

/// One field as declared in the copybook, before offsets are assigned.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldSpec {
    pub name: String,
    pub length: usize,
}

impl FieldSpec {
    pub fn new(name: impl Into<String>, length: usize) -> Self {
        Self {
            name: name.into(),
            length,
        }
    }
}

/// A copybook line that looked like a definition but was not a `PIC X` field.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SkippedLine {
    /// 1-based line number.
    pub line: usize,
    pub text: String,
}

/// What to do with lines that do not match the field grammar.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum UnmatchedLines {
    /// Skip the line, record it in [`ParsedSchema::skipped`] and log a warning.
    #[default]
    Warn,
    /// Skip the line without recording it.
    Ignore,
    /// Fail with [`SchemaError::Malformed`].
    Reject,
}

/// Result of parsing a copybook.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ParsedSchema {
    /// Fields in declaration order.
    pub fields: Vec<FieldSpec>,
    /// Lines skipped under [`UnmatchedLines::Warn`].
    pub skipped: Vec<SkippedLine>,
    /// Names declared more than once. Lookups by name see the last one.
    pub duplicates: Vec<String>,
}

impl ParsedSchema {
    /// Assign byte offsets to the parsed fields.
    pub fn into_layout(self) -> Result<RecordLayout, SchemaError> {
        RecordLayout::compute(self.fields)
    }
}

/// Parse copybook text, reporting unmatched lines as warnings.
pub fn parse_schema(text: &str) -> Result<ParsedSchema, SchemaError> {
    parse_schema_with(text, UnmatchedLines::Warn)
}

/// Parse copybook text with an explicit policy for unmatched lines.
pub fn parse_schema_with(text: &str, policy: UnmatchedLines) -> Result<ParsedSchema, SchemaError> {
    let mut parsed = ParsedSchema::default();
    let mut seen = HashSet::new();

    for (line_num, raw) in text.lines().enumerate() {
        let line = raw.trim();

        if line.is_empty() || is_comment(raw) {
            continue;
        }

        match parse_field_line(line) {
            Some(field) => {
                if !seen.insert(field.name.to_ascii_uppercase()) {
                    warn!(field = %field.name, line = line_num + 1, "duplicate field name in copybook");
                    parsed.duplicates.push(field.name.clone());
                }
                parsed.fields.push(field);
            }
            None if is_group_item(line) => continue,
            None => match policy {
                UnmatchedLines::Ignore => continue,
                UnmatchedLines::Warn => {
                    warn!(line = line_num + 1, text = line, "skipping copybook line");
                    parsed.skipped.push(SkippedLine {
                        line: line_num + 1,
                        text: line.to_string(),
                    });
                }
                UnmatchedLines::Reject => {
                    return Err(SchemaError::Malformed {
                        line: line_num + 1,
                        text: line.to_string(),
                    });
                }
            },
        }
    }

    if parsed.fields.is_empty() {
        return Err(SchemaError::Empty);
    }

    debug!(
        fields = parsed.fields.len(),
        skipped = parsed.skipped.len(),
        "parsed copybook"
    );
    Ok(parsed)
}

/// Read and parse a copybook file, reporting unmatched lines as warnings.
pub fn load_schema(path: impl AsRef<Path>) -> Result<ParsedSchema, SchemaError> {
    load_schema_with(path, UnmatchedLines::Warn)
}

/// Read and parse a copybook file with an explicit unmatched-line policy.
pub fn load_schema_with(
    path: impl AsRef<Path>,
    policy: UnmatchedLines,
) -> Result<ParsedSchema, SchemaError> {
    let path = path.as_ref();
    let text = fs::read_to_string(path).map_err(|source| SchemaError::NotFound {
        path: path.to_path_buf(),
        source,
    })?;
    parse_schema_with(&text, policy)
}

/// Parse a single trimmed line: `[level] NAME PIC X(n).`
fn parse_field_line(line: &str) -> Option<FieldSpec> {
    let body = line.strip_suffix('.')?.trim_end();
    let mut tokens = body.split_whitespace().peekable();

    // Optional level number
    if tokens.peek()?.chars().all(|c| c.is_ascii_digit()) {
        tokens.next();
    }

    let name = tokens.next()?;
    if !is_field_name(name) {
        return None;
    }

    let keyword = tokens.next()?;
    if !keyword.eq_ignore_ascii_case("PIC") && !keyword.eq_ignore_ascii_case("PICTURE") {
        return None;
    }

    let mut picture = tokens.next()?;
    if picture.eq_ignore_ascii_case("IS") {
        picture = tokens.next()?;
    }

    if tokens.next().is_some() {
        return None;
    }

    let length = parse_picture(picture)?;
    Some(FieldSpec::new(name, length))
}

/// Parse an alphanumeric picture string: `X(n)` or `XXX`.
fn parse_picture(picture: &str) -> Option<usize> {
    let upper = picture.to_ascii_uppercase();

    let length = if let Some(inner) = upper
        .strip_prefix("X(")
        .and_then(|rest| rest.strip_suffix(')'))
    {
        if inner.is_empty() || !inner.chars().all(|c| c.is_ascii_digit()) {
            return None;
        }
        inner.parse::<usize>().ok()?
    } else if !upper.is_empty() && upper.chars().all(|c| c == 'X') {
        upper.len()
    } else {
        return None;
    };

    (length > 0).then_some(length)
}

fn is_field_name(token: &str) -> bool {
    !token.is_empty() && token.chars().all(|c| c.is_ascii_alphanumeric() || c == '-')
}

/// Group items carry a name but no picture: `01 CUSTOMER-RECORD.`
fn is_group_item(line: &str) -> bool {
    let Some(body) = line.strip_suffix('.') else {
        return false;
    };
    let tokens: Vec<&str> = body.split_whitespace().collect();
    match tokens.as_slice() {
        [level, name] => level.chars().all(|c| c.is_ascii_digit()) && is_field_name(name),
        [name] => is_field_name(name),
        _ => false,
    }
}

/// Free-form `*` comments, or `*` / `/` in the fixed-format indicator column.
fn is_comment(raw: &str) -> bool {
    if raw.trim_start().starts_with('*') {
        return true;
    }
    matches!(raw.as_bytes().get(6), Some(b'*') | Some(b'/'))
        && raw.get(..6).is_some_and(|seq| seq.chars().all(|c| c.is_ascii_digit() || c == ' '))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_field_with_level() {
        let field = parse_field_line("05 CUSTOMER-NAME PIC X(20).").unwrap();
        assert_eq!(field, FieldSpec::new("CUSTOMER-NAME", 20));
    }

    #[test]
    fn test_parse_field_without_level() {
        let field = parse_field_line("STATUS PIC X(1).").unwrap();
        assert_eq!(field, FieldSpec::new("STATUS", 1));
    }

    #[test]
    fn test_parse_keywords_case_insensitive() {
        let field = parse_field_line("05 name pic x(7).").unwrap();
        assert_eq!(field, FieldSpec::new("name", 7));
    }

    #[test]
    fn test_parse_picture_keyword_and_is() {
        let field = parse_field_line("10 REGION PICTURE IS XXX.").unwrap();
        assert_eq!(field, FieldSpec::new("REGION", 3));
    }

    #[test]
    fn test_parse_period_after_space() {
        let field = parse_field_line("05 CODE PIC X(4) .").unwrap();
        assert_eq!(field.length, 4);
    }

    #[test]
    fn test_parse_rejects_missing_period() {
        assert!(parse_field_line("05 CODE PIC X(4)").is_none());
    }

    #[test]
    fn test_parse_rejects_numeric_picture() {
        assert!(parse_field_line("05 AMOUNT PIC 9(7).").is_none());
        assert!(parse_field_line("05 AMOUNT PIC S9(7) COMP-3.").is_none());
    }

    #[test]
    fn test_parse_rejects_zero_length() {
        assert!(parse_field_line("05 EMPTY PIC X(0).").is_none());
        assert!(parse_field_line("05 EMPTY PIC X().").is_none());
    }

    #[test]
    fn test_parse_rejects_bad_name() {
        assert!(parse_field_line("05 BAD_NAME PIC X(3).").is_none());
    }

    #[test]
    fn test_parse_schema_preserves_order() {
        let text = "01 REC.\n  05 A PIC X(10).\n  05 B PIC X(5).\n  05 C PIC X(15).\n";
        let parsed = parse_schema(text).unwrap();
        let names: Vec<&str> = parsed.fields.iter().map(|f| f.name.as_str()).collect();
        assert_eq!(names, vec!["A", "B", "C"]);
        assert!(parsed.skipped.is_empty());
    }

    #[test]
    fn test_parse_schema_reports_unmatched_lines() {
        let text = "01 REC.\n05 A PIC X(2).\n05 AMOUNT PIC 9(5).\n05 B PIC X(3).";
        let parsed = parse_schema(text).unwrap();
        assert_eq!(parsed.fields.len(), 2);
        assert_eq!(
            parsed.skipped,
            vec![SkippedLine {
                line: 3,
                text: "05 AMOUNT PIC 9(5).".to_string()
            }]
        );
    }

    #[test]
    fn test_parse_schema_ignore_policy() {
        let text = "05 A PIC X(2).\n05 AMOUNT PIC 9(5).";
        let parsed = parse_schema_with(text, UnmatchedLines::Ignore).unwrap();
        assert_eq!(parsed.fields.len(), 1);
        assert!(parsed.skipped.is_empty());
    }

    #[test]
    fn test_parse_schema_reject_policy() {
        let text = "05 A PIC X(2).\n05 AMOUNT PIC 9(5).";
        let err = parse_schema_with(text, UnmatchedLines::Reject).unwrap_err();
        match err {
            SchemaError::Malformed { line, text } => {
                assert_eq!(line, 2);
                assert_eq!(text, "05 AMOUNT PIC 9(5).");
            }
            other => panic!("Expected Malformed, got {other:?}"),
        }
    }

    #[test]
    fn test_parse_schema_skips_comments() {
        let text = "      * customer layout\n000100*old field\n* note\n05 A PIC X(2).";
        let parsed = parse_schema(text).unwrap();
        assert_eq!(parsed.fields.len(), 1);
        assert!(parsed.skipped.is_empty());
    }

    #[test]
    fn test_parse_schema_empty() {
        assert!(matches!(parse_schema(""), Err(SchemaError::Empty)));
        assert!(matches!(
            parse_schema("01 REC.\n05 N PIC 9(3)."),
            Err(SchemaError::Empty)
        ));
    }

    #[test]
    fn test_parse_schema_reports_duplicates() {
        let text = "05 NAME PIC X(2).\n05 name PIC X(3).";
        let parsed = parse_schema(text).unwrap();
        assert_eq!(parsed.fields.len(), 2);
        assert_eq!(parsed.duplicates, vec!["name".to_string()]);
    }

    #[test]
    fn test_load_schema_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let err = load_schema(dir.path().join("missing.cpy")).unwrap_err();
        assert!(matches!(err, SchemaError::NotFound { .. }));
    }

    #[test]
    fn test_load_schema_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("layout.cpy");
        fs::write(&path, "01 REC.\n  05 NAME PIC X(10).\n  05 VALUE PIC X(5).\n").unwrap();
        let layout = load_schema(&path).unwrap().into_layout().unwrap();
        assert_eq!(layout.record_length(), 15);
    }

    #[test]
    fn test_layout_rejects_overflowing_lengths() {
        let text = format!("05 A PIC X({}).\n05 B PIC X(2).", usize::MAX);
        let parsed = parse_schema(&text).unwrap();
        assert_eq!(parsed.fields[0].length, usize::MAX);

        let err = parsed.into_layout().unwrap_err();
        assert!(matches!(err, SchemaError::RecordTooLong { ref field } if field == "B"));
        assert_eq!(err.to_string(), "record length overflows at field 'B'");
    }
}
