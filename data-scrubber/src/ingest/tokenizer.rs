//! Field tokenizer for venue CSV lines
//!
//! Vendor exports are "almost CSV": fields may be quoted, and data rows end
//! with a stray delimiter that the header line does not carry. The tokenizer
//! never fails; malformed quoting degrades to literal content and the caller
//! decides what to do with a row whose width does not match the header.

use crate::error::RowError;

const QUOTE: char = '"';
const DELIMITER: char = ',';

/// Split one raw line into fields.
///
/// - A field that opens with `"` is quoted; `""` inside it is one literal quote
///   and delimiters inside it are literal.
/// - A quote appearing mid-field in an unquoted field is literal.
/// - An unterminated quoted field takes the rest of the line verbatim.
/// - A single trailing delimiter outside quotes is dropped instead of opening
///   an empty trailing field.
/// - Trailing `\r` / `\n` are ignored.
pub fn split_fields(line: &str) -> Vec<String> {
    let line = line.trim_end_matches(['\r', '\n']);
    let mut fields = Vec::new();
    let mut field = String::new();
    let mut chars = line.chars().peekable();
    let mut at_field_start = true;
    let mut in_quotes = false;
    let mut ended_on_delimiter = false;

    while let Some(c) = chars.next() {
        ended_on_delimiter = false;

        if in_quotes {
            if c == QUOTE {
                if chars.peek() == Some(&QUOTE) {
                    field.push(QUOTE);
                    chars.next();
                } else {
                    in_quotes = false;
                }
            } else {
                field.push(c);
            }
            continue;
        }

        match c {
            QUOTE if at_field_start => {
                in_quotes = true;
                at_field_start = false;
            }
            DELIMITER => {
                fields.push(std::mem::take(&mut field));
                at_field_start = true;
                ended_on_delimiter = true;
            }
            _ => {
                field.push(c);
                at_field_start = false;
            }
        }
    }

    // `a,b,` ends on a bare delimiter: two fields, not three.
    if !ended_on_delimiter || fields.is_empty() {
        fields.push(field);
    }

    fields
}

/// Reconcile a tokenized row with the header width.
///
/// A row carrying exactly one surplus field that is empty is accepted with the
/// surplus dropped (a second trailing delimiter); any other mismatch is a
/// row-level error.
pub fn fit_to_width(mut fields: Vec<String>, width: usize) -> Result<Vec<String>, RowError> {
    if fields.len() == width + 1 && fields.last().is_some_and(|f| f.trim().is_empty()) {
        fields.pop();
    }

    if fields.len() != width {
        return Err(RowError::FieldCount {
            expected: width,
            actual: fields.len(),
        });
    }

    Ok(fields)
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Serialize fields the way a well-behaved exporter would
    fn join_fields(fields: &[&str]) -> String {
        fields
            .iter()
            .map(|f| {
                if f.contains(DELIMITER) || f.contains(QUOTE) {
                    format!("\"{}\"", f.replace('"', "\"\""))
                } else {
                    f.to_string()
                }
            })
            .collect::<Vec<_>>()
            .join(",")
    }

    #[test]
    fn test_plain_fields() {
        assert_eq!(split_fields("a,b,c"), vec!["a", "b", "c"]);
    }

    #[test]
    fn test_trailing_comma_dropped() {
        assert_eq!(split_fields("a,b,"), vec!["a", "b"]);
        assert_eq!(split_fields("a,b,\r\n"), vec!["a", "b"]);
    }

    #[test]
    fn test_only_one_trailing_comma_dropped() {
        assert_eq!(split_fields("a,b,,"), vec!["a", "b", ""]);
    }

    #[test]
    fn test_empty_fields_preserved() {
        assert_eq!(split_fields("a,,c"), vec!["a", "", "c"]);
        assert_eq!(split_fields(",a"), vec!["", "a"]);
        assert_eq!(split_fields(""), vec![""]);
    }

    #[test]
    fn test_quoted_comma_is_literal() {
        assert_eq!(split_fields("\"x,y\",z"), vec!["x,y", "z"]);
    }

    #[test]
    fn test_quoted_trailing_comma_kept() {
        // The final comma lives inside quotes, so it is content
        assert_eq!(split_fields("a,\"b,\""), vec!["a", "b,"]);
    }

    #[test]
    fn test_escaped_quote() {
        assert_eq!(split_fields("\"say \"\"hi\"\"\",1"), vec!["say \"hi\"", "1"]);
    }

    #[test]
    fn test_mid_field_quote_is_literal() {
        assert_eq!(split_fields("ab\"c,d"), vec!["ab\"c", "d"]);
    }

    #[test]
    fn test_unterminated_quote_takes_rest_of_line() {
        assert_eq!(split_fields("a,\"b,c,d"), vec!["a", "b,c,d"]);
    }

    #[test]
    fn test_round_trip() {
        let cases: Vec<Vec<&str>> = vec![
            vec!["600000", "10.50", "B"],
            vec!["has,comma", "has \"quote\"", "0"],
            vec!["\"", ",", "\"\""],
            vec!["", "", "x"],
        ];
        for fields in cases {
            let line = join_fields(&fields);
            assert_eq!(split_fields(&line), fields, "line: {}", line);

            let with_artifact = format!("{},", line);
            assert_eq!(split_fields(&with_artifact), fields, "line: {}", with_artifact);
        }
    }

    #[test]
    fn test_fit_to_width() {
        let fields = split_fields("a,b,c");
        assert_eq!(fit_to_width(fields, 3).unwrap(), vec!["a", "b", "c"]);

        let fields = split_fields("a,b,c,,");
        assert_eq!(fit_to_width(fields, 3).unwrap(), vec!["a", "b", "c"]);

        let fields = split_fields("a,b");
        assert_eq!(
            fit_to_width(fields, 3).unwrap_err(),
            RowError::FieldCount {
                expected: 3,
                actual: 2
            }
        );

        let fields = split_fields("a,b,c,d");
        assert!(fit_to_width(fields, 3).is_err());
    }
}
