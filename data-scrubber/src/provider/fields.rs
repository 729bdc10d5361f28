//! Typed access to tokenized row fields

use crate::error::{RowError, ScrubResult};
use crate::ingest::HeaderIndex;
use crate::schema::BOOK_LEVELS;

/// Borrowed view over one row's fields.
///
/// Values are trimmed before parsing (Shenzhen pads some columns). Non-key
/// numerics that fail to parse read as zero; key fields go through the
/// `required_*` accessors and fail the row instead.
#[derive(Debug, Clone, Copy)]
pub struct Row<'a> {
    fields: &'a [String],
}

impl<'a> Row<'a> {
    pub fn new(fields: &'a [String]) -> Self {
        Self { fields }
    }

    pub fn text(&self, idx: usize) -> &'a str {
        self.fields.get(idx).map(|s| s.trim()).unwrap_or("")
    }

    /// Text of an optional column, empty when the column is absent
    pub fn opt_text(&self, idx: Option<usize>) -> &'a str {
        idx.map(|i| self.text(i)).unwrap_or("")
    }

    pub fn float(&self, idx: usize) -> f64 {
        self.text(idx).parse().unwrap_or(0.0)
    }

    /// Integer column; decimal exports such as `100.000` are rounded
    pub fn int(&self, idx: usize) -> i64 {
        parse_int(self.text(idx)).unwrap_or(0)
    }

    pub fn opt_int(&self, idx: Option<usize>) -> i64 {
        idx.map(|i| self.int(i)).unwrap_or(0)
    }

    /// Non-empty text or a row error naming `column`
    pub fn required_text(&self, idx: usize, column: &'static str) -> Result<&'a str, RowError> {
        let value = self.text(idx);
        if value.is_empty() {
            return Err(RowError::MissingField(column));
        }
        Ok(value)
    }

    /// Parseable integer or a row error naming `column`
    pub fn required_int(&self, idx: usize, column: &'static str) -> Result<i64, RowError> {
        let value = self.required_text(idx, column)?;
        parse_int(value).ok_or_else(|| RowError::InvalidField {
            column,
            value: value.to_string(),
        })
    }
}

fn parse_int(s: &str) -> Option<i64> {
    s.parse::<i64>()
        .ok()
        .or_else(|| s.parse::<f64>().ok().filter(|f| f.is_finite()).map(|f| f.round() as i64))
}

/// Column positions of a ten-level ladder side
pub type LadderColumns = [(usize, usize); BOOK_LEVELS];

/// Bind `{side}Price{n}` / `{side}Volume{n}` for n = 1..=10.
pub fn bind_ladder(header: &HeaderIndex, side: &str, layout: &'static str) -> ScrubResult<LadderColumns> {
    let mut columns = [(0, 0); BOOK_LEVELS];
    for (level, slot) in columns.iter_mut().enumerate() {
        let n = level + 1;
        *slot = (
            header.require(&format!("{}Price{}", side, n), layout)?,
            header.require(&format!("{}Volume{}", side, n), layout)?,
        );
    }
    Ok(columns)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fields(values: &[&str]) -> Vec<String> {
        values.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_row_trims_and_defaults() {
        let f = fields(&["102 ", "abc", "100.000", "", " 7 "]);
        let row = Row::new(&f);
        assert_eq!(row.text(0), "102");
        assert_eq!(row.float(1), 0.0);
        assert_eq!(row.int(2), 100);
        assert_eq!(row.int(3), 0);
        assert_eq!(row.int(4), 7);
        assert_eq!(row.text(99), "");
        assert_eq!(row.opt_int(None), 0);
    }

    #[test]
    fn test_required_fields() {
        let f = fields(&["", "x", "12"]);
        let row = Row::new(&f);
        assert_eq!(row.required_text(0, "Type"), Err(RowError::MissingField("Type")));
        assert_eq!(
            row.required_int(1, "ExecType"),
            Err(RowError::InvalidField {
                column: "ExecType",
                value: "x".to_string()
            })
        );
        assert_eq!(row.required_int(2, "ExecType"), Ok(12));
    }

    #[test]
    fn test_bind_ladder() {
        let mut names = Vec::new();
        for n in 1..=10 {
            names.push(format!("BidPrice{}", n));
            names.push(format!("BidVolume{}", n));
        }
        let header = HeaderIndex::from_line(&names.join(","), 0);
        let ladder = bind_ladder(&header, "Bid", "test").unwrap();
        assert_eq!(ladder[0], (0, 1));
        assert_eq!(ladder[9], (18, 19));
        assert!(bind_ladder(&header, "Ask", "test").is_err());
    }
}
