//! Header index: column name to position, built once per file

use std::collections::HashMap;
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;

use crate::error::{ScrubError, ScrubResult};

use super::tokenizer::split_fields;

const UTF8_BOM: char = '\u{feff}';

/// Column positions of one table, shared read-only by every chunk worker.
#[derive(Debug, Clone)]
pub struct HeaderIndex {
    positions: HashMap<String, usize>,
    width: usize,
    data_offset: u64,
}

impl HeaderIndex {
    /// Build from a header line. `data_offset` is the byte offset where the
    /// first data record starts (header length including its newline).
    pub fn from_line(line: &str, data_offset: u64) -> Self {
        let names = split_fields(line.trim_start_matches(UTF8_BOM));
        let width = names.len();
        let mut positions = HashMap::with_capacity(width);
        for (i, name) in names.into_iter().enumerate() {
            // First occurrence wins on duplicated names
            positions.entry(name.trim().to_string()).or_insert(i);
        }

        Self {
            positions,
            width,
            data_offset,
        }
    }

    /// Read the header line of a decompressed table.
    pub fn read_from(path: &Path) -> ScrubResult<Self> {
        let mut reader = BufReader::new(File::open(path)?);
        let mut buf = Vec::new();
        let n = reader.read_until(b'\n', &mut buf)?;
        let line = String::from_utf8_lossy(&buf);
        if n == 0 || line.trim().is_empty() {
            return Err(ScrubError::EmptyHeader(path.to_path_buf()));
        }

        Ok(Self::from_line(&line, n as u64))
    }

    /// Number of columns declared by the header
    pub fn width(&self) -> usize {
        self.width
    }

    /// Byte offset of the first data record
    pub fn data_offset(&self) -> u64 {
        self.data_offset
    }

    pub fn get(&self, name: &str) -> Option<usize> {
        self.positions.get(name).copied()
    }

    /// Position of a required column.
    ///
    /// # Errors
    ///
    /// [`ScrubError::MissingColumn`] naming the column and the layout that
    /// needed it.
    pub fn require(&self, name: &str, layout: &'static str) -> ScrubResult<usize> {
        self.get(name).ok_or_else(|| ScrubError::MissingColumn {
            column: name.to_string(),
            layout,
        })
    }

    /// Column names ordered by position
    pub fn names(&self) -> Vec<&str> {
        let mut names: Vec<(&str, usize)> =
            self.positions.iter().map(|(k, v)| (k.as_str(), *v)).collect();
        names.sort_by_key(|(_, i)| *i);
        names.into_iter().map(|(k, _)| k).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_from_line_trims_names() {
        let header = HeaderIndex::from_line("BizIndex, SecurityID ,TickTime\r\n", 31);
        assert_eq!(header.width(), 3);
        assert_eq!(header.get("SecurityID"), Some(1));
        assert_eq!(header.get("TickTime"), Some(2));
        assert_eq!(header.data_offset(), 31);
    }

    #[test]
    fn test_header_trailing_comma() {
        let header = HeaderIndex::from_line("A,B,C,", 7);
        assert_eq!(header.width(), 3);
        assert_eq!(header.names(), vec!["A", "B", "C"]);
    }

    #[test]
    fn test_bom_stripped() {
        let header = HeaderIndex::from_line("\u{feff}UpdateTime,SecurityID", 0);
        assert_eq!(header.get("UpdateTime"), Some(0));
    }

    #[test]
    fn test_require_missing_column() {
        let header = HeaderIndex::from_line("A,B", 4);
        assert_eq!(header.require("B", "test").unwrap(), 1);
        match header.require("TickTime", "sse-trade-current") {
            Err(ScrubError::MissingColumn { column, layout }) => {
                assert_eq!(column, "TickTime");
                assert_eq!(layout, "sse-trade-current");
            }
            other => panic!("unexpected: {:?}", other),
        }
    }

    #[test]
    fn test_read_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, "A,B,C\n1,2,3\n").unwrap();
        let header = HeaderIndex::read_from(file.path()).unwrap();
        assert_eq!(header.width(), 3);
        assert_eq!(header.data_offset(), 6);
    }

    #[test]
    fn test_read_from_empty_file() {
        let file = tempfile::NamedTempFile::new().unwrap();
        assert!(matches!(
            HeaderIndex::read_from(file.path()),
            Err(ScrubError::EmptyHeader(_))
        ));
    }
}
