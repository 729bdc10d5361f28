//! Input archive handling
//!
//! Venue exports arrive as `.csv.zip` archives holding a single table. The
//! table is extracted to a scratch file so that every chunk worker can open
//! its own seekable handle on it. Plain `.csv` inputs are used in place.

use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::path::{Path, PathBuf};

use tempfile::NamedTempFile;
use tracing::{info, warn};
use zip::ZipArchive;

use crate::error::{ScrubError, ScrubResult};

/// A decompressed table ready for chunked reading
#[derive(Debug)]
pub enum TableSource {
    /// Extracted from an archive; the scratch file is removed on drop
    Extracted { file: NamedTempFile, member: String },
    /// Uncompressed input used as is
    Plain(PathBuf),
}

impl TableSource {
    pub fn path(&self) -> &Path {
        match self {
            TableSource::Extracted { file, .. } => file.path(),
            TableSource::Plain(path) => path,
        }
    }
}

/// Open an input file and expose its table.
///
/// # Errors
///
/// - [`ScrubError::MissingInput`] if the file does not exist
/// - [`ScrubError::EmptyInput`] if it has zero bytes
/// - [`ScrubError::NoTable`] if the archive holds no `.csv` member
pub fn open_table(path: &Path, scratch_dir: Option<&Path>) -> ScrubResult<TableSource> {
    if !path.exists() {
        return Err(ScrubError::MissingInput(path.to_path_buf()));
    }
    if std::fs::metadata(path)?.len() == 0 {
        return Err(ScrubError::EmptyInput(path.to_path_buf()));
    }

    if !is_zip(path) {
        return Ok(TableSource::Plain(path.to_path_buf()));
    }

    let mut archive = ZipArchive::new(File::open(path)?)?;

    let mut tables = Vec::new();
    for i in 0..archive.len() {
        let entry = archive.by_index(i)?;
        if !entry.is_dir() && entry.name().to_ascii_lowercase().ends_with(".csv") {
            tables.push(i);
        }
    }

    let Some(&first) = tables.first() else {
        return Err(ScrubError::NoTable(path.to_path_buf()));
    };

    if archive.len() > 1 {
        warn!(
            "Archive {:?} holds {} members ({} tables); using the first table",
            path,
            archive.len(),
            tables.len()
        );
    }

    let mut entry = archive.by_index(first)?;
    let member = entry.name().to_string();

    let scratch = match scratch_dir {
        Some(dir) => NamedTempFile::new_in(dir)?,
        None => NamedTempFile::new()?,
    };
    let bytes = {
        let mut writer = BufWriter::new(scratch.as_file());
        let bytes = io::copy(&mut entry, &mut writer)?;
        writer.flush()?;
        bytes
    };

    info!("Extracted {} ({} bytes) from {:?}", member, bytes, path);

    Ok(TableSource::Extracted {
        file: scratch,
        member,
    })
}

fn is_zip(path: &Path) -> bool {
    path.extension()
        .map(|ext| ext.eq_ignore_ascii_case("zip"))
        .unwrap_or(false)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Read;
    use zip::write::FileOptions;

    fn write_zip(dir: &Path, name: &str, members: &[(&str, &str)]) -> PathBuf {
        let path = dir.join(name);
        let mut zip = zip::ZipWriter::new(File::create(&path).unwrap());
        for (member, body) in members {
            zip.start_file(*member, FileOptions::default()).unwrap();
            zip.write_all(body.as_bytes()).unwrap();
        }
        zip.finish().unwrap();
        path
    }

    fn read_all(source: &TableSource) -> String {
        let mut s = String::new();
        File::open(source.path()).unwrap().read_to_string(&mut s).unwrap();
        s
    }

    #[test]
    fn test_extracts_single_table() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_zip(dir.path(), "t.csv.zip", &[("t.csv", "A,B\n1,2\n")]);
        let table = open_table(&path, None).unwrap();
        assert_eq!(read_all(&table), "A,B\n1,2\n");
        match table {
            TableSource::Extracted { member, .. } => assert_eq!(member, "t.csv"),
            other => panic!("unexpected source: {:?}", other),
        }
    }

    #[test]
    fn test_first_table_of_many() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_zip(
            dir.path(),
            "t.csv.zip",
            &[("readme.txt", "hi"), ("a.csv", "A\n1\n"), ("b.csv", "B\n2\n")],
        );
        let table = open_table(&path, Some(dir.path())).unwrap();
        assert_eq!(read_all(&table), "A\n1\n");
    }

    #[test]
    fn test_no_table() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_zip(dir.path(), "t.csv.zip", &[("readme.txt", "hi")]);
        assert!(matches!(open_table(&path, None), Err(ScrubError::NoTable(_))));
    }

    #[test]
    fn test_missing_and_empty_input() {
        let dir = tempfile::tempdir().unwrap();
        let missing = dir.path().join("nope.csv.zip");
        assert!(matches!(open_table(&missing, None), Err(ScrubError::MissingInput(_))));

        let empty = dir.path().join("empty.csv.zip");
        File::create(&empty).unwrap();
        assert!(matches!(open_table(&empty, None), Err(ScrubError::EmptyInput(_))));
    }

    #[test]
    fn test_plain_csv_used_in_place() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("t.csv");
        std::fs::write(&path, "A\n1\n").unwrap();
        let table = open_table(&path, None).unwrap();
        assert_eq!(table.path(), path.as_path());
    }
}
