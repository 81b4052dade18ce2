use std::{collections::HashSet, fs::File, num::NonZeroUsize, path::Path};

use csv::{Reader, ReaderBuilder, StringRecord};

use crate::error::{Error, Result};

/// Comma-separated input with a header row, read in batches of raw records.
pub struct CsvSource {
    reader: Reader<File>,
    header: Vec<String>,
}

impl CsvSource {
    pub fn open(path: &Path) -> Result<Self> {
        let file = File::open(path).map_err(|source| Error::InputAccess {
            path: path.to_path_buf(),
            source,
        })?;

        let mut reader = ReaderBuilder::new().has_headers(true).from_reader(file);
        let raw = reader.headers()?;
        if raw.is_empty() {
            return Err(Error::NoColumns);
        }
        let header = normalize_header(raw);

        Ok(CsvSource { reader, header })
    }

    pub fn header(&self) -> &[String] {
        &self.header
    }

    /// Reads up to `limit` records, or every remaining record when `limit`
    /// is `None`. Returns `None` once the input is exhausted.
    pub fn next_chunk(&mut self, limit: Option<NonZeroUsize>) -> Result<Option<Vec<StringRecord>>> {
        let mut records = Vec::new();
        let mut record = StringRecord::new();
        while limit.map_or(true, |limit| records.len() < limit.get()) {
            if !self.reader.read_record(&mut record)? {
                break;
            }
            records.push(std::mem::take(&mut record));
        }

        if records.is_empty() {
            Ok(None)
        } else {
            Ok(Some(records))
        }
    }
}

/// Names blank columns `Unnamed: <index>` and suffixes repeated names with
/// `.1`, `.2`, ... so every column name is unique.
fn normalize_header(raw: &StringRecord) -> Vec<String> {
    let mut seen = HashSet::new();
    let mut names = Vec::with_capacity(raw.len());

    for (index, name) in raw.iter().enumerate() {
        let base = if name.is_empty() {
            format!("Unnamed: {index}")
        } else {
            name.to_string()
        };

        let mut candidate = base.clone();
        let mut suffix = 1;
        while !seen.insert(candidate.clone()) {
            candidate = format!("{base}.{suffix}");
            suffix += 1;
        }
        names.push(candidate);
    }

    names
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    fn source(contents: &str) -> (NamedTempFile, CsvSource) {
        let mut file = NamedTempFile::new().unwrap();
        file.write_all(contents.as_bytes()).unwrap();
        let source = CsvSource::open(file.path()).unwrap();
        (file, source)
    }

    #[test]
    fn reads_consecutive_chunks() {
        let (_file, mut source) = source("a,b\n1,x\n2,y\n3,z\n");
        assert_eq!(source.header(), ["a", "b"]);

        let limit = NonZeroUsize::new(2);
        let first = source.next_chunk(limit).unwrap().unwrap();
        let second = source.next_chunk(limit).unwrap().unwrap();
        assert_eq!(first.len(), 2);
        assert_eq!(&first[1][0], "2");
        assert_eq!(second.len(), 1);
        assert_eq!(&second[0][1], "z");
        assert!(source.next_chunk(limit).unwrap().is_none());
    }

    #[test]
    fn reads_everything_without_limit() {
        let (_file, mut source) = source("a\n1\n2\n3\n");
        assert_eq!(source.next_chunk(None).unwrap().unwrap().len(), 3);
        assert!(source.next_chunk(None).unwrap().is_none());
    }

    #[test]
    fn header_only_yields_no_chunks() {
        let (_file, mut source) = source("a,b\n");
        assert_eq!(source.header(), ["a", "b"]);
        assert!(source.next_chunk(None).unwrap().is_none());
    }

    #[test]
    fn empty_file_has_no_columns() {
        let file = NamedTempFile::new().unwrap();
        assert!(matches!(CsvSource::open(file.path()), Err(Error::NoColumns)));
    }

    #[test]
    fn missing_file_is_an_input_error() {
        let dir = tempfile::tempdir().unwrap();
        let result = CsvSource::open(&dir.path().join("missing.csv"));
        assert!(matches!(result, Err(Error::InputAccess { .. })));
    }

    #[test]
    fn ragged_rows_are_rejected() {
        let (_file, mut source) = source("a,b\n1,2\n3,4,5\n");
        assert!(matches!(source.next_chunk(None), Err(Error::Csv(_))));
    }

    #[test]
    fn normalizes_blank_and_duplicate_names() {
        let raw = StringRecord::from(vec!["a", "", "a", "a", "b"]);
        assert_eq!(
            normalize_header(&raw),
            vec!["a", "Unnamed: 1", "a.1", "a.2", "b"]
        );
    }
}
