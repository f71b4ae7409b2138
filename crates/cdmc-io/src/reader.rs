//! CSV symbol sequence reader with input validation.

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use cdmc_dtw::SymbolSequence;
use tracing::{debug, info, instrument};

use crate::IoError;
use crate::domain::{Dataset, SequenceId};

/// Anything that can hand the pipeline a dataset of symbol sequences.
pub trait SequenceSource {
    /// Load every sequence with its id.
    ///
    /// # Errors
    ///
    /// Implementation-specific; see the implementor.
    fn sequences(&self) -> Result<Dataset, IoError>;
}

/// Reads symbol sequences from a CSV file, one sequence per row.
///
/// Expected CSV format:
/// - `id,s0,s1,...,sn`, optionally preceded by a header row (on by default)
/// - Rows may differ in length; the first empty cell ends a row and
///   anything after it is ignored
/// - Symbols are non-negative integers
///
/// # Errors
///
/// | Variant | Condition |
/// |---|---|
/// | [`IoError::FileNotFound`] | File doesn't exist or is unreadable |
/// | [`IoError::CsvParse`] | Malformed CSV record |
/// | [`IoError::EmptyDataset`] | Zero data rows |
/// | [`IoError::MissingId`] | A row's first cell is empty |
/// | [`IoError::EmptySequence`] | A row has no symbols |
/// | [`IoError::InvalidSymbol`] | A cell is not a non-negative integer |
/// | [`IoError::DuplicateId`] | Same id appears twice |
#[derive(Debug, Clone)]
pub struct CsvSequenceReader {
    path: PathBuf,
    has_headers: bool,
    delimiter: u8,
}

impl CsvSequenceReader {
    /// Create a new reader for the given CSV file path.
    pub fn new(path: &Path) -> Self {
        Self {
            path: path.to_path_buf(),
            has_headers: true,
            delimiter: b',',
        }
    }

    /// Whether the first row is a header to skip.
    #[must_use]
    pub fn with_headers(mut self, has_headers: bool) -> Self {
        self.has_headers = has_headers;
        self
    }

    /// Set the field delimiter.
    #[must_use]
    pub fn with_delimiter(mut self, delimiter: u8) -> Self {
        self.delimiter = delimiter;
        self
    }

    fn parse_error(&self, e: csv::Error) -> IoError {
        IoError::CsvParse {
            path: self.path.clone(),
            offset: e.position().map_or(0, csv::Position::byte),
            source: e,
        }
    }

    /// Read and validate the CSV file, returning a [`Dataset`].
    #[instrument(skip(self), fields(path = %self.path.display()))]
    pub fn read(&self) -> Result<Dataset, IoError> {
        let file = std::fs::File::open(&self.path).map_err(|e| IoError::FileNotFound {
            path: self.path.clone(),
            source: e,
        })?;

        // flexible: rows are ragged by format
        let mut rdr = csv::ReaderBuilder::new()
            .has_headers(self.has_headers)
            .delimiter(self.delimiter)
            .flexible(true)
            .trim(csv::Trim::All)
            .from_reader(file);

        let mut ids = Vec::new();
        let mut sequences = Vec::new();
        let mut seen: HashMap<String, usize> = HashMap::new();

        for (row_index, result) in rdr.records().enumerate() {
            let record = result.map_err(|e| self.parse_error(e))?;

            let id = record.get(0).unwrap_or("").to_string();
            if id.is_empty() {
                return Err(IoError::MissingId {
                    path: self.path.clone(),
                    row_index,
                });
            }
            if let Some(&first_row) = seen.get(&id) {
                return Err(IoError::DuplicateId {
                    path: self.path.clone(),
                    id,
                    first_row,
                    second_row: row_index,
                });
            }

            let mut symbols = Vec::with_capacity(record.len().saturating_sub(1));
            for (col_index, raw) in record.iter().skip(1).take_while(|c| !c.is_empty()).enumerate() {
                let symbol: usize = raw.parse().map_err(|_| IoError::InvalidSymbol {
                    path: self.path.clone(),
                    row_index,
                    col_index,
                    raw: raw.to_string(),
                })?;
                symbols.push(symbol);
            }
            if symbols.len() + 1 < record.len() {
                debug!(row_index, kept = symbols.len(), "row ended at empty cell");
            }

            let sequence = SymbolSequence::new(symbols).map_err(|_| IoError::EmptySequence {
                path: self.path.clone(),
                row_index,
                id: id.clone(),
            })?;

            seen.insert(id.clone(), row_index);
            ids.push(SequenceId::new(id));
            sequences.push(sequence);
        }

        if ids.is_empty() {
            return Err(IoError::EmptyDataset {
                path: self.path.clone(),
            });
        }

        let dataset = Dataset { ids, sequences };
        info!(
            n_sequences = dataset.len(),
            alphabet = dataset.alphabet_size(),
            "dataset loaded"
        );
        Ok(dataset)
    }
}

impl SequenceSource for CsvSequenceReader {
    fn sequences(&self) -> Result<Dataset, IoError> {
        self.read()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    fn write_csv(content: &str) -> NamedTempFile {
        let mut f = NamedTempFile::new().unwrap();
        f.write_all(content.as_bytes()).unwrap();
        f.flush().unwrap();
        f
    }

    fn read(content: &str) -> Result<Dataset, IoError> {
        let f = write_csv(content);
        CsvSequenceReader::new(f.path()).read()
    }

    #[test]
    fn read_ragged_rows() {
        let ds = read("id,s0,s1,s2,s3\nA,0,1,0,1\nB,2,2\nC,3,1,0\n").unwrap();
        assert_eq!(ds.len(), 3);
        assert_eq!(ds.ids[1].as_str(), "B");
        assert_eq!(ds.sequences[0].as_slice(), &[0, 1, 0, 1]);
        assert_eq!(ds.sequences[1].as_slice(), &[2, 2]);
        assert_eq!(ds.alphabet_size(), 4);
    }

    #[test]
    fn empty_cell_terminates_row() {
        let ds = read("id,s0,s1,s2,s3\nA,0,1,,1\nB,2,,,\n").unwrap();
        assert_eq!(ds.sequences[0].as_slice(), &[0, 1]);
        assert_eq!(ds.sequences[1].as_slice(), &[2]);
    }

    #[test]
    fn whitespace_is_trimmed() {
        let ds = read("id,s0,s1\n A , 3 ,4\n").unwrap();
        assert_eq!(ds.ids[0].as_str(), "A");
        assert_eq!(ds.sequences[0].as_slice(), &[3, 4]);
    }

    #[test]
    fn headerless_and_delimiter() {
        let f = write_csv("A;0;1\nB;1;0\n");
        let ds = CsvSequenceReader::new(f.path())
            .with_headers(false)
            .with_delimiter(b';')
            .sequences()
            .unwrap();
        assert_eq!(ds.len(), 2);
        assert_eq!(ds.sequences[1].as_slice(), &[1, 0]);
    }

    #[test]
    fn insertion_order_preserved() {
        let ds = read("id,s0\nZZZ,1\nAAA,2\nMMM,3\n").unwrap();
        let ids: Vec<&str> = ds.ids.iter().map(SequenceId::as_str).collect();
        assert_eq!(ids, vec!["ZZZ", "AAA", "MMM"]);
    }

    #[test]
    fn file_not_found() {
        let result = CsvSequenceReader::new(Path::new("/nonexistent/sequences.csv")).read();
        assert!(matches!(result, Err(IoError::FileNotFound { .. })));
    }

    #[test]
    fn header_only_is_empty() {
        assert!(matches!(read("id,s0,s1\n"), Err(IoError::EmptyDataset { .. })));
    }

    #[test]
    fn row_without_symbols_rejected() {
        let result = read("id,s0,s1\nA,0,1\nB,,1\n");
        assert!(matches!(
            result,
            Err(IoError::EmptySequence { row_index: 1, ref id, .. }) if id == "B"
        ));
    }

    #[test]
    fn missing_id_rejected() {
        assert!(matches!(read("id,s0\n,1\n"), Err(IoError::MissingId { row_index: 0, .. })));
    }

    #[test]
    fn invalid_symbols_rejected() {
        for bad in ["-1", "1.5", "x"] {
            let result = read(&format!("id,s0,s1\nA,0,{bad}\n"));
            assert!(
                matches!(result, Err(IoError::InvalidSymbol { col_index: 1, ref raw, .. }) if raw == bad),
                "{bad} accepted"
            );
        }
    }

    #[test]
    fn duplicate_id_rejected() {
        let result = read("id,s0\nA,1\nB,2\nA,3\n");
        assert!(matches!(
            result,
            Err(IoError::DuplicateId { first_row: 0, second_row: 2, .. })
        ));
    }
}
