//! Vocabulary table parser.
//!
//! Reads supplied context group tables: delimited text files with one coded
//! entry per row, keyed by the name of the context group's enumerated value.
//!
//! ```text
//! key	codingSchemeDesignator	codeValue	codeMeaning
//! Abdomen	SRT	T-D4000	Abdomen
//! Chest	SRT	T-D3000	Chest
//! ```

use std::fs::File;
use std::io::{BufReader, Read};
use std::path::Path;

use csv::{Reader, ReaderBuilder, StringRecord};
use dcmr_types::CodedEntry;

use crate::types::{CmrError, CmrResult, VocabularyConfig};

/// Expected column names of a vocabulary table.
pub const EXPECTED_COLUMNS: &[&str] = &["key", "codingSchemeDesignator", "codeValue", "codeMeaning"];

/// One row of a vocabulary table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VocabularyRecord {
    /// Name of the enumerated value.
    pub key: String,
    /// The coded entry for this key.
    pub entry: CodedEntry,
}

impl VocabularyRecord {
    fn from_record(record: &StringRecord) -> CmrResult<Self> {
        if record.len() < EXPECTED_COLUMNS.len() {
            return Err(CmrError::InvalidHeader {
                expected: EXPECTED_COLUMNS.len(),
                found: record.len(),
            });
        }
        Ok(Self {
            key: record[0].trim().to_string(),
            entry: CodedEntry::new(record[2].trim(), record[1].trim(), record[3].trim()),
        })
    }
}

/// A streaming parser for vocabulary tables.
pub struct VocabularyParser<R: Read> {
    reader: Reader<R>,
    records_read: usize,
}

impl VocabularyParser<BufReader<File>> {
    /// Creates a new parser from a file path.
    ///
    /// # Errors
    /// Returns an error if the file cannot be opened or has invalid headers.
    pub fn from_path<P: AsRef<Path>>(path: P, config: &VocabularyConfig) -> CmrResult<Self> {
        let path = path.as_ref();

        if !path.exists() {
            return Err(CmrError::FileNotFound {
                path: path.display().to_string(),
            });
        }

        let file = File::open(path)?;
        Self::from_reader(BufReader::new(file), config)
    }
}

impl<R: Read> VocabularyParser<R> {
    /// Creates a new parser from a reader.
    pub fn from_reader(reader: R, config: &VocabularyConfig) -> CmrResult<Self> {
        let mut csv_reader = ReaderBuilder::new()
            .delimiter(config.delimiter)
            .has_headers(true)
            .flexible(false)
            .trim(csv::Trim::None)
            .from_reader(reader);

        Self::validate_headers(&mut csv_reader)?;

        Ok(Self {
            reader: csv_reader,
            records_read: 0,
        })
    }

    /// Validates that the table has the expected column headers.
    fn validate_headers(reader: &mut Reader<R>) -> CmrResult<()> {
        let headers = reader.headers()?;

        if headers.len() < EXPECTED_COLUMNS.len() {
            return Err(CmrError::InvalidHeader {
                expected: EXPECTED_COLUMNS.len(),
                found: headers.len(),
            });
        }

        for (i, expected_col) in EXPECTED_COLUMNS.iter().enumerate() {
            let found = headers.get(i).unwrap_or("");
            // Handle UTF-8 BOM at start of file
            let found = found.trim_start_matches('\u{feff}');
            if found != *expected_col {
                return Err(CmrError::UnexpectedColumn {
                    position: i,
                    expected: expected_col.to_string(),
                    found: found.to_string(),
                });
            }
        }

        Ok(())
    }

    /// Returns the number of rows read so far.
    pub fn records_read(&self) -> usize {
        self.records_read
    }

    /// Parses all rows into a Vec, stopping at the first malformed row.
    pub fn parse_all(self) -> CmrResult<Vec<VocabularyRecord>> {
        self.collect()
    }
}

impl<R: Read> Iterator for VocabularyParser<R> {
    type Item = CmrResult<VocabularyRecord>;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            let mut record = StringRecord::new();
            match self.reader.read_record(&mut record) {
                Ok(true) => {
                    self.records_read += 1;

                    // Skip empty rows
                    if record.is_empty() || record.iter().all(|f| f.trim().is_empty()) {
                        continue;
                    }

                    return Some(VocabularyRecord::from_record(&record));
                }
                Ok(false) => return None,
                Err(e) => return Some(Err(e.into())),
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const TABLE: &str = "key\tcodingSchemeDesignator\tcodeValue\tcodeMeaning\n\
                         Abdomen\tSRT\tT-D4000\tAbdomen\n\
                         Chest\tSRT\tT-D3000\tChest\n";

    #[test]
    fn test_parse_table() {
        let parser =
            VocabularyParser::from_reader(TABLE.as_bytes(), &VocabularyConfig::default()).unwrap();
        let records = parser.parse_all().unwrap();
        assert_eq!(records.len(), 2);
        assert_eq!(records[0].key, "Abdomen");
        assert_eq!(records[0].entry, CodedEntry::new("T-D4000", "SRT", "Abdomen"));
        assert_eq!(records[1].entry.code_meaning(), "Chest");
    }

    #[test]
    fn test_bom_is_ignored() {
        let table = format!("\u{feff}{TABLE}");
        let parser =
            VocabularyParser::from_reader(table.as_bytes(), &VocabularyConfig::default()).unwrap();
        assert_eq!(parser.count(), 2);
    }

    #[test]
    fn test_invalid_header() {
        let result = VocabularyParser::from_reader(
            "key\tcodeValue\n".as_bytes(),
            &VocabularyConfig::default(),
        );
        assert!(matches!(
            result,
            Err(CmrError::InvalidHeader {
                expected: 4,
                found: 2
            })
        ));
    }

    #[test]
    fn test_unexpected_column() {
        let result = VocabularyParser::from_reader(
            "key\tscheme\tcodeValue\tcodeMeaning\n".as_bytes(),
            &VocabularyConfig::default(),
        );
        assert!(matches!(
            result,
            Err(CmrError::UnexpectedColumn { position: 1, .. })
        ));
    }

    #[test]
    fn test_custom_delimiter() {
        let config = VocabularyConfig {
            delimiter: b';',
            ..Default::default()
        };
        let table = "key;codingSchemeDesignator;codeValue;codeMeaning\nHead;SRT;T-D1100;Head\n";
        let records = VocabularyParser::from_reader(table.as_bytes(), &config)
            .unwrap()
            .parse_all()
            .unwrap();
        assert_eq!(records[0].entry.code_value(), "T-D1100");
    }

    #[test]
    fn test_missing_file() {
        let result = VocabularyParser::from_path(
            "/nonexistent/cid4031.tsv",
            &VocabularyConfig::default(),
        );
        assert!(matches!(result, Err(CmrError::FileNotFound { .. })));
    }
}
