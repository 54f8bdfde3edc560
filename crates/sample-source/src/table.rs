//! Feature Table and Samples

use crate::SourceError;
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;
use std::sync::Arc;
use tracing::{debug, info};

/// Target column dropped from processed datasets before prediction
pub const DEFAULT_LABEL_COLUMN: &str = "class";

/// One row of named feature values
#[derive(Debug, Clone, PartialEq)]
pub struct Sample {
    columns: Arc<[String]>,
    values: Vec<f64>,
}

impl Sample {
    /// Feature names, in table order
    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    /// Feature values, aligned with `columns()`
    pub fn values(&self) -> &[f64] {
        &self.values
    }

    /// Look up a feature by name
    pub fn get(&self, name: &str) -> Option<f64> {
        self.columns
            .iter()
            .position(|c| c == name)
            .map(|i| self.values[i])
    }

    /// Iterate over (name, value) pairs
    pub fn iter(&self) -> impl Iterator<Item = (&str, f64)> + '_ {
        self.columns
            .iter()
            .map(String::as_str)
            .zip(self.values.iter().copied())
    }

    /// Number of features
    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

/// Static table of numeric feature rows
#[derive(Debug, Clone)]
pub struct FeatureTable {
    columns: Arc<[String]>,
    rows: Vec<Vec<f64>>,
}

impl FeatureTable {
    /// Build a table from in-memory rows
    pub fn new(columns: Vec<String>, rows: Vec<Vec<f64>>) -> Result<Self, SourceError> {
        let expected = columns.len();
        for (i, row) in rows.iter().enumerate() {
            if row.len() != expected {
                return Err(SourceError::RaggedRow {
                    line: i + 1,
                    expected,
                    actual: row.len(),
                });
            }
        }

        Ok(Self {
            columns: columns.into(),
            rows,
        })
    }

    /// Load a CSV file with a header row
    pub fn from_csv_path(
        path: impl AsRef<Path>,
        label_column: Option<&str>,
    ) -> Result<Self, SourceError> {
        let path = path.as_ref();
        info!("Loading feature table from {}", path.display());

        let file = File::open(path)?;
        let table = Self::from_csv_reader(BufReader::new(file), label_column)?;

        info!(
            "Feature table loaded: {} rows x {} features",
            table.len(),
            table.columns.len()
        );
        Ok(table)
    }

    /// Parse CSV from any buffered reader
    ///
    /// When `label_column` is set, that column must exist and is dropped
    /// without being parsed.
    pub fn from_csv_reader<R: BufRead>(
        reader: R,
        label_column: Option<&str>,
    ) -> Result<Self, SourceError> {
        let mut lines = reader
            .lines()
            .enumerate()
            .map(|(i, line)| line.map(|l| (i + 1, l)));

        let header = loop {
            match lines.next() {
                Some(line) => {
                    let (_, text) = line?;
                    if !text.trim().is_empty() {
                        break text;
                    }
                }
                None => return Err(SourceError::MissingHeader),
            }
        };

        let header: Vec<String> = split_fields(&header).map(str::to_string).collect();
        let label_idx = match label_column {
            Some(name) => Some(
                header
                    .iter()
                    .position(|c| c == name)
                    .ok_or_else(|| SourceError::MissingColumn(name.to_string()))?,
            ),
            None => None,
        };

        let columns: Vec<String> = header
            .iter()
            .enumerate()
            .filter(|(i, _)| Some(*i) != label_idx)
            .map(|(_, c)| c.clone())
            .collect();

        let mut rows = Vec::new();
        for line in lines {
            let (line_no, text) = line?;
            if text.trim().is_empty() {
                continue;
            }

            let fields: Vec<&str> = split_fields(&text).collect();
            if fields.len() != header.len() {
                return Err(SourceError::RaggedRow {
                    line: line_no,
                    expected: header.len(),
                    actual: fields.len(),
                });
            }

            let mut row = Vec::with_capacity(columns.len());
            for (i, field) in fields.into_iter().enumerate() {
                if Some(i) == label_idx {
                    continue;
                }
                let value = field.parse::<f64>().map_err(|_| SourceError::InvalidNumber {
                    line: line_no,
                    column: header[i].clone(),
                    value: field.to_string(),
                })?;
                row.push(value);
            }
            rows.push(row);
        }

        debug!("Parsed {} rows", rows.len());

        Ok(Self {
            columns: columns.into(),
            rows,
        })
    }

    /// Feature names
    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    /// Number of rows
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Row `index` as a sample
    pub fn sample(&self, index: usize) -> Option<Sample> {
        self.rows.get(index).map(|values| Sample {
            columns: Arc::clone(&self.columns),
            values: values.clone(),
        })
    }
}

fn split_fields(line: &str) -> impl Iterator<Item = &str> {
    line.split(',').map(|f| f.trim().trim_matches('"'))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    const CSV: &str = "aa_000,ab_000,class,ac_000\n1.5,2,0,3\n4,5.25,1,6\n";

    #[test]
    fn test_label_column_dropped() {
        let table = FeatureTable::from_csv_reader(Cursor::new(CSV), Some("class")).unwrap();

        assert_eq!(table.columns(), &["aa_000", "ab_000", "ac_000"]);
        assert_eq!(table.len(), 2);

        let sample = table.sample(1).unwrap();
        assert_eq!(sample.values(), &[4.0, 5.25, 6.0]);
        assert_eq!(sample.get("ab_000"), Some(5.25));
        assert_eq!(sample.get("class"), None);
    }

    #[test]
    fn test_missing_label_column() {
        let result = FeatureTable::from_csv_reader(Cursor::new("a,b\n1,2\n"), Some("class"));
        assert!(matches!(result, Err(SourceError::MissingColumn(c)) if c == "class"));
    }

    #[test]
    fn test_ragged_row_rejected() {
        let result = FeatureTable::from_csv_reader(Cursor::new("a,b\n1,2\n3\n"), None);
        assert!(matches!(
            result,
            Err(SourceError::RaggedRow { line: 3, expected: 2, actual: 1 })
        ));
    }

    #[test]
    fn test_non_numeric_cell() {
        let result = FeatureTable::from_csv_reader(Cursor::new("a,b\n1,na\n"), None);
        match result {
            Err(SourceError::InvalidNumber { line, column, value }) => {
                assert_eq!(line, 2);
                assert_eq!(column, "b");
                assert_eq!(value, "na");
            }
            other => panic!("unexpected result: {:?}", other),
        }
    }

    #[test]
    fn test_header_only_is_empty_table() {
        let table = FeatureTable::from_csv_reader(Cursor::new("a,b\n\n"), None).unwrap();
        assert!(table.is_empty());
        assert!(table.sample(0).is_none());
    }

    #[test]
    fn test_empty_input_has_no_header() {
        let result = FeatureTable::from_csv_reader(Cursor::new(""), None);
        assert!(matches!(result, Err(SourceError::MissingHeader)));
    }

    #[test]
    fn test_in_memory_width_check() {
        let result = FeatureTable::new(vec!["a".into()], vec![vec![1.0, 2.0]]);
        assert!(result.is_err());
    }
}
